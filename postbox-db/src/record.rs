use postbox_common::model::{
    ModelValidationError,
    auth::PasswordHash,
    post::{Post, PostContent, UserPost},
    user::User,
};
use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub id: String,
    pub name: String,
    pub password: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserPostRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub user_name: String,
}

/// Timestamps are stored as UTC without an offset.
pub(crate) fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            password: PasswordHash::from_phc(value.password),
            created_at: value.created_at.assume_utc(),
            updated_at: value.updated_at.assume_utc(),
        }
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            author: value.author.into(),
            title: value.title,
            content: PostContent::new(value.content)?,
            created_at: value.created_at.assume_utc(),
            updated_at: value.updated_at.assume_utc(),
        })
    }
}

impl TryFrom<UserPostRecord> for UserPost {
    type Error = ModelValidationError;

    fn try_from(value: UserPostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: value.title,
            content: PostContent::new(value.content)?,
            user_id: value.user_id.into(),
            user_name: value.user_name,
        })
    }
}
