use crate::model::{Id, auth::PasswordHash};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub name: String,
    #[serde(skip)]
    pub password: PasswordHash,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateUser {
    pub id: Id<UserMarker>,
    pub name: String,
    pub password: PasswordHash,
}

/// Replacement values for every mutable column of a user.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UpdateUser {
    pub name: String,
    pub password: PasswordHash,
}
