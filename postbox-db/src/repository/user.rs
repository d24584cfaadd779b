use crate::{
    client::{DbError, Result},
    record::{UserPostRecord, UserRecord, now_utc},
    repository::Repository,
};
use postbox_common::model::{
    EntityKey, Id,
    post::UserPost,
    user::{CreateUser, UpdateUser, User, UserMarker},
};
use sqlx::{SqliteConnection, query, query_as};
use tracing::debug;

pub struct UserRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UserRepository<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// All posts written by the user, oldest first.
    pub async fn get_user_posts(&mut self, id: &Id<UserMarker>) -> Result<Vec<UserPost>> {
        self.get_by_id(id).await?;

        let records = query_as::<_, UserPostRecord>(
            "
            SELECT
                posts.id,
                posts.title,
                posts.content,
                users.id AS user_id,
                users.name AS user_name
            FROM
                posts JOIN users ON posts.author = users.id
            WHERE
                users.id = ?
            ORDER BY
                posts.created_at, posts.id
            ",
        )
        .bind(id.get())
        .fetch_all(&mut *self.conn)
        .await?;

        let posts = records
            .into_iter()
            .map(UserPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }
}

impl Repository for UserRepository<'_> {
    type Marker = UserMarker;
    type Entity = User;
    type Create = CreateUser;
    type Update = UpdateUser;

    async fn get_by_id(&mut self, id: &Id<UserMarker>) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.id,
                users.name,
                users.password,
                users.created_at,
                users.updated_at
            FROM
                users
            WHERE
                users.id = ?
            ",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.conn)
        .await?;

        record
            .map(User::from)
            .ok_or_else(|| DbError::NotFound(id.clone().into()))
    }

    async fn add(&mut self, user: &CreateUser) -> Result<()> {
        let key = EntityKey::from(user.id.clone());
        let now = now_utc();

        let result = query(
            "
            INSERT INTO users (id, name, password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(user.id.get())
        .bind(&user.name)
        .bind(user.password.as_phc())
        .bind(now)
        .bind(now)
        .execute(&mut *self.conn)
        .await
        .map_err(|err| DbError::InsertFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::InsertFailure(key, None));
        }

        debug!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    async fn delete(&mut self, id: &Id<UserMarker>) -> Result<User> {
        let user = self.get_by_id(id).await?;
        let key = EntityKey::from(id.clone());

        let result = query("DELETE FROM users WHERE users.id = ?")
            .bind(id.get())
            .execute(&mut *self.conn)
            .await
            .map_err(|err| DbError::DeleteFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::DeleteFailure(key, None));
        }

        debug!(user_id = %id, "Deleted user");
        Ok(user)
    }

    async fn update(&mut self, id: &Id<UserMarker>, new_values: &UpdateUser) -> Result<User> {
        self.get_by_id(id).await?;
        let key = EntityKey::from(id.clone());

        let result = query(
            "
            UPDATE users
            SET
                name = ?,
                password = ?,
                updated_at = ?
            WHERE
                users.id = ?
            ",
        )
        .bind(&new_values.name)
        .bind(new_values.password.as_phc())
        .bind(now_utc())
        .bind(id.get())
        .execute(&mut *self.conn)
        .await
        .map_err(|err| DbError::UpdateFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::UpdateFailure(key, None));
        }

        debug!(user_id = %id, "Updated user");
        self.get_by_id(id).await
    }
}
