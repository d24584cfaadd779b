use crate::{
    client::{DbError, Result},
    record::{PostRecord, UserPostRecord, now_utc},
    repository::{Repository, user::UserRepository},
};
use postbox_common::model::{
    EntityKey, Id,
    post::{CreatePost, Post, PostMarker, UpdatePost, UserPost},
    user::UserMarker,
};
use sqlx::{SqliteConnection, query, query_as};
use tracing::debug;

pub struct PostRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PostRepository<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Every post with its author's name, oldest first.
    pub async fn get_all(&mut self) -> Result<Vec<UserPost>> {
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
            ORDER BY
                posts.created_at, posts.id
            ",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let posts = records
            .into_iter()
            .map(UserPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn ensure_author_exists(&mut self, author: &Id<UserMarker>) -> Result<()> {
        UserRepository::new(&mut *self.conn)
            .get_by_id(author)
            .await
            .map(drop)
    }
}

impl Repository for PostRepository<'_> {
    type Marker = PostMarker;
    type Entity = Post;
    type Create = CreatePost;
    type Update = UpdatePost;

    async fn get_by_id(&mut self, id: &Id<PostMarker>) -> Result<Post> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                posts.id,
                posts.title,
                posts.content,
                posts.author,
                posts.created_at,
                posts.updated_at
            FROM
                posts
            WHERE
                posts.id = ?
            ",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.conn)
        .await?;

        let post = record
            .map(Post::try_from)
            .transpose()?
            .ok_or_else(|| DbError::NotFound(id.clone().into()))?;
        Ok(post)
    }

    async fn add(&mut self, post: &CreatePost) -> Result<()> {
        self.ensure_author_exists(&post.author).await?;

        let key = EntityKey::from(post.id.clone());
        let now = now_utc();

        let result = query(
            "
            INSERT INTO posts (id, title, content, author, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(post.id.get())
        .bind(&post.title)
        .bind(post.content.get())
        .bind(post.author.get())
        .bind(now)
        .bind(now)
        .execute(&mut *self.conn)
        .await
        .map_err(|err| DbError::InsertFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::InsertFailure(key, None));
        }

        debug!(post_id = %post.id, author = %post.author, "Inserted post");
        Ok(())
    }

    async fn delete(&mut self, id: &Id<PostMarker>) -> Result<Post> {
        let post = self.get_by_id(id).await?;
        let key = EntityKey::from(id.clone());

        let result = query("DELETE FROM posts WHERE posts.id = ?")
            .bind(id.get())
            .execute(&mut *self.conn)
            .await
            .map_err(|err| DbError::DeleteFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::DeleteFailure(key, None));
        }

        debug!(post_id = %id, "Deleted post");
        Ok(post)
    }

    async fn update(&mut self, id: &Id<PostMarker>, new_values: &UpdatePost) -> Result<Post> {
        self.get_by_id(id).await?;
        self.ensure_author_exists(&new_values.author).await?;
        let key = EntityKey::from(id.clone());

        let result = query(
            "
            UPDATE posts
            SET
                title = ?,
                content = ?,
                author = ?,
                updated_at = ?
            WHERE
                posts.id = ?
            ",
        )
        .bind(&new_values.title)
        .bind(new_values.content.get())
        .bind(new_values.author.get())
        .bind(now_utc())
        .bind(id.get())
        .execute(&mut *self.conn)
        .await
        .map_err(|err| DbError::UpdateFailure(key.clone(), Some(err)))?;

        if result.rows_affected() != 1 {
            return Err(DbError::UpdateFailure(key, None));
        }

        debug!(post_id = %id, "Updated post");
        self.get_by_id(id).await
    }
}
