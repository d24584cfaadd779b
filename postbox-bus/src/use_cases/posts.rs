use crate::bus::{BusError, Context, Result};
use postbox_common::{
    event::{AllPostViewRequested, PostCreated, PostDeleted, PostUpdated, PostViewRequested},
    model::{
        Id, ModelValidationError,
        post::{CreatePost, Post, PostContent, PostMarker, UpdatePost, UserPost},
    },
};
use postbox_db::repository::Repository;
use tracing::{info, instrument};

fn validate_content(content: String) -> Result<PostContent> {
    PostContent::new(content).map_err(|err| BusError::Validation(ModelValidationError::from(err)))
}

#[instrument(name = "postbox.use_cases.create_post", skip_all, fields(user_id = %event.user_id))]
pub async fn create_post(context: &Context, event: PostCreated) -> Result<Id<PostMarker>> {
    let content = validate_content(event.content)?;
    let id = event.id.unwrap_or_else(Id::generate);

    let mut uow = context.db.unit_of_work().await?;
    uow.posts()
        .add(&CreatePost {
            id: id.clone(),
            author: event.user_id,
            title: event.title,
            content,
        })
        .await?;
    uow.commit().await?;

    info!(post_id = %id, "Created post");
    Ok(id)
}

#[instrument(name = "postbox.use_cases.get_post", skip_all, fields(post_id = %event.id))]
pub async fn get_post(context: &Context, event: PostViewRequested) -> Result<Post> {
    let mut uow = context.db.unit_of_work().await?;
    let post = uow.posts().get_by_id(&event.id).await?;

    Ok(post)
}

#[instrument(name = "postbox.use_cases.get_all_posts", skip_all)]
pub async fn get_all_posts(context: &Context, _event: AllPostViewRequested) -> Result<Vec<UserPost>> {
    let mut uow = context.db.unit_of_work().await?;
    let posts = uow.posts().get_all().await?;

    Ok(posts)
}

/// Returns the post as stored after the update.
#[instrument(name = "postbox.use_cases.update_post", skip_all, fields(post_id = %event.id))]
pub async fn update_post(context: &Context, event: PostUpdated) -> Result<Post> {
    let content = validate_content(event.content)?;

    let mut uow = context.db.unit_of_work().await?;
    let post = uow
        .posts()
        .update(
            &event.id,
            &UpdatePost {
                author: event.user_id,
                title: event.title,
                content,
            },
        )
        .await?;
    uow.commit().await?;

    info!("Updated post");
    Ok(post)
}

#[instrument(name = "postbox.use_cases.delete_post", skip_all, fields(post_id = %event.id))]
pub async fn delete_post(context: &Context, event: PostDeleted) -> Result<Post> {
    let mut uow = context.db.unit_of_work().await?;
    let post = uow.posts().delete(&event.id).await?;
    uow.commit().await?;

    info!("Deleted post");
    Ok(post)
}
