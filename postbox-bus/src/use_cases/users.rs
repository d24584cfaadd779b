use crate::bus::{BusError, Context, Result};
use postbox_common::{
    event::{UserCreationRequested, UserDeletionRequested, UserInfoRequested, UserPostViewRequested},
    model::{
        Id,
        post::UserPost,
        user::{CreateUser, User, UserMarker},
    },
};
use postbox_db::repository::Repository;
use tracing::{info, instrument};

#[instrument(name = "postbox.use_cases.create_user", skip_all)]
pub async fn create_user(context: &Context, event: UserCreationRequested) -> Result<Id<UserMarker>> {
    let id = event.id.unwrap_or_else(Id::generate);
    let password = context.hasher.hash(&event.password)?;

    let mut uow = context.db.unit_of_work().await?;
    uow.users()
        .add(&CreateUser {
            id: id.clone(),
            name: event.name,
            password,
        })
        .await?;
    uow.commit().await?;

    info!(user_id = %id, "Created user");
    Ok(id)
}

#[instrument(name = "postbox.use_cases.get_user", skip_all, fields(user_id = %event.id))]
pub async fn get_user(context: &Context, event: UserInfoRequested) -> Result<User> {
    let mut uow = context.db.unit_of_work().await?;
    let user = uow.users().get_by_id(&event.id).await?;

    Ok(user)
}

/// Deletes the user and, through the foreign key, all of their posts.
#[instrument(name = "postbox.use_cases.delete_user", skip_all, fields(user_id = %event.id))]
pub async fn delete_user(context: &Context, event: UserDeletionRequested) -> Result<User> {
    let mut uow = context.db.unit_of_work().await?;

    let user = uow.users().get_by_id(&event.id).await?;
    if !context.hasher.verify(&user.password, &event.password)? {
        return Err(BusError::InvalidCredentials(event.id));
    }

    let deleted = uow.users().delete(&event.id).await?;
    uow.commit().await?;

    info!("Deleted user");
    Ok(deleted)
}

#[instrument(name = "postbox.use_cases.get_user_posts", skip_all, fields(user_id = %event.id))]
pub async fn get_user_posts(
    context: &Context,
    event: UserPostViewRequested,
) -> Result<Vec<UserPost>> {
    let mut uow = context.db.unit_of_work().await?;
    let posts = uow.users().get_user_posts(&event.id).await?;

    Ok(posts)
}
