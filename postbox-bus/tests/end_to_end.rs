mod common;

use common::{bus, handle_one};
use postbox_bus::bus::{ErrorKind, Outcome};
use postbox_common::{
    event::{
        AllPostViewRequested, Event, PostCreated, PostDeleted, PostUpdated, PostViewRequested,
        UserCreationRequested, UserDeletionRequested, UserInfoRequested, UserPostViewRequested,
    },
    model::Id,
};

fn ann() -> UserCreationRequested {
    UserCreationRequested {
        id: Some(Id::new("u1")),
        name: "Ann".to_owned(),
        password: "x".to_owned(),
    }
}

fn first_post() -> PostCreated {
    PostCreated {
        id: Some(Id::new("p1")),
        user_id: Id::new("u1"),
        title: "T".to_owned(),
        content: "C".to_owned(),
    }
}

#[tokio::test]
async fn user_then_post_round_trip() {
    let bus = bus().await;

    let created = handle_one(&bus, ann()).await;
    assert_eq!(created, Outcome::UserCreated(Id::new("u1")));

    let Outcome::User(user) = handle_one(&bus, UserInfoRequested { id: Id::new("u1") }).await
    else {
        panic!("expected a user");
    };
    assert_eq!(user.name, "Ann");

    let created = handle_one(&bus, first_post()).await;
    assert_eq!(created, Outcome::PostCreated(Id::new("p1")));

    let Outcome::Post(post) = handle_one(&bus, PostViewRequested { id: Id::new("p1") }).await
    else {
        panic!("expected a post");
    };
    assert_eq!(post.author, Id::new("u1"));
    assert_eq!(post.title, "T");
    assert_eq!(post.content.get(), "C");
}

#[tokio::test]
async fn password_is_not_stored_in_plaintext() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;

    let Outcome::User(user) = handle_one(&bus, UserInfoRequested { id: Id::new("u1") }).await
    else {
        panic!("expected a user");
    };

    assert_ne!(user.password.as_phc(), "x");
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("password"));
}

#[tokio::test]
async fn missing_ids_are_generated() {
    let bus = bus().await;

    let Outcome::UserCreated(user_id) = handle_one(
        &bus,
        UserCreationRequested {
            id: None,
            ..ann()
        },
    )
    .await
    else {
        panic!("expected a user id");
    };
    let Outcome::PostCreated(post_id) = handle_one(
        &bus,
        PostCreated {
            id: None,
            user_id: user_id.clone(),
            ..first_post()
        },
    )
    .await
    else {
        panic!("expected a post id");
    };

    assert!(!user_id.get().is_empty());
    let Outcome::Post(post) = handle_one(&bus, PostViewRequested { id: post_id }).await else {
        panic!("expected a post");
    };
    assert_eq!(post.author, user_id);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let bus = bus().await;

    let err = bus
        .handle(Event::new(UserInfoRequested { id: Id::new("ghost") }))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn post_by_unknown_author_is_rejected_without_writing() {
    let bus = bus().await;

    let err = bus
        .handle(Event::new(PostCreated {
            user_id: Id::new("ghost"),
            ..first_post()
        }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let outcome = handle_one(&bus, AllPostViewRequested {}).await;
    assert_eq!(outcome, Outcome::UserPosts(Vec::new()));
}

#[tokio::test]
async fn overlong_content_is_a_validation_failure() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;

    let err = bus
        .handle(Event::new(PostCreated {
            content: "a".repeat(201),
            ..first_post()
        }))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn post_listings_join_author_names() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;
    handle_one(
        &bus,
        UserCreationRequested {
            id: Some(Id::new("u2")),
            name: "Bob".to_owned(),
            password: "y".to_owned(),
        },
    )
    .await;
    handle_one(&bus, first_post()).await;
    handle_one(
        &bus,
        PostCreated {
            id: Some(Id::new("p2")),
            user_id: Id::new("u2"),
            ..first_post()
        },
    )
    .await;

    let Outcome::UserPosts(all) = handle_one(&bus, AllPostViewRequested {}).await else {
        panic!("expected posts");
    };
    assert_eq!(all.len(), 2);

    let Outcome::UserPosts(bobs) =
        handle_one(&bus, UserPostViewRequested { id: Id::new("u2") }).await
    else {
        panic!("expected posts");
    };
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id, Id::new("p2"));
    assert_eq!(bobs[0].user_name, "Bob");
}

#[tokio::test]
async fn update_returns_the_persisted_post() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;
    handle_one(&bus, first_post()).await;

    let Outcome::Post(updated) = handle_one(
        &bus,
        PostUpdated {
            id: Id::new("p1"),
            user_id: Id::new("u1"),
            title: "T2".to_owned(),
            content: "C2".to_owned(),
        },
    )
    .await
    else {
        panic!("expected a post");
    };
    assert_eq!(updated.title, "T2");

    let Outcome::Post(fetched) = handle_one(&bus, PostViewRequested { id: Id::new("p1") }).await
    else {
        panic!("expected a post");
    };
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn post_can_be_deleted_once() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;
    handle_one(&bus, first_post()).await;

    let Outcome::PostDeleted(deleted) = handle_one(&bus, PostDeleted { id: Id::new("p1") }).await
    else {
        panic!("expected the deleted post");
    };
    assert_eq!(deleted.id, Id::new("p1"));

    for event in [
        Event::new(PostViewRequested { id: Id::new("p1") }),
        Event::new(PostDeleted { id: Id::new("p1") }),
    ] {
        let err = bus.handle(event).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn user_deletion_requires_the_password() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;
    handle_one(&bus, first_post()).await;

    let err = bus
        .handle(Event::new(UserDeletionRequested {
            id: Id::new("u1"),
            password: "wrong".to_owned(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    handle_one(&bus, UserInfoRequested { id: Id::new("u1") }).await;

    let Outcome::UserDeleted(deleted) = handle_one(
        &bus,
        UserDeletionRequested {
            id: Id::new("u1"),
            password: "x".to_owned(),
        },
    )
    .await
    else {
        panic!("expected the deleted user");
    };
    assert_eq!(deleted.name, "Ann");

    let err = bus
        .handle(Event::new(UserInfoRequested { id: Id::new("u1") }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = bus
        .handle(Event::new(PostViewRequested { id: Id::new("p1") }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn duplicate_user_is_a_failure() {
    let bus = bus().await;
    handle_one(&bus, ann()).await;

    let err = bus.handle(Event::new(ann())).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Failure);
}
