//! Requests that can be dispatched on the message bus.
//!
//! Events are immutable and live for a single dispatch; they are never stored.

use crate::model::{Id, post::PostMarker, user::UserMarker};
use serde::Deserialize;
use std::fmt::Display;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Event {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    pub payload: EventPayload,
}

impl Event {
    #[must_use]
    pub fn new(payload: impl Into<EventPayload>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    UserCreationRequested(UserCreationRequested),
    UserInfoRequested(UserInfoRequested),
    UserDeletionRequested(UserDeletionRequested),
    PostCreated(PostCreated),
    PostViewRequested(PostViewRequested),
    UserPostViewRequested(UserPostViewRequested),
    AllPostViewRequested(AllPostViewRequested),
    PostUpdated(PostUpdated),
    PostDeleted(PostDeleted),
}

/// Registers a new user. A missing id is generated.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct UserCreationRequested {
    pub id: Option<Id<UserMarker>>,
    pub name: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct UserInfoRequested {
    pub id: Id<UserMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct UserDeletionRequested {
    pub id: Id<UserMarker>,
    pub password: String,
}

/// Publishes a new post by `user_id`. A missing id is generated.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct PostCreated {
    pub id: Option<Id<PostMarker>>,
    pub user_id: Id<UserMarker>,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct PostViewRequested {
    pub id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct UserPostViewRequested {
    pub id: Id<UserMarker>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct AllPostViewRequested {}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct PostUpdated {
    pub id: Id<PostMarker>,
    pub user_id: Id<UserMarker>,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct PostDeleted {
    pub id: Id<PostMarker>,
}

/// The kind of an event, without its data.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum EventType {
    UserCreationRequested,
    UserInfoRequested,
    UserDeletionRequested,
    PostCreated,
    PostViewRequested,
    UserPostViewRequested,
    AllPostViewRequested,
    PostUpdated,
    PostDeleted,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::UserCreationRequested,
        EventType::UserInfoRequested,
        EventType::UserDeletionRequested,
        EventType::PostCreated,
        EventType::PostViewRequested,
        EventType::UserPostViewRequested,
        EventType::AllPostViewRequested,
        EventType::PostUpdated,
        EventType::PostDeleted,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EventType::UserCreationRequested => "UserCreationRequested",
            EventType::UserInfoRequested => "UserInfoRequested",
            EventType::UserDeletionRequested => "UserDeletionRequested",
            EventType::PostCreated => "PostCreated",
            EventType::PostViewRequested => "PostViewRequested",
            EventType::UserPostViewRequested => "UserPostViewRequested",
            EventType::AllPostViewRequested => "AllPostViewRequested",
            EventType::PostUpdated => "PostUpdated",
            EventType::PostDeleted => "PostDeleted",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A payload struct that corresponds to exactly one [`EventPayload`] variant.
pub trait EventVariant: Sized {
    const TYPE: EventType;

    /// Unwraps the payload, handing it back unchanged if it is another variant.
    fn from_payload(payload: EventPayload) -> Result<Self, EventPayload>;
}

macro_rules! event_variants {
    ($($variant:ident),* $(,)?) => {
        impl EventPayload {
            #[must_use]
            pub fn event_type(&self) -> EventType {
                match self {
                    $(EventPayload::$variant(_) => EventType::$variant,)*
                }
            }
        }

        $(
            impl EventVariant for $variant {
                const TYPE: EventType = EventType::$variant;

                fn from_payload(payload: EventPayload) -> Result<Self, EventPayload> {
                    match payload {
                        EventPayload::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }

            impl From<$variant> for EventPayload {
                fn from(value: $variant) -> Self {
                    EventPayload::$variant(value)
                }
            }
        )*
    };
}

event_variants!(
    UserCreationRequested,
    UserInfoRequested,
    UserDeletionRequested,
    PostCreated,
    PostViewRequested,
    UserPostViewRequested,
    AllPostViewRequested,
    PostUpdated,
    PostDeleted,
);
