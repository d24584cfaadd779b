use crate::{
    bus::{BusError, Context, Result},
    use_cases::{posts, users},
};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};
use postbox_common::{
    event::{
        AllPostViewRequested, Event, EventType, EventVariant, PostCreated, PostDeleted,
        PostUpdated, PostViewRequested, UserCreationRequested, UserDeletionRequested,
        UserInfoRequested, UserPostViewRequested,
    },
    model::{
        Id,
        post::{Post, PostMarker, UserPost},
        user::{User, UserMarker},
    },
};
use serde::Serialize;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// What a handler hands back to the dispatcher.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    UserCreated(Id<UserMarker>),
    User(User),
    UserDeleted(User),
    PostCreated(Id<PostMarker>),
    Post(Post),
    PostDeleted(Post),
    UserPosts(Vec<UserPost>),
}

/// An outcome plus any events the handler wants dispatched next.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Reply {
    pub outcome: Outcome,
    pub follow_ups: Vec<Event>,
}

impl Reply {
    #[must_use]
    pub fn with_follow_up(mut self, event: Event) -> Self {
        self.follow_ups.push(event);
        self
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        Self {
            outcome,
            follow_ups: Vec::new(),
        }
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<Reply>>;
pub type Handler = Arc<dyn Fn(Context, Event) -> HandlerFuture + Send + Sync>;

/// Wraps a function of one event variant into a [`Handler`].
///
/// The handler fails with [`BusError::UnexpectedEvent`] when given any other variant.
pub fn handler<E, F, Fut, R>(f: F) -> Handler
where
    E: EventVariant + Send + 'static,
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: Into<Reply> + 'static,
{
    Arc::new(
        move |context: Context, event: Event| -> HandlerFuture {
            match E::from_payload(event.payload) {
                Ok(payload) => f(context, payload)
                    .map(|result| result.map(Into::into))
                    .boxed(),
                Err(other) => future::ready(Err(BusError::UnexpectedEvent {
                    expected: E::TYPE,
                    received: other.event_type(),
                }))
                .boxed(),
            }
        },
    )
}

/// The use case that serves each event type.
fn use_case(event_type: EventType) -> Handler {
    match event_type {
        EventType::UserCreationRequested => {
            handler(|context: Context, event: UserCreationRequested| async move {
                users::create_user(&context, event)
                    .await
                    .map(Outcome::UserCreated)
            })
        }
        EventType::UserInfoRequested => {
            handler(|context: Context, event: UserInfoRequested| async move {
                users::get_user(&context, event).await.map(Outcome::User)
            })
        }
        EventType::UserDeletionRequested => {
            handler(|context: Context, event: UserDeletionRequested| async move {
                users::delete_user(&context, event)
                    .await
                    .map(Outcome::UserDeleted)
            })
        }
        EventType::PostCreated => handler(|context: Context, event: PostCreated| async move {
            posts::create_post(&context, event)
                .await
                .map(Outcome::PostCreated)
        }),
        EventType::PostViewRequested => {
            handler(|context: Context, event: PostViewRequested| async move {
                posts::get_post(&context, event).await.map(Outcome::Post)
            })
        }
        EventType::UserPostViewRequested => {
            handler(|context: Context, event: UserPostViewRequested| async move {
                users::get_user_posts(&context, event)
                    .await
                    .map(Outcome::UserPosts)
            })
        }
        EventType::AllPostViewRequested => {
            handler(|context: Context, event: AllPostViewRequested| async move {
                posts::get_all_posts(&context, event)
                    .await
                    .map(Outcome::UserPosts)
            })
        }
        EventType::PostUpdated => handler(|context: Context, event: PostUpdated| async move {
            posts::update_post(&context, event).await.map(Outcome::Post)
        }),
        EventType::PostDeleted => handler(|context: Context, event: PostDeleted| async move {
            posts::delete_post(&context, event)
                .await
                .map(Outcome::PostDeleted)
        }),
    }
}

/// Handlers per event type, run in registration order.
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<EventType, Vec<Handler>>,
}

impl HandlerTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One use case per event type.
    #[must_use]
    pub fn with_use_cases() -> Self {
        let mut table = Self::new();
        for event_type in EventType::ALL {
            table.register(event_type, use_case(event_type));
        }
        table
    }

    pub fn register(&mut self, event_type: EventType, handler: Handler) -> &mut Self {
        self.handlers.entry(event_type).or_default().push(handler);
        self
    }

    #[must_use]
    pub fn get(&self, event_type: EventType) -> &[Handler] {
        self.handlers
            .get(&event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn first_unhandled(&self) -> Option<EventType> {
        EventType::ALL
            .into_iter()
            .find(|event_type| self.get(*event_type).is_empty())
    }
}

impl Debug for HandlerTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<_> = self
            .handlers
            .iter()
            .map(|(event_type, handlers)| (*event_type, handlers.len()))
            .collect();
        counts.sort();

        f.debug_struct("HandlerTable")
            .field("handlers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_cases_cover_every_event_type() {
        let table = HandlerTable::with_use_cases();

        assert_eq!(table.first_unhandled(), None);
        for event_type in EventType::ALL {
            assert_eq!(table.get(event_type).len(), 1);
        }
    }

    #[test]
    fn unregistered_type_has_no_handlers() {
        let mut table = HandlerTable::new();
        table.register(EventType::PostDeleted, use_case(EventType::PostDeleted));

        assert!(table.get(EventType::PostViewRequested).is_empty());
        assert_eq!(table.first_unhandled(), Some(EventType::UserCreationRequested));
    }
}
