use postbox_common::{
    event::{Event, EventType},
    model::{
        Id, ModelValidationError,
        auth::{CredentialHasher, PasswordHashError},
        user::UserMarker,
    },
};
use postbox_db::client::{DbClient, DbError};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, instrument};

mod handlers;

pub use handlers::{Handler, HandlerFuture, HandlerTable, Outcome, Reply, handler};

pub type Result<T, E = BusError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Invalid input: {0}")]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error("The password for user {0} was rejected")]
    InvalidCredentials(Id<UserMarker>),
    #[error("No handler is registered for {0} events")]
    Unhandled(EventType),
    #[error("A handler for {expected} events received a {received} event")]
    UnexpectedEvent {
        expected: EventType,
        received: EventType,
    },
}

/// Coarse classification of a [`BusError`], for callers that map errors to responses.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthorized,
    Configuration,
    Failure,
}

impl BusError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusError::Database(err) if err.is_not_found() => ErrorKind::NotFound,
            BusError::Validation(_) => ErrorKind::Validation,
            BusError::InvalidCredentials(_) => ErrorKind::Unauthorized,
            BusError::Unhandled(_) | BusError::UnexpectedEvent { .. } => ErrorKind::Configuration,
            BusError::Database(_) | BusError::PasswordHash(_) => ErrorKind::Failure,
        }
    }
}

/// Everything a use case needs, handed to each handler invocation.
#[derive(Clone, Debug)]
pub struct Context {
    pub db: DbClient,
    pub hasher: CredentialHasher,
}

impl Context {
    #[must_use]
    pub fn new(db: DbClient, hasher: CredentialHasher) -> Self {
        Self { db, hasher }
    }
}

/// Dispatches events to the handlers registered for their type.
#[derive(Debug)]
pub struct MessageBus {
    context: Context,
    handlers: HandlerTable,
}

impl MessageBus {
    /// Fails if any event type has no handler.
    pub fn new(context: Context, handlers: HandlerTable) -> Result<Self> {
        if let Some(event_type) = handlers.first_unhandled() {
            return Err(BusError::Unhandled(event_type));
        }

        Ok(Self { context, handlers })
    }

    /// Runs every handler for `event`, then for any follow-up events they produce,
    /// in FIFO order. Outcomes are returned in the order the handlers ran.
    #[instrument(
        name = "postbox.bus.handle",
        skip_all,
        fields(event_id = %event.id, event_type = %event.event_type())
    )]
    pub async fn handle(&self, event: Event) -> Result<Vec<Outcome>> {
        let mut results = Vec::new();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let event_type = event.event_type();
            let handlers = self.handlers.get(event_type);
            debug_assert!(!handlers.is_empty(), "no handler for {event_type}");

            debug!(
                event_id = %event.id,
                %event_type,
                handlers = handlers.len(),
                "Dispatching event"
            );

            for run in handlers {
                let reply = run(self.context.clone(), event.clone()).await?;
                results.push(reply.outcome);
                queue.extend(reply.follow_ups);
            }
        }

        Ok(results)
    }
}
