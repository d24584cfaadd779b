#![allow(dead_code)]

use argon2::Params;
use postbox_bus::bus::{Context, HandlerTable, MessageBus, Outcome};
use postbox_common::{
    event::{Event, EventPayload},
    model::auth::CredentialHasher,
};
use postbox_db::client::{DbClient, DbConfig};

pub async fn context() -> Context {
    let db = DbClient::connect(&DbConfig::in_memory()).await.unwrap();
    db.migrate().await.unwrap();

    let hasher = CredentialHasher::new(Params::new(64, 1, 1, None).unwrap());
    Context::new(db, hasher)
}

pub async fn bus() -> MessageBus {
    MessageBus::new(context().await, HandlerTable::with_use_cases()).unwrap()
}

/// Dispatches an event that is expected to produce exactly one outcome.
pub async fn handle_one(bus: &MessageBus, payload: impl Into<EventPayload>) -> Outcome {
    let mut outcomes = bus.handle(Event::new(payload)).await.unwrap();
    assert_eq!(outcomes.len(), 1, "expected a single outcome, got {outcomes:?}");
    outcomes.remove(0)
}
