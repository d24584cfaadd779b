pub mod auth;
pub mod post;
pub mod user;

use crate::model::{
    post::{InvalidPostContentError, PostMarker},
    user::UserMarker,
};
use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    PostContent(#[from] InvalidPostContentError),
}

/// An opaque string key, tagged with the kind of entity it identifies.
#[derive_where(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    /// Creates a fresh random (UUID v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<String> for Id<Marker> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<&str> for Id<Marker> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Names a single stored entity, for error reporting.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum EntityKey {
    User(Id<UserMarker>),
    Post(Id<PostMarker>),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::User(id) => write!(f, "user {id}"),
            EntityKey::Post(id) => write!(f, "post {id}"),
        }
    }
}

impl From<Id<UserMarker>> for EntityKey {
    fn from(value: Id<UserMarker>) -> Self {
        Self::User(value)
    }
}

impl From<Id<PostMarker>> for EntityKey {
    fn from(value: Id<PostMarker>) -> Self {
        Self::Post(value)
    }
}
