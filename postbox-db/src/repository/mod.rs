pub mod post;
pub mod user;

use crate::client::Result;
use postbox_common::model::Id;

/// Gateway between one kind of entity and its table.
///
/// Implementations borrow the connection of a [`UnitOfWork`](crate::unit_of_work::UnitOfWork),
/// so every call runs inside that unit's transaction.
pub trait Repository {
    type Marker;
    type Entity;
    type Create;
    type Update;

    /// Fails with [`DbError::NotFound`](crate::client::DbError::NotFound) when no row matches.
    fn get_by_id(&mut self, id: &Id<Self::Marker>) -> impl Future<Output = Result<Self::Entity>> + Send;

    fn add(&mut self, entity: &Self::Create) -> impl Future<Output = Result<()>> + Send;

    /// Returns the entity as it was before deletion.
    fn delete(&mut self, id: &Id<Self::Marker>) -> impl Future<Output = Result<Self::Entity>> + Send;

    /// Overwrites every mutable column and returns the entity read back afterwards.
    fn update(
        &mut self,
        id: &Id<Self::Marker>,
        new_values: &Self::Update,
    ) -> impl Future<Output = Result<Self::Entity>> + Send;
}
