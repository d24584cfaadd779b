//! A transaction together with the repositories operating inside it.
//!
//! Beginning a unit of work opens a transaction. [`UnitOfWork::commit`] is the
//! only way to persist what the repositories wrote; every other exit, including
//! dropping the unit of work on an error path, rolls the transaction back.

use crate::{
    client::Result,
    repository::{post::PostRepository, user::UserRepository},
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> Result<Self> {
        let tx = pool.begin().await?;
        debug!("Unit of work started");

        Ok(Self { tx })
    }

    /// Users repository bound to this transaction.
    pub fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(&mut self.tx)
    }

    /// Posts repository bound to this transaction.
    pub fn posts(&mut self) -> PostRepository<'_> {
        PostRepository::new(&mut self.tx)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        debug!("Unit of work committed");

        Ok(())
    }

    /// Discards all writes. Never fails; a failed rollback is only logged.
    pub async fn rollback(self) {
        match self.tx.rollback().await {
            Ok(()) => debug!("Unit of work rolled back"),
            Err(err) => warn!(error = %err, "Rolling back unit of work failed"),
        }
    }
}
