//! Transaction scope around a single product mutation.

use crate::error::{Action, AppError};
use crate::repository::{ProductRepository, ProductTransaction};
use std::future::Future;
use std::panic::Location;

/// Owns one open transaction for `action`. [`TransactionScope::complete`] commits or rolls back;
/// a scope that is dropped instead rolls back with its transaction.
pub struct TransactionScope {
    tx: Box<dyn ProductTransaction>,
    action: Action,
    expose: bool,
}

impl TransactionScope {
    pub async fn begin(
        repo: &dyn ProductRepository,
        action: Action,
        expose: bool,
    ) -> Result<Self, AppError> {
        let tx = repo
            .begin()
            .await
            .map_err(|e| AppError::persistence(action, e, expose))?;
        tracing::debug!(%action, "transaction started");
        Ok(TransactionScope { tx, action, expose })
    }

    pub fn store(&mut self) -> &mut dyn ProductTransaction {
        self.tx.as_mut()
    }

    /// Commit when `outcome` is `Ok`, roll back otherwise. Store failures, including a failed
    /// commit, come back as [`AppError::Persistence`]; validation and not-found errors pass through.
    #[track_caller]
    pub fn complete<T: Send>(
        self,
        outcome: Result<T, AppError>,
    ) -> impl Future<Output = Result<T, AppError>> + Send {
        let location = Location::caller();
        async move {
            let TransactionScope { tx, action, expose } = self;
            match outcome {
                Ok(value) => match tx.commit().await {
                    Ok(()) => {
                        tracing::debug!(%action, "transaction committed");
                        Ok(value)
                    }
                    Err(err) => Err(AppError::persistence_at(action, err, expose, location)),
                },
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(%action, error = %rollback_err, "rollback failed");
                    }
                    tracing::warn!(%action, error = %err, "transaction rolled back");
                    Err(AppError::persistence_at(action, err, expose, location))
                }
            }
        }
    }
}
