// Transaction helpers shared by the use cases

use crate::port::Transaction;
use tracing::warn;

/// Roll back a failed unit of work.
///
/// A rollback failure is logged and swallowed so the caller can return the
/// error that caused the rollback. SQLite discards the open transaction when
/// the connection goes back to the pool either way.
pub(crate) async fn rollback_quietly<T: Transaction + ?Sized>(tx: Box<T>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}
