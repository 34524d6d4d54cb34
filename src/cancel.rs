//! Cooperative job cancellation.
//!
//! Every executor call takes a [`CancellationToken`]. Async code races each
//! await point against [`CancellationToken::cancelled`]; blocking code polls
//! [`CancellationToken::is_cancelled`] between chunks. A cancelled job stops
//! with [`Error::Cancelled`] and leaves both its output and its ledger alone.

use crate::error::{Error, Result};

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        out = fut => Ok(out),
    }
}
