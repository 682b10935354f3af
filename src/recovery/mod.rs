//! Error recovery
//!
//! Every public engine operation runs through an `ErrorRecovery`
//! implementation. The default policy retries transient collaborator
//! failures with bounded exponential backoff.

pub mod retry;

pub use retry::RetryRecovery;

use crate::errors::Result;
use async_trait::async_trait;
use std::future::Future;

/// Wraps a fallible operation in a recovery policy
#[async_trait]
pub trait ErrorRecovery: Send + Sync {
    /// One-time setup, called while the engine initializes
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// On give-up the last failure is returned unchanged.
    async fn execute<T, F, Fut>(&self, service_name: &str, operation: F) -> Result<T>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send;
}
