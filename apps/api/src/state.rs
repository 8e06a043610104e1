use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one process-wide inference client, constructed at startup.
    /// Trait object so tests can swap in a mock model.
    pub llm: Arc<dyn GenerativeModel>,
    pub config: Config,
    /// Single-flight gate for generation submissions.
    pub submissions: SubmissionGuard,
}

/// Enforces the "one submission in flight" rule: while a generation is
/// running, further submits are rejected instead of queued. Exports are not
/// gated — they never block or get blocked by a generation.
#[derive(Clone)]
pub struct SubmissionGuard {
    inner: Arc<Semaphore>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claims the submission slot, or fails fast with `InFlight` if a
    /// generation is already running. The returned permit is RAII: dropping
    /// it — on success or on any error path — returns the flow to idle.
    pub fn try_begin(&self) -> Result<SubmissionPermit, AppError> {
        match self.inner.clone().try_acquire_owned() {
            Ok(permit) => Ok(SubmissionPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) => Err(AppError::InFlight),
            Err(TryAcquireError::Closed) => Err(AppError::Internal(anyhow::anyhow!(
                "submission semaphore closed"
            ))),
        }
    }
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that the holder owns the submission slot.
pub struct SubmissionPermit {
    _permit: OwnedSemaphorePermit,
}
