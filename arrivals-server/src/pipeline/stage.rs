//! The unit of work in the arrivals pipeline.

use futures::future::BoxFuture;

use crate::realtime::RealtimeError;

use super::context::ArrivalsContext;

/// What a stage did with the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Applied,
    /// The stage does not apply to this request.
    Skipped(&'static str),
}

/// Why a stage gave up. The context is left as the stage found it.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("real-time source unavailable: {0}")]
    Realtime(#[from] RealtimeError),

    #[error("{0}")]
    Other(String),
}

/// One enrichment step over the shared context.
///
/// Stages run one at a time in registration order. A stage that calls an
/// external source must finish its fetching before touching the context so
/// that a failure or timeout leaves the arrivals intact.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>>;
}
