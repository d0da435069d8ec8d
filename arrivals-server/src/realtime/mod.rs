//! Live estimates from each operator.
//!
//! Every operator publishes its own format; the clients here normalise them
//! into [`StopEstimate`]s keyed by the numeric public stop code. Failures are
//! returned as [`RealtimeError`] for the calling stage to log.

mod error;
mod http;
mod shuttle;
mod tranvias;
mod tussa;
mod vitrasa;

use futures::future::BoxFuture;

use crate::domain::StopEstimate;

pub use error::RealtimeError;
pub use http::build_client;
pub(crate) use http::get_json;
pub use shuttle::{ShuttleClient, ShuttleSource, ShuttleState, ShuttleStatus};
pub use tranvias::TranviasClient;
pub use tussa::TussaClient;
pub use vitrasa::VitrasaClient;

pub mod defaults {
    //! Production endpoints.
    pub use super::tranvias::DEFAULT_BASE_URL as TRANVIAS_BASE_URL;
    pub use super::tussa::DEFAULT_BASE_URL as TUSSA_BASE_URL;
    pub use super::vitrasa::DEFAULT_BASE_URL as VITRASA_BASE_URL;
}

/// Anything that reports live estimates for a stop.
pub trait EstimatesSource: Send + Sync {
    fn estimates(&self, stop_code: u32) -> BoxFuture<'_, Result<Vec<StopEstimate>, RealtimeError>>;
}
