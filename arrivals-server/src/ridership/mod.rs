//! Stop ridership by hour, for busy Vitrasa stops.

mod client;
mod whitelist;

use futures::future::BoxFuture;

use crate::realtime::RealtimeError;

pub use client::{UsageClient, UsagePoint};
pub use whitelist::{RidershipWhitelist, WhitelistError};

/// Anything that serves usage-by-hour for a normalised stop code.
pub trait UsageSource: Send + Sync {
    fn usage<'a>(&'a self, stop_code: &'a str) -> BoxFuture<'a, Result<Vec<UsagePoint>, RealtimeError>>;
}
