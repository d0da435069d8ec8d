//! Scheduled data from the trip planner.
//!
//! The planner exposes a GTFS GraphQL API. For each stop we ask for its
//! routes and up to 100 departures starting 75 minutes in the past, then
//! convert them into [`Arrival`](crate::domain::Arrival)s that keep a
//! reference to the planner trip for later enrichment.

mod client;
mod convert;
mod error;
mod fixture;
mod types;

use futures::future::BoxFuture;

use crate::domain::StopId;

pub use client::{DEFAULT_BASE_URL, OtpClient, OtpConfig, arrivals_query};
pub use convert::{StopSchedule, convert_stop, minutes_until};
pub use error::OtpError;
pub use fixture::FixtureScheduleSource;
pub use types::{
    GraphError, GraphResponse, OtpGeometry, OtpRoute, OtpStop, OtpStopRef, OtpStoptime,
    OtpTerminus, OtpTrip, OtpTripStop, OtpTripStoptime, PickupType, StopData,
};

/// Anything that can serve a stop's schedule.
pub trait ScheduleSource: Send + Sync {
    /// Fetch a stop's routes and departures. Reduced fetches may omit trip
    /// geometry.
    fn stop<'a>(&'a self, stop_id: &'a StopId, reduced: bool) -> BoxFuture<'a, Result<OtpStop, OtpError>>;
}
