//! Domain types for stop arrivals.
//!
//! Identifiers throughout the system are `"<feed>:<local id>"`; the feed
//! prefix drives every per-operator decision, so it is parsed once into
//! [`Feed`] and carried alongside the raw id.

mod arrival;
mod estimate;
mod feed;
mod schedule;

pub use arrival::{
    Arrival, DelayBadge, Estimate, Headsign, Precision, RouteInfo, ShiftBadge, VehicleBadge,
    VehiclePosition,
};
pub use estimate::StopEstimate;
pub use feed::{Feed, InvalidStopId, StopId};
pub use schedule::{PlannerTrip, ScheduleTrip, TimetableTrip, TripStop};
