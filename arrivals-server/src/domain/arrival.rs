//! The arrival model shared by every pipeline stage.

use geojson::FeatureCollection;
use serde::Serialize;

use super::feed::Feed;
use super::schedule::ScheduleTrip;

/// Route shown on an arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub gtfs_id: String,
    pub short_name: String,
    /// Background colour, hex with or without `#`.
    pub colour: String,
    pub text_colour: String,
}

impl RouteInfo {
    /// The route id without its feed prefix.
    pub fn local_id(&self) -> &str {
        self.gtfs_id
            .split_once(':')
            .map_or(self.gtfs_id.as_str(), |(_, local)| local)
    }

    pub fn feed(&self) -> Feed {
        Feed::of(&self.gtfs_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headsign {
    pub badge: Option<String>,
    pub destination: String,
    /// Scrolling summary of the next stops.
    pub marquee: Option<String>,
}

impl Headsign {
    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            badge: None,
            destination: destination.into(),
            marquee: None,
        }
    }
}

/// How an arrival time was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Matched to, or sourced from, a live estimate.
    Confident,
    /// Timetable only.
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Estimate {
    /// Minutes until arrival; negative when already past.
    pub minutes: i32,
    pub precision: Precision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayBadge {
    pub minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBadge {
    pub shift_name: String,
    pub shift_trip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleBadge {
    pub identifier: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub kind: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Heading in degrees, 0 = north.
    pub orientation_degrees: u16,
    pub shape_index: Option<usize>,
}

/// One upcoming arrival at a stop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub trip_id: String,
    pub route: RouteInfo,
    pub headsign: Headsign,
    pub estimate: Estimate,
    pub delay: Option<DelayBadge>,
    pub shift: Option<ShiftBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<FeatureCollection>,
    pub current_position: Option<VehiclePosition>,
    pub stop_shape_index: Option<usize>,
    pub vehicle_information: Option<VehicleBadge>,
    #[serde(skip)]
    pub next_stops: Vec<String>,
    #[serde(skip)]
    pub schedule: Option<ScheduleTrip>,
}

impl Arrival {
    /// A timetable arrival with no enrichment yet.
    pub fn scheduled(
        trip_id: impl Into<String>,
        route: RouteInfo,
        headsign: Headsign,
        minutes: i32,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            route,
            headsign,
            estimate: Estimate {
                minutes,
                precision: Precision::Scheduled,
            },
            delay: None,
            shift: None,
            shape: None,
            current_position: None,
            stop_shape_index: None,
            vehicle_information: None,
            next_stops: Vec::new(),
            schedule: None,
        }
    }

    pub fn with_schedule(mut self, trip: ScheduleTrip) -> Self {
        self.schedule = Some(trip);
        self
    }

    /// Overwrite the estimate with a live figure.
    ///
    /// Attaches a delay badge when the live time differs from the schedule.
    pub fn confirm(&mut self, live_minutes: i32) {
        let delay = live_minutes - self.estimate.minutes;
        self.estimate = Estimate {
            minutes: live_minutes,
            precision: Precision::Confident,
        };
        self.delay = (delay != 0).then_some(DelayBadge { minutes: delay });
    }

    pub fn is_confident(&self) -> bool {
        self.estimate.precision == Precision::Confident
    }
}
