//! Scheduled trips behind an arrival.
//!
//! Arrivals keep a reference to the trip they were built from so that later
//! pipeline stages can reach its geometry and stoptimes. The trip may come
//! from the trip planner or from a pre-built stop timetable; stages match on
//! the variant rather than guessing.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::geometry::LatLon;

/// One stop call on a planner trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripStop {
    pub name: String,
    pub location: Option<LatLon>,
    /// Seconds since service-day midnight.
    pub scheduled_departure: i64,
}

/// A trip as returned by the trip planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerTrip {
    pub trip_id: String,
    pub service_id: Option<String>,
    /// Headsign given on the stoptime or the trip.
    pub headsign: Option<String>,
    pub route_long_name: Option<String>,
    /// Encoded polyline of the whole trip, absent for reduced queries.
    pub geometry: Option<String>,
    /// Seconds since service-day midnight at the requested stop.
    pub departure_seconds: i64,
    /// Every call of the trip in order.
    pub stops: Vec<TripStop>,
}

/// A trip row from a stop timetable file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableTrip {
    pub trip_id: String,
    pub service_id: String,
    pub line: String,
    pub route: String,
    #[serde(default)]
    pub next_streets: Vec<String>,
    /// `HH:MM:SS`, hours may exceed 23.
    pub starting_time: String,
    /// `HH:MM:SS`, hours may exceed 23.
    pub calling_time: String,
    pub terminus_name: String,
    #[serde(default)]
    pub shape_id: Option<String>,
}

impl TimetableTrip {
    pub fn starting_at(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        parse_gtfs_time(&self.starting_time, date)
    }

    pub fn calling_at(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        parse_gtfs_time(&self.calling_time, date)
    }
}

/// Parse a GTFS `HH:MM:SS` time relative to `date`.
///
/// The result is moved forward to the next whole minute, including times
/// already on the minute.
pub fn parse_gtfs_time(s: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    let mut parts = s.trim().split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || hours < 0 || minutes < 0 || seconds < 0 {
        return None;
    }

    let dt = date.and_hms_opt(0, 0, 0)?
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds);
    Some(dt + Duration::seconds(60 - i64::from(dt.second())))
}

/// The scheduled trip an arrival was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleTrip {
    Planner(PlannerTrip),
    Timetable(TimetableTrip),
}

impl ScheduleTrip {
    /// Headsign published with the schedule, if any.
    pub fn headsign(&self) -> Option<&str> {
        match self {
            ScheduleTrip::Planner(t) => t.headsign.as_deref(),
            ScheduleTrip::Timetable(t) => Some(t.route.as_str()),
        }
    }

    pub fn route_long_name(&self) -> Option<&str> {
        match self {
            ScheduleTrip::Planner(t) => t.route_long_name.as_deref(),
            ScheduleTrip::Timetable(_) => None,
        }
    }

    pub fn last_stop_name(&self) -> Option<&str> {
        match self {
            ScheduleTrip::Planner(t) => t.stops.last().map(|s| s.name.as_str()),
            ScheduleTrip::Timetable(t) => Some(t.terminus_name.as_str()),
        }
    }

    /// Encoded polyline of the trip.
    pub fn geometry(&self) -> Option<&str> {
        match self {
            ScheduleTrip::Planner(t) => t.geometry.as_deref().filter(|g| !g.is_empty()),
            ScheduleTrip::Timetable(_) => None,
        }
    }

    /// Calls of the trip, empty when the source does not list them.
    pub fn stops(&self) -> &[TripStop] {
        match self {
            ScheduleTrip::Planner(t) => &t.stops,
            ScheduleTrip::Timetable(_) => &[],
        }
    }

    /// Calls after the requested stop, in departure order.
    pub fn upcoming_stops(&self) -> Vec<&TripStop> {
        match self {
            ScheduleTrip::Planner(t) => {
                let mut later: Vec<&TripStop> = t
                    .stops
                    .iter()
                    .filter(|s| s.scheduled_departure > t.departure_seconds)
                    .collect();
                later.sort_by_key(|s| s.scheduled_departure);
                later
            }
            ScheduleTrip::Timetable(_) => Vec::new(),
        }
    }

    /// Names of the stops after the requested one.
    pub fn upcoming_stop_names(&self) -> Vec<String> {
        match self {
            ScheduleTrip::Planner(_) => self
                .upcoming_stops()
                .into_iter()
                .map(|s| s.name.clone())
                .collect(),
            ScheduleTrip::Timetable(t) => t.next_streets.clone(),
        }
    }
}
