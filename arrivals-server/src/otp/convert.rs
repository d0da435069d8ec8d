//! Conversion from planner responses to arrivals.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::trace;

use crate::domain::{Arrival, Headsign, PlannerTrip, RouteInfo, ScheduleTrip, StopId, TripStop};
use crate::geometry::LatLon;

use super::types::{OtpRoute, OtpStop, OtpStoptime, PickupType};

/// A stop and its scheduled arrivals, before enrichment.
#[derive(Debug, Clone)]
pub struct StopSchedule {
    pub code: String,
    pub name: String,
    pub location: LatLon,
    pub routes: Vec<RouteInfo>,
    pub arrivals: Vec<Arrival>,
}

/// Convert a planner stop into arrivals relative to `now`.
///
/// Departures without pickup are dropped, as are trips that end at this
/// stop.
pub fn convert_stop(stop: OtpStop, stop_id: &StopId, now: DateTime<Tz>) -> StopSchedule {
    let arrivals = stop
        .arrivals
        .into_iter()
        .filter_map(|departure| convert_departure(departure, stop_id, now))
        .collect();

    StopSchedule {
        code: stop.code.unwrap_or_default(),
        name: stop.name,
        location: LatLon::new(stop.lat, stop.lon),
        routes: stop.routes.into_iter().map(route_info).collect(),
        arrivals,
    }
}

fn route_info(route: OtpRoute) -> RouteInfo {
    RouteInfo {
        gtfs_id: route.gtfs_id,
        short_name: route.short_name.unwrap_or_default(),
        colour: route.color.unwrap_or_default(),
        text_colour: route.text_color.unwrap_or_default(),
    }
}

/// Minutes from `now` until `seconds` past local midnight of `service_day`,
/// truncated toward zero.
pub fn minutes_until(service_day: i64, seconds: i64, now: DateTime<Tz>) -> Option<i32> {
    let day = Utc.timestamp_opt(service_day, 0).single()?;
    let midnight = day
        .with_timezone(&now.timezone())
        .date_naive()
        .and_hms_opt(0, 0, 0)?;
    let departure = midnight + Duration::seconds(seconds);
    i32::try_from((departure - now.naive_local()).num_minutes()).ok()
}

fn convert_departure(departure: OtpStoptime, stop_id: &StopId, now: DateTime<Tz>) -> Option<Arrival> {
    if departure.pickup_type == Some(PickupType::None) {
        trace!(trip = %departure.trip.gtfs_id, "skipping departure without pickup");
        return None;
    }

    let trip = departure.trip;
    if trip
        .arrival_stoptime
        .as_ref()
        .is_some_and(|t| t.stop.gtfs_id == stop_id.as_str())
    {
        trace!(trip = %trip.gtfs_id, "skipping trip terminating here");
        return None;
    }

    let minutes = minutes_until(departure.service_day, departure.scheduled_departure, now)?;
    let headsign = trip.trip_headsign.clone().or(departure.headsign);

    let route = RouteInfo {
        gtfs_id: trip.route.gtfs_id.clone(),
        short_name: trip.route_short_name.clone().unwrap_or_default(),
        colour: trip.route.color.clone().unwrap_or_else(|| "FFFFFF".into()),
        text_colour: trip.route.text_color.clone().unwrap_or_else(|| "000000".into()),
    };

    let stops = trip
        .stoptimes
        .into_iter()
        .map(|st| TripStop {
            name: st.stop.name,
            location: st.stop.lat.zip(st.stop.lon).map(|(lat, lon)| LatLon::new(lat, lon)),
            scheduled_departure: st.scheduled_departure,
        })
        .collect();

    let schedule = PlannerTrip {
        trip_id: trip.gtfs_id.clone(),
        service_id: trip.service_id,
        headsign: headsign.clone(),
        route_long_name: trip.route.long_name,
        geometry: trip.trip_geometry.and_then(|g| g.points),
        departure_seconds: departure.scheduled_departure,
        stops,
    };

    Some(
        Arrival::scheduled(
            trip.gtfs_id,
            route,
            Headsign::to(headsign.unwrap_or_default()),
            minutes,
        )
        .with_schedule(ScheduleTrip::Planner(schedule)),
    )
}
