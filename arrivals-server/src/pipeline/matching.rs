//! Shared pieces of the real-time matchers.

use std::collections::HashSet;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

use crate::domain::{Arrival, Feed, StopEstimate, TripStop, VehiclePosition};
use crate::geometry::{LatLon, Point, bus_position, decode_polyline, project};

/// Accepted range of `live - scheduled` minutes for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWindow {
    /// Most minutes a vehicle may run ahead of schedule (negative).
    pub earliest: i32,
    /// Most minutes a vehicle may run behind schedule.
    pub latest: i32,
    /// Multiplier applied to early differences when ranking candidates.
    pub early_weight: i32,
}

impl MatchWindow {
    /// Ranking score for a time difference; `None` outside the window.
    pub fn score(&self, diff: i32) -> Option<i32> {
        if diff < self.earliest || diff > self.latest {
            return None;
        }
        Some(if diff < 0 { -diff * self.early_weight } else { diff })
    }
}

/// Index of the unused candidate closest in time to `live_minutes`.
///
/// Ties go to the first candidate in list order.
pub fn best_match(
    arrivals: &[Arrival],
    used: &HashSet<String>,
    window: MatchWindow,
    live_minutes: i32,
    is_candidate: impl Fn(&Arrival) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;

    for (i, arrival) in arrivals.iter().enumerate() {
        if used.contains(&arrival.trip_id) || !is_candidate(arrival) {
            continue;
        }
        let Some(score) = window.score(live_minutes - arrival.estimate.minutes) else {
            continue;
        };
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((i, score));
        }
    }

    best.map(|(i, _)| i)
}

/// Id for a live estimate with no scheduled counterpart.
pub fn synthetic_trip_id(feed: Feed, estimate: &StopEstimate) -> String {
    format!(
        "{feed}:rt:{}:{}:{}",
        estimate.line, estimate.destination, estimate.minutes
    )
}

/// Append arrivals whose trip id is not already present.
pub fn push_unique(arrivals: &mut Vec<Arrival>, new: Vec<Arrival>) {
    let mut seen: HashSet<String> = arrivals.iter().map(|a| a.trip_id.clone()).collect();
    for arrival in new {
        if seen.insert(arrival.trip_id.clone()) {
            arrivals.push(arrival);
        }
    }
}

/// GeoJSON of a route line plus a point for each stop.
pub fn route_feature_collection(line: &[LatLon], stops: &[TripStop]) -> FeatureCollection {
    let mut features = Vec::with_capacity(stops.len() + 1);

    let mut route_props = JsonObject::new();
    route_props.insert("type".into(), "route".into());
    features.push(feature(
        Value::LineString(line.iter().map(|p| vec![p.lon, p.lat]).collect()),
        route_props,
    ));

    for stop in stops {
        let Some(location) = stop.location else {
            continue;
        };
        let mut props = JsonObject::new();
        props.insert("type".into(), "stop".into());
        props.insert("name".into(), stop.name.clone().into());
        features.push(feature(Value::Point(vec![location.lon, location.lat]), props));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Place the vehicle of a matched arrival on its route.
///
/// Needs the stop location, the trip geometry and a remaining distance.
/// Full requests also get the route GeoJSON when a position was found.
pub fn locate_vehicle(arrival: &mut Arrival, stop: Option<Point>, meters: Option<i32>, reduced: bool) {
    let (Some(stop), Some(meters)) = (stop, meters) else {
        return;
    };
    let Some(schedule) = arrival.schedule.as_ref() else {
        return;
    };
    let Some(encoded) = schedule.geometry() else {
        return;
    };

    let line = decode_polyline(encoded);
    let Some(shape) = line.iter().copied().map(project).collect::<Option<Vec<Point>>>() else {
        return;
    };

    let Some(position) = bus_position(&shape, stop, f64::from(meters.max(0))) else {
        return;
    };

    if !reduced {
        arrival.shape = Some(route_feature_collection(&line, schedule.stops()));
    }
    arrival.current_position = Some(VehiclePosition {
        latitude: position.coordinate.lat,
        longitude: position.coordinate.lon,
        orientation_degrees: position.orientation_degrees,
        shape_index: Some(position.shape_index),
    });
    arrival.stop_shape_index = Some(position.stop_shape_index);
}
