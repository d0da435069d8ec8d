//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Arrival, Feed, RouteInfo};
use crate::fares::{FareLeg, FareResult, to_euros};
use crate::feeds::{
    apply_colour_fallback, consolidate_routes, normalize_route_short_name, normalize_stop_code,
    normalize_stop_name, route_sort_key,
};
use crate::geometry::LatLon;
use crate::otp::StopSchedule;
use crate::pipeline::ArrivalsContext;
use crate::ridership::UsagePoint;

/// Query for a stop's arrivals.
#[derive(Debug, Deserialize)]
pub struct ArrivalsQuery {
    /// Prefixed stop id, e.g. `vitrasa:14264`
    pub id: String,

    /// Fewer arrivals and no route shapes
    #[serde(default)]
    pub reduced: bool,
}

/// Query for the legacy consolidated circulations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedQuery {
    /// Prefixed stop id; a bare number is taken as a Vitrasa stop
    pub stop_id: String,
}

/// Itinerary to price.
#[derive(Debug, Deserialize)]
pub struct FareRequest {
    pub legs: Vec<FareLeg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StopPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LatLon> for StopPosition {
    fn from(p: LatLon) -> Self {
        Self {
            latitude: p.lat,
            longitude: p.lon,
        }
    }
}

/// Arrivals at one stop.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopArrivalsResponse {
    pub stop_code: String,
    pub stop_name: String,
    pub stop_location: StopPosition,
    pub routes: Vec<RouteInfo>,
    pub arrivals: Vec<Arrival>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<UsagePoint>>,
}

/// Fare totals in euros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareResponse {
    pub cash_fare_euro: f64,
    pub cash_fare_is_total: bool,
    pub card_fare_euro: f64,
    pub card_fare_is_total: bool,
}

impl From<FareResult> for FareResponse {
    fn from(r: FareResult) -> Self {
        Self {
            cash_fare_euro: to_euros(r.cash),
            cash_fare_is_total: r.cash_is_total,
            card_fare_euro: to_euros(r.card),
            card_fare_is_total: r.card_is_total,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Oldest arrival, in minutes from now, that a response may list.
///
/// Feeds with live coverage drop anything already gone; timetable-only
/// feeds keep half an hour for late vehicles.
pub fn response_threshold(feed: Feed) -> i32 {
    if feed.hides_past_arrivals() { 0 } else { -30 }
}

/// Route badges for a stop: normalised, de-duplicated, coloured and sorted.
pub fn stop_routes(feed: Feed, routes: Vec<RouteInfo>) -> Vec<RouteInfo> {
    let normalised = routes
        .into_iter()
        .map(|mut r| {
            r.short_name = normalize_route_short_name(feed, &r.short_name);
            r
        })
        .collect();

    let mut routes = consolidate_routes(feed, normalised);
    for route in &mut routes {
        apply_colour_fallback(feed, route);
    }
    routes.sort_by_cached_key(|r| route_sort_key(&r.short_name, Some(&r.gtfs_id)));
    routes
}

impl StopArrivalsResponse {
    /// Assemble the response from the stop metadata and the enriched context.
    pub fn new(stop: StopSchedule, ctx: ArrivalsContext) -> Self {
        let feed = ctx.feed();
        let threshold = response_threshold(feed);

        Self {
            stop_code: normalize_stop_code(feed, &stop.code),
            stop_name: normalize_stop_name(feed, &stop.name),
            stop_location: stop.location.into(),
            routes: stop_routes(feed, stop.routes),
            arrivals: ctx
                .arrivals
                .into_iter()
                .filter(|a| a.estimate.minutes >= threshold)
                .collect(),
            usage: ctx.usage,
        }
    }
}
