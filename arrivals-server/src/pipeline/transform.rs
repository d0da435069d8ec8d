//! Stages that reshape the arrival list without calling out.

use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::{Feed, TripStop};
use crate::feeds::{
    apply_colour_fallback, format_vitrasa_line, marquee, normalize_route_short_name,
    normalize_stop_name, shift_badge,
};
use crate::geometry::decode_polyline;

use super::context::ArrivalsContext;
use super::matching::route_feature_collection;
use super::stage::{Stage, StageError, StageStatus};

/// Oldest arrival kept for feeds without full live coverage.
pub const PAST_ARRIVAL_MINUTES: i32 = -10;

/// Sort by minutes, drop stale arrivals and apply the request limit.
pub struct FilterSortStage;

/// Fill `next_stops` from the schedule.
pub struct NextStopsStage;

/// Display names, shift badges and colours.
pub struct FeedFormatStage;

/// Marquee text from the next stops.
pub struct MarqueeStage;

/// Route GeoJSON for full requests.
pub struct ShapeStage;

pub(super) fn filter_sort(ctx: &mut ArrivalsContext) {
    let earliest = if ctx.feed() == Feed::Vitrasa {
        0
    } else {
        PAST_ARRIVAL_MINUTES
    };

    ctx.arrivals.sort_by_key(|a| a.estimate.minutes);
    ctx.arrivals.retain(|a| a.estimate.minutes >= earliest);
    ctx.arrivals.truncate(ctx.limit());
}

impl Stage for FilterSortStage {
    fn name(&self) -> &'static str {
        "filter_sort"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            let before = ctx.arrivals.len();
            filter_sort(ctx);
            debug!(before, after = ctx.arrivals.len(), "filtered arrivals");
            Ok(StageStatus::Applied)
        })
    }
}

impl Stage for NextStopsStage {
    fn name(&self) -> &'static str {
        "next_stops"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            let feed = ctx.feed();
            for arrival in &mut ctx.arrivals {
                let Some(schedule) = arrival.schedule.as_ref() else {
                    continue;
                };
                arrival.next_stops = schedule
                    .upcoming_stop_names()
                    .iter()
                    .map(|name| normalize_stop_name(feed, name))
                    .collect();
            }
            Ok(StageStatus::Applied)
        })
    }
}

pub(super) fn format_arrivals(ctx: &mut ArrivalsContext) {
    let feed = ctx.feed();
    for arrival in &mut ctx.arrivals {
        let short_name = normalize_route_short_name(feed, &arrival.route.short_name);
        let destination = normalize_stop_name(feed, &arrival.headsign.destination);

        if feed == Feed::Vitrasa {
            let (line, destination) = format_vitrasa_line(&short_name, &destination);
            arrival.route.short_name = line;
            arrival.headsign.destination = destination;
            arrival.shift = shift_badge(feed, &arrival.trip_id);
        } else {
            arrival.route.short_name = short_name;
            arrival.headsign.destination = destination;
        }

        apply_colour_fallback(feed, &mut arrival.route);
    }
}

impl Stage for FeedFormatStage {
    fn name(&self) -> &'static str {
        "feed_format"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            format_arrivals(ctx);
            Ok(StageStatus::Applied)
        })
    }
}

impl Stage for MarqueeStage {
    fn name(&self) -> &'static str {
        "marquee"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            let feed = ctx.feed();
            for arrival in &mut ctx.arrivals {
                if arrival.headsign.marquee.is_none() {
                    arrival.headsign.marquee = marquee(feed, &arrival.next_stops);
                }
            }
            Ok(StageStatus::Applied)
        })
    }
}

impl Stage for ShapeStage {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.reduced {
                return Ok(StageStatus::Skipped("reduced request"));
            }

            for arrival in ctx.arrivals.iter_mut().filter(|a| a.shape.is_none()) {
                let Some(schedule) = arrival.schedule.as_ref() else {
                    continue;
                };
                let Some(encoded) = schedule.geometry() else {
                    continue;
                };

                let line = decode_polyline(encoded);
                if line.is_empty() {
                    continue;
                }
                let stops: Vec<TripStop> = schedule.upcoming_stops().into_iter().cloned().collect();
                arrival.shape = Some(route_feature_collection(&line, &stops));
            }
            Ok(StageStatus::Applied)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Arrival, Headsign, PlannerTrip, RouteInfo, ScheduleTrip, StopId};
    use crate::geometry::{LatLon, encode_polyline};
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;

    fn context(id: &str, arrivals: Vec<Arrival>) -> ArrivalsContext {
        let now = Madrid.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        ArrivalsContext::new(StopId::parse(id).unwrap(), "1", now).with_arrivals(arrivals)
    }

    fn arrival(feed: &str, trip_id: &str, short_name: &str, minutes: i32) -> Arrival {
        Arrival::scheduled(
            format!("{feed}:{trip_id}"),
            RouteInfo {
                gtfs_id: format!("{feed}:{short_name}"),
                short_name: short_name.into(),
                colour: String::new(),
                text_colour: String::new(),
            },
            Headsign::to("Centro"),
            minutes,
        )
    }

    fn planner_trip(geometry: Option<String>) -> ScheduleTrip {
        let stop = |name: &str, lat: f64, departure: i64| TripStop {
            name: name.into(),
            location: Some(LatLon::new(lat, -8.72)),
            scheduled_departure: departure,
        };
        ScheduleTrip::Planner(PlannerTrip {
            trip_id: "vitrasa:t".into(),
            service_id: Some("s".into()),
            headsign: Some("Centro".into()),
            route_long_name: None,
            geometry,
            departure_seconds: 32_400,
            stops: vec![
                stop("Rúa \"Urzaiz\"  45", 42.23, 32_400),
                stop("Praza de España", 42.231, 32_460),
                stop("Gran Vía  12", 42.232, 32_520),
            ],
        })
    }

    #[test]
    fn vitrasa_hides_past_and_limits() {
        let arrivals = (0..15)
            .map(|i| arrival("vitrasa", &format!("t{i}"), "C1", 12 - i))
            .collect();
        let mut ctx = context("vitrasa:1", arrivals);
        filter_sort(&mut ctx);

        let minutes: Vec<i32> = ctx.arrivals.iter().map(|a| a.estimate.minutes).collect();
        assert_eq!(minutes, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn other_feeds_keep_recent_past() {
        let arrivals = vec![
            arrival("xunta", "a", "1", 5),
            arrival("xunta", "b", "1", -11),
            arrival("xunta", "c", "1", -10),
        ];
        let mut ctx = context("xunta:1", arrivals).with_reduced(true);
        filter_sort(&mut ctx);

        let ids: Vec<&str> = ctx.arrivals.iter().map(|a| a.trip_id.as_str()).collect();
        assert_eq!(ids, vec!["xunta:c", "xunta:a"]);
    }

    #[test]
    fn reduced_requests_keep_four() {
        let arrivals = (0..8).map(|i| arrival("tussa", &format!("t{i}"), "1", i)).collect();
        let mut ctx = context("tussa:1", arrivals).with_reduced(true);
        filter_sort(&mut ctx);
        assert_eq!(ctx.arrivals.len(), 4);
    }

    #[test]
    fn vitrasa_formatting() {
        let mut a = arrival("vitrasa", "C1 04LN 02_001004_4", "A", 3);
        a.headsign.destination = "1 \"Praza América\"".into();
        let mut ctx = context("vitrasa:1", vec![a]);
        format_arrivals(&mut ctx);

        let a = &ctx.arrivals[0];
        assert_eq!(a.route.short_name, "A1");
        assert_eq!(a.route.colour, "#81D002");
        assert_eq!(a.shift.as_ref().map(|s| s.shift_name.as_str()), Some("C1-4"));
    }

    #[test]
    fn xunta_short_names_expand() {
        let mut ctx = context("xunta:1", vec![arrival("xunta", "t", "XG621045", 3)]);
        format_arrivals(&mut ctx);
        assert_eq!(ctx.arrivals[0].route.short_name, "621.45");
        assert!(ctx.arrivals[0].shift.is_none());
    }

    #[tokio::test]
    async fn next_stops_and_marquee() {
        let a = arrival("vitrasa", "t", "C1", 3).with_schedule(planner_trip(None));
        let mut ctx = context("vitrasa:1", vec![a]);

        NextStopsStage.process(&mut ctx).await.unwrap();
        assert_eq!(ctx.arrivals[0].next_stops, vec!["Praza de España", "Gran Vía, 12"]);

        MarqueeStage.process(&mut ctx).await.unwrap();
        assert!(ctx.arrivals[0].headsign.marquee.is_some());
    }

    #[tokio::test]
    async fn shape_only_for_full_requests() {
        let geometry = encode_polyline(&[LatLon::new(42.23, -8.72), LatLon::new(42.232, -8.72)]);
        let a = arrival("vitrasa", "t", "C1", 3).with_schedule(planner_trip(geometry));

        let mut reduced = context("vitrasa:1", vec![a.clone()]).with_reduced(true);
        let status = ShapeStage.process(&mut reduced).await.unwrap();
        assert_eq!(status, StageStatus::Skipped("reduced request"));
        assert!(reduced.arrivals[0].shape.is_none());

        let mut full = context("vitrasa:1", vec![a]);
        ShapeStage.process(&mut full).await.unwrap();
        let shape = full.arrivals[0].shape.as_ref().unwrap();
        // Route line plus the two stops after this one.
        assert_eq!(shape.features.len(), 3);
    }
}
