//! Scenario tests for the assembled pipeline.

use super::*;
use crate::domain::{Arrival, Headsign, PlannerTrip, RouteInfo, ScheduleTrip, StopEstimate, StopId};
use crate::geometry::{LatLon, encode_polyline};
use crate::realtime::{RealtimeError, ShuttleState, ShuttleStatus};
use crate::ridership::UsagePoint;
use chrono::{DateTime, TimeZone};
use chrono_tz::{Europe::Madrid, Tz};
use futures::future::BoxFuture;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Mutex;

fn now() -> DateTime<Tz> {
    Madrid.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

/// Mock estimates provider that records every stop it is asked about.
struct MockEstimates {
    estimates: Vec<StopEstimate>,
    calls: Mutex<Vec<u32>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockEstimates {
    fn returning(estimates: Vec<StopEstimate>) -> Self {
        Self {
            estimates,
            calls: Mutex::new(Vec::new()),
            fail: false,
            delay: None,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Vec::new())
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(Vec::new())
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl EstimatesSource for MockEstimates {
    fn estimates(&self, stop_code: u32) -> BoxFuture<'_, Result<Vec<StopEstimate>, RealtimeError>> {
        self.calls.lock().unwrap().push(stop_code);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(RealtimeError::Api {
                    status: 503,
                    message: "Service Unavailable".into(),
                });
            }
            Ok(self.estimates.clone())
        })
    }
}

struct FixedShuttle(ShuttleStatus);

impl ShuttleSource for FixedShuttle {
    fn status(&self) -> BoxFuture<'_, Result<ShuttleStatus, RealtimeError>> {
        let status = self.0.clone();
        Box::pin(async move { Ok(status) })
    }
}

struct FixedUsage;

impl UsageSource for FixedUsage {
    fn usage<'a>(&'a self, _stop_code: &'a str) -> BoxFuture<'a, Result<Vec<UsagePoint>, RealtimeError>> {
        Box::pin(async {
            Ok(vec![UsagePoint {
                hour: 8,
                total: 120,
                day_of_week: 5,
            }])
        })
    }
}

struct PanickingStage;

impl Stage for PanickingStage {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn process<'a>(
        &'a self,
        _ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async { panic!("stage blew up") })
    }
}

fn route(feed: &str, short_name: &str) -> RouteInfo {
    RouteInfo {
        gtfs_id: format!("{feed}:{short_name}"),
        short_name: short_name.into(),
        colour: "E61C29".into(),
        text_colour: "FFFFFF".into(),
    }
}

fn vitrasa_arrival(trip_id: &str, line: &str, destination: &str, minutes: i32) -> Arrival {
    let trip = PlannerTrip {
        trip_id: trip_id.into(),
        service_id: Some("weekday".into()),
        headsign: Some(destination.into()),
        route_long_name: None,
        geometry: None,
        departure_seconds: 32_400,
        stops: Vec::new(),
    };
    Arrival::scheduled(trip_id, route("vitrasa", line), Headsign::to(destination), minutes)
        .with_schedule(ScheduleTrip::Planner(trip))
}

fn sources(vitrasa: Arc<MockEstimates>) -> PipelineSources {
    PipelineSources {
        vitrasa,
        tranvias: Arc::new(MockEstimates::returning(Vec::new())),
        tussa: Arc::new(MockEstimates::returning(Vec::new())),
        shuttle: None,
        whitelist: Arc::new(RidershipWhitelist::empty()),
        usage: None,
    }
}

fn vitrasa_context(arrivals: Vec<Arrival>) -> ArrivalsContext {
    ArrivalsContext::new(StopId::parse("vitrasa:14264").unwrap(), "14264", now())
        .with_arrivals(arrivals)
}

#[test]
fn standard_order() {
    let pipeline = standard_pipeline(
        sources(Arc::new(MockEstimates::returning(Vec::new()))),
        DEFAULT_STAGE_TIMEOUT,
    );
    assert_eq!(
        pipeline.stage_names(),
        vec![
            "vitrasa_realtime",
            "tranvias_realtime",
            "tussa_realtime",
            "filter_sort",
            "next_stops",
            "feed_format",
            "marquee",
            "shape",
        ]
    );
}

#[tokio::test]
async fn estimates_match_once_and_extras_become_synthetic() {
    let source = Arc::new(MockEstimates::returning(vec![
        StopEstimate::new("C1", "Praza América", 12),
        StopEstimate::new("C1", "Praza América", 12),
        StopEstimate::new("C1", "Praza América", 12),
        StopEstimate::new("L4C", "Centro*", 3),
    ]));
    let pipeline = standard_pipeline(sources(source.clone()), DEFAULT_STAGE_TIMEOUT);
    let mut ctx = vitrasa_context(vec![
        vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10),
        vitrasa_arrival("vitrasa:b", "C1", "Praza América", 40),
    ]);

    let report = pipeline.run(&mut ctx).await;
    assert!(report.is_clean());
    assert_eq!(source.call_count(), 1);

    let ids: Vec<&str> = ctx.arrivals.iter().map(|a| a.trip_id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids, vec!["vitrasa:a", "vitrasa:rt:C1:Praza América:12", "vitrasa:b"]);

    let matched = &ctx.arrivals[0];
    assert!(matched.is_confident());
    assert_eq!(matched.estimate.minutes, 12);
    assert_eq!(matched.delay.map(|d| d.minutes), Some(2));
    assert!(!ctx.arrivals[2].is_confident());
}

#[tokio::test]
async fn failing_source_keeps_schedule() {
    let source = Arc::new(MockEstimates::failing());
    let pipeline = standard_pipeline(sources(source.clone()), DEFAULT_STAGE_TIMEOUT);
    let mut ctx = vitrasa_context(vec![vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10)]);

    let report = pipeline.run(&mut ctx).await;
    assert!(matches!(
        report.outcome("vitrasa_realtime"),
        Some(StageOutcome::Failed(_))
    ));
    assert_eq!(report.outcome("filter_sort"), Some(&StageOutcome::Completed));
    assert_eq!(ctx.arrivals.len(), 1);
    assert!(!ctx.arrivals[0].is_confident());
}

#[tokio::test]
async fn slow_source_times_out() {
    let source = Arc::new(MockEstimates::slow(Duration::from_secs(5)));
    let pipeline = standard_pipeline(sources(source), Duration::from_millis(50));
    let mut ctx = vitrasa_context(vec![vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10)]);

    let report = pipeline.run(&mut ctx).await;
    assert_eq!(report.outcome("vitrasa_realtime"), Some(&StageOutcome::TimedOut));
    assert_eq!(report.outcome("shape"), Some(&StageOutcome::Completed));
    assert_eq!(ctx.arrivals.len(), 1);
}

#[tokio::test]
async fn panic_is_contained() {
    let pipeline = Pipeline::default()
        .with_stage(PanickingStage)
        .with_stage(FilterSortStage);
    let mut ctx = vitrasa_context(vec![
        vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10),
        vitrasa_arrival("vitrasa:b", "C1", "Praza América", 5),
    ]);

    let report = pipeline.run(&mut ctx).await;
    assert_eq!(report.outcome("panicking"), Some(&StageOutcome::Panicked));
    assert!(!report.is_clean());
    assert_eq!(ctx.arrivals[0].trip_id, "vitrasa:b");
}

#[tokio::test]
async fn other_feeds_are_not_queried() {
    let source = Arc::new(MockEstimates::returning(vec![StopEstimate::new("C1", "Centro", 1)]));
    let pipeline = standard_pipeline(sources(source.clone()), DEFAULT_STAGE_TIMEOUT);
    let mut ctx = ArrivalsContext::new(StopId::parse("xunta:1234").unwrap(), "1234", now());

    let report = pipeline.run(&mut ctx).await;
    assert_eq!(source.call_count(), 0);
    assert_eq!(
        report.outcome("vitrasa_realtime"),
        Some(&StageOutcome::Skipped("not a vitrasa stop"))
    );
}

#[tokio::test]
async fn ridership_for_whitelisted_stops() {
    let mut sources = sources(Arc::new(MockEstimates::returning(Vec::new())));
    sources.whitelist = Arc::new(["14264".to_string()].into_iter().collect());
    sources.usage = Some(Arc::new(FixedUsage));
    let pipeline = standard_pipeline(sources, DEFAULT_STAGE_TIMEOUT);

    let mut ctx = vitrasa_context(Vec::new());
    pipeline.run(&mut ctx).await;
    assert_eq!(ctx.usage.as_ref().map(Vec::len), Some(1));

    let mut other = ArrivalsContext::new(StopId::parse("vitrasa:5800").unwrap(), "5800", now());
    pipeline.run(&mut other).await;
    assert!(other.usage.is_none());
}

mod vehicle_positions {
    use super::*;

    const STOP: LatLon = LatLon { lat: 42.23, lon: -8.72 };

    /// A northbound trip with a vertex every ~1.1 km, ending at the stop.
    fn with_route_geometry(mut arrival: Arrival) -> Arrival {
        let line: Vec<LatLon> = [42.20, 42.21, 42.22, 42.23]
            .into_iter()
            .map(|lat| LatLon::new(lat, -8.72))
            .collect();
        if let Some(ScheduleTrip::Planner(trip)) = arrival.schedule.as_mut() {
            trip.geometry = encode_polyline(&line);
        }
        arrival
    }

    async fn run(arrival: Arrival, meters: i32) -> ArrivalsContext {
        let source = Arc::new(MockEstimates::returning(vec![
            StopEstimate::new("C1", "Praza América", 12).with_meters(meters),
        ]));
        let pipeline = standard_pipeline(sources(source), DEFAULT_STAGE_TIMEOUT);
        let mut ctx = vitrasa_context(vec![arrival]).with_location(STOP);
        pipeline.run(&mut ctx).await;
        ctx
    }

    #[tokio::test]
    async fn matched_vehicle_is_placed_on_its_route() {
        let arrival = with_route_geometry(vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10));
        let ctx = run(arrival, 1600).await;

        let matched = &ctx.arrivals[0];
        assert!(matched.is_confident());
        assert_eq!(matched.stop_shape_index, Some(3));

        // 1.6 km back from the stop lands between the 2nd and 3rd vertices.
        let position = matched.current_position.unwrap();
        assert!((position.latitude - 42.2156).abs() < 1e-3, "lat = {}", position.latitude);
        assert!((position.longitude - -8.72).abs() < 1e-4, "lon = {}", position.longitude);
        assert_eq!(position.orientation_degrees, 0);
        assert_eq!(position.shape_index, Some(2));
        assert!(matched.shape.is_some());
    }

    #[tokio::test]
    async fn distance_past_route_start_gives_no_position() {
        let arrival = with_route_geometry(vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10));
        let ctx = run(arrival, 5000).await;

        let matched = &ctx.arrivals[0];
        assert!(matched.is_confident());
        assert!(matched.current_position.is_none());
    }

    #[tokio::test]
    async fn trip_without_geometry_gives_no_position() {
        let ctx = run(vitrasa_arrival("vitrasa:a", "C1", "Praza América", 10), 1600).await;

        let matched = &ctx.arrivals[0];
        assert!(matched.is_confident());
        assert_eq!(matched.estimate.minutes, 12);
        assert!(matched.current_position.is_none());
        assert!(matched.stop_shape_index.is_none());
        assert!(matched.shape.is_none());
    }
}

mod shuttle_scenarios {
    use super::*;

    /// A straight run north with a vertex every ~1.1 km.
    fn shuttle_arrival(trip_id: &str, minutes: i32) -> Arrival {
        let line: Vec<LatLon> = [42.20, 42.21, 42.22, 42.23]
            .into_iter()
            .map(|lat| LatLon::new(lat, -8.72))
            .collect();
        let trip = PlannerTrip {
            trip_id: trip_id.into(),
            service_id: Some("daily".into()),
            headsign: Some("CTAG".into()),
            route_long_name: None,
            geometry: encode_polyline(&line),
            departure_seconds: 32_400,
            stops: Vec::new(),
        };
        Arrival::scheduled(trip_id, route("shuttle", "LAN"), Headsign::to("CTAG"), minutes)
            .with_schedule(ScheduleTrip::Planner(trip))
    }

    fn status(age_minutes: i64, state: ShuttleState) -> ShuttleStatus {
        ShuttleStatus {
            state,
            position: LatLon::new(42.2201, -8.72),
            last_position_at: now().with_timezone(&chrono::Utc) - chrono::Duration::minutes(age_minutes),
            free_seats: Some(12),
        }
    }

    async fn run(status: ShuttleStatus, arrivals: Vec<Arrival>) -> (ArrivalsContext, PipelineReport) {
        let pipeline = Pipeline::default().with_stage(ShuttleStage::new(Arc::new(FixedShuttle(status))));
        let mut ctx = ArrivalsContext::new(StopId::parse("shuttle:1").unwrap(), "1", now())
            .with_location(LatLon::new(42.23, -8.72))
            .with_arrivals(arrivals);
        let report = pipeline.run(&mut ctx).await;
        (ctx, report)
    }

    #[tokio::test]
    async fn eta_goes_to_closest_departure() {
        let (ctx, report) = run(
            status(1, ShuttleState::Operating),
            vec![shuttle_arrival("shuttle:a", -20), shuttle_arrival("shuttle:b", 5)],
        )
        .await;

        assert_eq!(report.outcome("shuttle_realtime"), Some(&StageOutcome::Completed));
        let active = &ctx.arrivals[1];
        // ~1.1 km at 20 km/h.
        assert_eq!(active.estimate.minutes, 4);
        assert!(active.is_confident());
        assert_eq!(active.stop_shape_index, Some(3));

        let position = active.current_position.unwrap();
        assert_eq!(position.shape_index, Some(2));
        assert_eq!(position.orientation_degrees, 0);
        assert!(!ctx.arrivals[0].is_confident());
    }

    #[tokio::test]
    async fn stale_or_idle_is_skipped() {
        let (ctx, report) = run(status(5, ShuttleState::Operating), vec![shuttle_arrival("shuttle:a", 5)]).await;
        assert_eq!(
            report.outcome("shuttle_realtime"),
            Some(&StageOutcome::Skipped("stale position"))
        );
        assert!(!ctx.arrivals[0].is_confident());

        let (_, report) = run(status(0, ShuttleState::Idle), vec![shuttle_arrival("shuttle:a", 5)]).await;
        assert_eq!(report.outcome("shuttle_realtime"), Some(&StageOutcome::Skipped("shuttle idle")));
    }
}

proptest! {
    #[test]
    fn filter_sort_orders_and_limits(
        minutes in prop::collection::vec(-30i32..120, 0..30),
        reduced in any::<bool>(),
        vitrasa in any::<bool>(),
    ) {
        let (feed, id) = if vitrasa { ("vitrasa", "vitrasa:1") } else { ("xunta", "xunta:1") };
        let arrivals = minutes
            .iter()
            .enumerate()
            .map(|(i, m)| Arrival::scheduled(format!("{feed}:{i}"), route(feed, "1"), Headsign::to("X"), *m))
            .collect();
        let mut ctx = ArrivalsContext::new(StopId::parse(id).unwrap(), "1", now())
            .with_reduced(reduced)
            .with_arrivals(arrivals);

        super::transform::filter_sort(&mut ctx);

        let limit = if reduced { REDUCED_LIMIT } else { FULL_LIMIT };
        prop_assert!(ctx.arrivals.len() <= limit);
        prop_assert!(ctx.arrivals.windows(2).all(|w| w[0].estimate.minutes <= w[1].estimate.minutes));
        let floor = if vitrasa { 0 } else { PAST_ARRIVAL_MINUTES };
        prop_assert!(ctx.arrivals.iter().all(|a| a.estimate.minutes >= floor));
    }
}
