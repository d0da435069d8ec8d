//! Tranvías A Coruña live estimates matched by route id.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::domain::{Arrival, Feed, Headsign, Precision, RouteInfo, StopEstimate};
use crate::feeds::{normalize_stop_code, vehicle_badge};
use crate::geometry::project;
use crate::realtime::EstimatesSource;

use super::context::ArrivalsContext;
use super::matching::{MatchWindow, best_match, locate_vehicle, push_unique, synthetic_trip_id};
use super::stage::{Stage, StageError, StageStatus};

/// Coruña buses may run up to 5 minutes early or 15 late; running early is
/// ranked as twice as unlikely.
pub const CORUNA_WINDOW: MatchWindow = MatchWindow {
    earliest: -5,
    latest: 15,
    early_weight: 2,
};

pub struct TranviasStage {
    source: Arc<dyn EstimatesSource>,
}

impl TranviasStage {
    pub fn new(source: Arc<dyn EstimatesSource>) -> Self {
        Self { source }
    }
}

fn route_id(estimate: &StopEstimate) -> &str {
    estimate.route_id.as_deref().unwrap_or(&estimate.line).trim()
}

pub(super) fn apply_estimates(ctx: &mut ArrivalsContext, estimates: Vec<StopEstimate>) {
    let stop = ctx.stop_location.and_then(project);
    let mut used = HashSet::new();
    let mut unmatched = Vec::new();

    for estimate in estimates {
        let found = best_match(&ctx.arrivals, &used, CORUNA_WINDOW, estimate.minutes, |a| {
            a.route.local_id().trim() == route_id(&estimate)
        });

        let Some(index) = found else {
            info!(route = route_id(&estimate), minutes = estimate.minutes, "adding unmatched tranvias estimate");
            unmatched.push(synthetic(&ctx.arrivals, &estimate));
            continue;
        };

        let arrival = &mut ctx.arrivals[index];
        arrival.confirm(estimate.minutes);
        if let Some(vehicle) = estimate.vehicle_id.as_deref() {
            arrival.vehicle_information = Some(vehicle_badge(vehicle));
        }
        locate_vehicle(arrival, stop, estimate.meters, ctx.reduced);

        debug!(trip_id = %arrival.trip_id, live = estimate.minutes, "matched tranvias estimate");
        used.insert(arrival.trip_id.clone());
    }

    push_unique(&mut ctx.arrivals, unmatched);
}

/// A live-only arrival, described like any scheduled trip of the same route.
fn synthetic(arrivals: &[Arrival], estimate: &StopEstimate) -> Arrival {
    let id = route_id(estimate);
    let template = arrivals.iter().find(|a| a.route.local_id().trim() == id);

    let route = match template {
        Some(t) => t.route.clone(),
        None => RouteInfo {
            gtfs_id: format!("tranvias:{id}"),
            short_name: estimate.line.clone(),
            colour: "FFFFFF".into(),
            text_colour: "000000".into(),
        },
    };
    let destination = if estimate.destination.is_empty() {
        template.map(|t| t.headsign.destination.clone()).unwrap_or_default()
    } else {
        estimate.destination.clone()
    };

    let mut arrival = Arrival::scheduled(
        synthetic_trip_id(Feed::Tranvias, estimate),
        route,
        Headsign::to(destination),
        estimate.minutes,
    );
    arrival.estimate.precision = Precision::Confident;
    arrival.vehicle_information = estimate.vehicle_id.as_deref().map(vehicle_badge);
    arrival
}

impl Stage for TranviasStage {
    fn name(&self) -> &'static str {
        "tranvias_realtime"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.feed() != Feed::Tranvias {
                return Ok(StageStatus::Skipped("not a tranvias stop"));
            }
            let Ok(code) = normalize_stop_code(Feed::Tranvias, &ctx.stop_code).parse::<u32>() else {
                return Ok(StageStatus::Skipped("non-numeric stop code"));
            };

            let estimates = self.source.estimates(code).await?;
            apply_estimates(ctx, estimates);
            Ok(StageStatus::Applied)
        })
    }
}
