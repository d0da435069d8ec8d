//! Vitrasa live estimates matched onto scheduled trips.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::domain::{Arrival, Feed, Headsign, Precision, RouteInfo, StopEstimate};
use crate::feeds::{is_route_match, normalize_for_matching, normalize_stop_code};
use crate::geometry::project;
use crate::realtime::EstimatesSource;

use super::context::ArrivalsContext;
use super::matching::{MatchWindow, best_match, locate_vehicle, push_unique, synthetic_trip_id};
use super::stage::{Stage, StageError, StageStatus};

/// Vitrasa buses may run up to 7 minutes early or 75 late.
pub const VITRASA_WINDOW: MatchWindow = MatchWindow {
    earliest: -7,
    latest: 75,
    early_weight: 1,
};

pub struct VitrasaStage {
    source: Arc<dyn EstimatesSource>,
}

impl VitrasaStage {
    pub fn new(source: Arc<dyn EstimatesSource>) -> Self {
        Self { source }
    }
}

/// Whether a scheduled arrival can be the trip behind `estimate`.
///
/// The line must match exactly, then the destination must resemble the
/// scheduled headsign, the route long name or the last stop.
fn is_candidate(arrival: &Arrival, estimate: &StopEstimate, destination: &str) -> bool {
    if arrival.route.short_name.trim() != estimate.line.trim() {
        return false;
    }

    let headsign = arrival
        .schedule
        .as_ref()
        .and_then(|s| s.headsign())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or(&arrival.headsign.destination);
    if is_route_match(destination, &normalize_for_matching(headsign)) {
        return true;
    }

    let Some(schedule) = arrival.schedule.as_ref() else {
        return false;
    };
    [schedule.route_long_name(), schedule.last_stop_name()]
        .into_iter()
        .flatten()
        .any(|name| is_route_match(destination, &normalize_for_matching(name)))
}

/// Whether the live destination is only the name of the trip's last stop,
/// which is less informative than the scheduled headsign.
fn is_just_last_stop(arrival: &Arrival, destination: &str) -> bool {
    arrival
        .schedule
        .as_ref()
        .and_then(|s| s.last_stop_name())
        .is_some_and(|last| normalize_for_matching(last) == destination)
}

pub(super) fn apply_estimates(ctx: &mut ArrivalsContext, estimates: Vec<StopEstimate>) {
    let stop = ctx.stop_location.and_then(project);
    let mut used = HashSet::new();
    let mut unmatched = Vec::new();

    for estimate in estimates {
        let destination = normalize_for_matching(&estimate.destination);
        let found = best_match(&ctx.arrivals, &used, VITRASA_WINDOW, estimate.minutes, |a| {
            is_candidate(a, &estimate, &destination)
        });

        let Some(index) = found else {
            info!(
                line = %estimate.line,
                minutes = estimate.minutes,
                "adding unmatched vitrasa estimate"
            );
            unmatched.push(synthetic(&ctx.arrivals, &estimate));
            continue;
        };

        let arrival = &mut ctx.arrivals[index];
        let scheduled = arrival.estimate.minutes;
        arrival.confirm(estimate.minutes);

        if !estimate.destination.trim().is_empty() && !is_just_last_stop(arrival, &destination) {
            arrival.headsign.destination = estimate.destination.clone();
        }
        locate_vehicle(arrival, stop, estimate.meters, ctx.reduced);

        debug!(
            line = %estimate.line,
            trip_id = %arrival.trip_id,
            scheduled,
            live = estimate.minutes,
            "matched vitrasa estimate"
        );
        used.insert(arrival.trip_id.clone());
    }

    push_unique(&mut ctx.arrivals, unmatched);
}

/// A live-only arrival, coloured like any scheduled trip of the same line.
fn synthetic(arrivals: &[Arrival], estimate: &StopEstimate) -> Arrival {
    let template = arrivals
        .iter()
        .find(|a| a.route.short_name.trim() == estimate.line.trim());

    let route = RouteInfo {
        gtfs_id: format!("vitrasa:{}", estimate.line),
        short_name: estimate.line.clone(),
        colour: template.map_or_else(|| "FFFFFF".into(), |t| t.route.colour.clone()),
        text_colour: template.map_or_else(|| "000000".into(), |t| t.route.text_colour.clone()),
    };

    let mut arrival = Arrival::scheduled(
        synthetic_trip_id(Feed::Vitrasa, estimate),
        route,
        Headsign::to(estimate.destination.clone()),
        estimate.minutes,
    );
    arrival.estimate.precision = Precision::Confident;
    arrival
}

impl Stage for VitrasaStage {
    fn name(&self) -> &'static str {
        "vitrasa_realtime"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.feed() != Feed::Vitrasa {
                return Ok(StageStatus::Skipped("not a vitrasa stop"));
            }
            let Ok(code) = normalize_stop_code(Feed::Vitrasa, &ctx.stop_code).parse::<u32>() else {
                return Ok(StageStatus::Skipped("non-numeric stop code"));
            };

            let estimates: Vec<StopEstimate> = self
                .source
                .estimates(code)
                .await?
                .into_iter()
                .filter(|e| {
                    let route = e.destination.trim();
                    !route.is_empty() && !route.ends_with('*')
                })
                .collect();

            apply_estimates(ctx, estimates);
            Ok(StageStatus::Applied)
        })
    }
}
