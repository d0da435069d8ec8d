//! TUSSA live estimates matched by route id.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::{Arrival, Feed, Headsign, Precision, RouteInfo, StopEstimate};
use crate::feeds::{best_text_colour, fallback_colours, normalize_stop_code};
use crate::realtime::EstimatesSource;

use super::context::ArrivalsContext;
use super::matching::{MatchWindow, best_match, push_unique, synthetic_trip_id};
use super::stage::{Stage, StageError, StageStatus};

/// Santiago buses may run up to 5 minutes early or 25 late.
pub const TUSSA_WINDOW: MatchWindow = MatchWindow {
    earliest: -5,
    latest: 25,
    early_weight: 1,
};

/// Badge shown on arrivals known only from live data.
const REALTIME_BADGE: &str = "T.REAL";

pub struct TussaStage {
    source: Arc<dyn EstimatesSource>,
}

impl TussaStage {
    pub fn new(source: Arc<dyn EstimatesSource>) -> Self {
        Self { source }
    }
}

pub(super) fn apply_estimates(ctx: &mut ArrivalsContext, estimates: Vec<StopEstimate>) {
    let mut used = HashSet::new();
    let mut unmatched = Vec::new();

    for estimate in estimates {
        let id = estimate.route_id.as_deref().unwrap_or(&estimate.line).trim().to_string();
        let found = best_match(&ctx.arrivals, &used, TUSSA_WINDOW, estimate.minutes, |a| {
            a.route.local_id().trim() == id
        });

        match found {
            Some(index) => {
                let arrival = &mut ctx.arrivals[index];
                arrival.confirm(estimate.minutes);
                debug!(trip_id = %arrival.trip_id, live = estimate.minutes, "matched tussa estimate");
                used.insert(arrival.trip_id.clone());
            }
            None => unmatched.push(synthetic(&estimate, &id)),
        }
    }

    push_unique(&mut ctx.arrivals, unmatched);
}

fn synthetic(estimate: &StopEstimate, route_id: &str) -> Arrival {
    let colour = estimate
        .colour
        .clone()
        .unwrap_or_else(|| fallback_colours(Feed::Tussa).0.trim_start_matches('#').to_string());
    let text_colour = best_text_colour(&colour)
        .unwrap_or("#FFFFFF")
        .trim_start_matches('#')
        .to_string();

    let route = RouteInfo {
        gtfs_id: format!("tussa:{route_id}"),
        short_name: estimate.line.clone(),
        colour,
        text_colour,
    };
    let headsign = Headsign {
        badge: Some(REALTIME_BADGE.to_string()),
        ..Headsign::to(estimate.destination.clone())
    };

    let mut arrival = Arrival::scheduled(
        synthetic_trip_id(Feed::Tussa, estimate),
        route,
        headsign,
        estimate.minutes,
    );
    arrival.estimate.precision = Precision::Confident;
    arrival
}

impl Stage for TussaStage {
    fn name(&self) -> &'static str {
        "tussa_realtime"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.feed() != Feed::Tussa {
                return Ok(StageStatus::Skipped("not a tussa stop"));
            }
            let Ok(code) = normalize_stop_code(Feed::Tussa, &ctx.stop_code).parse::<u32>() else {
                return Ok(StageStatus::Skipped("non-numeric stop code"));
            };

            let estimates = self.source.estimates(code).await?;
            apply_estimates(ctx, estimates);
            Ok(StageStatus::Applied)
        })
    }
}
