//! CTAG shuttle: ETA derived from the vehicle's GPS position.
//!
//! The shuttle runs a single loop, so its position is snapped onto the
//! shape of the first scheduled trip and the distance to the stop is
//! measured along that loop.

use std::sync::Arc;

use chrono::Duration;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::domain::{Feed, VehiclePosition};
use crate::geometry::{
    Point, bearing_degrees, closest_point_index, cumulative_distance, distance, project,
    projected_shape,
};
use crate::realtime::{ShuttleSource, ShuttleState, ShuttleStatus};

use super::context::ArrivalsContext;
use super::stage::{Stage, StageError, StageStatus};

/// Positions older than this are ignored.
const MAX_POSITION_AGE_MINUTES: i64 = 3;

/// GPS fixes further than this from the route are ignored.
const MAX_DISTANCE_FROM_SHAPE_M: f64 = 100.0;

/// Closer than this counts as arriving now.
const ARRIVING_RADIUS_M: f64 = 50.0;

/// Roughly 20 km/h.
const METERS_PER_MINUTE: f64 = 333.0;

/// Scheduled departures this far in the past may still be the active trip.
const ACTIVE_TRIP_MIN_MINUTES: i32 = -2;

/// Largest schedule deviation accepted when picking the active trip.
const ACTIVE_TRIP_MAX_DIFF: i32 = 45;

pub struct ShuttleStage {
    source: Arc<dyn ShuttleSource>,
}

impl ShuttleStage {
    pub fn new(source: Arc<dyn ShuttleSource>) -> Self {
        Self { source }
    }
}

/// Minutes to cover `meters` at shuttle speed.
pub fn eta_minutes(meters: f64) -> i32 {
    if meters < ARRIVING_RADIUS_M {
        0
    } else {
        (meters / METERS_PER_MINUTE).ceil() as i32
    }
}

/// Distance from `from` forward to `to` along a closed loop.
fn loop_distance(shape: &[Point], from: usize, to: usize) -> f64 {
    let remaining = cumulative_distance(shape, to) - cumulative_distance(shape, from);
    if remaining < 0.0 {
        remaining + cumulative_distance(shape, shape.len().saturating_sub(1))
    } else {
        remaining
    }
}

pub(super) fn apply_status(ctx: &mut ArrivalsContext, status: &ShuttleStatus) -> StageStatus {
    let age = ctx.now.with_timezone(&chrono::Utc) - status.last_position_at;
    if age > Duration::minutes(MAX_POSITION_AGE_MINUTES) {
        info!(age_secs = age.num_seconds(), "shuttle position is stale");
        return StageStatus::Skipped("stale position");
    }
    if status.state == ShuttleState::Idle {
        return StageStatus::Skipped("shuttle idle");
    }

    let Some(stop_location) = ctx.stop_location else {
        warn!(stop_id = %ctx.stop_id, "no location for shuttle stop");
        return StageStatus::Skipped("no stop location");
    };
    let Some(encoded) = ctx
        .arrivals
        .first()
        .and_then(|a| a.schedule.as_ref())
        .and_then(|s| s.geometry())
    else {
        warn!(stop_id = %ctx.stop_id, "no shape for shuttle trip");
        return StageStatus::Skipped("no shape");
    };

    let (Some(vehicle), Some(stop)) = (project(status.position), project(stop_location)) else {
        return StageStatus::Skipped("unprojectable position");
    };
    let shape = projected_shape(encoded);
    let (Some(vehicle_index), Some(stop_index)) = (
        closest_point_index(&shape, vehicle),
        closest_point_index(&shape, stop),
    ) else {
        return StageStatus::Skipped("empty shape");
    };

    let off_route = distance(shape[vehicle_index], vehicle);
    if off_route > MAX_DISTANCE_FROM_SHAPE_M {
        warn!(off_route, "shuttle too far from its route");
        return StageStatus::Skipped("off route");
    }

    let remaining = loop_distance(&shape, vehicle_index, stop_index);
    let eta = eta_minutes(remaining);
    debug!(remaining, eta, "shuttle eta");

    let active = ctx
        .arrivals
        .iter()
        .enumerate()
        .filter(|(_, a)| a.estimate.minutes >= ACTIVE_TRIP_MIN_MINUTES)
        .map(|(i, a)| (i, (a.estimate.minutes - eta).abs()))
        .filter(|(_, diff)| *diff < ACTIVE_TRIP_MAX_DIFF)
        .min_by_key(|(_, diff)| *diff)
        .map(|(i, _)| i)
        .or_else(|| {
            ctx.arrivals
                .iter()
                .enumerate()
                .filter(|(_, a)| a.estimate.minutes >= 0)
                .min_by_key(|(_, a)| a.estimate.minutes)
                .map(|(i, _)| i)
        });

    let Some(index) = active else {
        warn!(stop_id = %ctx.stop_id, "no active shuttle trip");
        return StageStatus::Skipped("no active trip");
    };

    let orientation = shape
        .get(vehicle_index + 1)
        .map_or(0, |next| (bearing_degrees(shape[vehicle_index], *next).round() as u16) % 360);

    let arrival = &mut ctx.arrivals[index];
    arrival.confirm(eta);
    arrival.current_position = Some(VehiclePosition {
        latitude: status.position.lat,
        longitude: status.position.lon,
        orientation_degrees: orientation,
        shape_index: Some(vehicle_index),
    });
    arrival.stop_shape_index = Some(stop_index);

    info!(trip_id = %arrival.trip_id, eta, "updated active shuttle trip");
    StageStatus::Applied
}

impl Stage for ShuttleStage {
    fn name(&self) -> &'static str {
        "shuttle_realtime"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.feed() != Feed::Shuttle {
                return Ok(StageStatus::Skipped("not a shuttle stop"));
            }
            if ctx.arrivals.is_empty() {
                return Ok(StageStatus::Skipped("no scheduled arrivals"));
            }

            let status = self.source.status().await?;
            Ok(apply_status(ctx, &status))
        })
    }
}
