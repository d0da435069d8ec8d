//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::consolidated::Circulation;
use crate::domain::StopId;
use crate::fares::calculate_fare;
use crate::otp::convert_stop;
use crate::pipeline::ArrivalsContext;

use super::dto::*;
use super::error::AppError;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/arrivals", get(stop_arrivals))
        .route(
            "/api/vigo/GetConsolidatedCirculations",
            get(consolidated_circulations),
        )
        .route("/api/fares", post(fares))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}

/// Scheduled arrivals at a stop, enriched by the pipeline.
async fn stop_arrivals(
    State(state): State<AppState>,
    Query(req): Query<ArrivalsQuery>,
) -> Result<Json<StopArrivalsResponse>, AppError> {
    let stop_id = StopId::parse(&req.id)?;
    let now = (state.clock)();

    let stop = state.schedule.stop(&stop_id, req.reduced).await?;
    let mut schedule = convert_stop(stop, &stop_id, now);
    info!(
        stop_id = %stop_id,
        stop_name = %schedule.name,
        arrivals = schedule.arrivals.len(),
        "fetched scheduled arrivals"
    );

    let mut ctx = ArrivalsContext::new(stop_id, schedule.code.clone(), now)
        .with_reduced(req.reduced)
        .with_location(schedule.location)
        .with_arrivals(std::mem::take(&mut schedule.arrivals));

    let report = state.pipeline.run(&mut ctx).await;
    debug!(
        stop_id = %ctx.stop_id,
        clean = report.is_clean(),
        arrivals = ctx.arrivals.len(),
        "pipeline finished"
    );

    Ok(Json(StopArrivalsResponse::new(schedule, ctx)))
}

/// Legacy joined schedule and live list for Vigo stops.
async fn consolidated_circulations(
    State(state): State<AppState>,
    Query(req): Query<ConsolidatedQuery>,
) -> Result<Json<Vec<Circulation>>, AppError> {
    let raw = req.stop_id.trim();
    let stop_id = if raw.contains(':') {
        StopId::parse(raw)?
    } else {
        StopId::parse(&format!("vitrasa:{raw}"))?
    };

    let circulations = state
        .consolidated
        .circulations(&stop_id, (state.clock)())
        .await?;
    Ok(Json(circulations))
}

/// Cash and card totals for an itinerary.
async fn fares(State(state): State<AppState>, Json(req): Json<FareRequest>) -> Json<FareResponse> {
    Json(calculate_fare(&req.legs, &state.fares).into())
}
