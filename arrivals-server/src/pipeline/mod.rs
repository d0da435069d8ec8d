//! Arrival enrichment pipeline.
//!
//! A request starts with the scheduled arrivals of one stop. Stages then run
//! strictly one after another over a shared [`ArrivalsContext`]: per-operator
//! real-time matchers first, then filtering, formatting, marquees, shapes and
//! finally ridership. Each stage is time-boxed by the [`Pipeline`], and a
//! failing upstream only costs that stage's enrichment.

mod context;
mod matching;
mod orchestrator;
mod shuttle;
mod stage;
mod tranvias;
mod transform;
mod tussa;
mod usage;
mod vitrasa;

#[cfg(test)]
mod pipeline_tests;

use std::sync::Arc;
use std::time::Duration;

use crate::realtime::{EstimatesSource, ShuttleSource};
use crate::ridership::{RidershipWhitelist, UsageSource};

pub use context::{ArrivalsContext, FULL_LIMIT, REDUCED_LIMIT};
pub use matching::{
    MatchWindow, best_match, locate_vehicle, push_unique, route_feature_collection,
    synthetic_trip_id,
};
pub use orchestrator::{
    DEFAULT_STAGE_TIMEOUT, Pipeline, PipelineReport, StageOutcome, StageReport,
};
pub use shuttle::{ShuttleStage, eta_minutes};
pub use stage::{Stage, StageError, StageStatus};
pub use tranvias::{CORUNA_WINDOW, TranviasStage};
pub use transform::{
    FeedFormatStage, FilterSortStage, MarqueeStage, NextStopsStage, PAST_ARRIVAL_MINUTES,
    ShapeStage,
};
pub use tussa::{TUSSA_WINDOW, TussaStage};
pub use usage::UsageStage;
pub use vitrasa::{VITRASA_WINDOW, VitrasaStage};

/// External sources the standard pipeline draws on.
#[derive(Clone)]
pub struct PipelineSources {
    pub vitrasa: Arc<dyn EstimatesSource>,
    pub tranvias: Arc<dyn EstimatesSource>,
    pub tussa: Arc<dyn EstimatesSource>,
    /// The shuttle stage is left out when this is `None`.
    pub shuttle: Option<Arc<dyn ShuttleSource>>,
    pub whitelist: Arc<RidershipWhitelist>,
    /// The ridership stage is left out when this is `None`.
    pub usage: Option<Arc<dyn UsageSource>>,
}

/// The stages of a stop arrivals request, in their required order.
pub fn standard_pipeline(sources: PipelineSources, stage_timeout: Duration) -> Pipeline {
    let mut pipeline = Pipeline::new(stage_timeout)
        .with_stage(VitrasaStage::new(sources.vitrasa))
        .with_stage(TranviasStage::new(sources.tranvias))
        .with_stage(TussaStage::new(sources.tussa));

    if let Some(shuttle) = sources.shuttle {
        pipeline = pipeline.with_stage(ShuttleStage::new(shuttle));
    }

    pipeline = pipeline
        .with_stage(FilterSortStage)
        .with_stage(NextStopsStage)
        .with_stage(FeedFormatStage)
        .with_stage(MarqueeStage)
        .with_stage(ShapeStage);

    if let Some(usage) = sources.usage {
        if !sources.whitelist.is_empty() {
            pipeline = pipeline.with_stage(UsageStage::new(sources.whitelist, usage));
        }
    }

    pipeline
}
