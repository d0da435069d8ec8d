//! Application state for the web layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::{Europe::Madrid, Tz};

use crate::consolidated::ConsolidatedService;
use crate::fares::ZoneFareTable;
use crate::otp::ScheduleSource;
use crate::pipeline::Pipeline;

/// Current time in the feeds' timezone.
pub fn madrid_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Madrid)
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Scheduled arrivals per stop
    pub schedule: Arc<dyn ScheduleSource>,

    /// Enrichment stages run on every arrivals request
    pub pipeline: Arc<Pipeline>,

    /// Legacy consolidated circulations
    pub consolidated: Arc<ConsolidatedService>,

    /// Xunta zone prices, loaded once at startup
    pub fares: Arc<ZoneFareTable>,

    pub clock: fn() -> DateTime<Tz>,
}

impl AppState {
    pub fn new(
        schedule: Arc<dyn ScheduleSource>,
        pipeline: Pipeline,
        consolidated: ConsolidatedService,
        fares: ZoneFareTable,
    ) -> Self {
        Self {
            schedule,
            pipeline: Arc::new(pipeline),
            consolidated: Arc::new(consolidated),
            fares: Arc::new(fares),
            clock: madrid_now,
        }
    }

    /// Replace the clock, for tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Tz>) -> Self {
        self.clock = clock;
        self
    }
}
