//! Request-scoped state shared by every stage.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::{Arrival, Feed, StopId};
use crate::geometry::LatLon;
use crate::ridership::UsagePoint;

/// Arrivals returned for a reduced request.
pub const REDUCED_LIMIT: usize = 4;

/// Arrivals returned for a full request.
pub const FULL_LIMIT: usize = 10;

/// Everything the stages read and mutate for one stop request.
#[derive(Debug, Clone)]
pub struct ArrivalsContext {
    pub stop_id: StopId,
    /// Public stop code as published by the planner.
    pub stop_code: String,
    /// Reduced requests return fewer arrivals and no geometry.
    pub reduced: bool,
    pub stop_location: Option<LatLon>,
    pub arrivals: Vec<Arrival>,
    /// Local time in Europe/Madrid.
    pub now: DateTime<Tz>,
    pub usage: Option<Vec<UsagePoint>>,
}

impl ArrivalsContext {
    pub fn new(stop_id: StopId, stop_code: impl Into<String>, now: DateTime<Tz>) -> Self {
        Self {
            stop_id,
            stop_code: stop_code.into(),
            reduced: false,
            stop_location: None,
            arrivals: Vec::new(),
            now,
            usage: None,
        }
    }

    pub fn with_reduced(mut self, reduced: bool) -> Self {
        self.reduced = reduced;
        self
    }

    pub fn with_location(mut self, location: LatLon) -> Self {
        self.stop_location = Some(location);
        self
    }

    pub fn with_arrivals(mut self, arrivals: Vec<Arrival>) -> Self {
        self.arrivals = arrivals;
        self
    }

    pub fn feed(&self) -> Feed {
        self.stop_id.feed()
    }

    /// How many arrivals the response may hold.
    pub fn limit(&self) -> usize {
        if self.reduced {
            REDUCED_LIMIT
        } else {
            FULL_LIMIT
        }
    }

    pub fn set_usage(&mut self, usage: Vec<UsagePoint>) {
        self.usage = Some(usage);
    }
}
