//! Planner stand-in that serves stops from JSON files.
//!
//! Useful for development without a running planner.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use crate::domain::StopId;

use super::ScheduleSource;
use super::error::OtpError;
use super::types::OtpStop;

/// Serves stops loaded from a directory.
///
/// Files are named after the stop id with `:` replaced by `_`, e.g.
/// `vitrasa_14264.json`, and hold the `stop` object of a planner response.
/// Departure times are served as recorded.
#[derive(Debug, Clone)]
pub struct FixtureScheduleSource {
    stops: Arc<HashMap<String, OtpStop>>,
}

impl FixtureScheduleSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, OtpError> {
        let data_dir = data_dir.as_ref();
        let mut stops = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            OtpError::Fixture(format!("failed to read {}: {e}", data_dir.display()))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| OtpError::Fixture(format!("failed to read directory entry: {e}")))?
                .path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = stem.replacen('_', ":", 1);

            let json = std::fs::read_to_string(&path)
                .map_err(|e| OtpError::Fixture(format!("failed to read {}: {e}", path.display())))?;
            let stop: OtpStop = serde_json::from_str(&json)
                .map_err(|e| OtpError::Fixture(format!("failed to parse {}: {e}", path.display())))?;

            stops.insert(id, stop);
        }

        if stops.is_empty() {
            return Err(OtpError::Fixture(format!(
                "no stop files found in {}",
                data_dir.display()
            )));
        }

        info!(stops = stops.len(), dir = %data_dir.display(), "loaded schedule fixtures");
        Ok(Self {
            stops: Arc::new(stops),
        })
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl ScheduleSource for FixtureScheduleSource {
    fn stop<'a>(&'a self, stop_id: &'a StopId, reduced: bool) -> BoxFuture<'a, Result<OtpStop, OtpError>> {
        Box::pin(async move {
            let mut stop = self
                .stops
                .get(stop_id.as_str())
                .cloned()
                .ok_or_else(|| OtpError::StopNotFound(stop_id.to_string()))?;

            if reduced {
                for departure in &mut stop.arrivals {
                    departure.trip.trip_geometry = None;
                }
            }
            Ok(stop)
        })
    }
}
