//! Pre-built stop timetables on disk.
//!
//! Files live at `{dir}/{YYYY-MM-DD}/{stop_code}.json` and hold the trips
//! calling at one stop on one service day.

use std::path::PathBuf;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::TimetableTrip;
use crate::geometry::LatLon;

#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    #[error("failed to read timetable: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed timetable {path}: {message}")]
    Json { path: String, message: String },
}

/// Every trip calling at a stop on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTimetable {
    #[serde(default)]
    pub location: Option<LatLon>,
    pub arrivals: Vec<TimetableTrip>,
}

/// Anything that can serve a stop's timetable for a date.
pub trait TimetableSource: Send + Sync {
    /// `Ok(None)` when there is no timetable for that stop and day.
    fn timetable<'a>(
        &'a self,
        stop_code: &'a str,
        date: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<StopTimetable>, TimetableError>>;
}

/// Reads timetables from a directory tree.
#[derive(Debug, Clone)]
pub struct FileTimetableSource {
    dir: PathBuf,
}

impl FileTimetableSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, stop_code: &str, date: NaiveDate) -> PathBuf {
        self.dir
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{stop_code}.json"))
    }
}

impl TimetableSource for FileTimetableSource {
    fn timetable<'a>(
        &'a self,
        stop_code: &'a str,
        date: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<StopTimetable>, TimetableError>> {
        Box::pin(async move {
            // Codes come from request input.
            if stop_code.is_empty() || !stop_code.chars().all(|c| c.is_ascii_alphanumeric()) {
                warn!(stop_code, "refusing timetable lookup for odd stop code");
                return Ok(None);
            }

            let path = self.path(stop_code, date);
            let body = match tokio::fs::read_to_string(&path).await {
                Ok(body) => body,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "timetable file not found");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            let timetable: StopTimetable =
                serde_json::from_str(&body).map_err(|e| TimetableError::Json {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            debug!(path = %path.display(), trips = timetable.arrivals.len(), "loaded timetable");
            Ok(Some(timetable))
        })
    }
}
