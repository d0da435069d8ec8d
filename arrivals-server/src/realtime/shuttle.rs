//! CTAG campus shuttle GPS status.

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::BoxFuture;
use serde::Deserialize;

use crate::geometry::LatLon;

use super::error::RealtimeError;
use super::http::get_json;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    lat: f64,
    lng: f64,
    last_position_at: String,
    #[serde(default)]
    free_seats: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuttleState {
    Idle,
    Operating,
}

/// Latest reported state of the shuttle.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuttleStatus {
    pub state: ShuttleState,
    pub position: LatLon,
    pub last_position_at: DateTime<Utc>,
    pub free_seats: Option<u32>,
}

/// Timestamps come as RFC 3339 or as naive UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RealtimeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RealtimeError::InvalidValue {
            field: "last_position_at",
            value: value.to_string(),
        })
}

fn convert(response: StatusResponse) -> Result<ShuttleStatus, RealtimeError> {
    let state = match response.status.to_ascii_lowercase().as_str() {
        "idle" => ShuttleState::Idle,
        "operating" => ShuttleState::Operating,
        _ => {
            return Err(RealtimeError::InvalidValue {
                field: "status",
                value: response.status,
            });
        }
    };

    Ok(ShuttleStatus {
        state,
        position: LatLon::new(response.lat, response.lng),
        last_position_at: parse_timestamp(&response.last_position_at)?,
        free_seats: response.free_seats,
    })
}

/// Anything that reports the shuttle's status.
pub trait ShuttleSource: Send + Sync {
    fn status(&self) -> BoxFuture<'_, Result<ShuttleStatus, RealtimeError>>;
}

#[derive(Debug, Clone)]
pub struct ShuttleClient {
    http: reqwest::Client,
    status_url: String,
}

impl ShuttleClient {
    pub fn new(http: reqwest::Client, status_url: impl Into<String>) -> Self {
        Self {
            http,
            status_url: status_url.into(),
        }
    }

    pub async fn get_status(&self) -> Result<ShuttleStatus, RealtimeError> {
        let response: StatusResponse = get_json(&self.http, &self.status_url, &[]).await?;
        convert(response)
    }
}

impl ShuttleSource for ShuttleClient {
    fn status(&self) -> BoxFuture<'_, Result<ShuttleStatus, RealtimeError>> {
        Box::pin(self.get_status())
    }
}
