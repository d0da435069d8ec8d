//! Trip planner GraphQL client.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::StopId;

use super::ScheduleSource;
use super::error::OtpError;
use super::types::{GraphResponse, OtpStop, StopData};

/// Default planner root; `/gtfs/v1` is appended.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/otp";

const DEFAULT_MAX_CONCURRENT: usize = 8;

/// How far back departures are requested, so late vehicles still match.
const LOOKBACK_MINUTES: i64 = 75;

/// Window of departures requested, in seconds.
const TIME_RANGE_SECS: u32 = 4 * 60 * 60;

const NUMBER_OF_DEPARTURES: u32 = 100;

/// Configuration for the planner client.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub base_url: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
}

impl OtpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Serialize)]
struct GraphRequest<'a> {
    query: &'a str,
}

/// Build the arrivals query for a stop.
///
/// Reduced queries leave out trip geometry.
pub fn arrivals_query(stop_id: &StopId, reduced: bool, now: DateTime<Utc>) -> String {
    let start_time = (now - chrono::Duration::minutes(LOOKBACK_MINUTES)).timestamp();
    let geometry = if reduced { "" } else { "tripGeometry { points }" };
    let id = stop_id.as_str().replace('"', "");

    format!(
        r#"query Query {{
  stop(id: "{id}") {{
    code name lat lon
    routes {{ gtfsId shortName color textColor }}
    arrivals: stoptimesWithoutPatterns(numberOfDepartures: {NUMBER_OF_DEPARTURES}, startTime: {start_time}, timeRange: {TIME_RANGE_SECS}) {{
      headsign scheduledDeparture serviceDay pickupType
      trip {{
        gtfsId serviceId tripHeadsign routeShortName
        route {{ gtfsId color textColor longName }}
        {geometry}
        arrivalStoptime {{ stop {{ gtfsId }} }}
        stoptimes {{ stop {{ name lat lon }} scheduledDeparture }}
      }}
    }}
  }}
}}"#
    )
}

/// Client for the planner's GTFS GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct OtpClient {
    http: reqwest::Client,
    endpoint: String,
    semaphore: Arc<Semaphore>,
}

impl OtpClient {
    pub fn new(config: OtpConfig) -> Result<Self, OtpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/gtfs/v1", config.base_url.trim_end_matches('/')),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Fetch a stop with its routes and departures from 75 minutes ago
    /// onwards.
    pub async fn get_stop(&self, stop_id: &StopId, reduced: bool) -> Result<OtpStop, OtpError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| OtpError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let query = arrivals_query(stop_id, reduced, Utc::now());
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphRequest { query: &query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: GraphResponse<StopData> =
            serde_json::from_str(&body).map_err(|e| OtpError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        if let Some(error) = parsed.errors.first() {
            return Err(OtpError::GraphQl(error.message.clone()));
        }

        let stop = parsed
            .data
            .and_then(|d| d.stop)
            .ok_or_else(|| OtpError::StopNotFound(stop_id.to_string()))?;

        debug!(stop_id = %stop_id, departures = stop.arrivals.len(), "fetched stop schedule");
        Ok(stop)
    }
}

impl ScheduleSource for OtpClient {
    fn stop<'a>(&'a self, stop_id: &'a StopId, reduced: bool) -> BoxFuture<'a, Result<OtpStop, OtpError>> {
        Box::pin(self.get_stop(stop_id, reduced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn config_builder() {
        let config = OtpConfig::new("http://otp:8080/otp")
            .with_max_concurrent(2)
            .with_timeout(3);
        assert_eq!(config.base_url, "http://otp:8080/otp");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn config_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
    }

    #[test]
    fn client_endpoint() {
        let client = OtpClient::new(OtpConfig::new("http://otp/otp/")).unwrap();
        assert_eq!(client.endpoint, "http://otp/otp/gtfs/v1");
    }

    #[test]
    fn query_looks_back_and_omits_geometry_when_reduced() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap();
        let id = StopId::parse("vitrasa:14264").unwrap();

        let full = arrivals_query(&id, false, now);
        assert!(full.contains(r#"stop(id: "vitrasa:14264")"#));
        assert!(full.contains(&format!("startTime: {}", now.timestamp() - 75 * 60)));
        assert!(full.contains("timeRange: 14400"));
        assert!(full.contains("tripGeometry"));

        let reduced = arrivals_query(&id, true, now);
        assert!(!reduced.contains("tripGeometry"));
    }
}
