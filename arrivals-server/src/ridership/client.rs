//! Historical usage-by-hour from the Vigo open-data API.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::realtime::{RealtimeError, get_json};

use super::UsageSource;

/// Boardings at a stop in one hour of one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePoint {
    /// Hour of day, 0-23
    #[serde(rename = "h")]
    pub hour: u8,
    /// Total boardings
    #[serde(rename = "t")]
    pub total: u32,
    /// Day of week
    #[serde(rename = "d")]
    pub day_of_week: u8,
}

#[derive(Debug, Clone)]
pub struct UsageClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsageClient {
    /// `base_url` is the same `api2.jsp` endpoint that serves Vitrasa
    /// estimates.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn get_usage(&self, stop_code: &str) -> Result<Vec<UsagePoint>, RealtimeError> {
        get_json(
            &self.http,
            &self.base_url,
            &[
                ("tipo", "TRANSPORTE_PARADA_HORAS_USO".to_string()),
                ("parada", stop_code.to_string()),
            ],
        )
        .await
    }
}

impl UsageSource for UsageClient {
    fn usage<'a>(&'a self, stop_code: &'a str) -> BoxFuture<'a, Result<Vec<UsagePoint>, RealtimeError>> {
        Box::pin(self.get_usage(stop_code))
    }
}
