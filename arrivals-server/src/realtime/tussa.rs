//! TUSSA (Santiago de Compostela) live estimates.

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::domain::StopEstimate;

use super::EstimatesSource;
use super::error::RealtimeError;
use super::http::get_json;

pub const DEFAULT_BASE_URL: &str = "https://app.tussa.org/tussa/api/paradas";

#[derive(Debug, Deserialize)]
struct TussaStop {
    #[serde(default)]
    lineas: Vec<TussaLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TussaLine {
    /// GTFS route id
    id: serde_json::Value,
    /// Public line label
    sinoptico: String,
    /// Destination
    nombre: String,
    /// Route colour, hex
    #[serde(default)]
    estilo: Option<String>,
    minutos_proximo_paso: i32,
}

fn id_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn convert(stop: TussaStop) -> Vec<StopEstimate> {
    stop.lineas
        .into_iter()
        .map(|line| {
            let estimate = StopEstimate::new(line.sinoptico, line.nombre, line.minutos_proximo_paso)
                .with_route_id(id_string(&line.id));
            match line.estilo {
                Some(colour) if !colour.is_empty() => {
                    estimate.with_colour(colour.trim_start_matches('#'))
                }
                _ => estimate,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct TussaClient {
    http: reqwest::Client,
    base_url: String,
}

impl TussaClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn get_estimates(&self, stop_code: u32) -> Result<Vec<StopEstimate>, RealtimeError> {
        let url = format!("{}/{stop_code}", self.base_url.trim_end_matches('/'));
        let stop: TussaStop = get_json(&self.http, &url, &[]).await?;
        Ok(convert(stop))
    }
}

impl EstimatesSource for TussaClient {
    fn estimates(&self, stop_code: u32) -> BoxFuture<'_, Result<Vec<StopEstimate>, RealtimeError>> {
        Box::pin(self.get_estimates(stop_code))
    }
}
