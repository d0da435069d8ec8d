//! Shared request plumbing for the operator clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::RealtimeError;

const USER_AGENT: &str = concat!("arrivals-server/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every operator.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, RealtimeError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// GET `url` and decode its JSON body.
pub async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, RealtimeError> {
    let response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .query(query)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RealtimeError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| RealtimeError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}
