//! Shared HTTP plumbing for the external services

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ServicesConfig;
use crate::{PlannerError, Result};

/// Build the HTTP client shared by all data services
pub fn build_client(services: &ServicesConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(services.timeout_seconds.into()))
        .user_agent(services.user_agent.clone())
        .build()
        .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))
}

/// Send a request and decode a JSON body, mapping HTTP failures onto
/// [`PlannerError`]. No retries are attempted.
pub async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder, service: &str) -> Result<T> {
    match fetch(request, service, false).await? {
        Some(parsed) => Ok(parsed),
        None => Err(PlannerError::api(format!("{service} returned an empty response"))),
    }
}

/// Like [`fetch_json`], but HTTP 404 is `Ok(None)` for lookups where a
/// miss is an answer
pub async fn fetch_optional_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &str,
) -> Result<Option<T>> {
    fetch(request, service, true).await
}

async fn fetch<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &str,
    missing_ok: bool,
) -> Result<Option<T>> {
    let start_time = Instant::now();

    let response = request.send().await.map_err(|e| {
        warn!("{} request failed: {}", service, e);
        PlannerError::network(format!("{service} is unreachable: {e}"))
    })?;

    let status = response.status();
    debug!(
        "{} responded {} in {:.3}s",
        service,
        status,
        start_time.elapsed().as_secs_f64()
    );

    if missing_ok && status == StatusCode::NOT_FOUND {
        debug!("{} has no match (HTTP 404)", service);
        return Ok(None);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(service, status, &body));
    }

    let parsed = response.json::<T>().await.map_err(|e| {
        PlannerError::api(format!("Failed to parse {service} response: {e}"))
    })?;

    let total = start_time.elapsed();
    if total.as_secs() > 5 {
        warn!("Slow {} response: {:.3}s", service, total.as_secs_f64());
    } else {
        info!("{} request completed in {:.3}s", service, total.as_secs_f64());
    }

    Ok(Some(parsed))
}

fn status_error(service: &str, status: StatusCode, body: &str) -> PlannerError {
    let detail = body.chars().take(300).collect::<String>();
    match status.as_u16() {
        401 | 403 => PlannerError::config(format!(
            "{service} rejected the API key (HTTP {status})"
        )),
        429 => PlannerError::api(format!("{service} rate limit exceeded (HTTP 429)")),
        _ => PlannerError::api(format!("{service} returned HTTP {status}: {detail}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error("Nominatim", StatusCode::UNAUTHORIZED, ""),
            PlannerError::Config { .. }
        ));
        assert!(matches!(
            status_error("Open-Meteo", StatusCode::NOT_FOUND, "gone"),
            PlannerError::Api { .. }
        ));
        let err = status_error("Open-Meteo", StatusCode::BAD_REQUEST, "{\"reason\":\"bad date\"}");
        assert!(err.to_string().contains("bad date"));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&ServicesConfig::default()).is_ok());
    }
}
