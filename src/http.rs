//! Outbound HTTP plumbing shared by the weather, events and LLM clients

use crate::TripMateError;
use crate::config::HttpConfig;
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of an error body kept in messages
const MAX_ERROR_BODY: usize = 300;

/// Build a client with the configured timeout, user agent and retry policy
pub fn build_client(http: &HttpConfig, timeout_seconds: u32) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(http.user_agent.as_str())
        .build()
        .map_err(|e| TripMateError::config(format!("Failed to create HTTP client: {e}")))?;

    let mut builder = ClientBuilder::new(client);
    if http.max_retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(http.max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }

    Ok(builder.build())
}

/// Send the request; transport failures and non-success statuses become `ServiceUnavailable`
pub async fn send(service: &str, request: RequestBuilder) -> crate::Result<Response> {
    let response = request.send().await.map_err(|e| {
        warn!(service, error = %e, "request failed");
        TripMateError::service_unavailable(service, format!("request failed: {e}"))
    })?;

    let status = response.status();
    debug!(service, %status, "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(service, %status, "non-success response");
    Err(TripMateError::service_unavailable(
        service,
        format!("HTTP {status}: {}", truncate(body.trim())),
    ))
}

/// Decode a JSON body; a body we cannot read counts as the service failing
pub async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> crate::Result<T> {
    response.json::<T>().await.map_err(|e| {
        warn!(service, error = %e, "failed to parse response");
        TripMateError::service_unavailable(service, format!("invalid response: {e}"))
    })
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_bodies() {
        assert_eq!(truncate("bad request"), "bad request");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY + 10);
        assert_eq!(truncate(&body).chars().count(), MAX_ERROR_BODY);
    }

    #[test]
    fn test_build_client_with_retries() {
        let http = HttpConfig {
            max_retries: 2,
            user_agent: "TripMate/test".to_string(),
        };
        assert!(build_client(&http, 5).is_ok());
    }
}
