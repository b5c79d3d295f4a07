// file: src/sources/http.rs
// description: shared reqwest client and response classification for patent sources
// reference: https://docs.rs/reqwest

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::SourceKind;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

pub fn build_client(config: &PipelineConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .build()
        .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Sends the request and returns the body of a successful response.
pub async fn fetch_body(source: SourceKind, request: RequestBuilder) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| PipelineError::network(source.key(), describe_send_error(&e)))?;

    let response = check_status(source, response)?;

    debug!("{} responded with {}", source, response.status());

    response
        .text()
        .await
        .map_err(|e| PipelineError::network(source.key(), format!("Failed to read body: {}", e)))
}

fn check_status(source: SourceKind, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    Err(classify_status(source, status, retry_after_secs))
}

pub fn classify_status(
    source: SourceKind,
    status: StatusCode,
    retry_after_secs: Option<u64>,
) -> PipelineError {
    let throttled = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::SERVICE_UNAVAILABLE && retry_after_secs.is_some());

    if throttled {
        PipelineError::RateLimit {
            source_name: source.key().to_string(),
            retry_after_secs,
        }
    } else {
        PipelineError::network(source.key(), format!("HTTP status {}", status))
    }
}

fn describe_send_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
