//! HTTP client for the terminology service REST API
//!
//! Every call is classified into a tagged outcome instead of an error, so the
//! dispatcher decides what to report and what to retry.

use crate::config::RunConfig;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Version tag of the mutable latest-version pointer
pub const HEAD_VERSION: &str = "HEAD";

const USER_AGENT: &str = concat!("fhirload/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((idx, _)) => format!(
            "{}... [truncated, {} bytes total]",
            &body[..idx],
            body.len()
        ),
        None => body.to_string(),
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Describe a request that never produced a status code
fn describe_transport_error(error: &reqwest::Error, timeout: Option<Duration>) -> String {
    match timeout {
        Some(limit) if error.is_timeout() => {
            format!("request timed out after {}s", limit.as_secs_f32())
        }
        _ if error.is_connect() => format!("connection failed: {}", error),
        _ => error.to_string(),
    }
}

/// Outcome of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 201
    Created,
    /// 409, treated as success
    AlreadyExists,
    /// Any other status; reported but never retried
    HttpError { status: StatusCode, body: String },
    /// No response (timeout, connection failure, unreadable body)
    TransportFailure(String),
}

impl CreateOutcome {
    /// Only transport failures earn a second attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure(_))
    }
}

/// Outcome of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 204
    Deleted,
    HttpError { status: StatusCode, body: String },
    TransportFailure(String),
}

/// HTTP client bound to one base URL and token
#[derive(Clone)]
pub struct FhirHttpClient {
    client: Client,
    base_url: String,
    force: String,
    create_timeout: Duration,
}

impl FhirHttpClient {
    /// Create a new HTTP client; the authorization header is built once here
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, config.token.header_value()?);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!(
            "HTTP client ready for {} (token {})",
            config.base_url,
            config.token.masked()
        );

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            force: config.force.clone(),
            create_timeout: config.create_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of one resource version: `<base>/<id>/version/<version>/?force=<force>`
    pub fn delete_url(&self, id: &str, version: &str) -> String {
        format!(
            "{}/{}/version/{}/?force={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(id),
            urlencoding::encode(version),
            self.force
        )
    }

    /// POST the raw resource document to the base URL
    pub async fn create(&self, payload: &str) -> CreateOutcome {
        tracing::debug!("POST {}", self.base_url);

        let response = match self
            .client
            .post(&self.base_url)
            .timeout(self.create_timeout)
            .body(payload.to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("POST {} failed: {}", self.base_url, e);
                return CreateOutcome::TransportFailure(describe_transport_error(
                    &e,
                    Some(self.create_timeout),
                ));
            }
        };

        let status = response.status();
        if status == StatusCode::CREATED {
            return CreateOutcome::Created;
        }
        if status == StatusCode::CONFLICT {
            return CreateOutcome::AlreadyExists;
        }

        match response.text().await {
            Ok(body) => {
                // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
                tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
                CreateOutcome::HttpError { status, body }
            }
            Err(e) => {
                tracing::warn!("Failed to read response body: {}", e);
                CreateOutcome::TransportFailure(describe_transport_error(
                    &e,
                    Some(self.create_timeout),
                ))
            }
        }
    }

    /// DELETE one version of a resource
    pub async fn delete(&self, resource_type: &str, id: &str, version: &str) -> DeleteOutcome {
        let url = self.delete_url(id, version);
        tracing::debug!("DELETE {} ({})", url, resource_type);

        let response = match self.client.delete(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("DELETE {} failed: {}", url, e);
                return DeleteOutcome::TransportFailure(describe_transport_error(&e, None));
            }
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return DeleteOutcome::Deleted;
        }

        match response.text().await {
            Ok(body) => {
                tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
                DeleteOutcome::HttpError { status, body }
            }
            Err(e) => DeleteOutcome::TransportFailure(describe_transport_error(&e, None)),
        }
    }
}
