// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod error;

pub use error::{Result, RetrievalError};

use jobdash_app::ApplicationRecord;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, COOKIE};
use std::time::Duration;
use url::Url;

pub const DEFAULT_APPLICATIONS_PATH: &str = "/api/applications";

/// Blocking client for the applications endpoint. Cheap to clone, so a
/// copy can be moved onto a worker thread per request.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    timeout: Duration,
    session_cookie: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, applications_path: &str, timeout: Duration) -> Result<Self> {
        let endpoint = build_endpoint(base_url, applications_path)?;
        if timeout.is_zero() {
            return Err(RetrievalError::InvalidConfig {
                message: "server.timeout must be positive".to_owned(),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(client_build_error)?;

        Ok(Self {
            endpoint,
            timeout,
            session_cookie: None,
            http,
        })
    }

    /// Sends the cookie on every request; blank values clear it.
    pub fn with_session_cookie(mut self, cookie: &str) -> Self {
        let cookie = cookie.trim();
        self.session_cookie = (!cookie.is_empty()).then(|| cookie.to_owned());
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn has_session_cookie(&self) -> bool {
        self.session_cookie.is_some()
    }

    pub fn fetch_applications(&self) -> Result<Vec<ApplicationRecord>> {
        let endpoint = self.endpoint.to_string();
        tracing::debug!(%endpoint, "fetching applications");

        let mut request = self
            .http
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .map_err(|source| RetrievalError::Connection {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(
                %endpoint,
                status = status.as_u16(),
                body = %body_excerpt(&body),
                "applications request rejected"
            );
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().map_err(|source| RetrievalError::Body {
            endpoint: endpoint.clone(),
            source,
        })?;
        let records = decode_applications(&body)
            .map_err(|source| RetrievalError::Decode { endpoint, source })?;
        tracing::debug!(count = records.len(), "applications decoded");
        Ok(records)
    }
}

/// Decodes the JSON array the endpoint returns. Missing optional fields and
/// unknown fields are both accepted.
pub fn decode_applications(raw: &str) -> serde_json::Result<Vec<ApplicationRecord>> {
    serde_json::from_str(raw)
}

fn client_build_error(error: impl std::fmt::Display) -> RetrievalError {
    RetrievalError::InvalidConfig {
        message: format!("build HTTP client: {error}"),
    }
}

const BODY_EXCERPT_CHARS: usize = 100;

/// Trimmed, single-line prefix of an error response body for logs.
fn body_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= BODY_EXCERPT_CHARS {
        return flat;
    }
    let mut excerpt = flat.chars().take(BODY_EXCERPT_CHARS).collect::<String>();
    excerpt.push('…');
    excerpt
}

fn build_endpoint(base_url: &str, applications_path: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(RetrievalError::InvalidConfig {
            message: "server.base_url must not be empty".to_owned(),
        });
    }

    let path = applications_path.trim().trim_start_matches('/');
    let joined = if path.is_empty() {
        base.to_owned()
    } else {
        format!("{base}/{path}")
    };

    let endpoint = Url::parse(&joined).map_err(|error| RetrievalError::InvalidConfig {
        message: format!("server.base_url {base_url:?} is not a valid URL ({error})"),
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(RetrievalError::InvalidConfig {
            message: format!(
                "server.base_url {base_url:?} must use http or https, got {}",
                endpoint.scheme()
            ),
        });
    }
    Ok(endpoint)
}
