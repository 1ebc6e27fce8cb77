//! HTTP probe for environment variables exposed by a test application.
//!
//! The probe drives `GET {route_url}/env/{name}` until the application gives
//! a terminal answer (200 with a JSON body, or 404 for an absent variable).
//! Connection failures and every other status are retried at a fixed
//! interval until the window elapses.

use crate::poll::{poll_for, PollConfig, PollError};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Cadence for polling the env endpoint until a terminal status.
pub const FETCH_POLL: PollConfig =
    PollConfig::new(Duration::from_secs(1), Duration::from_secs(100));

/// Cadence for polling until a fetched value matches an expectation.
pub const VERIFY_POLL: PollConfig =
    PollConfig::new(Duration::from_secs(5), Duration::from_secs(100));

/// Maximum length for response bodies quoted in errors.
const MAX_ERROR_BODY_LEN: usize = 256;

/// Env-var probe errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no terminal response for env var {name:?} within {waited:?}")]
    PollTimeout { name: String, waited: Duration },

    #[error("env endpoint returned a body that is not valid JSON: {body}")]
    InvalidBody { body: String },
}

/// Probe for the `/env/{name}` endpoint of a deployed test application.
pub struct EnvVarProbe {
    base_url: String,
    client: reqwest::Client,
    fetch_poll: PollConfig,
    verify_poll: PollConfig,
}

impl EnvVarProbe {
    /// Create a probe for the application reachable at `route_url`.
    ///
    /// Bare hosts (the usual shape of a resolved route) get an `http://`
    /// scheme prefixed.
    pub fn new(route_url: impl Into<String>, client: reqwest::Client) -> Self {
        let route = route_url.into();
        let base_url = if route.starts_with("http://") || route.starts_with("https://") {
            route
        } else {
            format!("http://{route}")
        };

        Self {
            base_url,
            client,
            fetch_poll: FETCH_POLL,
            verify_poll: VERIFY_POLL,
        }
    }

    /// Override the polling cadences (used by tests against a mock server).
    pub fn with_poll_config(mut self, fetch: PollConfig, verify: PollConfig) -> Self {
        self.fetch_poll = fetch;
        self.verify_poll = verify;
        self
    }

    /// Fetch the value of an environment variable from the application.
    ///
    /// Polls until the endpoint answers 200 or 404. A 200 body is decoded as
    /// JSON and returned; 404 means the variable is absent (`None`). If no
    /// terminal status arrives within the window the probe fails with
    /// `ProbeError::PollTimeout`.
    pub async fn fetch(&self, name: &str) -> Result<Option<Value>, ProbeError> {
        let url = format!("{}/env/{}", self.base_url, name);

        let body = poll_for(self.fetch_poll, || {
            let client = &self.client;
            let url = &url;
            async move {
                let response = match client.get(url).send().await {
                    Ok(response) => response,
                    Err(err) => {
                        trace!(%url, error = %err, "env endpoint unreachable, retrying");
                        return None;
                    }
                };

                match response.status() {
                    StatusCode::OK => match response.text().await {
                        Ok(text) => Some(Some(text)),
                        Err(err) => {
                            trace!(%url, error = %err, "failed reading body, retrying");
                            None
                        }
                    },
                    StatusCode::NOT_FOUND => Some(None),
                    status => {
                        trace!(%url, %status, "non-terminal status, retrying");
                        None
                    }
                }
            }
        })
        .await
        .map_err(|PollError::Timeout { waited }| ProbeError::PollTimeout {
            name: name.to_string(),
            waited,
        })?;

        match body {
            Some(text) => {
                let value =
                    serde_json::from_str(&text).map_err(|_| ProbeError::InvalidBody {
                        body: truncate_body(&text),
                    })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Poll until the variable's fetched value equals `expected`.
    ///
    /// Returns `Ok(true)` as soon as equality holds and `Ok(false)` if the
    /// window elapses without a match. A poll timeout inside `fetch`
    /// propagates as an error.
    pub async fn verify(&self, name: &str, expected: &str) -> Result<bool, ProbeError> {
        let want = Value::String(expected.to_string());

        let outcome = poll_for(self.verify_poll, || {
            let want = &want;
            async move {
                match self.fetch(name).await {
                    Ok(value) if value.as_ref() == Some(want) => Some(Ok(())),
                    Ok(value) => {
                        debug!(name, ?value, "env var value does not match yet, retrying");
                        None
                    }
                    Err(err) => Some(Err(err)),
                }
            }
        })
        .await;

        match outcome {
            Ok(Ok(())) => Ok(true),
            Ok(Err(err)) => Err(err),
            Err(PollError::Timeout { .. }) => Ok(false),
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_BODY_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...[truncated]", &body[..cut])
    } else {
        body.to_string()
    }
}
