//! Cluster access utilities for the acceptance suite.
//!
//! This module provides the `ClusterConnection` type for validating that
//! `kubectl` and the target namespace are available before running tests,
//! and for running namespace-scoped kubectl queries on behalf of fixtures.

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Environment variable naming the namespace the suite runs against.
pub const NAMESPACE_ENV: &str = "TEST_NAMESPACE";

/// Request timeout for the shared HTTP client.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Cluster connection errors.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("kubectl not found on PATH. Install kubectl and configure it for the target cluster: {0}")]
    KubectlNotFound(std::io::Error),

    #[error("kubectl {args} failed with status {status}: {stderr}")]
    KubectlFailed {
        args: String,
        status: i32,
        stderr: String,
    },

    #[error("namespace {namespace:?} not found. Set {NAMESPACE_ENV} to a prepared namespace")]
    NamespaceNotFound { namespace: String },

    #[error("{NAMESPACE_ENV} is not set")]
    NamespaceNotConfigured,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Connection to the cluster namespace under test.
///
/// Carries the namespace every kubectl query is scoped to and a shared
/// HTTP client for fixtures that talk to deployed applications.
#[derive(Debug)]
pub struct ClusterConnection {
    namespace: String,
    http_client: reqwest::Client,
}

impl ClusterConnection {
    /// Create a connection to the given namespace.
    ///
    /// Verifies that kubectl is available and that the namespace exists.
    /// Returns actionable error messages otherwise.
    pub async fn new(namespace: impl Into<String>) -> Result<Self, ClusterError> {
        let namespace = namespace.into();

        // Existence check doubles as the kubectl availability check.
        run_kubectl(&["get", "namespace", &namespace, "-o", "name"])
            .await
            .map_err(|err| match err {
                ClusterError::KubectlFailed { .. } => ClusterError::NamespaceNotFound {
                    namespace: namespace.clone(),
                },
                other => other,
            })?;

        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            namespace,
            http_client,
        })
    }

    /// Create a connection to the namespace named by `TEST_NAMESPACE`.
    pub async fn from_env() -> Result<Self, ClusterError> {
        let namespace =
            std::env::var(NAMESPACE_ENV).map_err(|_| ClusterError::NamespaceNotConfigured)?;
        Self::new(namespace).await
    }

    /// Get the namespace this connection is scoped to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the HTTP client for making requests.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Run a kubectl command scoped to the connection's namespace.
    ///
    /// Returns captured stdout on success. A non-zero exit maps to
    /// `ClusterError::KubectlFailed` carrying the command's stderr.
    pub async fn kubectl(&self, args: &[&str]) -> Result<String, ClusterError> {
        let mut scoped: Vec<&str> = args.to_vec();
        scoped.push("-n");
        scoped.push(&self.namespace);
        run_kubectl(&scoped).await
    }
}

async fn run_kubectl(args: &[&str]) -> Result<String, ClusterError> {
    debug!(?args, "running kubectl");

    let output = Command::new("kubectl")
        .args(args)
        .output()
        .await
        .map_err(ClusterError::KubectlNotFound)?;

    if !output.status.success() {
        return Err(ClusterError::KubectlFailed {
            args: args.join(" "),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
