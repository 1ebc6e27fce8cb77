//! Generic test application fixture.
//!
//! Deploys the env-echo test image and resolves its external route. The
//! image serves `GET /env/{name}` with the JSON-encoded value of the named
//! environment variable, or 404 when the variable is absent.

use super::{AppError, TestApp};
use crate::cluster::{ClusterConnection, ClusterError};
use crate::poll::{poll_until, PollConfig, PollError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Default image for the generic test application.
pub const DEFAULT_TEST_APP_IMAGE: &str =
    "quay.io/redhat-developer/sbo-generic-test-app:20200923";

/// Port the test application listens on.
const APP_PORT: u16 = 8080;

/// Polling cadence while waiting for the deployment to become ready.
const READY_POLL: PollConfig =
    PollConfig::new(Duration::from_secs(5), Duration::from_secs(300));

/// Generic env-echo application deployed into the suite's namespace.
#[derive(Debug)]
pub struct GenericTestApp {
    cluster: Arc<ClusterConnection>,
    name: String,
    image: String,
    route_url: OnceCell<String>,
}

impl GenericTestApp {
    /// Create a fixture for the named application with the default image.
    pub fn new(cluster: Arc<ClusterConnection>, name: impl Into<String>) -> Self {
        Self::with_image(cluster, name, DEFAULT_TEST_APP_IMAGE)
    }

    /// Create a fixture with a custom image.
    pub fn with_image(
        cluster: Arc<ClusterConnection>,
        name: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            cluster,
            name: name.into(),
            image: image.into(),
            route_url: OnceCell::new(),
        }
    }

    async fn ready_replicas(&self) -> Result<Option<u32>, AppError> {
        let query = self
            .cluster
            .kubectl(&[
                "get",
                "deployment",
                &self.name,
                "-o",
                "jsonpath={.status.readyReplicas}",
            ])
            .await;

        match query {
            Ok(out) => Ok(Some(out.trim().parse().unwrap_or(0))),
            // Deployment does not exist yet
            Err(ClusterError::KubectlFailed { stderr, .. }) if stderr.contains("NotFound") => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve the external host: OpenShift route first, then ingress.
    async fn resolve_route(&self) -> Result<String, AppError> {
        let route = self
            .cluster
            .kubectl(&["get", "route", &self.name, "-o", "jsonpath={.spec.host}"])
            .await;

        if let Ok(host) = route {
            let host = host.trim();
            if !host.is_empty() {
                debug!(name = %self.name, %host, "resolved route host");
                return Ok(host.to_string());
            }
        }

        let ingress = self
            .cluster
            .kubectl(&[
                "get",
                "ingress",
                &self.name,
                "-o",
                "jsonpath={.spec.rules[0].host}",
            ])
            .await;

        match ingress {
            Ok(host) if !host.trim().is_empty() => {
                let host = host.trim().to_string();
                debug!(name = %self.name, %host, "resolved ingress host");
                Ok(host)
            }
            _ => Err(AppError::RouteNotFound {
                name: self.name.clone(),
            }),
        }
    }
}

#[async_trait]
impl TestApp for GenericTestApp {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        self.cluster.namespace()
    }

    async fn is_running(&self) -> Result<bool, AppError> {
        Ok(self.ready_replicas().await?.unwrap_or(0) > 0)
    }

    async fn install(&self) -> Result<(), AppError> {
        info!(name = %self.name, image = %self.image, "installing test application");

        self.cluster
            .kubectl(&[
                "create",
                "deployment",
                &self.name,
                &format!("--image={}", self.image),
            ])
            .await?;

        self.cluster
            .kubectl(&[
                "expose",
                "deployment",
                &self.name,
                &format!("--port={APP_PORT}"),
            ])
            .await?;

        let ready = poll_until(READY_POLL, || {
            let app = self;
            async move { matches!(app.is_running().await, Ok(true)) }
        })
        .await;

        ready.map_err(|PollError::Timeout { waited }| AppError::NotReady {
            name: self.name.clone(),
            waited,
        })
    }

    async fn route_url(&self) -> Result<String, AppError> {
        self.route_url
            .get_or_try_init(|| self.resolve_route())
            .await
            .cloned()
    }
}
