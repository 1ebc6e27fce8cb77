//! Test application fixtures.
//!
//! Applications the suite deploys and probes implement the `TestApp`
//! capability set so step definitions stay independent of the concrete
//! application kind.

pub mod generic;

pub use generic::GenericTestApp;

use crate::cluster::ClusterError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Test application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("no route or ingress host found for application {name:?}")]
    RouteNotFound { name: String },

    #[error("application {name:?} did not become ready within {waited:?}")]
    NotReady { name: String, waited: Duration },
}

/// Capability set of an application under test.
///
/// `install` and `is_running` cover deployment mechanics; `route_url` is the
/// externally resolved address probes are pointed at.
#[async_trait]
pub trait TestApp: std::fmt::Debug + Send + Sync {
    /// Application name, used for the deployment and service objects.
    fn name(&self) -> &str;

    /// Namespace the application is deployed into.
    fn namespace(&self) -> &str;

    /// Whether the application's deployment has at least one ready replica.
    async fn is_running(&self) -> Result<bool, AppError>;

    /// Deploy the application and wait until it is running.
    async fn install(&self) -> Result<(), AppError>;

    /// Resolve the externally reachable host for the application.
    async fn route_url(&self) -> Result<String, AppError>;
}
