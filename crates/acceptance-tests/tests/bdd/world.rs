//! Scenario state for the acceptance scenarios.
//!
//! The world threads the application reference between step handlers
//! explicitly instead of relying on implicit global scenario state.

use acceptance_tests::apps::TestApp;
use acceptance_tests::cluster::ClusterConnection;
use cucumber::World;
use std::sync::Arc;

#[derive(Debug, Default, World)]
pub struct AppWorld {
    cluster: Option<Arc<ClusterConnection>>,
    pub application: Option<Box<dyn TestApp>>,
}

impl AppWorld {
    /// Connection to the namespace under test, established on first use.
    pub async fn cluster(&mut self) -> Arc<ClusterConnection> {
        if let Some(cluster) = &self.cluster {
            return Arc::clone(cluster);
        }

        let cluster = Arc::new(
            ClusterConnection::from_env()
                .await
                .expect("Failed to connect - set TEST_NAMESPACE and check kubectl access"),
        );
        self.cluster = Some(Arc::clone(&cluster));
        cluster
    }
}
