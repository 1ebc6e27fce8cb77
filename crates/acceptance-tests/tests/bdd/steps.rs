//! Step definitions for the generic test application scenarios.

use crate::world::AppWorld;
use acceptance_tests::apps::{GenericTestApp, TestApp};
use acceptance_tests::probe::EnvVarProbe;
use cucumber::{given, then, when};
use tracing::info;

#[given(regex = r#"^Generic test application "([^"]+)" is running$"#)]
async fn generic_app_is_running(world: &mut AppWorld, name: String) {
    let cluster = world.cluster().await;
    let app = GenericTestApp::new(cluster, name);

    if !app
        .is_running()
        .await
        .expect("Failed to query application state")
    {
        info!(name = app.name(), "application is not running, installing it");
        app.install().await.expect("Failed to install application");
    }

    world.application = Some(Box::new(app));
}

#[when(regex = r#"^The application env var "([^"]+)" has value "([^"]*)"$"#)]
#[then(regex = r#"^The application env var "([^"]+)" has value "([^"]*)"$"#)]
async fn env_var_has_value(world: &mut AppWorld, name: String, value: String) {
    let cluster = world.cluster().await;

    let app = world
        .application
        .as_ref()
        .expect("No application is running in this scenario");

    let route_url = app
        .route_url()
        .await
        .expect("Failed to resolve application route");

    let probe = EnvVarProbe::new(route_url, cluster.http_client().clone());

    let found = probe
        .verify(&name, &value)
        .await
        .expect("Env endpoint never gave a terminal answer");

    assert!(found, "Env var {name:?} should contain value {value:?}");
}
