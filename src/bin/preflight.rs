//! Check that the deployment answers and that the session user can be provisioned.
//!
//! Prints one JSON line with the health check and the session user email.
use anyhow::Context;
use nutriapp_e2e::context::TestContext;
use nutriapp_e2e::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = std::env::var("LOGLEVEL").unwrap_or_else(|_| "info".into());
    let subscriber = get_subscriber("preflight".into(), level, std::io::stderr);
    init_subscriber(subscriber);

    let ctx = TestContext::from_env().context("Failed to build the test context")?;
    let health = ctx
        .api
        .check_health(ctx.settings.timeouts.health_check())
        .await;
    if !health.healthy {
        tracing::warn!(?health, "Application did not pass the health check");
    }

    ctx.session_user
        .ensure_provisioned(&ctx.api)
        .await
        .context("Failed to provision the session user")?;

    let report = serde_json::json!({
        "environment": ctx.run.environment.as_str(),
        "base_url": ctx.api.base_url(),
        "health": health,
        "session_user": ctx.session_user.identity().email,
    });
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
