use crate::support::{block_on, context};
use nutriapp_e2e::session_user::ProvisioningState;

#[test]
fn deployment_is_healthy() {
    block_on(async {
        let ctx = context().await;

        let health = ctx
            .api
            .check_health(ctx.settings.timeouts.health_check())
            .await;

        assert!(health.healthy, "Health check failed: {:?}", health);
    })
}

#[test]
fn session_user_is_ready_for_the_run() {
    block_on(async {
        let ctx = context().await;

        assert_eq!(ctx.session_user.state().await, ProvisioningState::Ready);
        let login = ctx
            .api
            .login(&ctx.session_user.identity().credentials())
            .await
            .unwrap();
        assert_eq!(login.status_code(), 200);
        assert!(login.session.is_some());
    })
}
