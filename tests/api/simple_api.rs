use crate::common::spawn_app;
use nutriapp_e2e::domain::{Credentials, TestIdentity};
use nutriapp_e2e::fixtures::generate_dish_fixture;
use std::time::Duration;

#[tokio::test]
async fn root_endpoint_is_reachable() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.ctx.api.get_root(None).await.unwrap();

    // Assert
    assert_eq!(app.ctx.api.base_url(), app.address);
    assert!([200, 404].contains(&response.status_code()));
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = spawn_app().await;

    let health = app.ctx.api.check_health(Duration::from_secs(5)).await;

    assert!(health.healthy);
    assert_eq!(health.status, Some(200));
    assert_eq!(health.error, None);
}

#[tokio::test]
async fn health_check_reports_an_unreachable_backend() {
    let app = spawn_app().await;
    let api = nutriapp_e2e::api_client::ApiClient::new(
        "http://127.0.0.1:9".into(),
        app.ctx.settings.timeouts.request(),
    )
    .unwrap();

    let health = api.check_health(Duration::from_millis(500)).await;

    assert!(!health.healthy);
    assert_eq!(health.status, None);
    assert!(health.error.is_some());
}

#[tokio::test]
async fn generated_user_data_is_complete() {
    let app = spawn_app().await;

    let TestIdentity {
        first_name,
        last_name,
        email,
        nationality,
        phone,
        ..
    } = app.fresh_identity();

    assert!(!first_name.is_empty());
    assert!(!last_name.is_empty());
    assert!(!nationality.is_empty());
    assert_eq!(phone.len(), 10);
    assert!(email.ends_with("@nutriapp.com"));
}

#[test]
fn generated_dish_data_is_complete() {
    let dish = generate_dish_fixture();

    assert!(!dish.name.is_empty());
    assert!(!dish.description.is_empty());
    assert!(dish.prep_time.is_some());
    assert!(dish.cook_time.is_some());
    assert_eq!(dish.steps.len(), 3);
}

#[tokio::test]
async fn registration_endpoint_accepts_generated_users() {
    let app = spawn_app().await;
    let identity = app.fresh_identity();

    let response = app
        .ctx
        .api
        .register(&identity.registration_body())
        .await
        .unwrap();

    assert!(response.status.is_success());
    assert_eq!(response.user().unwrap().email, identity.email);
}

#[tokio::test]
async fn login_with_unknown_credentials_fails() {
    let app = spawn_app().await;

    let outcome = app
        .ctx
        .api
        .login(&Credentials {
            email: "nobody@nutriapp.com",
            password: "not-a-password",
        })
        .await
        .unwrap();

    assert!([400, 401].contains(&outcome.status_code()));
    assert!(outcome.session.is_none());
}
