use super::{fresh_identity, register_and_login};
use anyhow::{Context, ensure};
use nutriapp_e2e::context::TestContext;
use nutriapp_e2e::domain::Credentials;
use serde_json::json;

pub async fn register_returns_the_created_user(ctx: &TestContext) -> anyhow::Result<()> {
    // Arrange
    let identity = fresh_identity(ctx);

    // Act
    let response = ctx.api.register(&identity.registration_body()).await?;

    // Assert
    ensure!(response.status.is_success(), "registration answered {}", response.status);
    let user = response.user().context("registration did not return a user")?;
    ensure!(user.email == identity.email);
    ensure!(user.first_name == identity.first_name);
    ensure!(user.last_name == identity.last_name);
    ensure!(user.nationality == identity.nationality);
    ensure!(user.phone == identity.phone);
    Ok(())
}

pub async fn register_rejects_missing_fields(ctx: &TestContext) -> anyhow::Result<()> {
    let test_cases = vec![
        (json!({ "email": "only-email@nutriapp.com" }), "only an email"),
        (json!({ "firstName": "Ana", "lastName": "Lopez" }), "only names"),
        (json!({}), "an empty body"),
    ];

    for (body, description) in test_cases {
        let response = ctx.api.register(&body).await?;

        ensure!(
            response.status_code() == 400,
            "The API did not reject a registration with {}, it answered {}.",
            description,
            response.status
        );
        ensure!(
            response
                .error_message()
                .is_some_and(|message| message.contains("Missing fields")),
            "unexpected error message {:?}",
            response.error_message()
        );
    }
    Ok(())
}

pub async fn register_rejects_an_empty_first_name(ctx: &TestContext) -> anyhow::Result<()> {
    let mut identity = fresh_identity(ctx);
    identity.first_name = String::new();

    let response = ctx.api.register(&identity.registration_body()).await?;

    ensure!(response.status_code() == 400, "empty first name answered {}", response.status);
    Ok(())
}

/// The backend does not validate email formats yet, it only must not break.
pub async fn register_survives_an_invalid_email_format(ctx: &TestContext) -> anyhow::Result<()> {
    let mut identity = fresh_identity(ctx);
    identity.email = "invalid-email-format".into();

    let response = ctx.api.register(&identity.registration_body()).await?;

    ensure!(
        response.status.is_success() || [400, 409].contains(&response.status_code()),
        "invalid email answered {}",
        response.status
    );
    Ok(())
}

pub async fn register_survives_a_short_password(ctx: &TestContext) -> anyhow::Result<()> {
    let mut identity = fresh_identity(ctx);
    identity.password = secrecy::Secret::new("123".into());

    let response = ctx.api.register(&identity.registration_body()).await?;

    ensure!(
        response.status.is_success() || response.status_code() == 400,
        "short password answered {}",
        response.status
    );
    Ok(())
}

pub async fn malicious_registration_input_is_handled_safely(
    ctx: &TestContext,
) -> anyhow::Result<()> {
    let mut identity = fresh_identity(ctx);
    identity.first_name = r#"<script>alert("xss")</script>"#.into();
    identity.last_name = r#""><script>alert("xss")</script>"#.into();
    identity.nationality = r#"Country"; DROP TABLE users; --"#.into();

    let response = ctx.api.register(&identity.registration_body()).await?;

    ensure!(
        response.status.is_success() || response.status_code() == 400,
        "malicious registration answered {}",
        response.status
    );
    // The backend must still accept ordinary traffic afterwards.
    register_and_login(ctx).await?;
    Ok(())
}

pub async fn duplicate_registration_is_rejected(ctx: &TestContext) -> anyhow::Result<()> {
    let identity = fresh_identity(ctx);

    let first = ctx.api.register(&identity.registration_body()).await?;
    let second = ctx.api.register(&identity.registration_body()).await?;

    ensure!(first.status.is_success(), "first registration answered {}", first.status);
    ensure!(second.status_code() == 409, "second registration answered {}", second.status);
    ensure!(
        second
            .error_message()
            .is_some_and(|message| message.contains("ya está registrado")),
        "unexpected duplicate message {:?}",
        second.error_message()
    );
    Ok(())
}

pub async fn login_returns_user_and_session_cookie(ctx: &TestContext) -> anyhow::Result<()> {
    let identity = fresh_identity(ctx);
    ctx.api.register(&identity.registration_body()).await?;

    let outcome = ctx.api.login(&identity.credentials()).await?;

    ensure!(outcome.status_code() == 200, "login answered {}", outcome.status_code());
    ensure!(outcome.session.is_some(), "login did not set a session cookie");
    let user = outcome.user.context("login did not return the user")?;
    ensure!(user.email == identity.email);
    Ok(())
}

pub async fn login_with_unknown_credentials_returns_401(ctx: &TestContext) -> anyhow::Result<()> {
    let outcome = ctx
        .api
        .login(&Credentials {
            email: "nonexistent@example.com",
            password: "wrongpassword",
        })
        .await?;

    ensure!(outcome.status_code() == 401, "login answered {}", outcome.status_code());
    ensure!(
        outcome
            .response
            .error_message()
            .is_some_and(|message| message.contains("Invalid credentials")),
        "unexpected error message {:?}",
        outcome.response.error_message()
    );
    ensure!(outcome.session.is_none(), "a failed login set a session cookie");
    Ok(())
}

pub async fn login_with_wrong_password_returns_401(ctx: &TestContext) -> anyhow::Result<()> {
    let registered = register_and_login(ctx).await?;

    let outcome = ctx
        .api
        .login(&Credentials {
            email: &registered.identity.email,
            password: "definitely-not-it",
        })
        .await?;

    ensure!(outcome.status_code() == 401, "login answered {}", outcome.status_code());
    ensure!(outcome.session.is_none(), "a failed login set a session cookie");
    Ok(())
}

pub async fn login_with_missing_credentials_returns_400(ctx: &TestContext) -> anyhow::Result<()> {
    let test_cases = vec![
        (
            Credentials {
                email: "",
                password: "somepassword",
            },
            "an empty email",
        ),
        (
            Credentials {
                email: "test@example.com",
                password: "",
            },
            "an empty password",
        ),
        (
            Credentials {
                email: "",
                password: "",
            },
            "both fields empty",
        ),
    ];

    for (credentials, description) in test_cases {
        let outcome = ctx.api.login(&credentials).await?;

        ensure!(
            outcome.status_code() == 400,
            "The API did not reject a login with {}, it answered {}.",
            description,
            outcome.status_code()
        );
        ensure!(
            outcome
                .response
                .error_message()
                .is_some_and(|message| message.contains("Missing fields")),
            "unexpected error message {:?}",
            outcome.response.error_message()
        );
    }
    Ok(())
}

pub async fn injection_attempts_in_login_are_rejected(ctx: &TestContext) -> anyhow::Result<()> {
    let malicious_emails = [
        "test@example.com' OR '1'='1",
        "admin@example.com' UNION SELECT * FROM users --",
    ];

    for email in malicious_emails {
        let outcome = ctx
            .api
            .login(&Credentials {
                email,
                password: "anypassword",
            })
            .await?;

        ensure!(
            [400, 401].contains(&outcome.status_code()),
            "{email} answered {}",
            outcome.status_code()
        );
        ensure!(outcome.session.is_none(), "{email} opened a session");
    }
    Ok(())
}

pub async fn full_authentication_cycle(ctx: &TestContext) -> anyhow::Result<()> {
    let identity = fresh_identity(ctx);

    let registered = ctx
        .api
        .register(&identity.registration_body())
        .await?
        .user()
        .context("registration did not return a user")?;
    let login = ctx.api.login(&identity.credentials()).await?;
    let session = login.session.context("login did not set a session cookie")?;
    let logged_in = login.user.context("login did not return the user")?;
    let dishes = ctx.api.list_dishes(Some(&session)).await?;

    ensure!(logged_in.id == registered.id);
    ensure!(logged_in.email == registered.email);
    ensure!(dishes.status_code() != 401, "the new session was refused");
    Ok(())
}

pub async fn session_stays_valid_across_requests(ctx: &TestContext) -> anyhow::Result<()> {
    let registered = register_and_login(ctx).await?;

    let first = ctx.api.list_dishes(Some(&registered.session)).await?;
    let second = ctx.api.list_dishes(Some(&registered.session)).await?;
    let root = ctx.api.get_root(Some(&registered.session)).await?;

    ensure!(first.status_code() == 200, "first listing answered {}", first.status_code());
    ensure!(second.status_code() == 200, "second listing answered {}", second.status_code());
    ensure!(root.status_code() != 401, "the home page refused the session");
    Ok(())
}

pub async fn dishes_require_a_session(ctx: &TestContext) -> anyhow::Result<()> {
    let response = ctx.api.list_dishes(None).await?;

    ensure!(response.status_code() == 401, "listing answered {}", response.status_code());
    ensure!(response.dishes.is_empty());
    Ok(())
}
