//! Layered login: fast API login, one reprovision per run, UI login as last resort.
//!
//! ```text
//! AttemptApiLogin --ok--> Authenticated(Api)
//! AttemptApiLogin --fail--> Reprovision        (reprovision still available this run)
//! AttemptApiLogin --fail--> UiLoginFallback    (reprovision already used)
//! Reprovision --registered--> RetryApiLogin    (after the reprovision delay)
//! Reprovision --error--> UiLoginFallback
//! RetryApiLogin --ok--> Authenticated(ApiAfterReprovision)
//! RetryApiLogin --fail--> UiLoginFallback
//! UiLoginFallback --ok--> Authenticated(Ui)
//! UiLoginFallback --fail--> Failed
//! ```
use crate::api_client::ApiClient;
use crate::domain::SessionCredential;
use crate::session_user::SessionUser;
use crate::ui::UiError;
use secrecy::Secret;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPath {
    Api,
    ApiAfterReprovision,
    Ui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AttemptApiLogin,
    Reprovision,
    RetryApiLogin,
    UiLoginFallback,
    Authenticated(AuthPath),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: AuthState,
    pub to: AuthState,
    pub cause: String,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -> {:?} ({})", self.from, self.to, self.cause)
    }
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub credential: SessionCredential,
    pub path: AuthPath,
    pub trail: Vec<Transition>,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed after every fallback: {}", render_trail(.trail))]
    Exhausted { trail: Vec<Transition> },
}

fn render_trail(trail: &[Transition]) -> String {
    trail
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Browser-driven login, used only when the API paths are exhausted.
#[async_trait::async_trait]
pub trait UiLogin: Send + Sync {
    /// Fill and submit the login form. `Ok(None)` means the form went through
    /// but no session cookie ended up in the browser.
    async fn login_via_form(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<Option<SessionCredential>, UiError>;
}

enum Step {
    Move(AuthState, String),
    Done(AuthPath, SessionCredential, String),
    Fail(String),
}

pub struct Authenticator<'a> {
    api: &'a ApiClient,
    session_user: &'a SessionUser,
    reprovision_delay: Duration,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        api: &'a ApiClient,
        session_user: &'a SessionUser,
        reprovision_delay: Duration,
    ) -> Self {
        Self {
            api,
            session_user,
            reprovision_delay,
        }
    }

    #[tracing::instrument(
        name = "Authenticating session user",
        skip_all,
        fields(email = %self.session_user.identity().email, path = tracing::field::Empty)
    )]
    pub async fn authenticate(&self, ui: Option<&dyn UiLogin>) -> Result<Authenticated, AuthError> {
        let mut trail = Vec::new();
        let mut state = AuthState::AttemptApiLogin;
        loop {
            let step = self.step(state, ui).await;
            let (to, cause) = match &step {
                Step::Move(to, cause) => (*to, cause.clone()),
                Step::Done(path, _, cause) => (AuthState::Authenticated(*path), cause.clone()),
                Step::Fail(cause) => (AuthState::Failed, cause.clone()),
            };
            match to {
                AuthState::Failed => {
                    tracing::error!(from = ?state, to = ?to, %cause, "Authentication transition")
                }
                AuthState::Authenticated(_) => {
                    tracing::info!(from = ?state, to = ?to, %cause, "Authentication transition")
                }
                _ => tracing::warn!(from = ?state, to = ?to, %cause, "Authentication transition"),
            }
            trail.push(Transition {
                from: state,
                to,
                cause,
            });

            match step {
                Step::Move(next, _) => state = next,
                Step::Done(path, credential, _) => {
                    tracing::Span::current().record("path", tracing::field::debug(&path));
                    return Ok(Authenticated {
                        credential,
                        path,
                        trail,
                    });
                }
                Step::Fail(_) => return Err(AuthError::Exhausted { trail }),
            }
        }
    }

    async fn step(&self, state: AuthState, ui: Option<&dyn UiLogin>) -> Step {
        match state {
            AuthState::AttemptApiLogin => match self.api_login().await {
                Ok(credential) => {
                    Step::Done(AuthPath::Api, credential, "API login succeeded".into())
                }
                Err(reason) if self.session_user.claim_reprovision() => {
                    Step::Move(AuthState::Reprovision, reason)
                }
                Err(reason) => Step::Move(
                    AuthState::UiLoginFallback,
                    format!("{reason}; reprovision already used this run"),
                ),
            },
            AuthState::Reprovision => match self.session_user.register(self.api).await {
                Ok(outcome) => {
                    tokio::time::sleep(self.reprovision_delay).await;
                    Step::Move(
                        AuthState::RetryApiLogin,
                        format!("session user {outcome}"),
                    )
                }
                Err(e) => Step::Move(
                    AuthState::UiLoginFallback,
                    format!("reprovisioning failed: {e}"),
                ),
            },
            AuthState::RetryApiLogin => match self.api_login().await {
                Ok(credential) => Step::Done(
                    AuthPath::ApiAfterReprovision,
                    credential,
                    "API login succeeded after reprovisioning".into(),
                ),
                Err(reason) => Step::Move(AuthState::UiLoginFallback, reason),
            },
            AuthState::UiLoginFallback => {
                let Some(ui) = ui else {
                    return Step::Fail("no browser session available for a UI login".into());
                };
                let identity = self.session_user.identity();
                match ui.login_via_form(&identity.email, &identity.password).await {
                    Ok(Some(credential)) => {
                        Step::Done(AuthPath::Ui, credential, "UI login succeeded".into())
                    }
                    Ok(None) => Step::Fail("UI login left no session cookie".into()),
                    Err(e) => Step::Fail(format!("UI login failed: {e}")),
                }
            }
            AuthState::Authenticated(_) | AuthState::Failed => {
                Step::Fail(format!("{state:?} is terminal"))
            }
        }
    }

    async fn api_login(&self) -> Result<SessionCredential, String> {
        let identity = self.session_user.identity();
        let outcome = self
            .api
            .login(&identity.credentials())
            .await
            .map_err(|e| format!("API login request failed: {e}"))?;
        match (outcome.status_code(), outcome.session) {
            (200, Some(credential)) => Ok(credential),
            (200, None) => Err("API login answered 200 without a session cookie".into()),
            (status, _) => Err(format!("API login answered {status}")),
        }
    }
}
