//! The one identity a test run authenticates with.
use crate::api_client::{ApiClient, ApiError};
use crate::configuration::SessionUserSettings;
use crate::context::RunInfo;
use crate::domain::{IdentityError, TestIdentity};
use crate::fixtures::generate_user_fixture;
use crate::telemetry::error_chain_fmt;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    NeedsCreation,
    /// A provisioning attempt is in flight, or was cancelled before it finished.
    Creating,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    AlreadyExists,
}

impl std::fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationOutcome::Created => f.write_str("created"),
            RegistrationOutcome::AlreadyExists => f.write_str("already exists"),
        }
    }
}

/// Failing to provision the session user must abort the run.
#[derive(thiserror::Error)]
pub enum ProvisioningError {
    #[error("Registering the session user was rejected with status {status}: {message}")]
    RegistrationRejected { status: u16, message: String },
    #[error("The session user exists but logging in with it answered {status}")]
    VerificationFailed { status: u16 },
    #[error("The session user logged in but no session cookie was set")]
    MissingSession,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl std::fmt::Debug for ProvisioningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug)]
pub struct SessionUser {
    identity: TestIdentity,
    state: Mutex<ProvisioningState>,
    reprovisioned: AtomicBool,
}

impl SessionUser {
    pub fn new(identity: TestIdentity) -> Self {
        Self {
            identity,
            state: Mutex::new(ProvisioningState::NeedsCreation),
            reprovisioned: AtomicBool::new(false),
        }
    }

    /// Fixed credentials from configuration when present, a freshly generated identity otherwise.
    pub fn from_settings(
        settings: &SessionUserSettings,
        run: &RunInfo,
    ) -> Result<Self, IdentityError> {
        let identity = match (&settings.email, &settings.password) {
            (Some(email), Some(password)) => {
                TestIdentity::from_credentials(email.clone(), password.clone())?
            }
            _ => generate_user_fixture(run, &settings.email_domain),
        };
        Ok(Self::new(identity))
    }

    /// Same object for the lifetime of the run.
    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub async fn state(&self) -> ProvisioningState {
        *self.state.lock().await
    }

    /// Register the identity once and prove it can log in.
    ///
    /// Concurrent callers wait for the attempt in flight instead of registering again.
    #[tracing::instrument(
        name = "Provisioning session user",
        skip_all,
        fields(email = %self.identity.email)
    )]
    pub async fn ensure_provisioned(&self, api: &ApiClient) -> Result<(), ProvisioningError> {
        let mut state = self.state.lock().await;
        match *state {
            ProvisioningState::Ready => return Ok(()),
            ProvisioningState::Creating => {
                tracing::warn!("Previous provisioning attempt did not finish, starting over");
            }
            ProvisioningState::NeedsCreation => {}
        }
        *state = ProvisioningState::Creating;

        match self.provision(api).await {
            Ok(()) => {
                *state = ProvisioningState::Ready;
                tracing::info!("Session user is ready");
                Ok(())
            }
            Err(e) => {
                *state = ProvisioningState::NeedsCreation;
                tracing::error!(error = %e, "Session user could not be provisioned");
                Err(e)
            }
        }
    }

    async fn provision(&self, api: &ApiClient) -> Result<(), ProvisioningError> {
        let outcome = self.register(api).await?;
        tracing::debug!(%outcome, "Registration finished, verifying login");
        let login = api.login(&self.identity.credentials()).await?;
        if login.response.status != StatusCode::OK {
            return Err(ProvisioningError::VerificationFailed {
                status: login.status_code(),
            });
        }
        if login.session.is_none() {
            return Err(ProvisioningError::MissingSession);
        }
        Ok(())
    }

    /// One registration call. A 409 means this identity was created earlier in the run.
    pub async fn register(
        &self,
        api: &ApiClient,
    ) -> Result<RegistrationOutcome, ProvisioningError> {
        let response = api.register(&self.identity.registration_body()).await?;
        match response.status {
            StatusCode::OK | StatusCode::CREATED => Ok(RegistrationOutcome::Created),
            StatusCode::CONFLICT => Ok(RegistrationOutcome::AlreadyExists),
            status => Err(ProvisioningError::RegistrationRejected {
                status: status.as_u16(),
                message: response
                    .error_message()
                    .unwrap_or("no error message")
                    .to_string(),
            }),
        }
    }

    /// Claim the single reprovision allowed per run. Only the first caller gets `true`.
    pub fn claim_reprovision(&self) -> bool {
        !self.reprovisioned.swap(true, Ordering::SeqCst)
    }
}
