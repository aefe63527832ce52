use crate::api_client::ApiClient;
use crate::authentication::Authenticator;
use crate::cleanup::cleanup_test_data;
use crate::configuration::{Environment, Settings, is_truthy};
use crate::session_user::SessionUser;
use tokio::sync::OnceCell;

/// Facts about the current test run, read once from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub environment: Environment,
    pub is_ci: bool,
    pub github_actions: bool,
    pub run_id: Option<String>,
    pub node_env: String,
}

impl RunInfo {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::detect(&lookup)?;
        let flag = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));
        let github_actions = flag("GITHUB_ACTIONS");
        let run_id = lookup("GITHUB_RUN_ID")
            .filter(|id| !id.trim().is_empty())
            .or_else(|| github_actions.then(|| "unknown".to_string()));
        Ok(Self {
            environment,
            is_ci: flag("CI") || environment == Environment::Ci,
            github_actions,
            run_id,
            node_env: lookup("NODE_ENV").unwrap_or_else(|| "test".into()),
        })
    }

    /// Tag embedded into generated identities: the CI run id, or `local`.
    pub fn run_tag(&self) -> String {
        if !self.is_ci {
            return "local".into();
        }
        let tag: String = self
            .run_id
            .as_deref()
            .unwrap_or("ci")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if tag.is_empty() { "ci".into() } else { tag }
    }
}

/// Everything a test case needs, built once per process and handed out by reference.
#[derive(Debug)]
pub struct TestContext {
    pub settings: Settings,
    pub run: RunInfo,
    pub api: ApiClient,
    pub session_user: SessionUser,
}

#[derive(thiserror::Error, Debug)]
pub enum ContextError {
    #[error("Failed to read configuration")]
    Configuration(#[from] config::ConfigError),
    #[error("Failed to inspect the run environment: {0}")]
    Environment(String),
    #[error("Failed to build the HTTP client")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    Identity(#[from] crate::domain::IdentityError),
}

impl TestContext {
    pub fn from_env() -> Result<Self, ContextError> {
        let settings = crate::configuration::get_configuration()?;
        let run = RunInfo::from_env().map_err(ContextError::Environment)?;
        Self::new(settings, run)
    }

    #[tracing::instrument(
        name = "Building test context",
        skip_all,
        fields(environment = %run.environment)
    )]
    pub fn new(settings: Settings, run: RunInfo) -> Result<Self, ContextError> {
        let api = ApiClient::from_settings(&settings)?;
        let session_user = SessionUser::from_settings(&settings.session_user, &run)?;
        tracing::info!(
            email = %session_user.identity().email,
            base_url = %settings.application.base_url(),
            "Session user for this run"
        );
        Ok(Self {
            settings,
            run,
            api,
            session_user,
        })
    }

    pub fn authenticator(&self) -> Authenticator<'_> {
        Authenticator::new(
            &self.api,
            &self.session_user,
            self.settings.timeouts.reprovision_delay(),
        )
    }
}

/// The context of a whole suite run, prepared by its first caller.
///
/// Preparing provisions the session user and removes test data left behind
/// by earlier runs. A failed preparation is kept: every later caller gets the
/// same error back at once, without another request to the application.
pub struct SharedContext {
    cell: OnceCell<Result<TestContext, anyhow::Error>>,
}

impl SharedContext {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    pub async fn get_or_prepare<B>(&self, build: B) -> Result<&TestContext, &anyhow::Error>
    where
        B: FnOnce() -> Result<TestContext, ContextError>,
    {
        self.cell.get_or_init(|| prepare(build)).await.as_ref()
    }
}

#[tracing::instrument(name = "Preparing the run", skip_all)]
async fn prepare<B>(build: B) -> Result<TestContext, anyhow::Error>
where
    B: FnOnce() -> Result<TestContext, ContextError>,
{
    let ctx = build()?;
    if let Err(e) = ctx.session_user.ensure_provisioned(&ctx.api).await {
        tracing::error!(error = ?e, "Provisioning failed, aborting the run");
        return Err(e.into());
    }
    if let Err(e) = cleanup_test_data(&ctx.api, &ctx.session_user).await {
        tracing::warn!(error = %e, "Initial cleanup failed");
    }
    Ok(ctx)
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new()
    }
}
