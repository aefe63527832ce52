use secrecy::Secret;
use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};
use std::path::Path;
use std::time::Duration;

/// Legacy override for the application base URL, still exported by the CI pipeline.
pub const BASE_URL_OVERRIDE_VAR: &str = "CYPRESS_baseUrl";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub timeouts: TimeoutSettings,
    pub browser: BrowserSettings,
    pub session_user: SessionUserSettings,
    /// How many times a failed test case is re-executed before it counts as failed.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retries: u32,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub base_url: String,
}

impl ApplicationSettings {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct TimeoutSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub default_command_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub response_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub health_check_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub reprovision_delay_ms: u64,
}

impl TimeoutSettings {
    pub fn default_command(&self) -> Duration {
        Duration::from_millis(self.default_command_ms)
    }

    /// Upper bound for a whole API round trip: connecting, sending and reading the response.
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms.max(self.response_ms))
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn health_check(&self) -> Duration {
        Duration::from_millis(self.health_check_ms)
    }

    pub fn reprovision_delay(&self) -> Duration {
        Duration::from_millis(self.reprovision_delay_ms)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_height: u32,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub screenshot_on_failure: bool,
    pub screenshots_folder: String,
    #[serde(default)]
    pub launch_args: Vec<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct SessionUserSettings {
    pub email_domain: String,
    /// Fixed credentials. When both are set they replace the generated per-run identity.
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
}

/// The possible runtime environments for the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Ci,
    Staging,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Ci => "ci",
            Environment::Staging => "staging",
        }
    }

    /// `APP_ENVIRONMENT` wins; otherwise a truthy `CI` selects `ci`, anything else `local`.
    pub fn detect<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(explicit) = lookup("APP_ENVIRONMENT") {
            return explicit.try_into();
        }
        if lookup("CI").is_some_and(|v| is_truthy(&v)) {
            Ok(Environment::Ci)
        } else {
            Ok(Environment::Local)
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ci" => Ok(Self::Ci),
            "staging" => Ok(Self::Staging),
            other => Err(format!(
                "{} is not a supported environment. Use either `local`, `ci` or `staging`.",
                other
            )),
        }
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let environment =
        Environment::detect(|key| std::env::var(key).ok()).map_err(config::ConfigError::Message)?;
    load_configuration(
        &base_path.join("configuration"),
        environment,
        std::env::var(BASE_URL_OVERRIDE_VAR).ok(),
    )
}

/// Layer `base.yaml`, the environment file, `APP_*` variables and the base URL override.
pub fn load_configuration(
    configuration_directory: &Path,
    environment: Environment,
    base_url_override: Option<String>,
) -> Result<Settings, config::ConfigError> {
    let environment_filename = format!("{}.yaml", environment.as_str());
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g. `APP_TIMEOUTS__REQUEST_MS=30000` would set `Settings.timeouts.request_ms`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option(
            "application.base_url",
            base_url_override.filter(|url| !url.trim().is_empty()),
        )?
        .build()?;
    settings.try_deserialize::<Settings>()
}
