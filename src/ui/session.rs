use crate::configuration::Settings;
use crate::context::RunInfo;
use crate::domain::SessionCredential;
use crate::fixtures::monotonic_millis;
use crate::ui::exceptions;
use std::path::PathBuf;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum UiError {
    #[error("WebDriver command failed")]
    WebDriver(#[from] WebDriverError),
    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
    #[error("The page raised unexpected errors: {}", .0.join(" | "))]
    UnexpectedPageErrors(Vec<String>),
    #[error("Failed to store a screenshot")]
    Screenshot(#[source] std::io::Error),
    #[error("{0} is not a known viewport preset")]
    UnknownViewport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const IPHONE_X: Viewport = Viewport {
        width: 375,
        height: 812,
    };
    pub const IPAD_2: Viewport = Viewport {
        width: 768,
        height: 1024,
    };

    pub fn preset(name: &str) -> Result<Self, UiError> {
        match name {
            "iphone-x" => Ok(Self::IPHONE_X),
            "ipad-2" => Ok(Self::IPAD_2),
            other => Err(UiError::UnknownViewport(other.to_string())),
        }
    }
}

/// One browser window pointed at the application under test.
pub struct UiSession {
    driver: WebDriver,
    base_url: String,
    timeout: Duration,
    default_viewport: Viewport,
    screenshots: Option<PathBuf>,
}

impl UiSession {
    #[tracing::instrument(
        name = "Connecting to WebDriver",
        skip_all,
        fields(webdriver_url = %settings.browser.webdriver_url)
    )]
    pub async fn connect(settings: &Settings, run: &RunInfo) -> Result<Self, UiError> {
        let browser = &settings.browser;
        let mut caps = DesiredCapabilities::chrome();
        if browser.headless {
            caps.set_headless()?;
        }
        for arg in &browser.launch_args {
            caps.add_arg(arg)?;
        }
        if run.github_actions {
            caps.add_arg("--disable-web-security")?;
        }

        let driver = WebDriver::new(browser.webdriver_url.as_str(), caps).await?;
        driver
            .set_page_load_timeout(settings.timeouts.page_load())
            .await?;

        let session = Self {
            driver,
            base_url: settings.application.base_url().trim_end_matches('/').to_string(),
            timeout: settings.timeouts.default_command(),
            default_viewport: Viewport {
                width: browser.viewport_width,
                height: browser.viewport_height,
            },
            screenshots: browser
                .screenshot_on_failure
                .then(|| PathBuf::from(&browser.screenshots_folder)),
        };
        session.set_viewport(session.default_viewport).await?;
        Ok(session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Navigate to a path of the application and arm the page error hook.
    #[tracing::instrument(name = "Visiting page", skip(self))]
    pub async fn visit(&self, path: &str) -> Result<(), UiError> {
        self.driver
            .goto(format!("{}{}", self.base_url, path))
            .await?;
        self.driver
            .execute(exceptions::INSTALL_ERROR_HOOK, Vec::new())
            .await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, UiError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    /// First displayed element matching the CSS selector.
    pub async fn find(&self, selector: &str) -> Result<WebElement, UiError> {
        Ok(self
            .driver
            .query(By::Css(selector))
            .wait(self.timeout, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await?)
    }

    pub async fn find_all(&self, selector: &str) -> Result<Vec<WebElement>, UiError> {
        Ok(self.driver.find_all(By::Css(selector)).await?)
    }

    pub async fn type_into(&self, selector: &str, text: &str) -> Result<(), UiError> {
        self.find(selector).await?.send_keys(text).await?;
        Ok(())
    }

    pub async fn clear_and_type(&self, selector: &str, text: &str) -> Result<(), UiError> {
        let element = self.find(selector).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    pub async fn click(&self, selector: &str) -> Result<(), UiError> {
        self.find(selector).await?.click().await?;
        Ok(())
    }

    /// Tick or untick a checkbox. A box already in the wanted state is left alone.
    pub async fn set_checked(&self, selector: &str, checked: bool) -> Result<(), UiError> {
        let checkbox = self.find(selector).await?;
        if checkbox.is_selected().await? != checked {
            checkbox.click().await?;
        }
        Ok(())
    }

    pub async fn is_checked(&self, selector: &str) -> Result<bool, UiError> {
        Ok(self.find(selector).await?.is_selected().await?)
    }

    pub async fn value_of(&self, selector: &str) -> Result<String, UiError> {
        Ok(self.find(selector).await?.value().await?.unwrap_or_default())
    }

    pub async fn text_of(&self, selector: &str) -> Result<String, UiError> {
        Ok(self.find(selector).await?.text().await?)
    }

    /// Whether a matching element is displayed right now, without waiting.
    pub async fn is_visible(&self, selector: &str) -> Result<bool, UiError> {
        for element in self.find_all(selector).await? {
            if element.is_displayed().await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn count(&self, selector: &str) -> Result<usize, UiError> {
        Ok(self.find_all(selector).await?.len())
    }

    pub async fn wait_for_url(&self, fragment: &str) -> Result<String, UiError> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let url = self.current_url().await?;
            if url.contains(fragment) {
                return Ok(url);
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(%url, %fragment, "URL did not change in time");
                return Err(UiError::Timeout {
                    what: format!("the URL to contain {fragment}"),
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_for_xpath(&self, xpath: &str) -> Result<WebElement, UiError> {
        Ok(self
            .driver
            .query(By::XPath(xpath))
            .wait(self.timeout, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await?)
    }

    /// Wait until some displayed element contains `text`.
    pub async fn wait_for_text(&self, text: &str) -> Result<WebElement, UiError> {
        Ok(self
            .driver
            .query(By::XPath(contains_text_xpath(text)))
            .wait(self.timeout, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await?)
    }

    pub async fn wait_for_text_absent(&self, text: &str) -> Result<(), UiError> {
        self.driver
            .query(By::XPath(contains_text_xpath(text)))
            .wait(self.timeout, POLL_INTERVAL)
            .not_exists()
            .await?;
        Ok(())
    }

    pub async fn set_viewport(&self, viewport: Viewport) -> Result<(), UiError> {
        self.driver
            .set_window_rect(0, 0, viewport.width.into(), viewport.height.into())
            .await?;
        Ok(())
    }

    pub async fn set_viewport_preset(&self, name: &str) -> Result<(), UiError> {
        self.set_viewport(Viewport::preset(name)?).await
    }

    pub async fn restore_viewport(&self) -> Result<(), UiError> {
        self.set_viewport(self.default_viewport).await
    }

    /// Drop cookies and web storage so the next test starts logged out.
    pub async fn reset_session(&self) -> Result<(), UiError> {
        self.driver.delete_all_cookies().await?;
        if let Err(e) = self
            .driver
            .execute(
                "window.localStorage.clear(); window.sessionStorage.clear();",
                Vec::new(),
            )
            .await
        {
            // No document loaded yet
            tracing::debug!(error = %e, "Web storage could not be cleared");
        }
        Ok(())
    }

    pub async fn session_cookie(&self) -> Result<Option<SessionCredential>, UiError> {
        let cookies = self.driver.get_all_cookies().await?;
        Ok(cookies
            .into_iter()
            .find(|cookie| {
                cookie.name == SessionCredential::COOKIE_NAME && !cookie.value.is_empty()
            })
            .map(|cookie| SessionCredential::new(cookie.value)))
    }

    /// Hand an API-obtained session to the browser. Cookies can only be set on
    /// the current origin, so the application root is loaded first.
    pub async fn inject_session(&self, credential: &SessionCredential) -> Result<(), UiError> {
        self.visit("/").await?;
        let cookie = Cookie::new(SessionCredential::COOKIE_NAME, credential.value().to_string());
        self.driver.add_cookie(cookie).await?;
        Ok(())
    }

    /// Drain the page error hook and keep what the allow-list does not cover.
    pub async fn take_unexpected_errors(&self) -> Result<Vec<String>, UiError> {
        let ret = self.driver.execute(exceptions::DRAIN_ERROR_HOOK, Vec::new()).await?;
        let messages: Vec<String> = serde_json::from_value(ret.json().clone()).unwrap_or_default();
        Ok(exceptions::unexpected(messages))
    }

    pub async fn assert_no_page_errors(&self) -> Result<(), UiError> {
        let errors = self.take_unexpected_errors().await?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(UiError::UnexpectedPageErrors(errors))
        }
    }

    /// Save a screenshot named after the failing test, when enabled.
    #[tracing::instrument(name = "Capturing failure screenshot", skip(self))]
    pub async fn capture_failure(&self, test_name: &str) -> Result<Option<PathBuf>, UiError> {
        let Some(folder) = &self.screenshots else {
            return Ok(None);
        };
        std::fs::create_dir_all(folder).map_err(UiError::Screenshot)?;
        let path = folder.join(screenshot_file_name(test_name, monotonic_millis()));
        self.driver.screenshot(&path).await?;
        tracing::info!(path = %path.display(), "Screenshot stored");
        Ok(Some(path))
    }

    pub async fn quit(self) -> Result<(), UiError> {
        self.driver.quit().await?;
        Ok(())
    }
}

fn screenshot_file_name(test_name: &str, stamp: i64) -> String {
    let slug: String = test_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}.png", slug.trim_matches('-'), stamp)
}

/// Elements with a text node containing `text`.
fn contains_text_xpath(text: &str) -> String {
    format!("//body//*[text()[contains(., {})]]", xpath_literal(text))
}

/// Quote `text` as an XPath 1.0 string literal.
pub(crate) fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        format!("\"{text}\"")
    } else if !text.contains('\'') {
        format!("'{text}'")
    } else {
        let parts: Vec<String> = text.split('"').map(|part| format!("\"{part}\"")).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
