use regex::Regex;
use reqwest::header::{HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, Secret};
use std::sync::LazyLock;

static SESSION_COOKIE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[;,\s])session=([^;,\s]+)").expect("session cookie pattern is valid")
});

/// The `session` cookie handed out by `POST /api/login`.
///
/// Owned by a single test case and replayed explicitly on every authorized call.
#[derive(Debug, Clone)]
pub struct SessionCredential(Secret<String>);

impl SessionCredential {
    pub const COOKIE_NAME: &'static str = "session";

    pub fn new(value: String) -> Self {
        Self(Secret::new(value))
    }

    /// Scan every `Set-Cookie` header for `session=<value>`.
    ///
    /// Returns `None` when no header carries a non-empty session value.
    pub fn from_set_cookie(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| {
                SESSION_COOKIE
                    .captures(value)
                    .and_then(|captures| captures.get(1))
                    .map(|m| Self::new(m.as_str().to_owned()))
            })
    }

    pub fn value(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for a `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("{}={}", Self::COOKIE_NAME, self.value())
    }
}
