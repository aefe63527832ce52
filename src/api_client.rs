use crate::configuration::Settings;
use crate::domain::{
    Credentials, Dish, DishUpdate, SessionCredential, User, normalize_dish_list,
};
use reqwest::header::{COOKIE, HeaderMap};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Thin wrapper over the NutriApp HTTP API.
///
/// Non-2xx statuses are returned as data: negative paths are asserted on, not raised.
/// Only transport failures surface as `Err`. A body that does not match the expected
/// shape is kept raw next to whatever could be parsed from it.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Request to the application failed")]
    Transport(#[from] reqwest::Error),
}

/// Raw outcome of one API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::String` for non-JSON bodies, `Value::Null` when empty.
    pub body: Value,
}

impl ApiResponse {
    async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The `error` message of a failure body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Deserialize one top-level field of the body, e.g. `user` or `dish`.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.get(key).cloned().unwrap_or(Value::Null))
    }

    pub fn user(&self) -> Result<User, serde_json::Error> {
        self.field("user")
    }

    pub fn dish(&self) -> Result<Dish, serde_json::Error> {
        self.field("dish")
    }
}

/// Outcome of `POST /api/login`.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub response: ApiResponse,
    /// `None` when the response did not set a session cookie.
    pub session: Option<SessionCredential>,
    /// `None` unless the login succeeded and the body carried a valid `user`.
    pub user: Option<User>,
}

impl LoginOutcome {
    pub fn status_code(&self) -> u16 {
        self.response.status_code()
    }
}

/// Outcome of `GET /api/dishes`, list already normalized.
#[derive(Debug, Clone)]
pub struct DishesResponse {
    pub response: ApiResponse,
    /// Empty unless the call succeeded and the body parsed.
    pub dishes: Vec<Dish>,
    /// Why a successful body could not be read as a dish list.
    pub parse_error: Option<String>,
}

impl DishesResponse {
    pub fn status_code(&self) -> u16 {
        self.response.status_code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HealthStatus {
    pub status: Option<u16>,
    pub healthy: bool,
    pub error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::new(
            settings.application.base_url().to_string(),
            settings.timeouts.request(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, session: Option<&SessionCredential>) -> RequestBuilder {
        match session {
            Some(credential) => request.header(COOKIE, credential.cookie_header()),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let response = request.send().await?;
        Ok(ApiResponse::read(response).await?)
    }

    #[tracing::instrument(name = "API register", skip(self, body))]
    pub async fn register<Body>(&self, body: &Body) -> Result<ApiResponse, ApiError>
    where
        Body: serde::Serialize,
    {
        let response =
            Self::send(self.http_client.post(self.url("/api/register")).json(body)).await?;
        tracing::debug!(status = response.status_code(), "Registration answered");
        Ok(response)
    }

    #[tracing::instrument(
        name = "API login",
        skip(self, credentials),
        fields(email = %credentials.email)
    )]
    pub async fn login(&self, credentials: &Credentials<'_>) -> Result<LoginOutcome, ApiError> {
        let response =
            Self::send(self.http_client.post(self.url("/api/login")).json(credentials)).await?;
        let session = SessionCredential::from_set_cookie(&response.headers);
        let user = if response.status.is_success() {
            response
                .user()
                .inspect_err(|e| tracing::warn!(error = %e, "Login body has no valid user"))
                .ok()
        } else {
            None
        };
        tracing::debug!(
            status = response.status_code(),
            has_session = session.is_some(),
            "Login answered"
        );
        Ok(LoginOutcome {
            response,
            session,
            user,
        })
    }

    #[tracing::instrument(name = "API list dishes", skip_all)]
    pub async fn list_dishes(
        &self,
        session: Option<&SessionCredential>,
    ) -> Result<DishesResponse, ApiError> {
        let request = Self::authorize(self.http_client.get(self.url("/api/dishes")), session);
        let response = Self::send(request).await?;
        let (dishes, parse_error) = if response.status.is_success() {
            match normalize_dish_list(&response.body) {
                Ok(dishes) => (dishes, None),
                Err(e) => {
                    tracing::warn!(error = %e, "Dish listing does not match the dish schema");
                    (Vec::new(), Some(e.to_string()))
                }
            }
        } else {
            (Vec::new(), None)
        };
        Ok(DishesResponse {
            response,
            dishes,
            parse_error,
        })
    }

    #[tracing::instrument(name = "API create dish", skip_all)]
    pub async fn create_dish<Body>(
        &self,
        body: &Body,
        session: Option<&SessionCredential>,
    ) -> Result<ApiResponse, ApiError>
    where
        Body: serde::Serialize,
    {
        let request = self.http_client.post(self.url("/api/dishes")).json(body);
        Self::send(Self::authorize(request, session)).await
    }

    #[tracing::instrument(name = "API get dish", skip(self, session))]
    pub async fn get_dish(
        &self,
        dish_id: i64,
        session: Option<&SessionCredential>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/dishes/{}", dish_id)));
        Self::send(Self::authorize(request, session)).await
    }

    #[tracing::instrument(name = "API update dish", skip(self, update, session))]
    pub async fn update_dish(
        &self,
        dish_id: i64,
        update: &DishUpdate,
        session: Option<&SessionCredential>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .http_client
            .put(self.url(&format!("/api/dishes/{}", dish_id)))
            .json(update);
        Self::send(Self::authorize(request, session)).await
    }

    #[tracing::instrument(name = "API delete dish", skip(self, session))]
    pub async fn delete_dish(
        &self,
        dish_id: i64,
        session: Option<&SessionCredential>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .http_client
            .delete(self.url(&format!("/api/dishes/{}", dish_id)));
        Self::send(Self::authorize(request, session)).await
    }

    /// `GET /`, the per-test reachability check.
    #[tracing::instrument(name = "API get root", skip_all)]
    pub async fn get_root(
        &self,
        session: Option<&SessionCredential>,
    ) -> Result<ApiResponse, ApiError> {
        Self::send(Self::authorize(self.http_client.get(self.url("/")), session)).await
    }

    /// Check `GET /api/health`. A 404 still counts as healthy: older deployments
    /// do not expose the endpoint at all.
    #[tracing::instrument(name = "API health check", skip(self))]
    pub async fn check_health(&self, timeout: Duration) -> HealthStatus {
        let outcome = self
            .http_client
            .get(self.url("/api/health"))
            .timeout(timeout)
            .send()
            .await;
        match outcome {
            Ok(response) => {
                let status = response.status();
                HealthStatus {
                    status: Some(status.as_u16()),
                    healthy: status == StatusCode::OK || status == StatusCode::NOT_FOUND,
                    error: None,
                }
            }
            Err(e) => {
                let error = if e.is_timeout() {
                    "timeout".to_string()
                } else {
                    e.to_string()
                };
                tracing::warn!(error = %error, "Health check failed");
                HealthStatus {
                    status: None,
                    healthy: false,
                    error: Some(error),
                }
            }
        }
    }
}
