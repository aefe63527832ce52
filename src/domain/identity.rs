use secrecy::{ExposeSecret, Secret};
use validator::ValidateEmail;

/// The account every authenticated test of a run logs in with.
#[derive(Debug, Clone)]
pub struct TestIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub nationality: String,
    pub phone: String,
    pub password: Secret<String>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{0} is not a valid email address.")]
    InvalidEmail(String),
    #[error("The password of a test identity cannot be empty.")]
    EmptyPassword,
}

/// Body of `POST /api/register`.
#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub nationality: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/login`.
#[derive(serde::Serialize, Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl TestIdentity {
    /// Build an identity around credentials supplied by configuration.
    pub fn from_credentials(
        email: String,
        password: Secret<String>,
    ) -> Result<Self, IdentityError> {
        if !email.validate_email() {
            return Err(IdentityError::InvalidEmail(email));
        }
        if password.expose_secret().is_empty() {
            return Err(IdentityError::EmptyPassword);
        }
        Ok(Self {
            first_name: "Session".into(),
            last_name: "User".into(),
            email,
            nationality: "Mexican".into(),
            phone: "5550000000".into(),
            password,
        })
    }

    pub fn registration_body(&self) -> RegistrationRequest<'_> {
        RegistrationRequest {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            nationality: &self.nationality,
            phone: &self.phone,
            password: self.password.expose_secret(),
        }
    }

    pub fn credentials(&self) -> Credentials<'_> {
        Credentials {
            email: &self.email,
            password: self.password.expose_secret(),
        }
    }
}
