#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Account entry against the hosted auth provider.
//!
//! Email/password sign-up goes through the provider's REST endpoint and
//! either yields a session right away or asks the user to confirm their
//! email first. Social sign-in only needs an authorize URL; the provider
//! handles the rest and redirects back to the dashboard.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Where a successful sign-up lands.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors from account-entry operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Form input rejected before any request was made.
    #[error("{message}")]
    Validation {
        /// What is wrong with the input.
        message: String,
    },

    /// The provider rejected the request.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// Response or URL could not be interpreted.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Required configuration is missing.
    #[error("{name} is not set")]
    MissingConfig {
        /// Environment variable name.
        name: &'static str,
    },
}

/// Supported social sign-in providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    /// Google.
    Google,
    /// GitHub.
    Github,
}

/// Provider connection settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Provider root URL, without trailing slash.
    pub url: String,
    /// Public (anonymous) API key.
    pub anon_key: String,
    /// Absolute URL the provider redirects to after sign-in.
    pub redirect_url: String,
}

impl AuthConfig {
    /// Reads `AUTH_URL`, `AUTH_ANON_KEY` and optional `AUTH_REDIRECT_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingConfig`] if a required variable is unset.
    pub fn from_env() -> Result<Self, AuthError> {
        let required = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or(AuthError::MissingConfig { name })
        };

        let url = required("AUTH_URL")?.trim_end_matches('/').to_string();
        let anon_key = required("AUTH_ANON_KEY")?;
        let redirect_url = std::env::var("AUTH_REDIRECT_URL")
            .unwrap_or_else(|_| format!("http://localhost:8080{DASHBOARD_PATH}"));

        Ok(Self {
            url,
            anon_key,
            redirect_url,
        })
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<u64>,
    /// Email of the signed-in user.
    pub email: Option<String>,
}

/// Result of a successful sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SignUpOutcome {
    /// Signed in immediately.
    Session(Session),
    /// Account created; the user must confirm their email first.
    ConfirmationPending {
        /// Address the confirmation was sent to.
        email: String,
    },
}

/// Checks sign-up input before any request is made.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] describing the first problem found.
pub fn validate_sign_up(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation {
            message: "Email is required".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(AuthError::Validation {
            message: "Enter a valid email address".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation {
            message: format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}

/// Client for the provider's REST API.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    config: AuthConfig,
}

impl AuthClient {
    /// Creates a client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: AuthConfig) -> Self {
        Self { client, config }
    }

    /// Registers a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if validation fails, the request fails, or the
    /// provider rejects the sign-up.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        validate_sign_up(email, password)?;

        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.config.url))
            .header("apikey", &self.config.anon_key)
            .query(&[("redirect_to", self.config.redirect_url.as_str())])
            .json(&serde_json::json!({
                "email": email.trim(),
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: serde_json::Value = response.json().await?;

        parse_sign_up_response(status, &body, email.trim())
    }

    /// Builds the URL that starts social sign-in with `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Parse`] if the configured URL is invalid.
    pub fn oauth_authorize_url(&self, provider: OAuthProvider) -> Result<String, AuthError> {
        authorize_url(&self.config.url, provider, &self.config.redirect_url)
    }
}

fn authorize_url(base: &str, provider: OAuthProvider, redirect: &str) -> Result<String, AuthError> {
    reqwest::Url::parse_with_params(
        &format!("{base}/auth/v1/authorize"),
        &[("provider", provider.as_ref()), ("redirect_to", redirect)],
    )
    .map(String::from)
    .map_err(|e| AuthError::Parse {
        message: format!("Invalid auth URL '{base}': {e}"),
    })
}

/// Pulls a human-readable message out of a provider error body.
fn error_message(body: &serde_json::Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|k| body[*k].as_str())
        .unwrap_or("Sign-up failed")
        .to_string()
}

/// Interprets a sign-up response.
///
/// A body with an `access_token` is a live session. Otherwise the body is
/// the created user and the account awaits email confirmation.
fn parse_sign_up_response(
    status: u16,
    body: &serde_json::Value,
    email: &str,
) -> Result<SignUpOutcome, AuthError> {
    if !(200..300).contains(&status) {
        let message = error_message(body);
        log::warn!("Sign-up rejected ({status}): {message}");
        return Err(AuthError::Rejected { status, message });
    }

    if let Some(token) = body["access_token"].as_str() {
        return Ok(SignUpOutcome::Session(Session {
            access_token: token.to_string(),
            refresh_token: body["refresh_token"].as_str().map(String::from),
            expires_in: body["expires_in"].as_u64(),
            email: body["user"]["email"].as_str().map(String::from),
        }));
    }

    let user = if body["user"].is_object() {
        &body["user"]
    } else {
        body
    };

    if user["id"].is_null() && user["email"].is_null() {
        return Err(AuthError::Parse {
            message: "Sign-up response has neither a session nor a user".to_string(),
        });
    }

    Ok(SignUpOutcome::ConfirmationPending {
        email: user["email"].as_str().unwrap_or(email).to_string(),
    })
}

/// State behind the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    /// Email field.
    pub email: String,
    /// Password field.
    pub password: String,
    /// Whether a submission is in flight.
    pub loading: bool,
    /// Inline error shown under the form.
    pub error: Option<String>,
    /// Inline notice (e.g. "check your email").
    pub notice: Option<String>,
}

impl SignUpForm {
    /// Creates a form with the given input.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Submits the form.
    ///
    /// Returns the redirect target when the user ends up signed in. Every
    /// failure lands in [`SignUpForm::error`] instead.
    pub async fn submit(&mut self, client: &AuthClient) -> Option<&'static str> {
        self.error = None;
        self.notice = None;

        if let Err(e) = validate_sign_up(&self.email, &self.password) {
            self.error = Some(e.to_string());
            return None;
        }

        self.loading = true;
        let result = client.sign_up(&self.email, &self.password).await;
        self.loading = false;

        self.apply(result)
    }

    /// Records the outcome of a sign-up request.
    pub fn apply(&mut self, result: Result<SignUpOutcome, AuthError>) -> Option<&'static str> {
        match result {
            Ok(SignUpOutcome::Session(_)) => Some(DASHBOARD_PATH),
            Ok(SignUpOutcome::ConfirmationPending { email }) => {
                self.notice = Some(format!("Check {email} for a confirmation link"));
                None
            }
            Err(e) => {
                log::error!("Sign-up failed: {e}");
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
