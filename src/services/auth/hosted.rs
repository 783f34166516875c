use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::models::user::UserSession;

use super::{AuthError, IdentityProvider};

/// Client for a hosted auth REST API (`/auth/v1/...`).
pub struct HostedIdentity {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserPayload,
}

/// Sign-up answers with a session when confirmation is off, or with the
/// bare user record when an email confirmation is pending.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl HostedIdentity {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AuthError> {
        if base_url.trim().is_empty() || anon_key.trim().is_empty() {
            return Err(AuthError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Network(format!("Failed to build auth HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn post(&self, path: &str, body: &serde_json::Value, bearer: Option<&str>) -> Result<Response, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            log::warn!("Auth request to {} failed with HTTP {}", path, status);
            Err(AuthError::Rejected(error_message(&text, status.as_u16())))
        }
    }
}

impl IdentityProvider for HostedIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        let response = self.post(
            "/auth/v1/token?grant_type=password",
            &json!({ "email": email, "password": password }),
            None,
        )?;
        let body = response
            .text()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        parse_token_response(&body)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<Option<UserSession>, AuthError> {
        let response = self.post(
            "/auth/v1/signup",
            &json!({ "email": email, "password": password }),
            None,
        )?;
        let body = response
            .text()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        parse_sign_up_response(&body)
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError> {
        Ok(authorize_url(&self.base_url, provider, redirect_to, code_challenge))
    }

    fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> Result<UserSession, AuthError> {
        let response = self.post(
            "/auth/v1/token?grant_type=pkce",
            &json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
            None,
        )?;
        let body = response
            .text()
            .map_err(|e| AuthError::Network(e.to_string()))?;
        parse_token_response(&body)
    }

    fn sign_out(&self, session: &UserSession) -> Result<(), AuthError> {
        let Some(token) = session.access_token.as_deref() else {
            return Ok(());
        };
        self.post("/auth/v1/logout", &json!({}), Some(token))?;
        Ok(())
    }
}

pub(crate) fn authorize_url(
    base_url: &str,
    provider: &str,
    redirect_to: &str,
    code_challenge: &str,
) -> String {
    format!(
        "{}/auth/v1/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
        base_url.trim_end_matches('/'),
        urlencoding::encode(provider),
        urlencoding::encode(redirect_to),
        urlencoding::encode(code_challenge)
    )
}

fn parse_token_response(body: &str) -> Result<UserSession, AuthError> {
    let token: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Rejected(format!("Unexpected sign-in response: {}", e)))?;
    Ok(UserSession {
        id: token.user.id,
        email: token.user.email.unwrap_or_default(),
        access_token: Some(token.access_token),
    })
}

fn parse_sign_up_response(body: &str) -> Result<Option<UserSession>, AuthError> {
    let sign_up: SignUpResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Rejected(format!("Unexpected sign-up response: {}", e)))?;
    Ok(match (sign_up.access_token, sign_up.user) {
        (Some(access_token), Some(user)) => Some(UserSession {
            id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: Some(access_token),
        }),
        _ => None,
    })
}

/// Best human-readable message from an error body.
fn error_message(body: &str, status: u16) -> String {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    payload
        .error_description
        .or(payload.msg)
        .or(payload.message)
        .or(payload.error)
        .unwrap_or_else(|| format!("Request failed with HTTP status {}", status))
}
