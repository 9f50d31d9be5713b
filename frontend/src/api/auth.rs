use reqwest::header::HeaderMap;
use reqwest::{Method, Response};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use super::{AUTH_HEADER, ApiClient};
use crate::error::ApiError;
use crate::session::{Role, Session};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
}

/// Whatever the auth endpoints put in the body; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    roles: Vec<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl AuthPayload {
    fn role(&self) -> Role {
        match &self.role {
            Some(role) => Role::from(role.clone()),
            None if self.roles.iter().any(|r| r == "ADMIN") => Role::Admin,
            None => Role::User,
        }
    }
}

/// Builds a session from an auth response: the token comes from the
/// `x-auth-token` header or a `token` body field.
async fn session_from_response(response: Response) -> Option<Session> {
    let header_token = token_header(response.headers());
    let payload = match response.text().await {
        Ok(body) => parse_payload(&body),
        Err(err) => {
            debug!("failed to read auth response body: {}", err);
            AuthPayload::default()
        }
    };

    header_token
        .or_else(|| payload.token.clone())
        .filter(|token| !token.trim().is_empty())
        .map(|token| Session::new(token, payload.role()))
}

/// An empty or non-JSON body carries no session fields.
fn parse_payload(body: &str) -> AuthPayload {
    if body.trim().is_empty() {
        return AuthPayload::default();
    }
    match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(err) => {
            debug!("ignoring undecodable auth response body: {}", err);
            AuthPayload::default()
        }
    }
}

fn token_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl ApiClient {
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let response = self
            .send(Method::POST, "/auth/signin", None, &[], Some(credentials))
            .await?;
        let session = session_from_response(response)
            .await
            .ok_or(ApiError::MissingToken)?;

        info!(admin = session.is_admin(), "user signed in");
        Ok(session)
    }

    /// Registers a new account. Returns a session when the API signs the
    /// user in straight away.
    pub async fn sign_up(
        &self,
        token: Option<&str>,
        request: &SignupRequest,
    ) -> Result<Option<Session>, ApiError> {
        let response = self
            .send(Method::POST, "/auth/signup", token, &[], Some(request))
            .await?;

        info!("account created");
        Ok(session_from_response(response).await)
    }
}
