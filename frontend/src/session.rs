//! Signed-in user record.
//!
//! The record lives in a single cookie (`user`) holding URL-encoded JSON
//! `{token, role}`. Screens never read the cookie themselves: they take a
//! [`CurrentSession`] extractor, and only login/signup (set) and logout
//! (remove) touch the store.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SESSION_COOKIE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        if role == "ADMIN" { Role::Admin } else { Role::User }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "ADMIN".to_string(),
            Role::User => "USER".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reads the record from the request. Missing, malformed or token-less
    /// records all count as "not signed in".
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        Self::decode(cookie.value())
    }

    fn decode(raw: &str) -> Option<Self> {
        let json = urlencoding::decode(raw).ok()?;
        match serde_json::from_str::<Session>(&json) {
            Ok(session) if !session.token.trim().is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                debug!("ignoring malformed session cookie: {}", err);
                None
            }
        }
    }

    fn encode(&self) -> String {
        // Serializing two strings cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        urlencoding::encode(&json).into_owned()
    }

    /// Cookie that stores this session.
    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.encode())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Cookie that removes the stored session.
    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}

/// Per-request session context.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn get(&self) -> Option<&Session> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<Session> {
        self.0
    }
}

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(CurrentSession(Session::from_request(req))))
    }
}
