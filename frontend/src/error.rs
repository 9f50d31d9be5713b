use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Failure of a call against the remote storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{method} {path} returned {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
    },

    #[error("failed to parse JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("sign-in response carried no token")]
    MissingToken,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client-side validation failures of the form screens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0} is required")]
    Required(&'static str),

    #[error("Price must be a non-negative number")]
    InvalidPrice,
}
