// src/error.rs
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::api::status::StatusClass;
use crate::api::types::ResponseMeta;
use crate::validation::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

/// HTTP-level failure reported by the API.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub class: StatusClass,
    pub message: Option<String>,
    /// Parsed response body, `Value::Null` when it was empty or not JSON.
    pub body: Value,
    pub meta: ResponseMeta,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.status, msg),
            None => write!(f, "{}", self.status),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("credentials missing")]
    MissingCredentials,

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("response is not valid JSON (status {status})")]
    InvalidJson {
        status: StatusCode,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("API error {0}")]
    Api(ApiError),

    #[error("second authentication factor required")]
    TwoFactorRequired(ApiError),
}

impl Error {
    pub(crate) fn transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::RequestFailed(err)
        }
    }

    /// The API error details, for both plain and second-factor failures.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) | Error::TwoFactorRequired(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the response that caused the error, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::InvalidJson { status, .. } => Some(*status),
            _ => self.api_error().map(|e| e.status),
        }
    }

    pub fn is_two_factor_required(&self) -> bool {
        matches!(self, Error::TwoFactorRequired(_))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
