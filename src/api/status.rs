//! Mapping from an HTTP status (plus the request that produced it) to an
//! outcome.
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::api::types::Verb;
use crate::auth::OTP_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn of(status: StatusCode) -> Self {
        match status.as_u16() {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StatusClass::Informational => "informational",
            StatusClass::Success => "success",
            StatusClass::Redirection => "redirection",
            StatusClass::ClientError => "client_error",
            StatusClass::ServerError => "server_error",
        })
    }
}

/// How the dispatcher should treat a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    TwoFactorRequired,
    Failure,
}

/// Availability checks answer 404 when the name is free.
fn is_availability_check(verb: Verb, path: &str) -> bool {
    let route = path.split(['?', '#']).next().unwrap_or(path);
    verb == Verb::Get && route.trim_end_matches('/').ends_with("/check")
}

pub fn classify(verb: Verb, path: &str, status: StatusCode, headers: &HeaderMap) -> Disposition {
    if status == StatusCode::NOT_FOUND && is_availability_check(verb, path) {
        return Disposition::Success;
    }

    if status == StatusCode::UNAUTHORIZED {
        let required = headers
            .get(OTP_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("required"));
        if required {
            return Disposition::TwoFactorRequired;
        }
    }

    match StatusClass::of(status) {
        StatusClass::Informational | StatusClass::Success => Disposition::Success,
        _ => Disposition::Failure,
    }
}

/// Statuses that confirm a DELETE went through.
pub fn confirms_deletion(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NO_CONTENT
}
