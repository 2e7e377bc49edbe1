use std::borrow::Cow;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::status::StatusClass;
use crate::auth::OTP_TOKEN_HEADER;
use crate::error::{Error, Result};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const RUNTIME_HEADER: &str = "x-runtime";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    pub(crate) fn method(&self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call against the API. `fields` is only sent for non-GET verbs.
#[derive(Debug, Clone)]
pub struct Request {
    pub verb: Verb,
    pub path: String,
    pub fields: Option<Value>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            fields: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    pub fn with_fields<T: Serialize + ?Sized>(mut self, fields: &T) -> Result<Self> {
        self.fields = Some(serde_json::to_value(fields).map_err(Error::Encode)?);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Body to send: nothing for GET, otherwise the fields or `{}`.
    pub(crate) fn body(&self) -> Option<Cow<'_, Value>> {
        match (self.verb, &self.fields) {
            (Verb::Get, _) => None,
            (_, Some(fields)) => Some(Cow::Borrowed(fields)),
            (_, None) => Some(Cow::Owned(Value::Object(Map::new()))),
        }
    }
}

/// Diagnostics the API attaches to every response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub class: StatusClass,
    pub request_id: Option<String>,
    pub runtime: Option<Duration>,
    /// Present after a successful strict two-factor login; reuse it via
    /// [`ClientConfig::with_otp_token`](crate::ClientConfig::with_otp_token).
    pub otp_token: Option<String>,
}

impl ResponseMeta {
    pub fn from_headers(status: StatusCode, headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let runtime = text(RUNTIME_HEADER)
            .and_then(|v| v.parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        Self {
            status,
            class: StatusClass::of(status),
            request_id: text(REQUEST_ID_HEADER),
            runtime,
            otp_token: text(OTP_TOKEN_HEADER),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            class: StatusClass::of(status),
            request_id: None,
            runtime: None,
            otp_token: None,
        }
    }
}

/// Normalized success body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 2xx with no body.
    Empty,
    /// DELETE with no body: whether the status confirmed the deletion.
    Deleted(bool),
    /// Parsed JSON with single-key envelopes unwrapped.
    Json(Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::Deleted(ok) => Value::Bool(ok),
            Payload::Json(v) => v,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response<T> {
    pub meta: ResponseMeta,
    pub data: T,
}

impl<T> Response<T> {
    pub fn status(&self) -> StatusCode {
        self.meta.status
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            meta: self.meta,
            data: f(self.data),
        }
    }

    /// Like [`map`](Self::map) for a fallible conversion.
    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(T) -> std::result::Result<U, E>,
    ) -> std::result::Result<Response<U>, E> {
        Ok(Response {
            meta: self.meta,
            data: f(self.data)?,
        })
    }
}
