use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::envelope::unwrap_envelope;
use crate::api::status::{Disposition, StatusClass, classify, confirms_deletion};
use crate::api::types::*;
use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::validation::{validate_hostname, validate_resource_path};

pub const USER_AGENT: &str = concat!("dnsimple-rs/", env!("CARGO_PKG_VERSION"));

/// Body fields that may carry a human-readable error, in lookup order.
const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "errors"];

/// Stateless dispatcher for the DNSimple API. Cheap to clone; clones share
/// the connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.is_none() {
            validate_hostname(&config.hostname)?;
        }

        // 3xx is reported to the caller; following it would also resend the
        // token headers to whatever host `Location` names.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(Error::RequestFailed)?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and normalize the response.
    pub async fn talk(&self, request: Request) -> Result<Response<Payload>> {
        let (meta, body) = self.exchange(&request).await?;
        normalize(request.verb, meta, body)
    }

    /// Like [`talk`](Self::talk), then decode the normalized payload into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>> {
        self.talk(request)
            .await?
            .try_map(|data| serde_json::from_value(data.into_value()).map_err(Error::Decode))
    }

    /// Decode the body exactly as received, without envelope unwrapping.
    /// Pair with [`Enveloped`](crate::api::envelope::Enveloped) when the
    /// endpoint's shape is known.
    pub async fn fetch_raw<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>> {
        let (meta, body) = self.exchange(&request).await?;
        let value = parse_json(&meta, body)?;
        Response { meta, data: value }
            .try_map(|value| serde_json::from_value(value).map_err(Error::Decode))
    }

    pub async fn get(&self, path: &str) -> Result<Response<Payload>> {
        self.talk(Request::get(path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &T,
    ) -> Result<Response<Payload>> {
        self.talk(Request::post(path).with_fields(fields)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &T,
    ) -> Result<Response<Payload>> {
        self.talk(Request::put(path).with_fields(fields)?).await
    }

    /// Whether the API confirmed the deletion.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        let response = self.talk(Request::delete(path)).await?;
        Ok(match response.data {
            Payload::Deleted(confirmed) => confirmed,
            _ => confirms_deletion(response.meta.status),
        })
    }

    /// Send the request and split the response into success body or error.
    async fn exchange(&self, request: &Request) -> Result<(ResponseMeta, String)> {
        validate_resource_path(&request.path)?;
        let credentials = Credentials::resolve(&self.config)?;
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let mut builder = self
            .http
            .request(request.verb.method(), self.config.url(&request.path))
            .header(ACCEPT, "application/json")
            .headers(credentials.headers()?)
            .timeout(timeout);
        if let Some(fields) = request.body() {
            builder = builder.json(fields.as_ref());
        }

        debug!(
            method = %request.verb,
            path = %request.path,
            auth = credentials.mode(),
            "sending DNSimple request"
        );

        let res = builder
            .send()
            .await
            .map_err(|e| transport_error(request, e, timeout))?;
        let status = res.status();
        let meta = ResponseMeta::from_headers(status, res.headers());
        let disposition = classify(request.verb, &request.path, status, res.headers());
        let body = res
            .text()
            .await
            .map_err(|e| transport_error(request, e, timeout))?;

        debug!(
            status = status.as_u16(),
            request_id = meta.request_id.as_deref().unwrap_or("-"),
            runtime = ?meta.runtime,
            "received DNSimple response"
        );

        match disposition {
            Disposition::Success => Ok((meta, body)),
            Disposition::TwoFactorRequired => {
                debug!("second authentication factor required");
                Err(Error::TwoFactorRequired(api_error(meta, &body)))
            }
            Disposition::Failure => {
                if meta.class == StatusClass::ServerError {
                    warn!(
                        class = %meta.class,
                        "DNSimple {} {} failed with {} (request id {})",
                        request.verb,
                        request.path,
                        status,
                        meta.request_id.as_deref().unwrap_or("-")
                    );
                }
                Err(Error::Api(api_error(meta, &body)))
            }
        }
    }
}

fn transport_error(request: &Request, err: reqwest::Error, timeout: Duration) -> Error {
    debug!("DNSimple {} {} transport error: {}", request.verb, request.path, err);
    Error::transport(err, timeout)
}

fn parse_json(meta: &ResponseMeta, body: String) -> Result<Value> {
    serde_json::from_str(&body).map_err(|source| Error::InvalidJson {
        status: meta.status,
        body,
        source,
    })
}

fn normalize(verb: Verb, meta: ResponseMeta, body: String) -> Result<Response<Payload>> {
    let deleted = || Payload::Deleted(confirms_deletion(meta.status));

    let data = if body.trim().is_empty() {
        match verb {
            Verb::Delete => deleted(),
            _ => Payload::Empty,
        }
    } else {
        match parse_json(&meta, body)? {
            Value::Null if verb == Verb::Delete => deleted(),
            value => Payload::Json(unwrap_envelope(value)),
        }
    };

    Ok(Response { meta, data })
}

fn api_error(meta: ResponseMeta, body: &str) -> ApiError {
    let body: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    ApiError {
        status: meta.status,
        class: meta.class,
        message: extract_message(&body),
        body,
        meta,
    }
}

/// First non-empty message in the known fields. Structured `errors` objects
/// are rendered as compact JSON.
fn extract_message(body: &Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| match body.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) if !map.is_empty() => Some(
            map.get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| body[field].to_string()),
        ),
        Value::Array(items) if !items.is_empty() => Some(body[field].to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn meta(status: u16) -> ResponseMeta {
        ResponseMeta::empty(StatusCode::from_u16(status).unwrap())
    }

    #[test]
    fn test_new_rejects_bad_hostname() {
        let config = ClientConfig::new().with_hostname("not a host");
        assert!(matches!(Client::new(config), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_user_agent_identifies_client() {
        assert!(USER_AGENT.starts_with("dnsimple-rs/"));
    }

    #[test]
    fn test_empty_body_is_empty_payload() {
        let res = normalize(Verb::Get, meta(200), String::new()).unwrap();
        assert_eq!(res.data, Payload::Empty);

        let res = normalize(Verb::Put, meta(204), "  \n".into()).unwrap();
        assert_eq!(res.data, Payload::Empty);
    }

    #[test]
    fn test_delete_confirmation() {
        let res = normalize(Verb::Delete, meta(204), String::new()).unwrap();
        assert_eq!(res.data, Payload::Deleted(true));

        let res = normalize(Verb::Delete, meta(200), "null".into()).unwrap();
        assert_eq!(res.data, Payload::Deleted(true));

        let res = normalize(Verb::Delete, meta(202), String::new()).unwrap();
        assert_eq!(res.data, Payload::Deleted(false));
    }

    #[test]
    fn test_delete_with_body_keeps_body() {
        let res = normalize(Verb::Delete, meta(200), r#"{"domain":{"id":3}}"#.into()).unwrap();
        assert_eq!(res.data, Payload::Json(json!({"id": 3})));
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let body = r#"{"domain":{"id":1,"name":"example.com"}}"#.to_string();
        let res = normalize(Verb::Get, meta(200), body).unwrap();
        assert_eq!(res.data, Payload::Json(json!({"id": 1, "name": "example.com"})));
    }

    #[test]
    fn test_invalid_json_keeps_raw_body() {
        let err = normalize(Verb::Get, meta(200), "<html>oops</html>".into()).unwrap_err();
        match err {
            Error::InvalidJson { status, body, .. } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_message_fields() {
        assert_eq!(
            extract_message(&json!({"message": "Domain not found"})).as_deref(),
            Some("Domain not found")
        );
        assert_eq!(
            extract_message(&json!({"error": "Authentication failed"})).as_deref(),
            Some("Authentication failed")
        );
        assert_eq!(
            extract_message(&json!({"message": "", "error": "fallback"})).as_deref(),
            Some("fallback")
        );
        assert_eq!(
            extract_message(&json!({"errors": {"name": ["is invalid"]}})).as_deref(),
            Some(r#"{"name":["is invalid"]}"#)
        );
        assert_eq!(
            extract_message(&json!({"error": {"message": "nested"}})).as_deref(),
            Some("nested")
        );
        assert_eq!(extract_message(&json!({"id": 1})), None);
        assert_eq!(extract_message(&Value::Null), None);
    }

    #[test]
    fn test_api_error_tolerates_non_json_body() {
        let err = api_error(meta(502), "Bad Gateway");
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.class, StatusClass::ServerError);
        assert_eq!(err.body, Value::Null);
        assert_eq!(err.message, None);
    }
}
