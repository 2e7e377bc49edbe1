//! Credential resolution and the authentication headers each mode sends.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::validation::ValidationError;

pub const TOKEN_HEADER: &str = "x-dnsimple-token";
pub const DOMAIN_TOKEN_HEADER: &str = "x-dnsimple-domain-token";
pub const OTP_HEADER: &str = "x-dnsimple-otp";
pub const OTP_STRICT_HEADER: &str = "x-dnsimple-2fa-strict";
pub const OTP_TOKEN_HEADER: &str = "x-dnsimple-otp-token";

/// Password placeholder the API expects alongside a two-factor token.
const OTP_TOKEN_PASSWORD: &str = "x-2fa-basic";

/// One resolved authentication mode. Borrowed from the config for the span of
/// a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    AccountToken {
        email: &'a str,
        token: &'a str,
    },
    DomainToken(&'a str),
    Password {
        email: &'a str,
        password: &'a str,
        one_time_password: Option<&'a str>,
    },
    OtpToken(&'a str),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl<'a> Credentials<'a> {
    /// Pick the first complete combination: account token, domain token,
    /// password, then two-factor token.
    pub fn resolve(config: &'a ClientConfig) -> Result<Self> {
        let email = non_empty(&config.email);

        if let (Some(email), Some(token)) = (email, non_empty(&config.token)) {
            return Ok(Credentials::AccountToken { email, token });
        }
        if let Some(token) = non_empty(&config.domain_token) {
            return Ok(Credentials::DomainToken(token));
        }
        if let (Some(email), Some(password)) = (email, non_empty(&config.password)) {
            return Ok(Credentials::Password {
                email,
                password,
                one_time_password: non_empty(&config.one_time_password),
            });
        }
        if let Some(token) = non_empty(&config.otp_token) {
            return Ok(Credentials::OtpToken(token));
        }

        Err(Error::MissingCredentials)
    }

    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match *self {
            Credentials::AccountToken { email, token } => {
                insert(&mut headers, TOKEN_HEADER, &format!("{}:{}", email, token))?;
            }
            Credentials::DomainToken(token) => {
                insert(&mut headers, DOMAIN_TOKEN_HEADER, token)?;
            }
            Credentials::Password {
                email,
                password,
                one_time_password,
            } => {
                headers.insert(AUTHORIZATION, basic(email, password)?);
                if let Some(code) = one_time_password {
                    insert(&mut headers, OTP_STRICT_HEADER, "1")?;
                    insert(&mut headers, OTP_HEADER, code)?;
                }
            }
            Credentials::OtpToken(token) => {
                headers.insert(AUTHORIZATION, basic(token, OTP_TOKEN_PASSWORD)?);
            }
        }
        Ok(headers)
    }

    /// Short label for logs; never includes secrets.
    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::AccountToken { .. } => "account-token",
            Credentials::DomainToken(_) => "domain-token",
            Credentials::Password { .. } => "password",
            Credentials::OtpToken(_) => "otp-token",
        }
    }
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| ValidationError::InvalidCredential)?;
    value.set_sensitive(true);
    Ok(value)
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    headers.insert(HeaderName::from_static(name), sensitive(value)?);
    Ok(())
}

fn basic(user: &str, password: &str) -> Result<HeaderValue> {
    let encoded = BASE64.encode(format!("{}:{}", user, password));
    sensitive(&format!("Basic {}", encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_no_credentials() {
        let config = ClientConfig::new();
        assert!(matches!(
            Credentials::resolve(&config),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn test_email_alone_is_not_enough() {
        let mut config = ClientConfig::new();
        config.email = Some("me@example.com".into());
        config.token = Some(String::new());
        assert!(matches!(
            Credentials::resolve(&config),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn test_account_token_takes_precedence() {
        let config = ClientConfig::new()
            .with_token("me@example.com", "abc123")
            .with_domain_token("dom")
            .with_password("me@example.com", "pw");
        let creds = Credentials::resolve(&config).unwrap();
        assert_eq!(
            creds,
            Credentials::AccountToken {
                email: "me@example.com",
                token: "abc123"
            }
        );

        let headers = creds.headers().unwrap();
        assert_eq!(header(&headers, "X-DNSimple-Token"), Some("me@example.com:abc123"));
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_domain_token_before_password() {
        let config = ClientConfig::new()
            .with_domain_token("dom")
            .with_password("me@example.com", "pw");
        let creds = Credentials::resolve(&config).unwrap();
        assert_eq!(creds, Credentials::DomainToken("dom"));
        let headers = creds.headers().unwrap();
        assert_eq!(header(&headers, "X-DNSimple-Domain-Token"), Some("dom"));
    }

    #[test]
    fn test_password_uses_basic_auth() {
        let config = ClientConfig::new().with_password("me@example.com", "pw");
        let headers = Credentials::resolve(&config).unwrap().headers().unwrap();
        // base64("me@example.com:pw")
        assert_eq!(
            header(&headers, "authorization"),
            Some("Basic bWVAZXhhbXBsZS5jb206cHc=")
        );
        assert!(headers.get(OTP_HEADER).is_none());
        assert!(headers.get(OTP_STRICT_HEADER).is_none());
    }

    #[test]
    fn test_password_with_one_time_code() {
        let config = ClientConfig::new()
            .with_password("me@example.com", "pw")
            .with_one_time_password("123456");
        let headers = Credentials::resolve(&config).unwrap().headers().unwrap();
        assert_eq!(header(&headers, OTP_HEADER), Some("123456"));
        assert_eq!(header(&headers, OTP_STRICT_HEADER), Some("1"));
        assert!(headers.get(AUTHORIZATION).is_some());
    }

    #[test]
    fn test_otp_token_is_last_resort() {
        let config = ClientConfig::new().with_otp_token("tok");
        let creds = Credentials::resolve(&config).unwrap();
        assert_eq!(creds, Credentials::OtpToken("tok"));
        let headers = creds.headers().unwrap();
        // base64("tok:x-2fa-basic")
        assert_eq!(
            header(&headers, "authorization"),
            Some("Basic dG9rOngtMmZhLWJhc2lj")
        );
    }

    #[test]
    fn test_header_unsafe_credential_is_rejected() {
        let config = ClientConfig::new().with_domain_token("bad\ntoken");
        let err = Credentials::resolve(&config).unwrap().headers().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRequest(ValidationError::InvalidCredential)
        ));
    }
}
