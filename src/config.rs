use std::time::Duration;

pub const DEFAULT_HOSTNAME: &str = "api.dnsimple.com";
pub const API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`Client`](crate::Client) needs: where to connect and which
/// credentials to present. Built once and owned by the client.
#[derive(Clone)]
pub struct ClientConfig {
    pub hostname: String,
    /// Replaces `https://<hostname>/v1` entirely, e.g. for a local test server.
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
    pub domain_token: Option<String>,
    pub password: Option<String>,
    pub one_time_password: Option<String>,
    /// Continuation token from `X-DNSimple-OTP-Token`.
    pub otp_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            base_url: None,
            email: None,
            token: None,
            domain_token: None,
            password: None,
            one_time_password: None,
            otp_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account email plus API token.
    pub fn with_token(mut self, email: impl Into<String>, token: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.token = Some(token.into());
        self
    }

    pub fn with_domain_token(mut self, token: impl Into<String>) -> Self {
        self.domain_token = Some(token.into());
        self
    }

    /// Account email plus password, sent as HTTP Basic auth.
    pub fn with_password(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_one_time_password(mut self, code: impl Into<String>) -> Self {
        self.one_time_password = Some(code.into());
        self
    }

    pub fn with_otp_token(mut self, token: impl Into<String>) -> Self {
        self.otp_token = Some(token.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Canonical hostname without trailing dot.
    pub fn hostname_root(&self) -> &str {
        self.hostname.trim_end_matches('.')
    }

    /// Versioned API root without trailing slash (e.g. https://api.dnsimple.com/v1).
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}/{}", self.hostname_root(), API_VERSION),
        }
    }

    /// Absolute URL for a resource-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &redact(&self.token))
            .field("domain_token", &redact(&self.domain_token))
            .field("password", &redact(&self.password))
            .field("one_time_password", &redact(&self.one_time_password))
            .field("otp_token", &redact(&self.otp_token))
            .field("timeout", &self.timeout)
            .finish()
    }
}
