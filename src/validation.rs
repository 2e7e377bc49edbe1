use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("hostname is empty")]
    EmptyHostname,
    #[error("hostname label '{0}' is invalid (only a-z, 0-9, and '-' allowed, max 63 characters)")]
    InvalidHostnameLabel(String),
    #[error("hostname port '{0}' is invalid")]
    InvalidPort(String),
    #[error("resource path is empty")]
    EmptyPath,
    #[error("resource path must be relative to the API base, got '{0}'")]
    AbsolutePath(String),
    #[error("resource path must not contain '..' segments")]
    ParentSegment,
    #[error("resource path must not contain whitespace")]
    Whitespace,
    #[error("credential contains characters not allowed in an HTTP header")]
    InvalidCredential,
}

lazy_static::lazy_static! {
    /// Only lowercase letters, digits and '-'
    static ref LABEL_RE: Regex = Regex::new(r"^[a-z0-9-]{1,63}$").unwrap();
    static ref SCHEME_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap();
}

fn validate_label(label: &str) -> Result<(), ValidationError> {
    if !LABEL_RE.is_match(label) || label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::InvalidHostnameLabel(label.to_string()));
    }
    Ok(())
}

/// Accepts `api.dnsimple.com`, `api.sandbox.dnsimple.com:443`, `localhost`.
pub fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    let (host, port) = match hostname.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (hostname, None),
    };

    let host = host.trim_end_matches('.');
    if host.is_empty() {
        return Err(ValidationError::EmptyHostname);
    }
    for label in host.split('.') {
        validate_label(label)?;
    }

    if let Some(port) = port {
        if port.parse::<u16>().is_err() {
            return Err(ValidationError::InvalidPort(port.to_string()));
        }
    }

    Ok(())
}

/// A resource path is joined onto the versioned API base, so it must stay
/// inside it. A query string is allowed.
pub fn validate_resource_path(path: &str) -> Result<(), ValidationError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if SCHEME_RE.is_match(path) || path.starts_with("//") {
        return Err(ValidationError::AbsolutePath(path.to_string()));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(ValidationError::Whitespace);
    }

    let route = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    if route.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::ParentSegment);
    }

    Ok(())
}
