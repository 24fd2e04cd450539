use std::time::Duration;

use anyhow::{Result, anyhow};
use hyper::header::HeaderValue;
use tracing::{debug, warn};

/// Build a `Set-Cookie` value.
pub fn set_cookie(
    name: &str,
    value: &str,
    max_age: Option<Duration>,
    path: Option<&str>,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}", name, value);

    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age.as_secs()));
    }

    if let Some(p) = path {
        cookie.push_str(&format!("; Path={}", p));
    }

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Strict");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| {
        warn!("Failed to create cookie header for {}: {}", name, e);
        anyhow!("Invalid cookie value: {}", e)
    })
}

/// Cookie that lives as long as the token inside it.
pub fn create_persistent_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    secure: bool,
) -> Result<HeaderValue> {
    set_cookie(name, value, Some(max_age), Some("/"), true, secure)
}

/// Expire a cookie immediately.
pub fn delete_cookie(name: &str) -> Result<HeaderValue> {
    debug!("Deleting cookie: {}", name);
    set_cookie(name, "", Some(Duration::from_secs(0)), Some("/"), true, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_cookie_expires_now() {
        let value = delete_cookie("token").unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("token=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("HttpOnly"));
    }

    #[test]
    fn persistent_cookie_carries_max_age() {
        let value =
            create_persistent_cookie("token", "t", Duration::from_secs(86_400), false).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "token=t; Max-Age=86400; Path=/; HttpOnly; SameSite=Strict"
        );
    }
}
