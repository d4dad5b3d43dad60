//! Request inspection.
//!
//! # Responsibilities
//! - Rebuild the URL the client navigated to
//! - Honor `X-Forwarded-Proto` from a fronting proxy
//! - Extract the request ID for log correlation
//!
//! # Design Decisions
//! - Absolute-form request targets win over the Host header
//! - Unknown forwarded schemes fall back to the configured default

use axum::http::{HeaderMap, Uri};

pub const X_REQUEST_ID: &str = "x-request-id";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// URL the client navigated to, or `None` without a usable host.
pub fn navigation_url(headers: &HeaderMap, uri: &Uri, default_scheme: &str) -> Option<String> {
    let host = match uri.authority() {
        Some(authority) => authority.as_str().to_string(),
        None => headers
            .get(axum::http::header::HOST)?
            .to_str()
            .ok()?
            .trim()
            .to_string(),
    };
    if host.is_empty() {
        return None;
    }

    let scheme = uri
        .scheme_str()
        .or_else(|| forwarded_proto(headers))
        .unwrap_or(default_scheme);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    Some(format!("{}://{}{}", scheme, host, path))
}

fn forwarded_proto(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(X_FORWARDED_PROTO)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.eq_ignore_ascii_case("https") {
        Some("https")
    } else if first.eq_ignore_ascii_case("http") {
        Some("http")
    } else {
        None
    }
}

/// Request ID set by the request-id layer, for logging.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_host_and_path() {
        let uri: Uri = "/page?x=1".parse().unwrap();
        let h = headers(&[("host", "old.com")]);
        assert_eq!(
            navigation_url(&h, &uri, "http").as_deref(),
            Some("http://old.com/page?x=1")
        );
    }

    #[test]
    fn test_forwarded_proto() {
        let uri: Uri = "/".parse().unwrap();
        let h = headers(&[("host", "www.old.com"), ("x-forwarded-proto", "https, http")]);
        assert_eq!(
            navigation_url(&h, &uri, "http").as_deref(),
            Some("https://www.old.com/")
        );

        let h = headers(&[("host", "old.com"), ("x-forwarded-proto", "gopher")]);
        assert_eq!(
            navigation_url(&h, &uri, "https").as_deref(),
            Some("https://old.com/")
        );
    }

    #[test]
    fn test_absolute_form() {
        let uri: Uri = "http://old.com:8080/a".parse().unwrap();
        let h = headers(&[("host", "ignored.com")]);
        assert_eq!(
            navigation_url(&h, &uri, "https").as_deref(),
            Some("http://old.com:8080/a")
        );
    }

    #[test]
    fn test_missing_host() {
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(navigation_url(&HeaderMap::new(), &uri, "http"), None);
    }
}
