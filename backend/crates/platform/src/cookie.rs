//! Cookie Management Infrastructure
//!
//! Session cookies are issued by the identity provider; this service only
//! reads them.

use axum::http::{HeaderMap, header};

/// Extract a cookie value from headers
///
/// All `Cookie` headers are searched, the first matching name wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; auth_session=abc.123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "auth_session"),
            Some("abc.123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("auth_session=tok"));

        assert_eq!(
            extract_cookie(&headers, "auth_session"),
            Some("tok".to_string())
        );
    }

    #[test]
    fn test_extract_cookie_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_session="));

        assert_eq!(extract_cookie(&headers, "auth_session"), None);
    }
}
