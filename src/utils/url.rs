//! Endpoint URL helpers.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use qllama::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/v1/"), "http://localhost:8000/v1");
/// assert_eq!(normalize_base_url(" http://gpu-box:8000/v1// "), "http://gpu-box:8000/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use qllama::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/v1/", "/chat/completions"),
///     "http://localhost:8000/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

/// Whether `url` looks like something reqwest can reach: an `http` or
/// `https` scheme followed by a host.
pub fn is_http_endpoint(url: &str) -> bool {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let rest = if lower.starts_with("http://") {
        &url["http://".len()..]
    } else if lower.starts_with("https://") {
        &url["https://".len()..]
    } else {
        return false;
    };
    !rest.trim_start_matches('/').is_empty() && !rest.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_api_url_variants() {
        for base in [
            "http://localhost:8000/v1",
            "http://localhost:8000/v1/",
            "http://localhost:8000/v1///",
        ] {
            assert_eq!(
                construct_api_url(base, "models"),
                "http://localhost:8000/v1/models",
                "base={base}"
            );
        }
        assert_eq!(
            construct_api_url("http://localhost:8000/v1", "//chat/completions"),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_is_http_endpoint() {
        assert!(is_http_endpoint("http://localhost:8000/v1"));
        assert!(is_http_endpoint("HTTPS://api.example.com"));
        assert!(!is_http_endpoint("localhost:8000"));
        assert!(!is_http_endpoint("ftp://example.com"));
        assert!(!is_http_endpoint("http://"));
        assert!(!is_http_endpoint("http:///v1"));
    }
}
