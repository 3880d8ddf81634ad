//! Credential extraction from requests.
//!
//! Tokens arrive either as `Authorization: Bearer <token>` or as a `token`
//! query parameter. The query form must stay supported: `<img>` and iframe
//! style embeds cannot set request headers.

use std::collections::HashMap;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Pull the bearer credential out of a request, header first.
#[must_use]
pub fn extract(headers: &HeaderMap, query: &HashMap<String, String>) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                if !token.is_empty() {
                    return Some(token.to_owned());
                }
            }
        }
    }

    query.get("token").filter(|t| !t.is_empty()).cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-a"));
        let query = HashMap::from([("token".to_owned(), "tok-b".to_owned())]);

        assert_eq!(extract(&headers, &query), Some("tok-a".to_owned()));
    }

    #[test]
    fn query_param_is_the_fallback() {
        let headers = HeaderMap::new();
        let query = HashMap::from([("token".to_owned(), "tok-b".to_owned())]);

        assert_eq!(extract(&headers, &query), Some("tok-b".to_owned()));
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        let query = HashMap::new();

        assert_eq!(extract(&headers, &query), None);
    }

    #[test]
    fn empty_everything_is_none() {
        assert_eq!(extract(&HeaderMap::new(), &HashMap::new()), None);
    }
}
