//! Owned snapshot of a dispatched HTTP response.
//!
//! The [`Response`] type keeps the raw body together with everything the
//! failure diagnoser needs: status, headers, parsed link relations and the URL
//! the request was sent to. Deserialization is left to the caller via
//! [`Response::json`].

use crate::link::Links;
use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A response returned by the WordPress API.
///
/// # Examples
///
/// ```no_run
/// use wordpress_api::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Post {
///     id: u64,
/// }
///
/// # async fn example() -> Result<(), wordpress_api::Error> {
/// let client = Client::builder()
///     .url("https://site.example")
///     .consumer_key("ck_xxx")
///     .consumer_secret("cs_xxx")
///     .build()?;
///
/// let response = client.get("posts").await?;
/// println!("Status: {}", response.status);
/// println!("Request took {:?}", response.latency);
///
/// let posts: Vec<Post> = response.json()?;
/// println!("Fetched {} posts", posts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Link relations parsed from the `Link` headers.
    pub links: Links,

    /// The raw response body.
    pub body: Vec<u8>,

    /// The URL the request was dispatched to, when known.
    pub request_url: Option<Url>,

    /// Time from dispatch until the full body was received.
    pub latency: Duration,
}

impl Response {
    /// Creates a new `Response`, parsing link relations from `headers`.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
        request_url: Option<Url>,
        latency: Duration,
    ) -> Self {
        let links = Links::from_headers(&headers);
        Self {
            status,
            headers,
            links,
            body,
            request_url,
            latency,
        }
    }

    /// Returns `true` for the status codes the API treats as success.
    pub fn is_success(&self) -> bool {
        matches!(self.status, StatusCode::OK | StatusCode::CREATED)
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body when the
    /// body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::DeserializationFailed {
            raw_response: self.text(),
            serde_error: e.to_string(),
            status: self.status,
        })
    }

    /// Returns a reference to a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wordpress_api::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-wp-total", HeaderValue::from_static("42"));
    ///
    /// let response = Response::new(
    ///     StatusCode::OK,
    ///     headers,
    ///     b"[]".to_vec(),
    ///     None,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(response.header("x-wp-total"), Some("42"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde::Deserialize;

    fn response(status: StatusCode, body: &[u8]) -> Response {
        Response::new(
            status,
            HeaderMap::new(),
            body.to_vec(),
            None,
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_success_is_only_200_and_201() {
        assert!(response(StatusCode::OK, b"").is_success());
        assert!(response(StatusCode::CREATED, b"").is_success());
        assert!(!response(StatusCode::NO_CONTENT, b"").is_success());
        assert!(!response(StatusCode::NOT_FOUND, b"").is_success());
    }

    #[test]
    fn test_json_success_and_failure() {
        #[derive(Deserialize)]
        struct Post {
            id: u64,
        }

        let ok = response(StatusCode::OK, br#"{"id": 7}"#);
        assert_eq!(ok.json::<Post>().unwrap().id, 7);

        let bad = response(StatusCode::OK, b"<html>");
        match bad.json::<Post>() {
            Err(Error::DeserializationFailed { raw_response, status, .. }) => {
                assert_eq!(raw_response, "<html>");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_links_are_parsed_on_construction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "link",
            HeaderValue::from_static(r#"<https://a.example/wp-json/>; rel="https://api.w.org/""#),
        );
        let response = Response::new(StatusCode::OK, headers, Vec::new(), None, Duration::ZERO);
        assert_eq!(
            response.links.get(crate::link::API_ROOT_REL).unwrap().url,
            "https://a.example/wp-json/"
        );
    }
}
