//! The transport wrapper: API configuration, endpoint URLs and the single
//! network call every request goes through.

use crate::auth::AuthCredential;
use crate::url_utils::{decapitate, is_ssl, join_components};
use crate::{Error, Response, Result};
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::Method;
use std::time::{Duration, Instant};
use url::Url;

/// Default path of the REST API below the site URL.
pub const DEFAULT_NAMESPACE: &str = "wp-json";

/// Default API version below the namespace.
pub const DEFAULT_VERSION: &str = "wp/v2";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("wordpress-api-rs/", env!("CARGO_PKG_VERSION"));

/// Immutable configuration of the remote API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) url: String,
    pub(crate) namespace: String,
    pub(crate) version: String,
    pub(crate) timeout: Duration,
    pub(crate) verify_ssl: bool,
    pub(crate) user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the site at `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verify_ssl: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Builds API URLs and performs the HTTP calls.
///
/// A `Requester` does not interpret status codes; that is left to the
/// request pipeline in [`Client`](crate::Client).
#[derive(Debug)]
pub struct Requester {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl Requester {
    /// Creates a requester for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the site URL is not a valid absolute URL or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.url)?;

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// The site URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// The API namespace, `wp-json` by default.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// The API version, `wp/v2` by default.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Whether TLS certificates are verified.
    pub fn verify_ssl(&self) -> bool {
        self.config.verify_ssl
    }

    /// Whether the site URL uses `https`.
    pub fn is_ssl(&self) -> bool {
        is_ssl(&self.config.url)
    }

    /// The API root, e.g. `https://site.example/wp-json/`.
    ///
    /// This is the form WordPress advertises in its `https://api.w.org/`
    /// link relation, trailing slash included.
    pub fn api_url(&self) -> String {
        let mut api_url = join_components(&[self.config.url.as_str(), self.config.namespace.as_str()]);
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        api_url
    }

    /// The versioned API root, e.g. `https://site.example/wp-json/wp/v2`.
    pub fn api_version_url(&self) -> String {
        join_components(&[
            self.config.url.as_str(),
            self.config.namespace.as_str(),
            self.config.version.as_str(),
        ])
    }

    /// Resolves an endpoint relative to the versioned API root.
    ///
    /// Endpoints that already start with the versioned root are accepted as
    /// well, so URLs taken from a previous response can be passed back in. An
    /// empty endpoint resolves to the namespace index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the composed URL does not parse.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let api_version_url = self.api_version_url();
        let endpoint = decapitate(endpoint, &api_version_url).trim_start_matches('/');
        let joined = join_components(&[api_version_url.as_str(), endpoint]);
        Ok(Url::parse(&joined)?)
    }

    /// Sends one request and returns the response whatever its status.
    ///
    /// Basic credentials become an `Authorization` header; the other
    /// credential kinds are already part of the signed URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when the configured timeout elapses and
    /// [`Error::Network`] for any other transport failure.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        auth: &AuthCredential,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        tracing::debug!(method = %method, url = %redact(&url), "Executing HTTP request");

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .timeout(self.config.timeout);

        if let AuthCredential::Basic { username, password } = auth {
            request = request.basic_auth(username, Some(password));
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body);
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(Error::from_transport)?
            .to_vec();
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            method = %method,
            "Received HTTP response"
        );

        Ok(Response::new(status, headers, body, Some(url), latency))
    }
}

/// Strips the query string, which may carry signatures or credentials.
fn redact(url: &Url) -> &str {
    let full = url.as_str();
    match full.find('?') {
        Some(idx) => &full[..idx],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester(url: &str) -> Requester {
        Requester::new(ClientConfig::new(url)).unwrap()
    }

    #[test]
    fn test_api_urls() {
        let requester = requester("https://site.example");
        assert_eq!(requester.api_url(), "https://site.example/wp-json/");
        assert_eq!(requester.api_version_url(), "https://site.example/wp-json/wp/v2");
        assert!(requester.is_ssl());
        assert!(requester.verify_ssl());
        assert_eq!(requester.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_endpoint_url_has_api_root_as_prefix() {
        let requester = requester("https://site.example/");
        let root = requester.api_version_url();
        for endpoint in ["posts", "posts/1", "users/me", "posts?per_page=5"] {
            let url = requester.endpoint_url(endpoint).unwrap();
            let rest = url.as_str().strip_prefix(root.as_str()).unwrap();
            assert_eq!(rest, format!("/{}", endpoint));
        }
    }

    #[test]
    fn test_endpoint_url_strips_leading_slash_and_root() {
        let requester = requester("http://site.example");
        let expected = "http://site.example/wp-json/wp/v2/posts";
        assert_eq!(requester.endpoint_url("/posts").unwrap().as_str(), expected);
        assert_eq!(
            requester
                .endpoint_url("http://site.example/wp-json/wp/v2/posts")
                .unwrap()
                .as_str(),
            expected
        );
        assert!(!requester.is_ssl());
    }

    #[test]
    fn test_empty_endpoint_is_namespace_index() {
        let requester = requester("https://site.example");
        assert_eq!(
            requester.endpoint_url("").unwrap().as_str(),
            "https://site.example/wp-json/wp/v2"
        );
    }

    #[test]
    fn test_custom_namespace_and_version() {
        let mut config = ClientConfig::new("https://shop.example");
        config.namespace = "api".to_string();
        config.version = "wc/v3".to_string();
        let requester = Requester::new(config).unwrap();
        assert_eq!(requester.api_url(), "https://shop.example/api/");
        assert_eq!(
            requester.endpoint_url("products").unwrap().as_str(),
            "https://shop.example/api/wc/v3/products"
        );
    }

    #[test]
    fn test_invalid_site_url_is_rejected() {
        assert!(matches!(
            Requester::new(ClientConfig::new("not a url")),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_redact_drops_query() {
        let url = Url::parse("https://a.example/x?oauth_signature=abc").unwrap();
        assert_eq!(redact(&url), "https://a.example/x");
    }
}
