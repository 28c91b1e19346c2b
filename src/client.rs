//! The authenticated request pipeline.
//!
//! The [`Client`] type is the main entry point for making API calls.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    auth::{Auth, AuthMethod, Credentials, HandshakeState, OAuth3Leg, SignatureMethod, Token},
    diagnose::ensure_success,
    transport::{ClientConfig, Requester},
    Error, Response, Result,
};
use http::Method;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A WordPress REST API client bound to one authentication scheme.
///
/// The client is cheap to clone and can be shared between tasks. Every call
/// is a single attempt: it returns the response when the status is 200 or
/// 201 and an [`Error::RequestFailed`] diagnosis otherwise.
///
/// # Examples
///
/// ```no_run
/// use wordpress_api::{AuthMethod, Client};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), wordpress_api::Error> {
/// let client = Client::builder()
///     .url("https://site.example")
///     .consumer_key("ck_xxx")
///     .consumer_secret("cs_xxx")
///     .auth_method(AuthMethod::Basic)
///     .build()?;
///
/// // GET request
/// let posts = client.get("posts?per_page=5").await?;
/// println!("{}", posts.text());
///
/// // POST request
/// let created = client
///     .post("posts", &json!({ "title": "Café", "status": "draft" }))
///     .await?;
/// println!("Created: {}", created.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    requester: Requester,
    auth: Auth,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Makes one authenticated request.
    ///
    /// The endpoint is resolved against the versioned API root, signed by the
    /// bound auth strategy and dispatched once. A body is sent as UTF-8 JSON.
    pub async fn call<Req>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Req>,
    ) -> Result<Response>
    where
        Req: Serialize + ?Sized,
    {
        let requester = &self.inner.requester;

        let url = requester.endpoint_url(endpoint)?;
        let url = self.inner.auth.get_auth_url(url, &method)?;
        let auth = self.inner.auth.get_auth()?;
        let body = body.map(encode_body).transpose()?;

        let response = requester.request(method, url, &auth, body).await?;
        ensure_success(response, requester)
    }

    /// Makes a GET request to the specified endpoint.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wordpress_api::Client;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Post { id: u64 }
    ///
    /// # async fn example() -> Result<(), wordpress_api::Error> {
    /// let client = Client::builder()
    ///     .url("https://site.example")
    ///     .consumer_key("ck_xxx")
    ///     .consumer_secret("cs_xxx")
    ///     .build()?;
    ///
    /// let post: Post = client.get("posts/1").await?.json()?;
    /// println!("Post ID: {}", post.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.call::<()>(Method::GET, endpoint, None).await
    }

    /// Makes a POST request to the specified endpoint with a JSON body.
    pub async fn post<Req>(&self, endpoint: &str, data: &Req) -> Result<Response>
    where
        Req: Serialize + ?Sized,
    {
        self.call(Method::POST, endpoint, Some(data)).await
    }

    /// Makes a PUT request to the specified endpoint with a JSON body.
    pub async fn put<Req>(&self, endpoint: &str, data: &Req) -> Result<Response>
    where
        Req: Serialize + ?Sized,
    {
        self.call(Method::PUT, endpoint, Some(data)).await
    }

    /// Makes a DELETE request to the specified endpoint.
    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.call::<()>(Method::DELETE, endpoint, None).await
    }

    /// Makes an OPTIONS request to the specified endpoint.
    pub async fn options(&self, endpoint: &str) -> Result<Response> {
        self.call::<()>(Method::OPTIONS, endpoint, None).await
    }

    /// The transport wrapper, for building URLs by hand.
    pub fn requester(&self) -> &Requester {
        &self.inner.requester
    }

    /// The bound authentication strategy.
    pub fn auth(&self) -> &Auth {
        &self.inner.auth
    }

    /// The site URL.
    pub fn url(&self) -> &str {
        self.inner.requester.url()
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.requester.timeout()
    }

    /// The API namespace.
    pub fn namespace(&self) -> &str {
        self.inner.requester.namespace()
    }

    /// The API version.
    pub fn version(&self) -> &str {
        self.inner.requester.version()
    }

    /// Whether TLS certificates are verified.
    pub fn verify_ssl(&self) -> bool {
        self.inner.requester.verify_ssl()
    }

    /// Whether the site URL uses `https`.
    pub fn is_ssl(&self) -> bool {
        self.inner.requester.is_ssl()
    }

    /// The consumer key.
    pub fn consumer_key(&self) -> &str {
        self.inner.auth.consumer_key()
    }

    /// The consumer secret.
    pub fn consumer_secret(&self) -> &str {
        self.inner.auth.consumer_secret()
    }

    /// The callback URL, if one was configured.
    pub fn callback(&self) -> Option<&str> {
        self.inner.auth.callback()
    }

    /// Starts the three-legged handshake and returns the URL the user must
    /// visit to authorize this application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] unless the client uses
    /// [`AuthMethod::OAuth1a3Leg`].
    pub async fn begin_authorization(&self) -> Result<Url> {
        self.three_leg()?
            .begin_authorization(&self.inner.requester)
            .await
    }

    /// Finishes the three-legged handshake with the verifier the user
    /// received, returning the access token.
    pub async fn complete_authorization(&self, verifier: &str) -> Result<Token> {
        self.three_leg()?
            .complete_authorization(&self.inner.requester, verifier)
            .await
    }

    /// Restores a previously negotiated three-legged access token.
    pub fn set_access_token(&self, token: Token) -> Result<()> {
        self.three_leg()?.set_access_token(token);
        Ok(())
    }

    /// The three-legged access token, once authorized.
    pub fn access_token(&self) -> Option<Token> {
        self.inner.auth.as_three_leg()?.access_token()
    }

    /// The three-legged handshake state.
    pub fn auth_state(&self) -> Option<HandshakeState> {
        self.inner.auth.as_three_leg().map(OAuth3Leg::state)
    }

    fn three_leg(&self) -> Result<&OAuth3Leg> {
        self.inner.auth.as_three_leg().ok_or_else(|| {
            Error::ConfigurationError(
                "Handshake requires AuthMethod::OAuth1a3Leg".to_string(),
            )
        })
    }
}

/// Encodes a request body as UTF-8 JSON with non-ASCII text left unescaped.
pub(crate) fn encode_body<Req>(body: &Req) -> Result<Vec<u8>>
where
    Req: Serialize + ?Sized,
{
    serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use wordpress_api::{AuthMethod, ClientBuilder};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), wordpress_api::Error> {
/// let client = ClientBuilder::new()
///     .url("https://site.example")
///     .consumer_key("ck_xxx")
///     .consumer_secret("cs_xxx")
///     .auth_method(AuthMethod::OAuth1a3Leg)
///     .callback("https://app.example/oauth/callback")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    url: Option<String>,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    callback: Option<String>,
    auth_method: AuthMethod,
    signature_method: SignatureMethod,
    query_string_auth: bool,
    namespace: Option<String>,
    version: Option<String>,
    timeout: Option<Duration>,
    verify_ssl: Option<bool>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the site URL, e.g. `https://site.example`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the consumer key.
    pub fn consumer_key(mut self, key: impl Into<String>) -> Self {
        self.consumer_key = Some(key.into());
        self
    }

    /// Sets the consumer secret.
    pub fn consumer_secret(mut self, secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(secret.into());
        self
    }

    /// Sets the callback URL used by three-legged OAuth.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Selects the authentication scheme. Defaults to two-legged OAuth.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    /// Selects the OAuth signature method. Defaults to `HMAC-SHA1`.
    pub fn signature_method(mut self, method: SignatureMethod) -> Self {
        self.signature_method = method;
        self
    }

    /// Sends Basic credentials as query parameters instead of a header.
    pub fn query_string_auth(mut self, enabled: bool) -> Self {
        self.query_string_auth = enabled;
        self
    }

    /// Sets the API namespace. Defaults to `wp-json`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the API version. Defaults to `wp/v2`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the request timeout. Defaults to 5 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables TLS certificate verification. Enabled by default.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configured `Client`.
    ///
    /// No network activity takes place here, including for three-legged
    /// OAuth; see [`Client::begin_authorization`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] for three-legged OAuth without a
    /// callback, and [`Error::ConfigurationError`] or [`Error::InvalidUrl`]
    /// for a missing or invalid URL or missing credentials.
    pub fn build(self) -> Result<Client> {
        let url = self
            .url
            .ok_or_else(|| Error::ConfigurationError("URL is required".to_string()))?;
        let consumer_key = self
            .consumer_key
            .ok_or_else(|| Error::ConfigurationError("Consumer key is required".to_string()))?;
        let consumer_secret = self.consumer_secret.ok_or_else(|| {
            Error::ConfigurationError("Consumer secret is required".to_string())
        })?;

        let mut credentials = Credentials::new(consumer_key, consumer_secret);
        credentials.callback = self.callback;
        let auth = Auth::new(
            self.auth_method,
            credentials,
            self.signature_method,
            self.query_string_auth,
        )?;

        let mut config = ClientConfig::new(url);
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(version) = self.version {
            config.version = version;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(verify_ssl) = self.verify_ssl {
            config.verify_ssl = verify_ssl;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        let requester = Requester::new(config)?;

        Ok(Client {
            inner: Arc::new(ClientInner { requester, auth }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> ClientBuilder {
        Client::builder()
            .url("https://site.example")
            .consumer_key("ck_key")
            .consumer_secret("cs_secret")
    }

    #[test]
    fn test_encode_body_keeps_non_ascii() {
        let body = json!({ "title": "Crème brûlée", "tags": ["日本語"] });
        let encoded = encode_body(&body).unwrap();
        let text = String::from_utf8(encoded).unwrap();

        assert!(text.contains("Crème brûlée"));
        assert!(text.contains("日本語"));
        assert!(!text.contains("\\u"));

        let decoded: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded["title"], "Crème brûlée");
    }

    #[test]
    fn test_configuration_accessors() {
        let client = builder()
            .namespace("api")
            .version("wc/v3")
            .timeout(Duration::from_secs(30))
            .verify_ssl(false)
            .build()
            .unwrap();

        assert_eq!(client.url(), "https://site.example");
        assert_eq!(client.namespace(), "api");
        assert_eq!(client.version(), "wc/v3");
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert!(!client.verify_ssl());
        assert!(client.is_ssl());
        assert_eq!(client.consumer_key(), "ck_key");
        assert_eq!(client.consumer_secret(), "cs_secret");
        assert_eq!(client.callback(), None);
        assert_eq!(client.auth().method(), AuthMethod::OAuth1a);
        assert_eq!(client.auth_state(), None);
    }

    #[test]
    fn test_three_leg_without_callback_fails_to_build() {
        let result = builder().auth_method(AuthMethod::OAuth1a3Leg).build();
        assert!(matches!(result, Err(Error::MissingCallback)));

        let client = builder()
            .auth_method(AuthMethod::OAuth1a3Leg)
            .callback("https://app.example/cb")
            .build()
            .unwrap();
        assert_eq!(client.callback(), Some("https://app.example/cb"));
        assert_eq!(client.auth_state(), Some(HandshakeState::Unauthorized));
        assert!(client.access_token().is_none());
    }

    #[test]
    fn test_missing_settings_are_rejected() {
        assert!(matches!(
            Client::builder().consumer_key("k").consumer_secret("s").build(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            Client::builder().url("https://site.example").consumer_secret("s").build(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            builder().url("site.example").build(),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_handshake_methods_need_three_leg() {
        let client = builder().auth_method(AuthMethod::Basic).build().unwrap();
        assert!(matches!(
            client.set_access_token(Token::new("a", "b")),
            Err(Error::ConfigurationError(_))
        ));
    }
}
