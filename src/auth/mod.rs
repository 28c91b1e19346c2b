//! Authentication strategies.
//!
//! A client is bound to exactly one [`Auth`] strategy, chosen from
//! [`AuthMethod`] when it is built. Every strategy answers the same two
//! questions for a request:
//!
//! - [`Auth::get_auth_url`]: what URL to send it to, possibly with signature
//!   parameters added;
//! - [`Auth::get_auth`]: which credential the transport should attach.

mod basic;
mod oauth;
mod signature;
mod three_leg;

pub use basic::BasicAuth;
pub use oauth::OAuth;
pub use signature::SignatureMethod;
pub use three_leg::{HandshakeState, OAuth3Leg, OAuthEndpoints};

use crate::Result;
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Which authentication scheme a client uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// HTTP Basic with the consumer key and secret.
    Basic,
    /// Two-legged OAuth 1.0a signed requests.
    #[default]
    OAuth1a,
    /// Three-legged OAuth 1.0a; requires a callback URL.
    OAuth1a3Leg,
}

/// Consumer credentials issued by the site.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The consumer key.
    pub consumer_key: String,
    /// The consumer secret.
    pub consumer_secret: String,
    /// Where the user is sent after authorizing a three-legged handshake.
    pub callback: Option<String>,
}

impl Credentials {
    /// Creates credentials without a callback URL.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback: None,
        }
    }

    /// Sets the callback URL.
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("callback", &self.callback)
            .finish()
    }
}

/// An OAuth token and its secret.
///
/// Serializable so applications can persist an access token and restore it
/// later with [`Client::set_access_token`](crate::Client::set_access_token).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The `oauth_token` value.
    pub key: String,
    /// The `oauth_token_secret` value.
    pub secret: String,
}

impl Token {
    /// Creates a token.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The credential handed to the transport alongside the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Nothing to attach; any signature is already in the URL.
    None,
    /// HTTP Basic credentials.
    Basic {
        /// The user name, i.e. the consumer key.
        username: String,
        /// The password, i.e. the consumer secret.
        password: String,
    },
    /// The three-legged access token the URL was signed with.
    AccessToken(Token),
}

/// The authentication strategy bound to a client.
#[derive(Debug)]
pub enum Auth {
    /// See [`BasicAuth`].
    Basic(BasicAuth),
    /// See [`OAuth`].
    OAuth(OAuth),
    /// See [`OAuth3Leg`].
    OAuth3Leg(OAuth3Leg),
}

impl Auth {
    /// Builds the strategy for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`](crate::Error::MissingCallback) for
    /// [`AuthMethod::OAuth1a3Leg`] without a callback URL.
    pub fn new(
        method: AuthMethod,
        credentials: Credentials,
        signature_method: SignatureMethod,
        query_string_auth: bool,
    ) -> Result<Self> {
        Ok(match method {
            AuthMethod::Basic => Auth::Basic(BasicAuth::new(credentials, query_string_auth)),
            AuthMethod::OAuth1a => Auth::OAuth(OAuth::new(credentials, signature_method)),
            AuthMethod::OAuth1a3Leg => {
                Auth::OAuth3Leg(OAuth3Leg::new(credentials, signature_method)?)
            }
        })
    }

    /// Returns the URL to dispatch to, signed where the scheme requires it.
    ///
    /// # Errors
    ///
    /// Three-legged auth fails with
    /// [`Error::NotAuthorized`](crate::Error::NotAuthorized) until the
    /// handshake completes.
    pub fn get_auth_url(&self, url: Url, method: &Method) -> Result<Url> {
        match self {
            Auth::Basic(auth) => Ok(auth.get_auth_url(url)),
            Auth::OAuth(auth) => Ok(auth.get_auth_url(&url, method)),
            Auth::OAuth3Leg(auth) => auth.get_auth_url(&url, method),
        }
    }

    /// Returns the credential the transport should attach.
    ///
    /// # Errors
    ///
    /// Three-legged auth fails with
    /// [`Error::NotAuthorized`](crate::Error::NotAuthorized) until the
    /// handshake completes.
    pub fn get_auth(&self) -> Result<AuthCredential> {
        match self {
            Auth::Basic(auth) => Ok(auth.get_auth()),
            Auth::OAuth(auth) => Ok(auth.get_auth()),
            Auth::OAuth3Leg(auth) => auth.get_auth(),
        }
    }

    /// The scheme this strategy implements.
    pub fn method(&self) -> AuthMethod {
        match self {
            Auth::Basic(_) => AuthMethod::Basic,
            Auth::OAuth(_) => AuthMethod::OAuth1a,
            Auth::OAuth3Leg(_) => AuthMethod::OAuth1a3Leg,
        }
    }

    /// The credentials the strategy was built with.
    pub fn credentials(&self) -> &Credentials {
        match self {
            Auth::Basic(auth) => auth.credentials(),
            Auth::OAuth(auth) => auth.credentials(),
            Auth::OAuth3Leg(auth) => auth.credentials(),
        }
    }

    /// The consumer key.
    pub fn consumer_key(&self) -> &str {
        &self.credentials().consumer_key
    }

    /// The consumer secret.
    pub fn consumer_secret(&self) -> &str {
        &self.credentials().consumer_secret
    }

    /// The callback URL, if one was configured.
    pub fn callback(&self) -> Option<&str> {
        self.credentials().callback.as_deref()
    }

    /// The three-legged strategy, if that is the bound scheme.
    pub fn as_three_leg(&self) -> Option<&OAuth3Leg> {
        match self {
            Auth::OAuth3Leg(auth) => Some(auth),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_strategy_follows_method() {
        let credentials = Credentials::new("ck", "cs");
        let basic = Auth::new(
            AuthMethod::Basic,
            credentials.clone(),
            SignatureMethod::default(),
            false,
        )
        .unwrap();
        assert_eq!(basic.method(), AuthMethod::Basic);
        assert_eq!(basic.consumer_key(), "ck");
        assert_eq!(basic.consumer_secret(), "cs");
        assert_eq!(basic.callback(), None);

        let oauth = Auth::new(
            AuthMethod::OAuth1a,
            credentials.clone(),
            SignatureMethod::default(),
            false,
        )
        .unwrap();
        assert_eq!(oauth.method(), AuthMethod::OAuth1a);
        assert!(oauth.as_three_leg().is_none());

        assert!(matches!(
            Auth::new(
                AuthMethod::OAuth1a3Leg,
                credentials.clone(),
                SignatureMethod::default(),
                false
            ),
            Err(Error::MissingCallback)
        ));

        let three_leg = Auth::new(
            AuthMethod::OAuth1a3Leg,
            credentials.with_callback("https://app.example/cb"),
            SignatureMethod::default(),
            false,
        )
        .unwrap();
        assert_eq!(three_leg.callback(), Some("https://app.example/cb"));
        assert!(three_leg.as_three_leg().is_some());
    }

    #[test]
    fn test_basic_url_is_identity_through_enum() {
        let auth = Auth::new(
            AuthMethod::Basic,
            Credentials::new("ck", "cs"),
            SignatureMethod::default(),
            false,
        )
        .unwrap();
        let url = Url::parse("https://site.example/wp-json/wp/v2/posts?page=1").unwrap();
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS] {
            assert_eq!(auth.get_auth_url(url.clone(), &method).unwrap(), url);
        }
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let credentials = Credentials::new("ck", "super-secret");
        assert!(!format!("{:?}", credentials).contains("super-secret"));
        let token = Token::new("tok", "token-secret");
        assert!(!format!("{:?}", token).contains("token-secret"));
    }
}
