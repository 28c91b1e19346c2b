//! Three-legged OAuth 1.0a.
//!
//! Requests can only be signed once the handshake has produced an access
//! token:
//!
//! 1. [`OAuth3Leg::begin_authorization`] discovers the site's OAuth endpoints,
//!    obtains temporary credentials and returns the URL the user must visit.
//! 2. The user approves the application and is redirected to the callback
//!    with an `oauth_verifier`.
//! 3. [`OAuth3Leg::complete_authorization`] exchanges the verifier for the
//!    access token.
//!
//! A token obtained earlier can be restored with
//! [`OAuth3Leg::set_access_token`], skipping the handshake.

use super::signature::{SignatureMethod, Signer};
use super::{AuthCredential, Credentials, Token};
use crate::diagnose::ensure_success;
use crate::transport::Requester;
use crate::{Error, Result};
use http::Method;
use serde::Deserialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Where the handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// No handshake has been started.
    Unauthorized,
    /// Temporary credentials were issued; waiting for the user's verifier.
    PendingAuthorization,
    /// An access token is available and requests can be signed.
    Authorized,
}

impl HandshakeState {
    /// A short lowercase name for messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeState::Unauthorized => "unauthorized",
            HandshakeState::PendingAuthorization => "pending authorization",
            HandshakeState::Authorized => "authorized",
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The OAuth 1.0a endpoints advertised in the API index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// Temporary credential request endpoint.
    pub request: Url,
    /// User authorization endpoint.
    pub authorize: Url,
    /// Token exchange endpoint.
    pub access: Url,
}

#[derive(Deserialize)]
struct RawEndpoints {
    request: String,
    authorize: String,
    access: String,
}

#[derive(Debug)]
enum Handshake {
    Unauthorized,
    Pending {
        endpoints: OAuthEndpoints,
        request_token: Token,
    },
    Authorized {
        access_token: Token,
    },
}

impl Handshake {
    fn state(&self) -> HandshakeState {
        match self {
            Handshake::Unauthorized => HandshakeState::Unauthorized,
            Handshake::Pending { .. } => HandshakeState::PendingAuthorization,
            Handshake::Authorized { .. } => HandshakeState::Authorized,
        }
    }
}

/// Three-legged OAuth 1.0a strategy.
///
/// The handshake state is shared by every call made through the same client.
/// It is guarded by a mutex that is never held across a network call, so
/// concurrent handshakes on one client are not serialized: the last one to
/// finish wins.
#[derive(Debug)]
pub struct OAuth3Leg {
    credentials: Credentials,
    callback: String,
    signature_method: SignatureMethod,
    handshake: Mutex<Handshake>,
}

impl OAuth3Leg {
    /// Creates a three-legged strategy in the unauthorized state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if `credentials` has no callback URL.
    pub fn new(credentials: Credentials, signature_method: SignatureMethod) -> Result<Self> {
        let callback = credentials.callback.clone().ok_or(Error::MissingCallback)?;
        Ok(Self {
            credentials,
            callback,
            signature_method,
            handshake: Mutex::new(Handshake::Unauthorized),
        })
    }

    /// The credentials this strategy signs with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The callback URL the user is redirected to after authorizing.
    pub fn callback(&self) -> &str {
        &self.callback
    }

    /// The current handshake state.
    pub fn state(&self) -> HandshakeState {
        self.lock().state()
    }

    /// The negotiated access token, once authorized.
    pub fn access_token(&self) -> Option<Token> {
        match &*self.lock() {
            Handshake::Authorized { access_token } => Some(access_token.clone()),
            _ => None,
        }
    }

    /// Restores a previously negotiated access token.
    pub fn set_access_token(&self, access_token: Token) {
        tracing::debug!(state = "authorized", "Access token restored");
        *self.lock() = Handshake::Authorized { access_token };
    }

    /// Reads the OAuth endpoints from the API index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Handshake`] if the index does not advertise OAuth 1.0a.
    pub async fn discover(&self, requester: &Requester) -> Result<OAuthEndpoints> {
        let index_url = Url::parse(&requester.api_url())?;
        let response = requester
            .request(Method::GET, index_url, &AuthCredential::None, None)
            .await?;
        let response = ensure_success(response, requester)?;

        let index: serde_json::Value = response.json()?;
        let raw = index
            .pointer("/authentication/oauth1")
            .cloned()
            .ok_or_else(|| {
                Error::Handshake("API index does not advertise OAuth 1.0a endpoints".to_string())
            })?;
        let raw: RawEndpoints = serde_json::from_value(raw)
            .map_err(|e| Error::Handshake(format!("Malformed OAuth 1.0a endpoints: {}", e)))?;

        Ok(OAuthEndpoints {
            request: Url::parse(&raw.request)?,
            authorize: Url::parse(&raw.authorize)?,
            access: Url::parse(&raw.access)?,
        })
    }

    /// Obtains temporary credentials and returns the user authorization URL.
    ///
    /// Any previous handshake state, including an access token, is replaced.
    pub async fn begin_authorization(&self, requester: &Requester) -> Result<Url> {
        let endpoints = self.discover(requester).await?;

        let signer = Signer {
            consumer_key: &self.credentials.consumer_key,
            consumer_secret: &self.credentials.consumer_secret,
            token: None,
            method: self.signature_method,
            extra: vec![("oauth_callback", self.callback.clone())],
        };
        let url = signer.sign_url(&endpoints.request, &Method::GET);
        let response = requester
            .request(Method::GET, url, &AuthCredential::None, None)
            .await?;
        let response = ensure_success(response, requester)?;
        let request_token = parse_token(&response.body)?;

        let mut authorize_url = endpoints.authorize.clone();
        authorize_url
            .query_pairs_mut()
            .append_pair("oauth_token", &request_token.key)
            .append_pair("oauth_callback", &self.callback);

        tracing::debug!(state = "pending authorization", "Temporary credentials obtained");
        *self.lock() = Handshake::Pending {
            endpoints,
            request_token,
        };

        Ok(authorize_url)
    }

    /// Exchanges the user's verifier for the access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] if no authorization is pending, and
    /// [`Error::Handshake`] if the pending authorization was replaced while
    /// the exchange was in flight.
    pub async fn complete_authorization(
        &self,
        requester: &Requester,
        verifier: &str,
    ) -> Result<Token> {
        let (access_url, request_token) = match &*self.lock() {
            Handshake::Pending {
                endpoints,
                request_token,
            } => (endpoints.access.clone(), request_token.clone()),
            other => {
                return Err(Error::NotAuthorized {
                    state: other.state().as_str(),
                })
            }
        };

        let signer = Signer {
            consumer_key: &self.credentials.consumer_key,
            consumer_secret: &self.credentials.consumer_secret,
            token: Some(&request_token),
            method: self.signature_method,
            extra: vec![("oauth_verifier", verifier.to_string())],
        };
        let url = signer.sign_url(&access_url, &Method::POST);
        let response = requester
            .request(Method::POST, url, &AuthCredential::None, None)
            .await?;
        let response = ensure_success(response, requester)?;
        let access_token = parse_token(&response.body)?;

        let mut handshake = self.lock();
        match &*handshake {
            Handshake::Pending {
                request_token: current,
                ..
            } if current.key == request_token.key => {}
            _ => {
                return Err(Error::Handshake(
                    "authorization was restarted during the token exchange".to_string(),
                ))
            }
        }
        tracing::debug!(state = "authorized", "Access token obtained");
        *handshake = Handshake::Authorized {
            access_token: access_token.clone(),
        };

        Ok(access_token)
    }

    /// Signs `url` with the access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] before the handshake has completed.
    pub fn get_auth_url(&self, url: &Url, method: &Method) -> Result<Url> {
        let access_token = self.authorized_token()?;
        let signer = Signer {
            consumer_key: &self.credentials.consumer_key,
            consumer_secret: &self.credentials.consumer_secret,
            token: Some(&access_token),
            method: self.signature_method,
            extra: Vec::new(),
        };
        Ok(signer.sign_url(url, method))
    }

    /// The negotiated access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] before the handshake has completed.
    pub fn get_auth(&self) -> Result<AuthCredential> {
        Ok(AuthCredential::AccessToken(self.authorized_token()?))
    }

    fn authorized_token(&self) -> Result<Token> {
        match &*self.lock() {
            Handshake::Authorized { access_token } => Ok(access_token.clone()),
            other => Err(Error::NotAuthorized {
                state: other.state().as_str(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Handshake> {
        self.handshake.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parses an `oauth_token=..&oauth_token_secret=..` form body.
fn parse_token(body: &[u8]) -> Result<Token> {
    let mut key = None;
    let mut secret = None;
    for (name, value) in url::form_urlencoded::parse(body) {
        match name.as_ref() {
            "oauth_token" => key = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }
    match (key, secret) {
        (Some(key), Some(secret)) => Ok(Token::new(key, secret)),
        _ => Err(Error::Handshake(format!(
            "response is missing oauth_token or oauth_token_secret: {}",
            String::from_utf8_lossy(body)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::query_value;

    fn three_leg() -> OAuth3Leg {
        let credentials =
            Credentials::new("ck_key", "cs_secret").with_callback("https://app.example/callback");
        OAuth3Leg::new(credentials, SignatureMethod::HmacSha1).unwrap()
    }

    #[test]
    fn test_missing_callback_is_rejected() {
        for (key, secret) in [("ck", "cs"), ("", ""), ("key with space", "sécret")] {
            let result = OAuth3Leg::new(Credentials::new(key, secret), SignatureMethod::HmacSha1);
            assert!(matches!(result, Err(Error::MissingCallback)));
        }
    }

    #[test]
    fn test_signing_is_gated_on_authorization() {
        let auth = three_leg();
        assert_eq!(auth.state(), HandshakeState::Unauthorized);
        assert_eq!(auth.callback(), "https://app.example/callback");

        let url = Url::parse("https://site.example/wp-json/wp/v2/posts").unwrap();
        assert!(matches!(
            auth.get_auth_url(&url, &Method::GET),
            Err(Error::NotAuthorized { state: "unauthorized" })
        ));
        assert!(matches!(
            auth.get_auth(),
            Err(Error::NotAuthorized { state: "unauthorized" })
        ));
    }

    #[test]
    fn test_restored_token_signs_requests() {
        let auth = three_leg();
        let token = Token::new("acc", "acc_secret");
        auth.set_access_token(token.clone());

        assert_eq!(auth.state(), HandshakeState::Authorized);
        assert_eq!(auth.access_token(), Some(token.clone()));
        assert_eq!(auth.get_auth().unwrap(), AuthCredential::AccessToken(token));

        let url = Url::parse("https://site.example/wp-json/wp/v2/posts").unwrap();
        let signed = auth.get_auth_url(&url, &Method::DELETE).unwrap();
        assert_eq!(query_value(&signed, "oauth_token").as_deref(), Some("acc"));
        assert!(query_value(&signed, "oauth_signature").is_some());
    }

    #[test]
    fn test_parse_token() {
        let token =
            parse_token(b"oauth_token=abc&oauth_token_secret=d%26f&oauth_callback_confirmed=true")
                .unwrap();
        assert_eq!(token, Token::new("abc", "d&f"));

        assert!(matches!(
            parse_token(b"oauth_token=abc"),
            Err(Error::Handshake(_))
        ));
    }
}
