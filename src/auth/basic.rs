use super::{AuthCredential, Credentials};
use url::Url;

/// HTTP Basic authentication with the consumer key and secret.
///
/// Some hosts strip the `Authorization` header before it reaches WordPress;
/// for those, `query_string_auth` sends the pair as `consumer_key` and
/// `consumer_secret` query parameters instead.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    credentials: Credentials,
    query_string_auth: bool,
}

impl BasicAuth {
    /// Creates a Basic strategy.
    pub fn new(credentials: Credentials, query_string_auth: bool) -> Self {
        Self {
            credentials,
            query_string_auth,
        }
    }

    /// The credentials this strategy authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns `url` unchanged, or with the credentials appended as query
    /// parameters when query string auth is enabled.
    pub fn get_auth_url(&self, url: Url) -> Url {
        if !self.query_string_auth {
            return url;
        }
        let mut url = url;
        url.query_pairs_mut()
            .append_pair("consumer_key", &self.credentials.consumer_key)
            .append_pair("consumer_secret", &self.credentials.consumer_secret);
        url
    }

    /// The key/secret pair, unless it already travels in the query string.
    pub fn get_auth(&self) -> AuthCredential {
        if self.query_string_auth {
            return AuthCredential::None;
        }
        AuthCredential::Basic {
            username: self.credentials.consumer_key.clone(),
            password: self.credentials.consumer_secret.clone(),
        }
    }
}
