use super::signature::{SignatureMethod, Signer};
use super::{AuthCredential, Credentials};
use http::Method;
use url::Url;

/// Two-legged OAuth 1.0a: every request URL is signed with the consumer
/// credentials alone.
///
/// Each call to [`get_auth_url`](Self::get_auth_url) draws a new nonce and
/// timestamp, so signing the same URL twice yields different signatures.
#[derive(Debug, Clone)]
pub struct OAuth {
    credentials: Credentials,
    signature_method: SignatureMethod,
}

impl OAuth {
    /// Creates a two-legged strategy.
    pub fn new(credentials: Credentials, signature_method: SignatureMethod) -> Self {
        Self {
            credentials,
            signature_method,
        }
    }

    /// The credentials this strategy signs with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The configured signature method.
    pub fn signature_method(&self) -> SignatureMethod {
        self.signature_method
    }

    /// Returns `url` with the `oauth_*` parameters and signature appended.
    pub fn get_auth_url(&self, url: &Url, method: &Method) -> Url {
        self.signer().sign_url(url, method)
    }

    /// The signature travels in the URL, so no further credential is needed.
    pub fn get_auth(&self) -> AuthCredential {
        AuthCredential::None
    }

    fn signer(&self) -> Signer<'_> {
        Signer {
            consumer_key: &self.credentials.consumer_key,
            consumer_secret: &self.credentials.consumer_secret,
            token: None,
            method: self.signature_method,
            extra: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::query_value;

    fn oauth() -> OAuth {
        OAuth::new(Credentials::new("ck_key", "cs_secret"), SignatureMethod::HmacSha1)
    }

    fn without(url: &Url, names: &[&str]) -> Vec<(String, String)> {
        url.query_pairs()
            .filter(|(k, _)| !names.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_signed_url_is_structurally_valid() {
        let url = Url::parse("https://site.example/wp-json/wp/v2/posts?per_page=3").unwrap();
        let signed = oauth().get_auth_url(&url, &Method::GET);

        assert_eq!(signed.path(), url.path());
        assert_eq!(signed.host_str(), url.host_str());
        assert_eq!(query_value(&signed, "per_page").as_deref(), Some("3"));
        assert_eq!(query_value(&signed, "oauth_consumer_key").as_deref(), Some("ck_key"));
        assert_eq!(
            query_value(&signed, "oauth_signature_method").as_deref(),
            Some("HMAC-SHA1")
        );
        let timestamp = query_value(&signed, "oauth_timestamp").unwrap();
        assert!(timestamp.parse::<u64>().is_ok());
        assert!(query_value(&signed, "oauth_nonce").is_some());
        assert!(query_value(&signed, "oauth_signature").is_some());
        assert!(query_value(&signed, "oauth_token").is_none());
        assert_eq!(oauth().get_auth(), AuthCredential::None);
    }

    #[test]
    fn test_successive_signatures_differ_but_rest_is_stable() {
        let auth = oauth();
        let url = Url::parse("https://site.example/wp-json/wp/v2/posts?status=draft").unwrap();
        let first = auth.get_auth_url(&url, &Method::GET);
        let second = auth.get_auth_url(&url, &Method::GET);

        assert_ne!(
            query_value(&first, "oauth_signature"),
            query_value(&second, "oauth_signature")
        );
        let volatile = ["oauth_nonce", "oauth_timestamp", "oauth_signature"];
        assert_eq!(without(&first, &volatile), without(&second, &volatile));
        assert_eq!(first.path(), second.path());
    }

    #[test]
    fn test_method_is_part_of_signature() {
        let auth = oauth();
        let url = Url::parse("https://site.example/wp-json/wp/v2/posts").unwrap();
        let signer = auth.signer();
        let get = signer.sign_url_with(&url, &Method::GET, "fixed", 1);
        let post = signer.sign_url_with(&url, &Method::POST, "fixed", 1);
        assert_ne!(
            query_value(&get, "oauth_signature"),
            query_value(&post, "oauth_signature")
        );
    }
}
