//! Small string helpers for composing API URLs.

use url::Url;

/// Joins URL components with single `/` separators, skipping empty ones.
///
/// Trailing slashes on the first component and leading slashes on the rest
/// are collapsed, so `["https://a.example/", "/wp-json"]` joins to
/// `https://a.example/wp-json`.
pub(crate) fn join_components<S: AsRef<str>>(components: &[S]) -> String {
    let mut joined = String::new();
    for component in components.iter().map(AsRef::as_ref) {
        if component.is_empty() {
            continue;
        }
        if joined.is_empty() {
            joined.push_str(component);
            continue;
        }
        let trimmed = component.trim_start_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        while joined.ends_with('/') {
            joined.pop();
        }
        joined.push('/');
        joined.push_str(trimmed);
    }
    joined
}

/// Removes `prefix` from the start of `s` once, if present.
pub(crate) fn decapitate<'a>(s: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return s;
    }
    s.strip_prefix(prefix).unwrap_or(s)
}

/// Removes `suffix` from the end of `s` once, if present.
pub(crate) fn eviscerate<'a>(s: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return s;
    }
    s.strip_suffix(suffix).unwrap_or(s)
}

/// Returns `true` if the URL uses the `https` scheme.
pub(crate) fn is_ssl(url: &str) -> bool {
    url.get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Query parameters whose values must never be shown.
const CREDENTIAL_PARAMS: &[&str] = &[
    "consumer_key",
    "consumer_secret",
    "oauth_consumer_key",
    "oauth_token",
    "oauth_signature",
    "oauth_verifier",
];

/// Renders `url` with the values of credential query parameters masked.
///
/// Other query pairs are kept so the report still shows what was asked for.
pub(crate) fn mask_credentials(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if CREDENTIAL_PARAMS.contains(&name.as_ref()) {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
