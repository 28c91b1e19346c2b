//! Parsing of `Link` response headers into link relations.
//!
//! WordPress advertises its canonical API root on every response with a
//! header such as:
//!
//! ```text
//! Link: <https://site.example/wp-json/>; rel="https://api.w.org/"
//! ```
//!
//! [`Links`] collects every relation found across all `Link` headers of a
//! response so callers can look them up by relation name.

use http::header::LINK;
use http::HeaderMap;

/// The relation WordPress uses to advertise its REST API root.
pub const API_ROOT_REL: &str = "https://api.w.org/";

/// A single link relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The target URL, exactly as it appeared between `<` and `>`.
    pub url: String,
    /// The relation type.
    pub rel: String,
    /// All parameters of the link, names lowercased.
    pub params: Vec<(String, String)>,
}

impl Link {
    /// Returns the value of a link parameter such as `title` or `type`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The link relations of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    links: Vec<Link>,
}

impl Links {
    /// Collects relations from every `Link` header in `headers`.
    ///
    /// Malformed entries are skipped. Values are decoded as UTF-8, so
    /// internationalized hosts sent unencoded are kept.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut links = Vec::new();
        for value in headers.get_all(LINK) {
            parse_link_value(&String::from_utf8_lossy(value.as_bytes()), &mut links);
        }
        Self { links }
    }

    /// Parses a single `Link` header value.
    pub fn parse(value: &str) -> Self {
        let mut links = Vec::new();
        parse_link_value(value, &mut links);
        Self { links }
    }

    /// Returns the first link with the given relation.
    pub fn get<'a>(&'a self, rel: &'a str) -> Option<&'a Link> {
        self.all(rel).next()
    }

    /// Returns the link with the given relation only when it is unambiguous.
    ///
    /// Several links with the same relation are tolerated when they all point
    /// to the same URL; conflicting targets yield `None`.
    pub fn unique<'a>(&'a self, rel: &'a str) -> Option<&'a Link> {
        let mut matches = self.all(rel);
        let first = matches.next()?;
        if matches.all(|link| link.url == first.url) {
            Some(first)
        } else {
            None
        }
    }

    /// Iterates over every link with the given relation.
    pub fn all<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |link| link.rel == rel)
    }

    /// Iterates over every parsed link.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Returns the number of parsed links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no links were parsed.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn parse_link_value(value: &str, out: &mut Vec<Link>) {
    let mut rest = value;
    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        let Some(after_open) = rest.strip_prefix('<') else {
            return;
        };
        let Some(close) = after_open.find('>') else {
            return;
        };
        let url = &after_open[..close];
        rest = &after_open[close + 1..];

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start();
            let Some(after_semi) = rest.strip_prefix(';') else {
                break;
            };
            let (param, remaining) = parse_param(after_semi);
            rest = remaining;
            if let Some(param) = param {
                params.push(param);
            }
        }

        // A single link may carry several space-separated relation types.
        let rels = params
            .iter()
            .find(|(name, _)| name == "rel")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        for rel in rels.split_whitespace() {
            out.push(Link {
                url: url.to_string(),
                rel: rel.to_string(),
                params: params.clone(),
            });
        }

        if !rest.starts_with(',') {
            match rest.find(',') {
                Some(next) => rest = &rest[next..],
                None => return,
            }
        }
    }
}

fn parse_param(input: &str) -> (Option<(String, String)>, &str) {
    let input = input.trim_start();
    let name_end = input
        .find(|c: char| c == '=' || c == ';' || c == ',')
        .unwrap_or(input.len());
    let name = input[..name_end].trim().to_ascii_lowercase();
    let rest = &input[name_end..];

    let Some(after_eq) = rest.strip_prefix('=') else {
        let param = (!name.is_empty()).then(|| (name, String::new()));
        return (param, rest);
    };

    let after_eq = after_eq.trim_start();
    let (value, rest) = match after_eq.strip_prefix('"') {
        Some(quoted) => take_quoted(quoted),
        None => {
            let end = after_eq
                .find(|c: char| c == ';' || c == ',')
                .unwrap_or(after_eq.len());
            (after_eq[..end].trim().to_string(), &after_eq[end..])
        }
    };

    let param = (!name.is_empty()).then_some((name, value));
    (param, rest)
}

fn take_quoted(input: &str) -> (String, &str) {
    let mut value = String::new();
    let mut escaped = false;
    for (idx, c) in input.char_indices() {
        if escaped {
            value.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return (value, &input[idx + 1..]);
        } else {
            value.push(c);
        }
    }
    (value, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_wordpress_api_link() {
        let links = Links::parse(r#"<https://site.example/wp-json/>; rel="https://api.w.org/""#);
        let link = links.get(API_ROOT_REL).unwrap();
        assert_eq!(link.url, "https://site.example/wp-json/");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_parse_multiple_links_and_params() {
        let links = Links::parse(
            r#"<https://a.example/wp-json/>; rel="https://api.w.org/", <https://a.example/?p=12>; rel=shortlink; title="Hello, world""#,
        );
        assert_eq!(links.len(), 2);
        let short = links.get("shortlink").unwrap();
        assert_eq!(short.url, "https://a.example/?p=12");
        assert_eq!(short.param("title"), Some("Hello, world"));
    }

    #[test]
    fn test_space_separated_relations() {
        let links = Links::parse(r#"<https://a.example/2>; rel="next last""#);
        assert_eq!(links.get("next").unwrap().url, "https://a.example/2");
        assert_eq!(links.get("last").unwrap().url, "https://a.example/2");
    }

    #[test]
    fn test_links_from_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            LINK,
            HeaderValue::from_static(r#"<https://a.example/wp-json/>; rel="https://api.w.org/""#),
        );
        headers.append(
            LINK,
            HeaderValue::from_static(r#"<https://a.example/wp-json/wp/v2/pages/2>; rel="alternate""#),
        );
        let links = Links::from_headers(&headers);
        assert_eq!(links.len(), 2);
        assert!(links.get("alternate").is_some());
    }

    #[test]
    fn test_non_ascii_link_header_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_bytes(
                r#"<https://bücher.example/wp-json/>; rel="https://api.w.org/""#.as_bytes(),
            )
            .unwrap(),
        );
        let links = Links::from_headers(&headers);
        assert_eq!(links.len(), 1);
        assert_eq!(
            links.unique(API_ROOT_REL).unwrap().url,
            "https://bücher.example/wp-json/"
        );
    }

    #[test]
    fn test_unique_rejects_conflicting_targets() {
        let links = Links::parse(
            r#"<https://a.example/wp-json/>; rel="https://api.w.org/", <https://b.example/wp-json/>; rel="https://api.w.org/""#,
        );
        assert!(links.get(API_ROOT_REL).is_some());
        assert!(links.unique(API_ROOT_REL).is_none());

        let links = Links::parse(
            r#"<https://a.example/wp-json/>; rel="https://api.w.org/", <https://a.example/wp-json/>; rel="https://api.w.org/""#,
        );
        assert!(links.unique(API_ROOT_REL).is_some());
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        assert!(Links::parse("").is_empty());
        assert!(Links::parse("garbage").is_empty());
        assert!(Links::parse("<https://a.example/").is_empty());
        // No rel parameter, nothing to index it under.
        assert!(Links::parse("<https://a.example/>; title=x").is_empty());
    }
}
