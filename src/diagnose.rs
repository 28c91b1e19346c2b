//! Post-mortem of failed requests.
//!
//! When the API answers with anything but 200 or 201 the response is turned
//! into a [`Diagnosis`]: everything known about the call, plus a guess at the
//! cause when one can be made. The only cause currently recognised is a site
//! URL that does not match the API root WordPress advertises in its
//! `https://api.w.org/` link relation, which typically happens when a site
//! moved or redirects between `http` and `https`.

use crate::link::API_ROOT_REL;
use crate::transport::Requester;
use crate::url_utils::{eviscerate, mask_credentials};
use crate::{Error, Response, Result};
use http::{HeaderMap, StatusCode};
use std::fmt;

/// A best-effort explanation of a failed request.
///
/// Its `Display` output is the multi-line report carried by
/// [`Error::RequestFailed`].
#[derive(Debug, Clone)]
pub struct Diagnosis {
    request_url: Option<String>,
    status: StatusCode,
    raw_body: String,
    headers: HeaderMap,
    reason: Option<String>,
    remedy: Option<String>,
}

impl Diagnosis {
    /// Inspects a failed response against the configured API root.
    pub fn from_response(response: &Response, requester: &Requester) -> Self {
        let mut reason = None;
        let mut remedy = None;

        // Conflicting or missing relations leave nothing to compare against.
        let advertised = response.links.unique(API_ROOT_REL).map(|link| link.url.as_str());
        let configured = requester.api_url();
        if let Some(advertised) = advertised.filter(|url| !url.is_empty()) {
            if advertised != configured {
                tracing::warn!(
                    advertised = %advertised,
                    configured = %configured,
                    "API root advertised by the site differs from the configured one"
                );
                reason = Some(format!("hostname mismatch. {} != {}", advertised, configured));
                let site_url = eviscerate(advertised, "/");
                let site_url = eviscerate(site_url, requester.namespace());
                remedy = Some(format!("try changing url to {}", site_url));
            }
        }

        Self {
            request_url: response.request_url.as_ref().map(mask_credentials),
            status: response.status,
            raw_body: response.text(),
            headers: response.headers.clone(),
            reason,
            remedy,
        }
    }

    /// The URL the failed request was sent to, if known.
    ///
    /// Credential and signature query values are masked.
    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    /// The status code of the failed response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw response body.
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The inferred cause, e.g. `hostname mismatch. <advertised> != <configured>`.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// A suggested fix for the inferred cause.
    pub fn remedy(&self) -> Option<&str> {
        self.remedy.as_deref()
    }

    /// The body pretty-printed as JSON when possible, verbatim otherwise.
    fn rendered_body(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.raw_body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| self.raw_body.clone())
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API call to {} returned \nCODE: {}\n{} \nHEADERS: {:?}",
            self.request_url.as_deref().unwrap_or_default(),
            self.status.as_u16(),
            self.rendered_body(),
            self.headers
        )?;
        if let Some(reason) = &self.reason {
            write!(f, "\nMost likely because of {}", reason)?;
        }
        if let Some(remedy) = &self.remedy {
            write!(f, "\n{}", remedy)?;
        }
        Ok(())
    }
}

/// Passes 200 and 201 responses through and diagnoses everything else.
pub(crate) fn ensure_success(response: Response, requester: &Requester) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }
    Err(Error::RequestFailed(Box::new(Diagnosis::from_response(
        &response, requester,
    ))))
}
