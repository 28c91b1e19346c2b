//! Error types for authenticated API calls.
//!
//! Every failure of a call is returned synchronously to the caller. Transport
//! failures are passed through as they came from `reqwest`, while failed HTTP
//! responses are wrapped in a [`Diagnosis`] describing the likely cause.

use crate::diagnose::Diagnosis;
use http::StatusCode;

/// The main error type for WordPress API calls.
///
/// # Examples
///
/// ```no_run
/// use wordpress_api::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .url("https://site.example")
///     .consumer_key("ck_xxx")
///     .consumer_secret("cs_xxx")
///     .build()?;
///
/// match client.get("posts").await {
///     Ok(response) => println!("Success: {}", response.text()),
///     Err(Error::RequestFailed(diagnosis)) => {
///         eprintln!("HTTP {}", diagnosis.status());
///         if let Some(remedy) = diagnosis.remedy() {
///             eprintln!("Hint: {}", remedy);
///         }
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS, TLS, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Three-legged OAuth was requested without a callback URL.
    #[error("callback url not specified")]
    MissingCallback,

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided or composed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with a status other than 200 or 201.
    ///
    /// The [`Diagnosis`] holds the request URL, status, body and headers,
    /// plus a likely cause when one could be inferred.
    #[error("{0}")]
    RequestFailed(Box<Diagnosis>),

    /// A three-legged call was attempted before the handshake completed.
    #[error("Not yet authorized: handshake is {state}")]
    NotAuthorized {
        /// The handshake state at the time of the call.
        state: &'static str,
    },

    /// The OAuth handshake or API discovery returned an unusable response.
    #[error("OAuth handshake failed: {0}")]
    Handshake(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the response body into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RequestFailed(diagnosis) => Some(diagnosis.status()),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::RequestFailed(diagnosis) => Some(diagnosis.raw_body()),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the diagnosis of a failed request.
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Error::RequestFailed(diagnosis) => Some(diagnosis.as_ref()),
            _ => None,
        }
    }

    /// Maps a `reqwest` error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

/// A specialized `Result` type for WordPress API calls.
pub type Result<T> = std::result::Result<T, Error>;
