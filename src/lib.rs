//! # wordpress-api - An authenticated WordPress REST API client
//!
//! `wordpress-api` performs authenticated requests against the WordPress REST
//! API (`/wp-json`), built on top of `reqwest`. It supports three
//! authentication schemes and explains failed requests instead of just
//! reporting a status code.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wordpress_api::Client;
//! use serde::Deserialize;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Post {
//!     id: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wordpress_api::Error> {
//!     // Two-legged OAuth 1.0a is the default scheme
//!     let client = Client::builder()
//!         .url("https://site.example")
//!         .consumer_key("ck_xxx")
//!         .consumer_secret("cs_xxx")
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET https://site.example/wp-json/wp/v2/posts
//!     let posts: Vec<Post> = client.get("posts").await?.json()?;
//!     println!("Fetched {} posts", posts.len());
//!
//!     // Bodies are sent as UTF-8 JSON, non-ASCII text unescaped
//!     let created = client.post("posts", &json!({ "title": "Zürich" })).await?;
//!     println!("Created in {:?}", created.latency);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! - [`AuthMethod::Basic`] - consumer key and secret as HTTP Basic credentials
//! - [`AuthMethod::OAuth1a`] - every request URL signed with the consumer credentials
//! - [`AuthMethod::OAuth1a3Leg`] - requests signed with an access token obtained through
//!   a user authorization handshake
//!
//! ```no_run
//! use wordpress_api::{AuthMethod, Client};
//!
//! # async fn example() -> Result<(), wordpress_api::Error> {
//! let client = Client::builder()
//!     .url("https://site.example")
//!     .consumer_key("ck_xxx")
//!     .consumer_secret("cs_xxx")
//!     .auth_method(AuthMethod::OAuth1a3Leg)
//!     .callback("https://app.example/oauth/callback")
//!     .build()?;
//!
//! let authorize_url = client.begin_authorization().await?;
//! println!("Visit {} and paste the verifier", authorize_url);
//! # let verifier = String::new();
//! let token = client.complete_authorization(&verifier).await?;
//! // Persist `token` and restore it later with `client.set_access_token(token)`
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Responses with a status other than 200 or 201 become
//! [`Error::RequestFailed`], carrying a [`Diagnosis`] with the request URL,
//! status, body and headers. When the site advertises a different API root
//! than the one configured, the diagnosis names the mismatch and suggests the
//! URL to use instead:
//!
//! ```no_run
//! use wordpress_api::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().url("https://site.example").consumer_key("k").consumer_secret("s").build()?;
//! match client.get("posts").await {
//!     Ok(response) => println!("Success: {}", response.text()),
//!     Err(Error::RequestFailed(diagnosis)) => eprintln!("{}", diagnosis),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod diagnose;
mod error;
pub mod link;
mod response;
pub mod transport;
mod url_utils;

pub use auth::{AuthMethod, HandshakeState, SignatureMethod, Token};
pub use client::{Client, ClientBuilder};
pub use diagnose::Diagnosis;
pub use error::{Error, Result};
pub use response::Response;
