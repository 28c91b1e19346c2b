//! Example demonstrating failure diagnosis and the three-legged handshake.
//!
//! This example shows how to:
//! - Read the diagnosis of a failed request
//! - Tell transport failures apart from HTTP failures
//! - Walk a user through three-legged OAuth authorization
//!
//! Run with: `cargo run --example error_handling -- https://site.example ck_xxx cs_xxx`

use std::io::BufRead;
use wordpress_api::{AuthMethod, Client, Error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("wordpress_api=info")
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "https://site.example".to_string());
    let key = args.next().unwrap_or_default();
    let secret = args.next().unwrap_or_default();

    let client = Client::builder()
        .url(&url)
        .consumer_key(&key)
        .consumer_secret(&secret)
        .build()?;

    println!("=== Example 1: Diagnosing a failed request ===");
    match client.get("posts/999999").await {
        Ok(response) => println!("Success: {}", response.text()),
        Err(Error::RequestFailed(diagnosis)) => {
            println!("Status: {}", diagnosis.status());
            if let Some(reason) = diagnosis.reason() {
                println!("Likely cause: {}", reason);
            }
            if let Some(remedy) = diagnosis.remedy() {
                println!("Suggestion: {}", remedy);
            }
            println!("Full report:\n{}", diagnosis);
        }
        Err(Error::Timeout) => println!("The site did not answer in {:?}", client.timeout()),
        Err(Error::Network(e)) => println!("Could not reach the site: {}", e),
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Three-legged authorization ===");
    let client = Client::builder()
        .url(&url)
        .consumer_key(&key)
        .consumer_secret(&secret)
        .auth_method(AuthMethod::OAuth1a3Leg)
        .callback("oob")
        .build()?;

    let authorize_url = client.begin_authorization().await?;
    println!("Open {} and paste the verifier here:", authorize_url);

    let mut verifier = String::new();
    std::io::stdin().lock().read_line(&mut verifier)?;
    let token = client.complete_authorization(verifier.trim()).await?;
    println!("Authorized with token {}", token.key);

    let me = client.get("users/me").await?;
    println!("Current user: {}", me.text());

    Ok(())
}
