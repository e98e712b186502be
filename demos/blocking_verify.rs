//! Blocking verification example for sync contexts.
//!
//! Same two-step workflow as `verify_flow`, driven from a plain `fn main`
//! without an async runtime of its own.
//!
//! To run this example:
//! ```bash
//! export DUPHLUX_LIVE_ACCESS_TOKEN="your-token-here"
//! cargo run --example blocking_verify -- 2348012345678 order-1042
//! ```

use duphlux_client::{DuphluxClient, VerifyRequest};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let phone_number = args.next().unwrap_or_else(|| "2348012345678".to_string());
    let reference = args.next().unwrap_or_else(|| "order-1042".to_string());

    let mut client = DuphluxClient::from_env()?;

    println!("=== Blocking Initiation ===\n");

    let outcome = client.authenticate_blocking(VerifyRequest::new(
        phone_number.as_str(),
        reference.as_str(),
        "https://example.com/verified",
    ))?;

    if outcome.has_error() {
        anyhow::bail!("initiation failed: {}", outcome.error());
    }
    if let Some(url) = client.verification_url()? {
        println!("Send the subscriber to: {url}\n");
    }

    println!("=== Blocking Status Check ===\n");

    let outcome = client.check_status_blocking(&reference)?;
    println!("status: {}", outcome.status());
    println!("errors: {}", outcome.error());
    println!("verified: {}", client.is_verified()?);

    Ok(())
}
