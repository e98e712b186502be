//! Async verification flow example.
//!
//! Walks the full two-step workflow: initiate a verification transaction,
//! print the verification URL the subscriber must visit, then poll the
//! transaction status.
//!
//! To run this example:
//! ```bash
//! export DUPHLUX_LIVE_ACCESS_TOKEN="your-token-here"
//! export DUPHLUX_BASE_URL="https://duphlux.com/webservice/authe"  # Optional
//! cargo run --example verify_flow -- 2348012345678
//! ```

use std::time::Duration;

use duphlux_client::{DEFAULT_REFERENCE_LENGTH, DuphluxClient, VerifyRequest, generate_reference};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let phone_number = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "2348012345678".to_string());

    let mut client = DuphluxClient::from_env()?;

    println!("=== Step 1: Initiate Verification ===\n");

    let reference = generate_reference(DEFAULT_REFERENCE_LENGTH);
    let outcome = client
        .authenticate(VerifyRequest::new(
            phone_number.as_str(),
            reference.as_str(),
            "https://example.com/verified",
        ))
        .await?;

    if outcome.has_error() {
        anyhow::bail!("initiation failed: {}", outcome.error());
    }

    println!("Transaction reference: {reference}");
    match client.verification_url()? {
        Some(url) => println!("Send the subscriber to: {url}\n"),
        None => println!("No verification URL returned\n"),
    }

    println!("=== Step 2: Poll Verification Status ===\n");

    for attempt in 1..=5 {
        let outcome = client.check_status(&reference).await?;
        if outcome.has_error() {
            println!("Attempt {attempt}: status check failed: {}", outcome.error());
        } else if client.is_verified()? {
            println!("Phone number {phone_number} verified!");
            return Ok(());
        } else if client.is_failed()? {
            anyhow::bail!("verification failed for {phone_number}");
        } else {
            println!("Attempt {attempt}: still pending");
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    println!("\nVerification still pending - poll again later");
    Ok(())
}
