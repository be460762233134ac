//! Send one HSM message using credentials from the environment.
//!
//! ```sh
//! WAPPIN_CLIENT_ID=... WAPPIN_SECRET_KEY=... WAPPIN_PROJECT_ID=... \
//!     cargo run --example send_hsm -- otp_code 081213141516 202404
//! ```
//!
//! Set `RUST_LOG=wappin_client=debug` to see token cache activity.

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use wappin_client::{RequestWhatsappMessage, WappinClient, WappinConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let (Some(template), Some(number)) = (args.next(), args.next()) else {
        bail!("usage: send_hsm <template> <recipient> [param...]");
    };

    let mut request = RequestWhatsappMessage::new(template, number);
    for (i, value) in args.enumerate() {
        request = request.with_param((i + 1).to_string(), value);
    }

    let config = WappinConfig::from_env().context("failed to read WAPPIN_* variables")?;
    let client = WappinClient::new(config)?;

    let response = client.send_message(Some(&request)).await?;
    println!("{} {} {}", response.message_id, response.status, response.message);

    Ok(())
}
