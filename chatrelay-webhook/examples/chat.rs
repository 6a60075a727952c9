//! Send one message to a chat webhook and print the reply as it streams.
//!
//! Run with:
//!   CHATRELAY_WEBHOOK_URL=https://... RUST_LOG=debug cargo run --example chat -- "Hello"

use std::io::Write;

use chatrelay_webhook::{ChatRequest, ReplyPolicy, WebhookClient, new_session_id};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello! Who are you?".into());

    let client = WebhookClient::from_env()?;
    let request = ChatRequest::new(new_session_id(), message);

    let mut printed = 0;
    let outcome = client
        .send_and_collect(request, |text| {
            // Updates carry the running total; print only what is new.
            print!("{}", &text[printed..]);
            let _ = std::io::stdout().flush();
            printed = text.len();
        })
        .await;
    println!();

    if let Ok(reply) = &outcome {
        if let Some(title) = &reply.title {
            println!("[title] {title}");
        }
    }
    if outcome.as_ref().map_or(true, |r| r.is_empty()) {
        println!("{}", ReplyPolicy::default().render(&outcome));
    }

    Ok(())
}
