//! Reference "hello-world" bridge client.
//!
//! Connects to a code-bridge server, forwards its own `tracing` output,
//! sends one console line and one error, then closes the session.
//!
//! Usage:
//!   CODE_BRIDGE_SECRET=dev-secret cb-hello-bridge --project demo
//!
//! Env vars:
//!   CODE_BRIDGE_URL      bridge server URL (default: ws://localhost:9877)
//!   CODE_BRIDGE_SECRET   shared secret (default: dev-secret)
//!   CODE_BRIDGE_PROJECT  project id announced in `hello` (optional)

use std::time::Duration;

use cb_client::{BridgeClientBuilder, BridgeLayer};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Stream a few diagnostic events to a code-bridge server.
#[derive(Debug, Parser)]
#[command(name = "cb-hello-bridge", version, about)]
struct Args {
    /// Bridge server WebSocket URL.
    #[arg(long, env = "CODE_BRIDGE_URL", default_value = "ws://localhost:9877")]
    url: String,
    /// Shared secret expected by the bridge server.
    #[arg(long, env = "CODE_BRIDGE_SECRET", default_value = "dev-secret", hide_env_values = true)]
    secret: String,
    /// Project identifier announced in `hello`.
    #[arg(long, env = "CODE_BRIDGE_PROJECT")]
    project: Option<String>,
    /// Comma-separated capability set (default: console,error).
    #[arg(long, value_delimiter = ',')]
    capabilities: Vec<String>,
    /// Console line to send after connecting.
    #[arg(long, default_value = "hello from rust")]
    message: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut builder = BridgeClientBuilder::new()
        .url(&args.url)
        .secret(&args.secret)
        .capabilities(args.capabilities.iter().cloned());
    if let Some(project) = &args.project {
        builder = builder.project_id(project);
    }
    let mut client = builder.build()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(BridgeLayer::new(client.emitter()))
        .init();

    client.start().await?;
    tracing::info!(url = %args.url, "bridge connected");

    client.send_console("info", &args.message);
    client.send_error("sample error");

    client.stop();
    if tokio::time::timeout(Duration::from_secs(2), client.closed())
        .await
        .is_err()
    {
        tracing::warn!("bridge server did not finish the close handshake");
    }

    tracing::info!("hello-bridge exiting");
    Ok(())
}
