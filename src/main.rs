use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fb_auth::{StaticSdk, detect};
use fb_core::{AppConfig, launch};
use fb_host::{ChannelHost, HostAssets, RuntimeBridge};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Authorization code handed out by the local SDK stand-in
const AUTH_CODE_ENV: &str = "FRAME_BRIDGE_AUTH_CODE";

/// Local harness: runs one launch against a channel-backed runtime host
#[derive(Parser)]
#[command(name = "frame-bridge", version)]
struct Args {
    /// Launch query string, e.g. "?frame_id=abc&guild_id=42"
    query: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    // Launch classification happens before anything else and never changes.
    let ctx = detect(args.query.as_deref().unwrap_or_default());

    let config_path = match args.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load(&config_path).await?;
    let assets = HostAssets::resolve(&config.host, &ctx);

    let sdk = match (std::env::var(AUTH_CODE_ENV), ctx.guild_id.clone()) {
        (Ok(code), Some(guild_id)) => StaticSdk::new(code).in_scope(guild_id),
        (Ok(code), None) => StaticSdk::new(code),
        (Err(_), _) => {
            if ctx.is_embedded() {
                warn!("{} not set, authorization will be declined", AUTH_CODE_ENV);
            }
            StaticSdk::declining()
        }
    };

    let (host, mut inbox) = ChannelHost::new();
    let host_task = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            println!("{}.{}({})", message.target, message.method, message.payload);
        }
    });

    let bootstrap = async {
        info!(
            loader = %assets.loader_url,
            code = %assets.code_url,
            streaming_assets = %assets.streaming_assets_url,
            "Loading {} {}",
            assets.product_name,
            assets.product_version
        );
        Ok(())
    };

    let report = launch(
        config.orchestrator(ctx, Arc::new(sdk)),
        RuntimeBridge::new(Arc::new(host)),
        bootstrap,
    )
    .await;

    info!(
        host_started = report.host_started,
        delivery = ?report.delivery,
        trail = ?report.trail,
        "Launch complete"
    );

    host_task.await.context("host inbox task panicked")?;
    Ok(())
}
