//! Dropserve - share a folder over HTTP on the local network
//!
//! This is the main entry point for the Dropserve CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dropserve_core::config::{DEFAULT_FOLDER, DEFAULT_PORT};
use dropserve_core::{Error, ServeConfig};
use dropserve_tls::{SelfSignedCredential, build_acceptor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod banner;
mod handler;
mod server;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Dropserve - serve a folder, forcing downloads for media and documents
#[derive(Parser, Debug)]
#[command(name = "dropserve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Folder to serve
    #[arg(long, default_value = DEFAULT_FOLDER)]
    folder: PathBuf,

    /// Do not log requests
    #[arg(long)]
    silent: bool,

    /// Serve over HTTPS with a generated self-signed certificate
    #[arg(long)]
    https: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ServeConfig {
        ServeConfig {
            port: self.port,
            root: self.folder.clone(),
            silent: self.silent,
            https: self.https,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    if let Err(e) = run(cli.config()).await {
        tracing::error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServeConfig) -> anyhow::Result<()> {
    if config.root.exists() && !config.root.is_dir() {
        return Err(Error::Config(format!("{} is not a directory", config.root.display())).into());
    }
    if !config.root.exists() {
        tracing::warn!("⚠️ Folder {} does not exist, every request will 404", config.root.display());
    }

    // No plain-HTTP fallback: a failed certificate ends startup
    let tls = if config.https {
        let credential = SelfSignedCredential::generate()
            .context("failed to generate self-signed certificate")?;
        Some(build_acceptor(&credential).context("failed to configure TLS")?)
    } else {
        None
    };

    let listener = server::bind(config.listen_addr()).await?;
    let port = listener.local_addr()?.port();

    tracing::info!(
        "🚀 Dropserve v{} serving {} on port {} ({})",
        dropserve_core::VERSION,
        config.root.display(),
        port,
        config.scheme()
    );
    banner::print(config.scheme(), port);

    let state = Arc::new(handler::AppState::new(config));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server::serve(listener, state, tls, shutdown).await?;
    Ok(())
}
