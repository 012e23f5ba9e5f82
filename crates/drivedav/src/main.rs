//! drivedav server binary.
//!
//! Discovers the host's mounted volumes, composes the WebDAV namespace and
//! serves it over HTTPS until interrupted. A self-signed certificate is
//! generated on first start if none exists.

use anyhow::{Context, Result};
use clap::Parser;
use drivedav::{
    tls, BasicAuth, Namespace, ServerConfig, SystemVolumeSource, VolumeSource, WebDavServer,
};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// WebDAV server for local volumes
#[derive(Parser, Debug)]
#[command(name = "drivedav", version, about)]
struct Args {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 2080)]
    port: u16,

    /// Certificate file (self-signed pair is generated if missing)
    #[arg(long, default_value = "webdav.crt")]
    cert: PathBuf,

    /// Private key file
    #[arg(long, default_value = "webdav.key")]
    key: PathBuf,

    /// Username for basic authentication
    #[arg(short, long, default_value = "root")]
    user: String,

    /// Password (will prompt if not provided)
    #[arg(short = 'P', long, env = "DRIVEDAV_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };

    let descriptors = SystemVolumeSource::new()
        .discover()
        .context("volume enumeration failed")?;
    let namespace = Namespace::build(&descriptors);

    for binding in namespace.bindings() {
        tracing::info!(
            prefix = %binding.prefix,
            root = %binding.root_path.display(),
            "serving volume"
        );
    }
    if namespace.bindings().is_empty() {
        tracing::warn!("no usable volumes discovered, serving an empty namespace");
    }

    tls::ensure_server_cert(&args.cert, &args.key, &args.host.to_string())
        .context("certificate bootstrap failed")?;
    let acceptor = tls::build_acceptor(&args.cert, &args.key)
        .context("failed to load certificate/key pair")?;

    let config = ServerConfig {
        port: args.port,
        bind_address: args.host,
    };
    let server = WebDavServer::start(
        namespace,
        BasicAuth::new(args.user, password),
        acceptor,
        config,
    )
    .await
    .context("failed to start server")?;

    tracing::info!(url = %server.url(), "webdav server started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for ctrl-c")?;
    server.stop().await;

    Ok(())
}
