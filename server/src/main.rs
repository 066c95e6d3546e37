use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hyper::Request;
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower::{ServiceBuilder, service_fn};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use server::tower_middle::RouteAdmissionLayer;
use server::{AppState, app_router};
use shared::config::{LiveConfig, load_config};
use shared::types::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "storefront-gate", version, about)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            info!("No --config given, running on defaults");
            AppConfig::default()
        }
    };
    let addr = config.server.addr();

    let live = LiveConfig::new(config);
    if let Some(path) = args.config.clone() {
        reload_on_sighup(path, live.clone());
    }

    let state = AppState::from_live(live);
    let router = Arc::new(app_router());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        debug!("Connection from {}", peer);

        let io = TokioIo::new(stream);
        let router = router.clone();
        let handler_state = state.clone();

        let service = ServiceBuilder::new()
            .layer(RouteAdmissionLayer::new(state.config.clone()))
            .service(service_fn(move |req: Request<IncomingBody>| {
                let router = router.clone();
                let state = handler_state.clone();
                async move { Ok::<_, Infallible>(router.route(req, state).await) }
            }));

        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, TowerToHyperService::new(service))
                .await
            {
                debug!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }
}

/// Re-read the config file on SIGHUP. Route and cookie changes apply to the
/// next request; the listen address only changes on restart.
#[cfg(unix)]
fn reload_on_sighup(path: String, config: LiveConfig) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Cannot listen for SIGHUP, config reload disabled: {}", e);
                return;
            }
        };

        while hangup.recv().await.is_some() {
            match load_config(&path) {
                Ok(new) => {
                    config.reload(new).await;
                    info!("Reloaded config from {}", path);
                }
                Err(e) => warn!("Keeping current config, {} is invalid: {}", path, e),
            }
        }
    });
}

#[cfg(not(unix))]
fn reload_on_sighup(path: String, _config: LiveConfig) {
    debug!("Config reload on signal is unix-only, {} is read once", path);
}
