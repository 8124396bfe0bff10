use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod models;
mod state;
mod template;
mod upload;

use claimsift_core::{ContentCache, GrobidSource, config_file};
use claimsift_grobid::{DEFAULT_GROBID_URL, DEFAULT_TIMEOUT, GrobidClient};
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "claimsift-web")]
#[command(about = "Claim extraction web app for scientific papers")]
struct Args {
    /// Address to listen on, e.g. 0.0.0.0:8501.
    #[arg(long)]
    listen: Option<String>,

    /// Directory holding the ONNX model bundles.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Base URL of the GROBID service.
    #[arg(long)]
    grobid_url: Option<String>,

    /// Path to config TOML. If omitted, uses the standard lookup.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => config_file::load_from_path(path).unwrap_or_default(),
        None => config_file::load_config(),
    };

    // Precedence: flags over environment over config file over defaults.
    let models_dir = args
        .models_dir
        .or_else(|| {
            std::env::var("CLAIMSIFT_MODELS_DIR")
                .ok()
                .map(PathBuf::from)
        })
        .or_else(|| {
            config
                .models
                .as_ref()
                .and_then(|m| m.dir.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("models"));

    let grobid_url = args
        .grobid_url
        .or_else(|| std::env::var("GROBID_URL").ok())
        .or_else(|| config.grobid.as_ref().and_then(|g| g.url.clone()))
        .unwrap_or_else(|| DEFAULT_GROBID_URL.to_string());

    let listen = args
        .listen
        .or_else(|| std::env::var("CLAIMSIFT_LISTEN").ok())
        .or_else(|| config.server.as_ref().and_then(|s| s.listen.clone()))
        .unwrap_or_else(|| "0.0.0.0:8501".to_string());

    let grobid_timeout = config
        .grobid
        .as_ref()
        .and_then(|g| g.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let max_upload_mb = config
        .server
        .as_ref()
        .and_then(|s| s.max_upload_mb)
        .unwrap_or(50);

    // All three classifiers load before the server accepts requests.
    tracing::info!(dir = %models_dir.display(), "loading classifiers");
    let predictor =
        tokio::task::spawn_blocking(move || claimsift_pipeline::load_models(&models_dir))
            .await
            .context("model loading task panicked")??;

    tracing::info!(url = %grobid_url, timeout_secs = grobid_timeout.as_secs(), "using GROBID service");
    let grobid = GrobidClient::with_timeout(grobid_url, grobid_timeout);

    let state = Arc::new(AppState {
        predictor: Arc::new(predictor),
        cache: ContentCache::new(),
        source: Arc::new(GrobidSource::new(grobid)),
    });

    let body_limit = axum::extract::DefaultBodyLimit::max(max_upload_mb as usize * 1024 * 1024);

    let app = axum::Router::new()
        .route("/", axum::routing::get(handlers::index::index))
        .route(
            "/api/predict",
            axum::routing::post(handlers::predict::predict),
        )
        .route(
            "/api/extract",
            axum::routing::post(handlers::extract::extract),
        )
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(body_limit),
        )
        .with_state(state);

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address: {listen}"))?;
    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
