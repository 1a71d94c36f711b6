use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::{AppState, build_router};
use shared::config::{ApiConfig, load_dotenv};
use shared::llm::{GeminiGateway, GeminiGatewayConfig, PersonaTemplate};
use shared::sessions::SessionStore;
use shared::vision::{CLASS_NAMES, OnnxClassifier};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    init_tracing();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gemini_config = match GeminiGatewayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read gemini config: {err}");
            std::process::exit(1);
        }
    };
    let upstream_timeout = Duration::from_millis(gemini_config.timeout_ms);

    let gateway = match GeminiGateway::new(gemini_config) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to initialize gemini gateway: {err}");
            std::process::exit(1);
        }
    };

    let classifier = match OnnxClassifier::load(&config.model_path, CLASS_NAMES.len()) {
        Ok(classifier) => classifier,
        Err(err) => {
            error!(model_path = %config.model_path.display(), "failed to load model: {err}");
            std::process::exit(1);
        }
    };
    info!(model_path = %config.model_path.display(), classes = CLASS_NAMES.len(), "model loaded");

    let persona = config
        .persona_template
        .as_deref()
        .map(PersonaTemplate::new)
        .unwrap_or_default();
    let sessions = SessionStore::new(Arc::new(gateway), persona)
        .with_session_timeout(Duration::from_secs(config.session_timeout_seconds))
        .with_upstream_timeout(upstream_timeout);

    if config.session_sweep_interval_seconds > 0 {
        sessions.spawn_sweeper(Duration::from_secs(config.session_sweep_interval_seconds));
    }

    let app = build_router(AppState {
        sessions,
        classifier: Arc::new(classifier),
        allowed_origins: config.allowed_origins(),
        max_upload_bytes: config.max_upload_bytes,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(bind_addr = %config.bind_addr, "invalid bind address: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "api_server=debug,shared=info,axum=info,tower_http=info".to_string()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
