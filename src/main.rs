use atomlink::config::Config;
use atomlink::orchestrator::Orchestrator;
use atomlink::server::{RelayState, relay_router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        api_url = %cfg.gemini.api_url,
        text_model = %cfg.gemini.text_model,
        speech_model = %cfg.gemini.speech_model,
        proxy = %cfg.gemini.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        primary_key = cfg.credentials.primary.is_some(),
        secondary_key = cfg.credentials.secondary.is_some(),
        retry_attempts = cfg.retry.max_attempts,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
    );

    if cfg.credentials.primary.is_none() && cfg.credentials.secondary.is_none() {
        warn!("No API key configured; generation calls will report that setup is required.");
    }

    let orchestrator = Orchestrator::spawn(&cfg).await?;
    let app = relay_router(RelayState::new(orchestrator));

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
