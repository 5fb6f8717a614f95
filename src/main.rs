use parksense::{AppState, Config, DocumentStore, api_router, web_router};
use std::net::SocketAddr;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let store = DocumentStore::connect(config.data_path.clone()).await?;
    let state = AppState::new(config.clone(), store);

    if state.recognizer.is_enabled() {
        info!("plate recognizer enabled");
    } else {
        warn!("PARKSENSE_RECOGNIZER_URL not set, uploads will be logged as not detected");
    }

    let api_addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let web_addr = SocketAddr::from(([0, 0, 0, 0], config.web_port));
    let api_listener = TcpListener::bind(api_addr).await?;
    let web_listener = TcpListener::bind(web_addr).await?;

    info!("api listening on http://{api_addr}");
    info!("pages listening on http://{web_addr} (api base {})", config.api_base_url);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let api = axum::serve(api_listener, api_router(state.clone()))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()));
    let web = axum::serve(web_listener, web_router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx));

    tokio::try_join!(
        async { api.await },
        async { web.await },
    )?;

    info!("shut down");
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
