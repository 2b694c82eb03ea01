//! Server binary, grounded on `orchestrator-server.rs`'s `main()`: tracing
//! init from `RUST_LOG`, env-driven bind address, `axum::serve` with
//! graceful shutdown on Ctrl-C/SIGTERM. Stripped of the teacher's
//! SSL/LDAP/database bootstrapping, none of which this crate's scope needs.

use server::api::routes::create_router;
use server::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let config = Config::from_env()?;
    tracing::info!(addr = %config.bind_addr, "starting server");

    let bind_addr = config.bind_addr;
    let state = server::build_state(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);

    axum::serve(listener, app.into_make_service()).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
