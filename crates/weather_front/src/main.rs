use axum::serve;
use log::{info, LevelFilter};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use weather_front::{app, build_app_state, get_config_info, get_log_level, setup_logger, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info()?;
    setup_logger()
        .level(get_log_level(&cli))
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .apply()?;

    let settings = Settings::try_from(cli)?;
    let socket_addr = settings.socket_addr()?;
    let listener = TcpListener::bind(socket_addr).await?;

    info!("{} listening on http://{}", settings.app_name, socket_addr);
    if settings.debug {
        info!("api docs at http://{}/docs", socket_addr);
    }

    let app = app(build_app_state(settings)?);
    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
