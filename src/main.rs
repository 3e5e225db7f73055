use anyhow::Result;
use rgw_exporter::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let signer = signer::RequestSigner::new(
        app_config.gateway.access_key.clone(),
        app_config.gateway.secret_key.clone(),
    );
    let client = gateway::GatewayClient::new(app_config.gateway.base_url()?, signer)?;
    tracing::info!(
        gateway = %client.base_url(),
        access_key = client.access_key(),
        "Gateway client ready"
    );

    let exporter = Arc::new(exporter::Exporter::new(
        client,
        exporter::DescriptorTable::new(),
        app_config.exporter.owner_quota_failure,
    ));
    let app = routes::app(exporter, &app_config);

    let addr = app_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        name = version::NAME,
        version = version::VERSION,
        "Listening on http://{}{}",
        addr,
        app_config.server.metrics_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received shutdown signal");
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
