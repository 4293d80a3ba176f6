use api_service::config::Config;
use api_service::shutdown::cancel_on;
use api_service::shutdown::wait_for_shutdown;
use api_service::supervisor::Supervisor;
use api_service::telemetry;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;
    telemetry::init(&config.log);

    tracing::info!(
        service = "api-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );
    tracing::info!(
        rest_port = config.rest.port,
        healthcheck_port = config.healthcheck.port,
        swagger_enabled = config.swagger.enable,
        swagger_port = config.swagger.port,
        backend = ?config.users.backend,
        "Configuration loaded"
    );

    let supervisor = Supervisor::build(&config)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Startup failed"))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on(wait_for_shutdown(), shutdown.clone()));

    supervisor.run(shutdown).await?;
    tracing::info!("Service stopped");

    Ok(())
}
