mod config;

use std::sync::Arc;

use anchor_client::solana_sdk::{signature::read_keypair_file, signer::Signer};
use config::Config;
use pool_rebalancer::{
    AnchorConnector, HttpBackend, Rebalancer, Scheduler, SystemClock, pool_program, telemetry,
};
use tokio::{signal, sync::watch};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // OTLP exporters use a blocking HTTP client, so they are built before the
    // async runtime starts.
    let telemetry = telemetry::init(config.log_format)?;
    telemetry::install_panic_hook();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config));
    drop(runtime);

    if let Err(e) = &result {
        error!(error = ?e, "Rebalancer exited with error");
    }
    telemetry.shutdown();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let authority = read_keypair_file(&config.keypair_path).map_err(|e| {
        anyhow::anyhow!("Failed to read keypair from {}: {}", config.keypair_path, e)
    })?;
    let authority = Arc::new(authority);

    let program = pool_program(config.cluster(), authority.clone())?;
    let backend = Arc::new(HttpBackend::new(&config.app_url, config.http_timeout())?);

    let rebalancer = Rebalancer::new(
        backend.clone(),
        Arc::new(AnchorConnector::new(program, config.compute_budget())),
        backend,
        Arc::new(SystemClock),
    );
    let scheduler = Scheduler::new(Arc::new(rebalancer), config.poll_interval());

    info!(
        authority = %authority.pubkey(),
        backend = %config.app_url,
        rpc = %config.rpc_url,
        poll_interval_secs = config.poll_interval_secs,
        "Starting pool rebalancer"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
        info!("Shutting down...");
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await;
    Ok(())
}
