use clap::Parser;
use eyre::Result;
use fee_distributor::chain::{BalanceReader, HolderLister};
use fee_distributor::claim::{FeeClaimer, PumpPortalClient};
use fee_distributor::config::DistributorConfig;
use fee_distributor::distribution::{Distributor, TransferSettings};
use fee_distributor::keeper::{CycleConfig, CycleController};
use fee_distributor::lamports::lamports_to_sol;
use fee_distributor::rpc::SolanaRpcClient;
use fee_distributor::Wallet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration directory
    #[arg(long, default_value = "./configs/dev")]
    config_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Sign but never submit claim or transfer transactions
    #[arg(long)]
    dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("{}", "=".repeat(60));
    tracing::info!("Fee Distributor Started");
    tracing::info!("{}", "=".repeat(60));

    // Load configuration
    let config_path = PathBuf::from(&cli.config_path).join("distributor.json");
    let config = if config_path.exists() {
        DistributorConfig::load_from_file(&config_path).await?
    } else {
        tracing::warn!(path = %config_path.display(), "distributor.json not found, using defaults");
        DistributorConfig::default()
    };
    let mut config = config.with_env_overrides();

    if cli.dry_run {
        config.distribution.dry_run = true;
    }
    config.validate()?;

    let mint = config.token_mint()?;
    tracing::info!(
        rpc_url = %config.rpc.url,
        mint = %mint,
        interval_secs = config.distribution.interval_secs,
        dry_run = config.distribution.dry_run,
        "Config loaded"
    );

    // Wallet: secret only from the environment
    let private_key = std::env::var("PRIVATE_KEY")
        .map_err(|_| eyre::eyre!("PRIVATE_KEY environment variable is required"))?;
    let wallet = Arc::new(Wallet::from_base58(&private_key)?);
    if let Some(expected) = config.expected_public_key()? {
        wallet.ensure_matches(&expected)?;
    }
    tracing::info!("Wallet: {}", wallet.pubkey());

    let rpc = Arc::new(SolanaRpcClient::new(
        config.rpc.url.clone(),
        config.rpc.timeout_secs,
    ));
    let fee_api = Arc::new(PumpPortalClient::new(
        config.fee_claim.url.clone(),
        config.fee_claim.priority_fee_sol,
        config.fee_claim.timeout_secs,
    )?);

    let dry_run = config.distribution.dry_run;
    let claimer = FeeClaimer::new(rpc.clone(), fee_api, wallet.clone(), dry_run);
    let balances = BalanceReader::new(rpc.clone(), wallet.pubkey());
    let holders = HolderLister::new(rpc.clone(), mint, config.distribution.resolve_owners);
    let distributor = Distributor::new(
        rpc.clone(),
        wallet.clone(),
        TransferSettings {
            min_transfer_lamports: config.distribution.min_transfer_lamports,
            progress_every: config.distribution.progress_every,
            blockhash_max_age: Duration::from_secs(config.distribution.blockhash_max_age_secs),
            dry_run,
        },
    );

    let cycle_config = CycleConfig {
        interval_secs: config.distribution.interval_secs,
        settle_delay_secs: config.distribution.settle_delay_secs,
        error_backoff_secs: config.distribution.error_backoff_secs,
        reserve_lamports: config.reserve_lamports(),
        claim_enabled: config.fee_claim.enabled,
    };

    let controller = Arc::new(CycleController::new(
        claimer,
        balances,
        holders,
        distributor,
        cycle_config,
    ));

    if cli.once {
        let report = controller.run_cycle().await;
        tracing::info!(
            balance_sol = lamports_to_sol(report.balance_lamports),
            holders = report.holder_count,
            distributed = report.outcome.as_ref().map_or(0, |o| o.attempted()),
            "Single cycle complete"
        );
        return Ok(());
    }

    let cancel_token = controller.cancel_token();

    // Spawn the distributor loop
    let loop_handle = {
        let controller = controller.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.run().await {
                tracing::error!("Distributor loop error: {:?}", e);
            }
        })
    };

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, stopping after the current step");
    cancel_token.cancel();

    if let Err(e) = loop_handle.await {
        tracing::error!("Distributor loop task failed: {:?}", e);
    }

    Ok(())
}
