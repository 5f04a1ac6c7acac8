//! eth-fetcher server.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                       ETH-FETCHER                        │
//!                  │                                                          │
//!  HTTP client     │  ┌────────┐    ┌─────────────────────┐    ┌───────────┐  │
//!  ────────────────┼─▶│  http  │───▶│ TransactionResolver │───▶│   store   │  │
//!                  │  │ router │    └──────────┬──────────┘    │ (journal) │  │
//!                  │  └───┬────┘               │ miss          └─────▲─────┘  │
//!                  │      │                    ▼                      │        │
//!                  │      │  save    ┌─────────────────────┐          │        │
//!                  │      └────────▶│ PersonSubmitter      │          │        │
//!                  │                 │  + ConfirmationWaiter│          │        │
//!                  │                 └──────────┬──────────┘          │        │
//!                  │                            ▼                     │        │
//!  Ethereum node   │                 ┌─────────────────────┐   ┌──────┴─────┐  │
//!  ◀───HTTP────────┼─────────────────│ ChainClient/Gateway │──▶│  Ingestor  │  │
//!  ────WS──────────┼────────────────▶│                     │   │ (bg task)  │  │
//!                  │                 └─────────────────────┘   └────────────┘  │
//!                  └──────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use eth_fetcher::blockchain::{ChainClient, Wallet};
use eth_fetcher::config::load_config;
use eth_fetcher::confirmation::ConfirmationWaiter;
use eth_fetcher::contract::{ContractGateway, PersonRegistry, PersonSubmitter};
use eth_fetcher::http::{AppState, HttpServer};
use eth_fetcher::ingest::EventIngestor;
use eth_fetcher::lifecycle::{signals, Shutdown};
use eth_fetcher::observability::{logging, metrics};
use eth_fetcher::resolver::TransactionResolver;
use eth_fetcher::store::{MemoryEventStore, MemoryTransactionStore};

#[derive(Parser)]
#[command(name = "eth-fetcher")]
#[command(about = "Ethereum transaction fetcher and person-registry gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "eth-fetcher starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.chain.rpc_url,
        ws_url = %config.chain.ws_url,
        contract = %config.contract.address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = ChainClient::connect(&config.chain).await?;
    let wallet = Wallet::from_private_key(config.chain.private_key.expose(), client.chain_id().into())?;
    let gateway = ContractGateway::new(client.clone(), wallet, &config.contract)?;
    let registry: Arc<dyn PersonRegistry> = Arc::new(gateway);

    let transactions = Arc::new(MemoryTransactionStore::open(
        config.storage.transactions_path.as_deref(),
    )?);
    let events = Arc::new(MemoryEventStore::open(config.storage.events_path.as_deref())?);

    let shutdown = Shutdown::new();
    let signal_task = signals::spawn_signal_listener(shutdown.clone());

    let ingestor = EventIngestor::new(registry.clone(), events.clone(), config.ingest.clone());
    let ingest_running = ingestor.running_flag();
    let ingest_shutdown = shutdown.clone();
    let ingest_task = tokio::spawn(async move { ingestor.run(ingest_shutdown).await });

    let chain = Arc::new(client);
    let waiter = ConfirmationWaiter::new(chain.clone(), &config.confirmation, shutdown.clone());
    let state = AppState {
        resolver: TransactionResolver::new(chain.clone(), transactions.clone()),
        transactions,
        events,
        registry: registry.clone(),
        submitter: PersonSubmitter::new(registry, waiter),
        node: chain,
        ingest_running,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let served = HttpServer::new(state, &config.listener)
        .run(listener, shutdown.clone())
        .await;

    shutdown.trigger();
    match ingest_task.await {
        Ok(reason) => tracing::info!(reason = ?reason, "Event ingestor joined"),
        Err(e) => tracing::error!(error = %e, "Event ingestor task failed"),
    }
    signal_task.abort();

    served?;
    tracing::info!("Shutdown complete");
    Ok(())
}
