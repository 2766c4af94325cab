use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use broker::DerivBroker;
use common::{BrokerClient, Config, TradeChooser, TradingMode};
use session::{Orchestrator, SessionStore};
use sim::SimBroker;
use strategy::{RsiDigitChooser, RsiIndicator};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.trading_mode, symbol = %cfg.trade_symbol, "GhostFX starting");

    // ── Shared state ──────────────────────────────────────────────────────────
    let store = Arc::new(SessionStore::default());

    // ── Broker client (injected based on TRADING_MODE) ────────────────────────
    let broker_client: Arc<dyn BrokerClient> = match cfg.trading_mode {
        TradingMode::Live => {
            info!(endpoint = %cfg.deriv_endpoint, "Live mode, using DerivBroker");
            Arc::new(DerivBroker::from_config(&cfg))
        }
        TradingMode::Sim => {
            info!("Sim mode, using SimBroker");
            Arc::new(SimBroker::default())
        }
    };

    // ── Decision engine ───────────────────────────────────────────────────────
    let chooser: Arc<dyn TradeChooser> = Arc::new(RsiDigitChooser::new(RsiIndicator::default()));

    // ── Orchestrator ──────────────────────────────────────────────────────────
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        broker_client.clone(),
        chooser,
        cfg.trade_symbol.clone(),
    ));

    // ── Dashboard API ─────────────────────────────────────────────────────────
    let api_state = AppState {
        store,
        broker: broker_client,
        orchestrator,
        trading_mode: cfg.trading_mode,
    };
    tokio::spawn(api::serve(api_state, cfg.api_port));

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
