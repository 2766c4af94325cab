use async_trait::async_trait;

use crate::{OrderParams, Result, SettledTrade, TradeChoice};

/// Chooses the contract for one trade attempt from the recent close prices.
///
/// Pure and synchronous: the broker session calls it exactly once, after
/// price history arrives and before the buy order goes out.
pub trait TradeChooser: Send + Sync {
    fn choose(&self, closes: &[f64]) -> TradeChoice;
}

/// Abstraction over the broker connection.
///
/// `DerivBroker` implements this against the live streaming API.
/// `SimBroker` implements it for simulation.
///
/// One `run_trade` call owns one connection for the lifetime of a single
/// attempt; only the Session Orchestrator drives it, and only after the
/// session gate has passed.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Fetch the account balance for the given credential token.
    async fn balance(&self, token: &str) -> Result<f64>;

    /// Drive one complete trade attempt: authenticate, fetch history, let
    /// `chooser` pick the contract, buy it, and wait for settlement.
    async fn run_trade(
        &self,
        token: &str,
        order: &OrderParams,
        chooser: &dyn TradeChooser,
    ) -> Result<SettledTrade>;
}
