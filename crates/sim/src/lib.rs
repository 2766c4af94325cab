use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::{BrokerClient, Error, OrderParams, Result, SettledTrade, TradeChooser};

/// Payout multiplier for an unscripted winning contract.
const WIN_PAYOUT: f64 = 0.95;

/// Simulated broker for dry runs and tests.
///
/// No network at all: serves a fixed close-price window to the chooser and
/// settles immediately. Outcomes can be scripted per call; with an empty
/// script it alternates a win at the usual binary payout with a full-stake
/// loss, so longer dry runs exercise both sides of the ledger.
pub struct SimBroker {
    balance: f64,
    history: Vec<f64>,
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    outcomes: VecDeque<Result<f64>>,
    settled: u64,
}

impl SimBroker {
    pub fn new(balance: f64) -> Self {
        info!(balance, "SimBroker initialized");
        Self {
            balance,
            history: default_history(),
            state: Mutex::new(SimState::default()),
        }
    }

    /// Replace the close-price window served to the chooser.
    pub fn with_history(mut self, closes: Vec<f64>) -> Self {
        self.history = closes;
        self
    }

    /// Queue a settlement profit for an upcoming trade.
    pub async fn script_profit(&self, profit: f64) {
        self.state.lock().await.outcomes.push_back(Ok(profit));
    }

    /// Queue a failure for an upcoming trade.
    pub async fn script_failure(&self, error: Error) {
        self.state.lock().await.outcomes.push_back(Err(error));
    }

    /// How many trades have settled so far.
    pub async fn settled_count(&self) -> u64 {
        self.state.lock().await.settled
    }
}

impl Default for SimBroker {
    fn default() -> Self {
        Self::new(10_000.0)
    }
}

/// Alternating one-point moves: neutral RSI, so the digit rule decides.
fn default_history() -> Vec<f64> {
    let mut closes = vec![100.0];
    for i in 1..20 {
        let last = closes[i - 1];
        closes.push(if i % 2 == 1 { last + 1.0 } else { last - 1.0 });
    }
    closes
}

/// Settlement amounts are money; keep them at cent precision.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[async_trait]
impl BrokerClient for SimBroker {
    async fn balance(&self, _token: &str) -> Result<f64> {
        Ok(self.balance)
    }

    async fn run_trade(
        &self,
        _token: &str,
        order: &OrderParams,
        chooser: &dyn TradeChooser,
    ) -> Result<SettledTrade> {
        let choice = chooser.choose(&self.history);

        let mut state = self.state.lock().await;
        let profit = match state.outcomes.pop_front() {
            Some(Ok(profit)) => profit,
            Some(Err(error)) => return Err(error),
            None if state.settled % 2 == 0 => order.stake * WIN_PAYOUT,
            None => -order.stake,
        };
        state.settled += 1;

        let trade = SettledTrade::new(choice, round_cents(profit));
        debug!(
            contract = %trade.choice.contract_type,
            method = %trade.choice.method,
            profit = trade.profit,
            "simulated settlement"
        );
        Ok(trade)
    }
}
