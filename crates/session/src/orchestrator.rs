use std::sync::Arc;

use tracing::{error, info, warn};

use common::{BrokerClient, Error, GateRejection, OrderParams, Period, TradeChooser};

use crate::store::SessionStore;

/// How a gated attempt resolved. Both variants travel back to the
/// dashboard as HTTP 200 with the resolved message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The contract settled and the ledger has it.
    Settled,
    /// The broker connection failed somewhere along the attempt. The
    /// period is consumed anyway; only a gate rejection leaves it free.
    Failed,
}

impl SessionOutcome {
    /// The message string the dashboard shows for this resolution.
    pub fn message(&self) -> &'static str {
        match self {
            SessionOutcome::Settled => "Trade executed and recorded",
            SessionOutcome::Failed => "WebSocket failed",
        }
    }
}

/// Why an attempt produced no resolution at all.
#[derive(Debug)]
pub enum SessionError {
    /// Blocked by the gate before any broker contact.
    Rejected(GateRejection),
    /// A local bug, not a broker condition. The period stays free.
    Internal(Error),
}

/// Runs one trade attempt end to end: gate, order, settlement, ledger.
pub struct Orchestrator {
    store: Arc<SessionStore>,
    broker: Arc<dyn BrokerClient>,
    chooser: Arc<dyn TradeChooser>,
    symbol: String,
}

impl Orchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        broker: Arc<dyn BrokerClient>,
        chooser: Arc<dyn TradeChooser>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            store,
            broker,
            chooser,
            symbol: symbol.into(),
        }
    }

    /// One gated attempt for the current wall-clock period.
    pub async fn run_session(&self, token: &str) -> Result<SessionOutcome, SessionError> {
        self.attempt(token, Period::current()).await
    }

    /// One gated attempt for an explicit period.
    pub async fn attempt(
        &self,
        token: &str,
        period: Period,
    ) -> Result<SessionOutcome, SessionError> {
        if let Err(rejection) = self.store.gate(period).await {
            info!(%period, reason = %rejection, "attempt blocked at the gate");
            return Err(SessionError::Rejected(rejection));
        }

        let settings = self.store.settings().await;
        let order = OrderParams {
            symbol: self.symbol.clone(),
            stake: settings.stake_amount,
            currency: settings.currency.clone(),
        };
        info!(%period, symbol = %order.symbol, stake = order.stake, "attempt started");

        match self
            .broker
            .run_trade(token, &order, self.chooser.as_ref())
            .await
        {
            Ok(trade) => {
                self.store.record_settlement(period, &trade).await;
                info!(%period, profit = trade.profit, outcome = %trade.outcome, "attempt settled");
                Ok(SessionOutcome::Settled)
            }
            Err(err) if err.is_transport() => {
                self.store.mark_period(period).await;
                warn!(%period, error = %err, "attempt failed in transit, period consumed");
                Ok(SessionOutcome::Failed)
            }
            Err(err) => {
                error!(%period, error = %err, "attempt hit a local error");
                Err(SessionError::Internal(err))
            }
        }
    }
}
