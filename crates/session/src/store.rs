use serde::Serialize;
use tokio::sync::RwLock;

use common::{
    GateRejection, Period, Report, SessionRecord, SettledTrade, Settings, SettingsUpdate, Summary,
};

use crate::aggregator::{self, Ledger};
use crate::gate;

/// Process-wide trading state: the live settings and the ledger.
///
/// Two locks on purpose. Settings traffic never contends with the ledger,
/// and one ledger write guard covers every aggregator mutation, so a
/// dashboard read under the read guard is an atomic snapshot.
#[derive(Debug, Default)]
pub struct SessionStore {
    settings: RwLock<Settings>,
    ledger: RwLock<Ledger>,
}

/// One consistent view of the ledger, as `GET /api/dashboard` returns it.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub summary: Summary,
    pub reports: Vec<Report>,
    pub sessions: Vec<SessionRecord>,
}

impl SessionStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Merge an update into the live settings and return the result.
    pub async fn merge_settings(&self, update: SettingsUpdate) -> Settings {
        let mut settings = self.settings.write().await;
        settings.merge(update);
        settings.clone()
    }

    pub async fn dashboard(&self) -> DashboardSnapshot {
        let ledger = self.ledger.read().await;
        DashboardSnapshot {
            summary: ledger.summary.clone(),
            reports: ledger.reports.clone(),
            sessions: ledger.sessions.clone(),
        }
    }

    /// Run the session gate for `period` against the current state.
    pub async fn gate(&self, period: Period) -> Result<(), GateRejection> {
        let settings = self.settings.read().await;
        let ledger = self.ledger.read().await;
        gate::check(&ledger.tracker, &ledger.summary, &settings, period)
    }

    /// Fold a settlement into the ledger and consume the period, under one
    /// write guard.
    pub async fn record_settlement(&self, period: Period, trade: &SettledTrade) {
        let mut ledger = self.ledger.write().await;
        aggregator::record(&mut ledger, period, trade, current_time());
    }

    /// Consume the period without recording anything (failed attempt).
    pub async fn mark_period(&self, period: Period) {
        self.ledger.write().await.tracker.mark(period);
    }
}

/// Wall-clock time the way the dashboard lists it: `HH:MM:SS`, local.
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
