use common::{Period, Report, SessionRecord, SessionTracker, SettledTrade, Summary};

/// Everything one settlement touches. Held behind a single write lock so
/// the summary, the report list, the session list, and the period tracker
/// can only ever move together.
#[derive(Debug, Default)]
pub struct Ledger {
    pub summary: Summary,
    pub reports: Vec<Report>,
    pub sessions: Vec<SessionRecord>,
    pub tracker: SessionTracker,
}

/// Fold one settled trade into the ledger: append the report, bump the
/// summary, recompute the win rate, append the session record, and consume
/// the period.
pub fn record(ledger: &mut Ledger, period: Period, trade: &SettledTrade, time: String) {
    ledger.reports.push(Report {
        time: time.clone(),
        contract_type: trade.choice.contract_type,
        result: trade.outcome,
        profit: trade.profit,
        method: trade.choice.method,
    });

    ledger.summary.trades += 1;
    ledger.summary.profit += trade.profit;
    let wins = ledger.reports.iter().filter(|r| r.profit > 0.0).count();
    ledger.summary.rate =
        format!("{:.1}", wins as f64 / ledger.summary.trades as f64 * 100.0);

    ledger.sessions.push(SessionRecord {
        period,
        time,
        result: format!("{} → {}", trade.choice.contract_type, trade.outcome),
        method: trade.choice.method,
    });

    ledger.tracker.mark(period);
}
