use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

/// Time-of-day bucket used to rate-limit trading to one attempt each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    /// Bucket for a wall-clock hour: before 12 morning, before 18 afternoon,
    /// evening otherwise.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Period::Morning
        } else if hour < 18 {
            Period::Afternoon
        } else {
            Period::Evening
        }
    }

    /// Bucket for the local wall clock right now.
    pub fn current() -> Self {
        Self::from_hour(Local::now().hour())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Morning => write!(f, "morning"),
            Period::Afternoon => write!(f, "afternoon"),
            Period::Evening => write!(f, "evening"),
        }
    }
}

/// Per-period "already traded" flags. Never reset within a run, so each
/// period admits at most one trade attempt per process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTracker {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
}

impl SessionTracker {
    pub fn is_used(&self, period: Period) -> bool {
        match period {
            Period::Morning => self.morning,
            Period::Afternoon => self.afternoon,
            Period::Evening => self.evening,
        }
    }

    pub fn mark(&mut self, period: Period) {
        match period {
            Period::Morning => self.morning = true,
            Period::Afternoon => self.afternoon = true,
            Period::Evening => self.evening = true,
        }
    }
}

/// Dashboard color theme, stored with the rest of the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// Dashboard-controlled trading settings, JSON-compatible with what the
/// frontend reads and writes (`stakeAmount`, `maxTrades`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub currency: String,
    pub stake_amount: f64,
    pub max_trades: u32,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_per_trade: f64,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub theme: Theme,
    /// Session duration in minutes.
    pub session_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            stake_amount: 0.35,
            max_trades: 5,
            stop_loss: 2.0,
            take_profit: 5.0,
            risk_per_trade: 10.0,
            notifications_enabled: true,
            sound_enabled: false,
            theme: Theme::Dark,
            session_duration: 60,
        }
    }
}

/// Partial settings payload accepted by `POST /api/settings`.
///
/// The four fields the session gate reads are required and typed numeric;
/// a payload missing any of them fails to deserialize and is rejected
/// wholesale, leaving the stored settings untouched. Every other field is
/// optional and merges field-by-field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub stake_amount: f64,
    pub max_trades: u32,
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub risk_per_trade: Option<f64>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub sound_enabled: Option<bool>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub session_duration: Option<u32>,
}

impl Settings {
    /// Apply an update on top of the current settings.
    pub fn merge(&mut self, update: SettingsUpdate) {
        self.stake_amount = update.stake_amount;
        self.max_trades = update.max_trades;
        self.stop_loss = update.stop_loss;
        self.take_profit = update.take_profit;
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(risk_per_trade) = update.risk_per_trade {
            self.risk_per_trade = risk_per_trade;
        }
        if let Some(notifications_enabled) = update.notifications_enabled {
            self.notifications_enabled = notifications_enabled;
        }
        if let Some(sound_enabled) = update.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(session_duration) = update.session_duration {
            self.session_duration = session_duration;
        }
    }
}

/// Running aggregate shown on the dashboard overview tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trades: u32,
    /// Signed cumulative profit across all settled trades.
    pub profit: f64,
    /// Win rate as a percentage with one decimal, e.g. "66.7".
    pub rate: String,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            trades: 0,
            profit: 0.0,
            rate: "0".to_string(),
        }
    }
}

/// Broker contract direction/shape for a binary bet. Serialized with the
/// wire spelling (`CALL`, `DIGITEVEN`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
    Call,
    Put,
    DigitEven,
    DigitOdd,
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractType::Call => write!(f, "CALL"),
            ContractType::Put => write!(f, "PUT"),
            ContractType::DigitEven => write!(f, "DIGITEVEN"),
            ContractType::DigitOdd => write!(f, "DIGITODD"),
        }
    }
}

/// Which decision rule picked the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryMethod {
    RsiLow,
    RsiHigh,
    Digit,
}

impl std::fmt::Display for EntryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryMethod::RsiLow => write!(f, "RSI_LOW"),
            EntryMethod::RsiHigh => write!(f, "RSI_HIGH"),
            EntryMethod::Digit => write!(f, "DIGIT"),
        }
    }
}

/// Settlement classification: profit strictly above zero is a win, anything
/// else (including zero) is a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl TradeOutcome {
    pub fn from_profit(profit: f64) -> Self {
        if profit > 0.0 {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        }
    }
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "win"),
            TradeOutcome::Loss => write!(f, "loss"),
        }
    }
}

/// Output of the decision engine: what to buy and which rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeChoice {
    pub contract_type: ContractType,
    pub method: EntryMethod,
}

/// A contract observed as sold, with its realized profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledTrade {
    pub choice: TradeChoice,
    pub profit: f64,
    pub outcome: TradeOutcome,
}

impl SettledTrade {
    pub fn new(choice: TradeChoice, profit: f64) -> Self {
        Self {
            choice,
            profit,
            outcome: TradeOutcome::from_profit(profit),
        }
    }
}

/// Parameters for the single buy order of one trade attempt. The contract
/// duration is fixed at one minute; the broker client owns that constant.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    pub symbol: String,
    pub stake: f64,
    pub currency: String,
}

/// Immutable record of one settled trade, appended newest-last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub time: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub result: TradeOutcome,
    pub profit: f64,
    pub method: EntryMethod,
}

/// Immutable record of one attempted session, e.g. `"CALL → win"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub period: Period,
    pub time: String,
    pub result: String,
    pub method: EntryMethod,
}

/// Reason a trade attempt was blocked before touching the broker.
/// `Display` is the user-facing string returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRejection {
    PeriodUsed(Period),
    MaxTrades,
    StopLoss,
    TakeProfit,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRejection::PeriodUsed(period) => {
                write!(f, "Already traded in {period} session")
            }
            GateRejection::MaxTrades => write!(f, "Max trades reached"),
            GateRejection::StopLoss => write!(f, "Stop loss hit"),
            GateRejection::TakeProfit => write!(f, "Take profit reached"),
        }
    }
}

/// Whether trade attempts hit the real broker or the in-process simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Live,
    Sim,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "live"),
            TradingMode::Sim => write!(f, "sim"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_buckets_split_at_noon_and_six() {
        assert_eq!(Period::from_hour(0), Period::Morning);
        assert_eq!(Period::from_hour(11), Period::Morning);
        assert_eq!(Period::from_hour(12), Period::Afternoon);
        assert_eq!(Period::from_hour(17), Period::Afternoon);
        assert_eq!(Period::from_hour(18), Period::Evening);
        assert_eq!(Period::from_hour(23), Period::Evening);
    }

    #[test]
    fn zero_profit_settles_as_loss() {
        assert_eq!(TradeOutcome::from_profit(0.0), TradeOutcome::Loss);
        assert_eq!(TradeOutcome::from_profit(-0.35), TradeOutcome::Loss);
        assert_eq!(TradeOutcome::from_profit(0.01), TradeOutcome::Win);
    }

    #[test]
    fn settings_merge_keeps_unspecified_fields() {
        let mut settings = Settings::default();
        let update: SettingsUpdate = serde_json::from_value(serde_json::json!({
            "stakeAmount": 1.0,
            "maxTrades": 3,
            "stopLoss": 4.0,
            "takeProfit": 8.0,
            "theme": "light",
        }))
        .unwrap();

        settings.merge(update);

        assert_eq!(settings.stake_amount, 1.0);
        assert_eq!(settings.max_trades, 3);
        assert_eq!(settings.theme, Theme::Light);
        // untouched by the partial update
        assert_eq!(settings.currency, "USD");
        assert!(settings.notifications_enabled);
        assert_eq!(settings.session_duration, 60);
    }

    #[test]
    fn gate_rejection_strings_match_the_dashboard() {
        assert_eq!(
            GateRejection::PeriodUsed(Period::Morning).to_string(),
            "Already traded in morning session"
        );
        assert_eq!(GateRejection::MaxTrades.to_string(), "Max trades reached");
        assert_eq!(GateRejection::StopLoss.to_string(), "Stop loss hit");
        assert_eq!(
            GateRejection::TakeProfit.to_string(),
            "Take profit reached"
        );
    }
}
