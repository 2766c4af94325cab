use common::{ContractType, EntryMethod, TradeChoice, TradeChooser};
use tracing::debug;

use crate::indicators::RsiIndicator;

/// RSI readings at or below this pick a rising contract.
const OVERSOLD: u32 = 30;
/// RSI readings at or above this pick a falling contract.
const OVERBOUGHT: u32 = 70;

/// Entry policy for one trade attempt, checked in priority order:
///
/// 1. RSI below 30 → `CALL`, method `RSI_LOW`
/// 2. RSI above 70 → `PUT`, method `RSI_HIGH`
/// 3. Otherwise (including too little history for an RSI) → parity of the
///    last price's final printed digit, `DIGITEVEN`/`DIGITODD`, method `DIGIT`
///
/// Every call yields exactly one contract.
#[derive(Debug, Clone, Default)]
pub struct RsiDigitChooser {
    indicator: RsiIndicator,
}

impl RsiDigitChooser {
    pub fn new(indicator: RsiIndicator) -> Self {
        Self { indicator }
    }
}

impl TradeChooser for RsiDigitChooser {
    fn choose(&self, closes: &[f64]) -> TradeChoice {
        let rsi = self.indicator.compute(closes);
        let choice = match rsi {
            Some(value) if value < OVERSOLD => TradeChoice {
                contract_type: ContractType::Call,
                method: EntryMethod::RsiLow,
            },
            Some(value) if value > OVERBOUGHT => TradeChoice {
                contract_type: ContractType::Put,
                method: EntryMethod::RsiHigh,
            },
            _ => TradeChoice {
                contract_type: digit_contract(closes.last().copied()),
                method: EntryMethod::Digit,
            },
        };
        debug!(?rsi, contract = %choice.contract_type, method = %choice.method, "entry chosen");
        choice
    }
}

/// Parity of the final digit of `price` as printed. `f64` formatting never
/// ends in a decimal point, so the last character of the shortest
/// representation is the last significant digit. A missing or non-numeric
/// tail (empty history, non-finite price) counts as odd.
fn digit_contract(price: Option<f64>) -> ContractType {
    let even = price
        .map(|p| p.to_string())
        .and_then(|s| s.chars().last())
        .and_then(|c| c.to_digit(10))
        .map(|d| d % 2 == 0)
        .unwrap_or(false);
    if even {
        ContractType::DigitEven
    } else {
        ContractType::DigitOdd
    }
}
