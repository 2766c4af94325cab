use common::{ContractType, EntryMethod, TradeChooser};
use proptest::prelude::*;
use strategy::{RsiDigitChooser, RsiIndicator};

proptest! {
    /// With a full window the RSI must always land on a whole number in 0..=100.
    #[test]
    fn rsi_stays_in_bounds_on_random_prices(
        closes in prop::collection::vec(0.0001f64..1_000_000.0f64, 15..60),
    ) {
        let rsi = RsiIndicator::default();
        let value = rsi.compute(&closes).expect("window is full");
        prop_assert!(value <= 100, "RSI out of range: {value}");
    }

    /// Below a full window the indicator stays silent instead of guessing.
    #[test]
    fn rsi_is_none_below_a_full_window(
        closes in prop::collection::vec(0.0001f64..1_000_000.0f64, 0..15),
    ) {
        let rsi = RsiIndicator::default();
        prop_assert!(rsi.compute(&closes).is_none());
    }

    /// The chooser is total: any history, including an empty one, yields a
    /// contract whose entry method matches its direction.
    #[test]
    fn chooser_always_pairs_contract_and_method(
        closes in prop::collection::vec(0.0001f64..1_000_000.0f64, 0..60),
    ) {
        let choice = RsiDigitChooser::default().choose(&closes);
        match choice.method {
            EntryMethod::RsiLow => prop_assert_eq!(choice.contract_type, ContractType::Call),
            EntryMethod::RsiHigh => prop_assert_eq!(choice.contract_type, ContractType::Put),
            EntryMethod::Digit => prop_assert!(matches!(
                choice.contract_type,
                ContractType::DigitEven | ContractType::DigitOdd
            )),
        }
    }
}
