use common::{GateRejection, Period, SessionTracker, Settings, Summary};

/// Decide whether a trade attempt may start in `period`.
///
/// Checks run in a fixed order and the first hit wins: period already
/// used, then the trade cap, then stop loss, then take profit. Read-only;
/// a rejection leaves no trace anywhere.
pub fn check(
    tracker: &SessionTracker,
    summary: &Summary,
    settings: &Settings,
    period: Period,
) -> Result<(), GateRejection> {
    if tracker.is_used(period) {
        return Err(GateRejection::PeriodUsed(period));
    }
    if summary.trades >= settings.max_trades {
        return Err(GateRejection::MaxTrades);
    }
    // The stop loss is a magnitude however it was entered.
    if summary.profit <= -settings.stop_loss.abs() {
        return Err(GateRejection::StopLoss);
    }
    if summary.profit >= settings.take_profit {
        return Err(GateRejection::TakeProfit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(trades: u32, profit: f64) -> Summary {
        Summary {
            trades,
            profit,
            rate: "0".into(),
        }
    }

    #[test]
    fn fresh_state_passes() {
        let gate = check(
            &SessionTracker::default(),
            &summary(0, 0.0),
            &Settings::default(),
            Period::Morning,
        );
        assert_eq!(gate, Ok(()));
    }

    #[test]
    fn used_period_is_rejected_first() {
        let mut tracker = SessionTracker::default();
        tracker.mark(Period::Morning);

        // Even with every other limit blown, the period check wins.
        let gate = check(
            &tracker,
            &summary(99, -99.0),
            &Settings::default(),
            Period::Morning,
        );
        assert_eq!(gate, Err(GateRejection::PeriodUsed(Period::Morning)));

        // A different period falls through to the next check.
        let gate = check(
            &tracker,
            &summary(99, -99.0),
            &Settings::default(),
            Period::Evening,
        );
        assert_eq!(gate, Err(GateRejection::MaxTrades));
    }

    #[test]
    fn trade_cap_is_inclusive() {
        let settings = Settings::default(); // maxTrades 5
        let gate = check(
            &SessionTracker::default(),
            &summary(5, 0.0),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Err(GateRejection::MaxTrades));

        // The cap also outranks the profit limits.
        let gate = check(
            &SessionTracker::default(),
            &summary(5, -99.0),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Err(GateRejection::MaxTrades));

        let gate = check(
            &SessionTracker::default(),
            &summary(4, 0.0),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Ok(()));
    }

    #[test]
    fn stop_loss_triggers_at_the_boundary_and_ignores_sign() {
        let mut settings = Settings::default();
        settings.stop_loss = -2.0; // entered negative; treated as magnitude

        let gate = check(
            &SessionTracker::default(),
            &summary(1, -2.0),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Err(GateRejection::StopLoss));

        let gate = check(
            &SessionTracker::default(),
            &summary(1, -1.99),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Ok(()));
    }

    #[test]
    fn take_profit_triggers_at_the_boundary() {
        let settings = Settings::default(); // takeProfit 5
        let gate = check(
            &SessionTracker::default(),
            &summary(1, 5.0),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Err(GateRejection::TakeProfit));

        let gate = check(
            &SessionTracker::default(),
            &summary(1, 4.99),
            &settings,
            Period::Morning,
        );
        assert_eq!(gate, Ok(()));
    }
}
