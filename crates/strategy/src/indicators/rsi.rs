/// RSI (Relative Strength Index) indicator.
///
/// Uses plain arithmetic means of gains and losses over a single lookback
/// window rather than Wilder's smoothed variant; the entry policy's 30/70
/// thresholds are calibrated against this gauge, so the two must move
/// together. Returns `None` until at least `period + 1` close prices are
/// available.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// Compute the RSI over the most recent `period + 1` close prices
    /// (oldest first), rounded to a whole number in `0..=100`.
    /// Returns `None` if there are fewer than `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<u32> {
        if closes.len() < self.period + 1 {
            return None;
        }

        let window = &closes[closes.len() - (self.period + 1)..];

        let mut gains = 0.0;
        let mut losses = 0.0;
        for pair in window.windows(2) {
            let change = pair[1] - pair[0];
            if change >= 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        // A windowful of gains pegs the index at its ceiling.
        if avg_loss == 0.0 {
            return Some(100);
        }

        let rs = avg_gain / avg_loss;
        Some((100.0 - 100.0 / (1.0 + rs)).round() as u32)
    }
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}
