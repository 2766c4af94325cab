pub mod decision;
pub mod indicators;

pub use decision::RsiDigitChooser;
pub use indicators::RsiIndicator;
