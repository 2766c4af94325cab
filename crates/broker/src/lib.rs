pub mod deriv;
pub mod session;
pub mod wire;

pub use deriv::DerivBroker;
pub use session::{Action, SessionState, TradeSession};
