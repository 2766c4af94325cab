pub mod aggregator;
pub mod gate;
pub mod orchestrator;
pub mod store;

pub use aggregator::Ledger;
pub use orchestrator::{Orchestrator, SessionError, SessionOutcome};
pub use store::{DashboardSnapshot, SessionStore};
