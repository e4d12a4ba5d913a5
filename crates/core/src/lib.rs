pub mod guard;
pub mod messages;
pub mod models;
pub mod roster;
pub mod triage;

pub use guard::{parse_guard_verdict, GuardGate, VerdictError};
pub use models::*;
pub use roster::specialist_for;
pub use triage::route_category;
