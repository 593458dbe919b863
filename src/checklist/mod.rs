//! Checklist flow — session data, the state machine, and the pure transition
//! function that drives one inspection pass.

pub mod flow;
pub mod session;
pub mod state;
pub mod store;

pub use flow::{Event, Outbound, Step};
pub use session::{Finding, Session};
pub use state::FlowState;
pub use store::SessionStore;
