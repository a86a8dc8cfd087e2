//! Role assignments per event.
//!
//! - `RosterStore`: single-threaded store used by the app state
//! - `SharedRoster`: per-event locked variant for concurrent administrators
//! - `EventRoster`: the bindings of one event and the assignment rules

pub mod event_roster;
pub mod shared;
pub mod store;

pub use event_roster::EventRoster;
pub use shared::SharedRoster;
pub use store::{Reassignment, RosterStore};
