//! Rosterbook core library - scheduling for a worship ministry.
//!
//! Derives the recurring service calendar, tracks when members are
//! unavailable, records who fills each role at each service and reports
//! on participation. Front ends (the `rosterbook` CLI, a future UI) drive
//! everything through [`RosterBook`].

pub mod availability;
pub mod book;
pub mod calendar;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod participation;
pub mod roster;
pub mod store;
pub mod summary;
pub mod utils;

pub use availability::AvailabilityTracker;
pub use book::{BookError, BookResult, RosterBook};
pub use config::Config;
pub use directory::{MemberDirectory, MemberList};
pub use error::{ErrorKind, Result, RosterError};
pub use models::{
    Assignment, AvailabilityBlock, DateRange, Event, EventType, Member, MemberId, Role, SlotKey,
    YearMonth,
};
pub use participation::{MonthlyCount, ParticipationRecord};
pub use roster::{Reassignment, RosterStore, SharedRoster};
pub use store::{JsonRepository, MemoryRepository, RosterRepository, StoredData};
pub use summary::{MonthSummary, OpenSlots};
