//! Data models for the ministry schedule.
//!
//! - `Member`, `MemberId`, `Role`: people and the functions they can fill
//! - `EventType`, `Event`: recurring services and their concrete occurrences
//! - `YearMonth`, `DateRange`: calendar windows used by queries
//! - `Assignment`, `SlotKey`, `AvailabilityBlock`: the mutable records

pub mod assignment;
pub mod event;
pub mod member;

pub use assignment::{Assignment, AvailabilityBlock, SlotKey};
pub use event::{DateRange, Event, EventType, YearMonth};
pub use member::{Member, MemberId, Role};
