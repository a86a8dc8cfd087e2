//! Persistence for assignments, availability blocks and the member list.
//!
//! `RosterRepository` is the storage seam. Two implementations ship:
//! - `MemoryRepository`: plain in-memory maps
//! - `JsonRepository`: JSON files under the data directory, each wrapped
//!   with the time it was saved

pub mod json;
pub mod repository;

pub use json::{JsonRepository, StoreAges, StoredData};
pub use repository::{MemoryRepository, RosterRepository};
