//! Thread-safe roster for stores shared by several administrators.
//!
//! Mutations are serialized per event, not globally: the outer map lock is
//! held only long enough to find or create an event's lock. All rules are
//! evaluated while holding the event lock, so two concurrent `assign` calls
//! for the same slot can never both succeed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::debug;

use crate::availability::AvailabilityTracker;
use crate::directory::MemberDirectory;
use crate::error::Result;
use crate::models::{Assignment, Event, MemberId, Role};
use crate::roster::event_roster::EMPTY_ROSTER;
use crate::roster::{EventRoster, Reassignment, RosterStore};

#[derive(Debug, Default)]
pub struct SharedRoster {
    events: Mutex<HashMap<Event, Arc<Mutex<EventRoster>>>>,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
/// Rosters are only written after validation passes, so the data is
/// always consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SharedRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock of an event that has been written before.
    fn existing_lock(&self, event: &Event) -> Option<Arc<Mutex<EventRoster>>> {
        lock(&self.events).get(event).cloned()
    }

    /// Lock of an event about to be written, created on first use. Rules
    /// that do not depend on current bindings are checked against an empty
    /// roster first, so rejected calls never add entries.
    fn write_lock<D>(
        &self,
        event: &Event,
        role: Role,
        member: &MemberId,
        replacing: bool,
        directory: &D,
        availability: &RwLock<AvailabilityTracker>,
    ) -> Result<Arc<Mutex<EventRoster>>>
    where
        D: MemberDirectory + ?Sized,
    {
        {
            let availability = availability.read().unwrap_or_else(PoisonError::into_inner);
            EMPTY_ROSTER.check_assign(event, role, member, replacing, directory, &availability)?;
        }
        let mut events = lock(&self.events);
        Ok(Arc::clone(events.entry(*event).or_default()))
    }

    pub fn assign<D>(
        &self,
        event: &Event,
        role: Role,
        member: &MemberId,
        directory: &D,
        availability: &RwLock<AvailabilityTracker>,
    ) -> Result<Assignment>
    where
        D: MemberDirectory + ?Sized,
    {
        let slot = self.write_lock(event, role, member, false, directory, availability)?;
        let mut roster = lock(&slot);
        {
            let availability = availability.read().unwrap_or_else(PoisonError::into_inner);
            roster.check_assign(event, role, member, false, directory, &availability)?;
        }
        roster.insert(role, member.clone());
        debug!(event = %event, role = role.key(), member = %member, version = roster.version(), "Assigned");
        Ok(Assignment::new(event, role, member.clone()))
    }

    pub fn unassign(&self, event: &Event, role: Role) -> Option<Assignment> {
        let slot = self.existing_lock(event)?;
        let mut roster = lock(&slot);
        let member = roster.remove(role)?;
        debug!(event = %event, role = role.key(), member = %member, version = roster.version(), "Unassigned");
        Some(Assignment::new(event, role, member))
    }

    pub fn reassign<D>(
        &self,
        event: &Event,
        role: Role,
        member: &MemberId,
        directory: &D,
        availability: &RwLock<AvailabilityTracker>,
    ) -> Result<Reassignment>
    where
        D: MemberDirectory + ?Sized,
    {
        let slot = self.write_lock(event, role, member, true, directory, availability)?;
        let mut roster = lock(&slot);
        {
            let availability = availability.read().unwrap_or_else(PoisonError::into_inner);
            roster.check_assign(event, role, member, true, directory, &availability)?;
        }
        let previous = roster
            .insert(role, member.clone())
            .map(|old| Assignment::new(event, role, old));
        Ok(Reassignment {
            previous,
            current: Assignment::new(event, role, member.clone()),
        })
    }

    pub fn list_assignments(&self, event: &Event) -> Vec<Assignment> {
        match self.existing_lock(event) {
            Some(slot) => lock(&slot).assignments(event),
            None => Vec::new(),
        }
    }

    /// Assignment-set version of an event; grows by one on every change.
    pub fn version(&self, event: &Event) -> u64 {
        self.existing_lock(event)
            .map(|slot| lock(&slot).version())
            .unwrap_or(0)
    }

    /// Copy the current state into a single-threaded store, e.g. for reporting.
    pub fn snapshot(&self) -> RosterStore {
        let handles: Vec<(Event, Arc<Mutex<EventRoster>>)> = lock(&self.events)
            .iter()
            .map(|(event, slot)| (*event, Arc::clone(slot)))
            .collect();

        let mut store = RosterStore::new();
        for (event, slot) in handles {
            for assignment in lock(&slot).assignments(&event) {
                // Each event roster already satisfies the slot rules
                let _ = store.restore(assignment);
            }
        }
        store
    }
}
