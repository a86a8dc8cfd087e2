//! Application state: the stores plus their persistence.
//!
//! `RosterBook` is what a front end talks to. Every command validates
//! against the in-memory stores, then writes through the repository. If
//! the write fails the in-memory change is undone, so memory and storage
//! never disagree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::availability::AvailabilityTracker;
use crate::calendar;
use crate::directory::{MemberDirectory, MemberList};
use crate::error::{ErrorKind, RosterError};
use crate::models::{
    Assignment, AvailabilityBlock, DateRange, Event, EventType, Member, MemberId, Role, YearMonth,
};
use crate::participation::{self, ParticipationRecord};
use crate::roster::{Reassignment, RosterStore};
use crate::store::RosterRepository;
use crate::summary::{self, MonthSummary, OpenSlots};

#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl BookError {
    /// Domain category, `None` for storage failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            BookError::Roster(e) => Some(e.kind()),
            BookError::Storage(_) => None,
        }
    }

    /// Short label for front ends: the error kind or "storage".
    pub fn label(&self) -> String {
        self.kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "storage".to_string())
    }
}

pub type BookResult<T> = std::result::Result<T, BookError>;

pub struct RosterBook<R, D = MemberList> {
    directory: D,
    repository: R,
    availability: AvailabilityTracker,
    roster: RosterStore,
}

impl<R, D> RosterBook<R, D>
where
    R: RosterRepository,
    D: MemberDirectory,
{
    /// Load persisted blocks and assignments. Records that break a roster
    /// rule (a doubled slot, a member in two roles) are skipped with a warning
    /// and deleted from the repository.
    pub fn open(directory: D, mut repository: R) -> BookResult<Self> {
        let mut availability = AvailabilityTracker::new();
        for block in repository.blocks_in(DateRange::all())? {
            availability.restore(block);
        }

        let mut roster = RosterStore::new();
        let mut skipped = Vec::new();
        for assignment in repository.assignments_in(DateRange::all())? {
            let slot = assignment.slot();
            if let Err(e) = roster.restore(assignment) {
                warn!(slot = %slot, error = %e, "Skipping inconsistent stored assignment");
                skipped.push(slot);
            }
        }
        for slot in &skipped {
            repository.delete_assignment(slot)?;
        }

        debug!(
            assignments = roster.len(),
            blocks = availability.len(),
            members = directory.members().len(),
            "Roster book opened"
        );
        Ok(Self {
            directory,
            repository,
            availability,
            roster,
        })
    }

    // ===== Accessors =====

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn availability(&self) -> &AvailabilityTracker {
        &self.availability
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Swap the member directory, e.g. after an import. Existing
    /// assignments are kept even if their members disappear.
    pub fn replace_directory(&mut self, directory: D) -> D {
        std::mem::replace(&mut self.directory, directory)
    }

    /// Resolve a (date, type) pair to a scheduled event.
    pub fn event(&self, date: NaiveDate, event_type: EventType) -> BookResult<Event> {
        Ok(calendar::event_on(date, event_type)?)
    }

    // ===== Commands =====

    /// Flip a member's availability for `date`. Returns `true` when the
    /// date is blocked afterwards.
    pub fn toggle_block(&mut self, member: &MemberId, date: NaiveDate) -> BookResult<bool> {
        let blocked = self.availability.toggle_block(member, date);
        let persisted = if blocked {
            self.repository
                .insert_block(&AvailabilityBlock::new(member.clone(), date))
        } else {
            self.repository.delete_block(member, date).map(|_| ())
        };
        if let Err(e) = persisted {
            self.availability.toggle_block(member, date);
            return Err(e.into());
        }
        debug!(member = %member, date = %date, blocked, "Toggled availability");
        Ok(blocked)
    }

    pub fn assign(&mut self, event: &Event, role: Role, member: &MemberId) -> BookResult<Assignment> {
        let assignment =
            self.roster
                .assign(event, role, member, &self.directory, &self.availability)?;
        if let Err(e) = self.repository.insert_assignment(&assignment) {
            self.roster.unassign(event, role);
            return Err(e.into());
        }
        debug!(event = %event, role = role.key(), member = %member, "Assigned");
        Ok(assignment)
    }

    /// Remove the binding of `role`; an empty slot is an error here.
    pub fn unassign(&mut self, event: &Event, role: Role) -> BookResult<Assignment> {
        let removed = self
            .roster
            .unassign(event, role)
            .ok_or(RosterError::SlotEmpty {
                date: event.date,
                event_type: event.event_type,
                role,
            })?;
        if let Err(e) = self.repository.delete_assignment(&removed.slot()) {
            self.put_back(removed);
            return Err(e.into());
        }
        debug!(event = %event, role = role.key(), member = %removed.member_id, "Unassigned");
        Ok(removed)
    }

    pub fn reassign(
        &mut self,
        event: &Event,
        role: Role,
        member: &MemberId,
    ) -> BookResult<Reassignment> {
        let change =
            self.roster
                .reassign(event, role, member, &self.directory, &self.availability)?;
        if let Err(e) = self.repository.insert_assignment(&change.current) {
            self.roster.unassign(event, role);
            if let Some(previous) = change.previous {
                self.put_back(previous);
            }
            return Err(e.into());
        }
        debug!(
            event = %event,
            role = role.key(),
            from = ?change.previous.as_ref().map(|a| a.member_id.as_str()),
            to = %member,
            "Reassigned"
        );
        Ok(change)
    }

    fn put_back(&mut self, assignment: Assignment) {
        let slot = assignment.slot();
        if let Err(e) = self.roster.restore(assignment) {
            warn!(slot = %slot, error = %e, "Could not roll back roster change");
        }
    }

    // ===== Queries =====

    pub fn is_blocked(&self, member: &MemberId, date: NaiveDate) -> bool {
        self.availability.is_blocked(member, date)
    }

    pub fn list_blocked(&self, member: &MemberId) -> Vec<NaiveDate> {
        self.availability.list_blocked(member)
    }

    pub fn list_assignments(&self, event: &Event) -> Vec<Assignment> {
        self.roster.list_assignments(event)
    }

    pub fn is_fully_staffed(&self, event: &Event) -> bool {
        self.roster.is_fully_staffed(event)
    }

    pub fn open_roles(&self, event: &Event) -> Vec<Role> {
        self.roster.open_roles(event)
    }

    pub fn eligible_members(&self, event: &Event, role: Role) -> Vec<&Member> {
        self.roster
            .eligible_members(event, role, &self.directory, &self.availability)
    }

    pub fn aggregate(
        &self,
        range: DateRange,
        event_type: Option<EventType>,
    ) -> BTreeMap<MemberId, usize> {
        participation::aggregate(&self.roster, range, event_type)
    }

    pub fn top_participant(&self, range: DateRange) -> Option<ParticipationRecord> {
        participation::top_participant(&self.roster, range, &self.directory)
    }

    pub fn participation_table(&self, range: DateRange) -> Vec<ParticipationRecord> {
        participation::participation_table(&self.roster, range, &self.directory)
    }

    pub fn member_participation(&self, member: &MemberId, range: DateRange) -> ParticipationRecord {
        participation::member_participation(&self.roster, member, range, &self.directory)
    }

    pub fn month_summary(&self, month: YearMonth) -> MonthSummary {
        summary::month_summary(month, &self.directory, &self.roster)
    }

    pub fn unstaffed_events(&self, month: YearMonth) -> Vec<OpenSlots> {
        summary::unstaffed_events(month, &self.roster)
    }
}
