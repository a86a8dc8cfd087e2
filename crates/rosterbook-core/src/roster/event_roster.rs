use std::collections::BTreeMap;

use crate::availability::AvailabilityTracker;
use crate::calendar;
use crate::directory::MemberDirectory;
use crate::error::{Result, RosterError};
use crate::models::{Assignment, Event, MemberId, Role};

/// Role bindings of a single event plus a version counter bumped on every
/// successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRoster {
    slots: BTreeMap<Role, MemberId>,
    version: u64,
}

/// Stand-in for events nobody has been assigned to yet.
pub(crate) static EMPTY_ROSTER: EventRoster = EventRoster {
    slots: BTreeMap::new(),
    version: 0,
};

impl EventRoster {
    pub fn holder(&self, role: Role) -> Option<&MemberId> {
        self.slots.get(&role)
    }

    /// Role currently held by `member` at this event, if any.
    pub fn role_of(&self, member: &MemberId) -> Option<Role> {
        self.slots
            .iter()
            .find(|(_, holder)| *holder == member)
            .map(|(role, _)| *role)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Run every assignment rule for binding `member` to `role`.
    ///
    /// With `replacing` set, the current holder of `role` is ignored, which is
    /// what a reassignment needs. Checks run in a fixed order so the first
    /// failing rule is the one reported.
    pub fn check_assign<D>(
        &self,
        event: &Event,
        role: Role,
        member: &MemberId,
        replacing: bool,
        directory: &D,
        availability: &AvailabilityTracker,
    ) -> Result<()>
    where
        D: MemberDirectory + ?Sized,
    {
        self.check_slot(event, role, member, replacing)?;

        let record = directory
            .member(member)
            .ok_or_else(|| RosterError::UnknownMember(member.clone()))?;
        if !record.is_qualified(role) {
            return Err(RosterError::NotQualified {
                member: member.clone(),
                role,
            });
        }
        if availability.is_blocked(member, event.date) {
            return Err(RosterError::MemberBlocked {
                member: member.clone(),
                date: event.date,
            });
        }
        Ok(())
    }

    /// Structural rules only: the event exists, needs the role, the slot is
    /// free and the member is not already serving. Also used when restoring
    /// persisted records, where availability at assignment time is unknown.
    pub fn check_slot(
        &self,
        event: &Event,
        role: Role,
        member: &MemberId,
        replacing: bool,
    ) -> Result<()> {
        calendar::event_on(event.date, event.event_type)?;

        if !event.event_type.requires(role) {
            return Err(RosterError::RoleNotRequired {
                event_type: event.event_type,
                role,
            });
        }
        if !replacing {
            if let Some(holder) = self.holder(role) {
                return Err(RosterError::SlotFilled {
                    date: event.date,
                    event_type: event.event_type,
                    role,
                    holder: holder.clone(),
                });
            }
        }
        if let Some(current_role) = self.role_of(member).filter(|r| *r != role) {
            return Err(RosterError::AlreadyServing {
                member: member.clone(),
                date: event.date,
                event_type: event.event_type,
                current_role,
            });
        }
        Ok(())
    }

    /// Bind without checking. Returns the previous holder.
    pub(crate) fn insert(&mut self, role: Role, member: MemberId) -> Option<MemberId> {
        self.version += 1;
        self.slots.insert(role, member)
    }

    pub(crate) fn remove(&mut self, role: Role) -> Option<MemberId> {
        let removed = self.slots.remove(&role);
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    /// Assignments in the event type's required-role order.
    pub fn assignments(&self, event: &Event) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> = self
            .slots
            .iter()
            .map(|(role, member)| Assignment::new(event, *role, member.clone()))
            .collect();
        assignments.sort_by_key(|a| event.event_type.role_position(a.role));
        assignments
    }

    /// Required roles with nobody bound, in required-role order.
    pub fn open_roles(&self, event: &Event) -> Vec<Role> {
        event
            .required_roles()
            .iter()
            .copied()
            .filter(|role| !self.slots.contains_key(role))
            .collect()
    }

    pub fn is_fully_staffed(&self, event: &Event) -> bool {
        self.open_roles(event).is_empty()
    }
}
