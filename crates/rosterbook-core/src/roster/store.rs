use std::collections::BTreeMap;

use crate::availability::AvailabilityTracker;
use crate::directory::MemberDirectory;
use crate::error::Result;
use crate::models::{Assignment, DateRange, Event, EventType, Member, MemberId, Role};
use crate::roster::event_roster::{EventRoster, EMPTY_ROSTER};
use crate::utils::cmp_ignore_case;

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub previous: Option<Assignment>,
    pub current: Assignment,
}

/// Single-threaded assignment store keyed by event.
///
/// Every mutation validates first and only then touches state, so a failed
/// call leaves the store exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStore {
    events: BTreeMap<Event, EventRoster>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign<D>(
        &mut self,
        event: &Event,
        role: Role,
        member: &MemberId,
        directory: &D,
        availability: &AvailabilityTracker,
    ) -> Result<Assignment>
    where
        D: MemberDirectory + ?Sized,
    {
        self.roster(event)
            .check_assign(event, role, member, false, directory, availability)?;
        self.events
            .entry(*event)
            .or_default()
            .insert(role, member.clone());
        Ok(Assignment::new(event, role, member.clone()))
    }

    /// Remove the binding of `role`. `None` means the slot was already empty.
    pub fn unassign(&mut self, event: &Event, role: Role) -> Option<Assignment> {
        let roster = self.events.get_mut(event)?;
        let member = roster.remove(role)?;
        if roster.is_empty() {
            self.events.remove(event);
        }
        Some(Assignment::new(event, role, member))
    }

    /// Replace whoever holds `role` with `member`. On failure the existing
    /// binding stays untouched. An empty slot behaves like `assign`.
    pub fn reassign<D>(
        &mut self,
        event: &Event,
        role: Role,
        member: &MemberId,
        directory: &D,
        availability: &AvailabilityTracker,
    ) -> Result<Reassignment>
    where
        D: MemberDirectory + ?Sized,
    {
        self.roster(event)
            .check_assign(event, role, member, true, directory, availability)?;
        let previous = self
            .events
            .entry(*event)
            .or_default()
            .insert(role, member.clone())
            .map(|old| Assignment::new(event, role, old));
        Ok(Reassignment {
            previous,
            current: Assignment::new(event, role, member.clone()),
        })
    }

    /// Put a persisted assignment back without consulting availability.
    /// Slot and double-booking rules still apply.
    pub fn restore(&mut self, assignment: Assignment) -> Result<()> {
        let event = assignment.event();
        self.roster(&event)
            .check_slot(&event, assignment.role, &assignment.member_id, false)?;
        self.events
            .entry(event)
            .or_default()
            .insert(assignment.role, assignment.member_id);
        Ok(())
    }

    /// Assignments of one event in required-role order; empty if none.
    pub fn list_assignments(&self, event: &Event) -> Vec<Assignment> {
        self.events
            .get(event)
            .map(|roster| roster.assignments(event))
            .unwrap_or_default()
    }

    pub fn assignment(&self, event: &Event, role: Role) -> Option<Assignment> {
        self.events
            .get(event)
            .and_then(|roster| roster.holder(role))
            .map(|member| Assignment::new(event, role, member.clone()))
    }

    pub fn is_fully_staffed(&self, event: &Event) -> bool {
        self.roster(event).is_fully_staffed(event)
    }

    pub fn open_roles(&self, event: &Event) -> Vec<Role> {
        self.roster(event).open_roles(event)
    }

    /// Active members who would pass every `assign` rule for this slot,
    /// sorted by name.
    pub fn eligible_members<'a, D>(
        &self,
        event: &Event,
        role: Role,
        directory: &'a D,
        availability: &AvailabilityTracker,
    ) -> Vec<&'a Member>
    where
        D: MemberDirectory + ?Sized,
    {
        let roster = self.roster(event);
        let mut eligible: Vec<&Member> = directory
            .members()
            .iter()
            .filter(|m| m.active)
            .filter(|m| {
                roster
                    .check_assign(event, role, &m.id, false, directory, availability)
                    .is_ok()
            })
            .collect();
        eligible.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        eligible
    }

    pub fn assignments_for_member(&self, member: &MemberId) -> Vec<Assignment> {
        self.iter().filter(|a| &a.member_id == member).collect()
    }

    /// All assignments ordered by event, then required-role order.
    pub fn iter(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.events
            .iter()
            .flat_map(|(event, roster)| roster.assignments(event))
    }

    pub fn assignments_in(&self, range: DateRange) -> impl Iterator<Item = Assignment> + '_ {
        let first = Event::new(range.start(), EventType::Wednesday);
        let last = Event::new(range.end(), EventType::SundayNight);
        self.events
            .range(first..=last)
            .flat_map(|(event, roster)| roster.assignments(event))
    }

    pub fn len(&self) -> usize {
        self.events.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn roster(&self, event: &Event) -> &EventRoster {
        self.events.get(event).unwrap_or(&EMPTY_ROSTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event_on;
    use crate::directory::MemberList;
    use crate::error::{ErrorKind, RosterError};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn christmas() -> Event {
        event_on(date(2024, 12, 25), EventType::Wednesday).unwrap()
    }

    fn members() -> MemberList {
        MemberList::new(vec![
            Member::new("M1", "Joao Silva").with_roles([Role::Drums]),
            Member::new("M2", "Maria Santos").with_roles([Role::Bass, Role::Vocal]),
            Member::new("M3", "Pedro Oliveira").with_roles([Role::Guitar, Role::AcousticGuitar]),
            Member::new("M4", "Ana Costa").with_roles([Role::Vocal, Role::WorshipLeader]),
            Member::new("M5", "Lucas Ferreira").with_roles([Role::Media, Role::Drums]).inactive(),
        ])
    }

    fn id(s: &str) -> MemberId {
        MemberId::from(s)
    }

    #[test]
    fn test_assign_success() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();

        let a = store.assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail).unwrap();
        assert_eq!(a.member_id, id("M1"));
        assert_eq!(a.role, Role::Drums);
        assert_eq!(store.assignment(&christmas(), Role::Drums), Some(a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_assign_second_role_same_event_conflicts() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail).unwrap();

        // M1 is not a vocalist either, but double-booking is reported first
        let err = store
            .assign(&christmas(), Role::Vocal, &id("M1"), &dir, &avail)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(err, RosterError::AlreadyServing { current_role: Role::Drums, .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_assign_blocked_member_conflicts_without_binding() {
        let dir = members();
        let mut avail = AvailabilityTracker::new();
        avail.toggle_block(&id("M1"), date(2024, 12, 25));
        let mut store = RosterStore::new();

        let err = store
            .assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::MemberBlocked { .. }));
        assert!(err.is_conflict());
        assert!(store.is_empty());
        assert!(store.list_assignments(&christmas()).is_empty());
    }

    #[test]
    fn test_assign_filled_slot_conflicts() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Vocal, &id("M2"), &dir, &avail).unwrap();

        let err = store
            .assign(&christmas(), Role::Vocal, &id("M4"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::SlotFilled { ref holder, .. } if holder == &id("M2")));
    }

    #[test]
    fn test_assign_validation_errors() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();

        // Acoustic guitar is only needed on Sunday mornings
        let err = store
            .assign(&christmas(), Role::AcousticGuitar, &id("M3"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::RoleNotRequired { .. }));
        assert!(err.is_validation());

        let err = store
            .assign(&christmas(), Role::Bass, &id("M1"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::NotQualified { .. }));

        let err = store
            .assign(&christmas(), Role::Bass, &id("M99"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::UnknownMember(_)));
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }

    #[test]
    fn test_assign_rejects_event_not_on_calendar() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let tuesday = Event::new(date(2024, 12, 24), EventType::Wednesday);

        let err = store
            .assign(&tuesday, Role::Drums, &id("M1"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::EventNotScheduled { .. }));
    }

    #[test]
    fn test_assign_then_unassign_restores_state() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Bass, &id("M2"), &dir, &avail).unwrap();
        let before = store.list_assignments(&christmas());
        let before_len = store.len();

        store.assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail).unwrap();
        let removed = store.unassign(&christmas(), Role::Drums).unwrap();
        assert_eq!(removed.member_id, id("M1"));
        assert_eq!(store.list_assignments(&christmas()), before);
        assert_eq!(store.len(), before_len);

        let mut empty = RosterStore::new();
        empty.assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail).unwrap();
        empty.unassign(&christmas(), Role::Drums);
        assert_eq!(empty, RosterStore::new());
    }

    #[test]
    fn test_unassign_empty_slot() {
        let mut store = RosterStore::new();
        assert!(store.unassign(&christmas(), Role::Drums).is_none());
    }

    #[test]
    fn test_reassign_replaces_holder() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Vocal, &id("M2"), &dir, &avail).unwrap();

        let change = store
            .reassign(&christmas(), Role::Vocal, &id("M4"), &dir, &avail)
            .unwrap();
        assert_eq!(change.previous.unwrap().member_id, id("M2"));
        assert_eq!(change.current.member_id, id("M4"));
        assert_eq!(
            store.assignment(&christmas(), Role::Vocal).unwrap().member_id,
            id("M4")
        );
    }

    #[test]
    fn test_reassign_failure_keeps_old_binding() {
        let dir = members();
        let mut avail = AvailabilityTracker::new();
        avail.toggle_block(&id("M4"), date(2024, 12, 25));
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Vocal, &id("M2"), &dir, &avail).unwrap();
        let before = store.clone();

        let err = store
            .reassign(&christmas(), Role::Vocal, &id("M4"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::MemberBlocked { .. }));
        assert_eq!(store, before);

        let err = store
            .reassign(&christmas(), Role::Vocal, &id("M1"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::NotQualified { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_reassign_to_member_serving_elsewhere_in_event() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        store.assign(&christmas(), Role::Bass, &id("M2"), &dir, &avail).unwrap();
        store.assign(&christmas(), Role::Vocal, &id("M4"), &dir, &avail).unwrap();

        let err = store
            .reassign(&christmas(), Role::Vocal, &id("M2"), &dir, &avail)
            .unwrap_err();
        assert!(matches!(err, RosterError::AlreadyServing { current_role: Role::Bass, .. }));

        // Reassigning a slot to its current holder is allowed
        let same = store
            .reassign(&christmas(), Role::Vocal, &id("M4"), &dir, &avail)
            .unwrap();
        assert_eq!(same.previous, Some(same.current.clone()));
    }

    #[test]
    fn test_reassign_empty_slot_assigns() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let change = store
            .reassign(&christmas(), Role::Drums, &id("M1"), &dir, &avail)
            .unwrap();
        assert!(change.previous.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_assignments_in_required_order() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let event = christmas();
        store.assign(&event, Role::Vocal, &id("M4"), &dir, &avail).unwrap();
        store.assign(&event, Role::Guitar, &id("M3"), &dir, &avail).unwrap();
        store.assign(&event, Role::Drums, &id("M1"), &dir, &avail).unwrap();

        let roles: Vec<Role> = store.list_assignments(&event).iter().map(|a| a.role).collect();
        assert_eq!(roles, vec![Role::Drums, Role::Guitar, Role::Vocal]);

        let other = event_on(date(2024, 12, 18), EventType::Wednesday).unwrap();
        assert!(store.list_assignments(&other).is_empty());
    }

    #[test]
    fn test_fully_staffed() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let morning = event_on(date(2024, 12, 29), EventType::SundayMorning).unwrap();

        assert!(!store.is_fully_staffed(&morning));
        assert_eq!(store.open_roles(&morning), vec![Role::AcousticGuitar, Role::Vocal]);

        store.assign(&morning, Role::AcousticGuitar, &id("M3"), &dir, &avail).unwrap();
        assert_eq!(store.open_roles(&morning), vec![Role::Vocal]);
        store.assign(&morning, Role::Vocal, &id("M4"), &dir, &avail).unwrap();
        assert!(store.is_fully_staffed(&morning));

        // Sunday night is a separate event on the same date
        let night = event_on(date(2024, 12, 29), EventType::SundayNight).unwrap();
        assert!(!store.is_fully_staffed(&night));
        store.assign(&night, Role::Guitar, &id("M3"), &dir, &avail).unwrap();
    }

    #[test]
    fn test_eligible_members() {
        let dir = members();
        let mut avail = AvailabilityTracker::new();
        avail.toggle_block(&id("M4"), date(2024, 12, 25));
        let mut store = RosterStore::new();

        let vocals: Vec<&str> = store
            .eligible_members(&christmas(), Role::Vocal, &dir, &avail)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(vocals, vec!["M2"]);

        store.assign(&christmas(), Role::Bass, &id("M2"), &dir, &avail).unwrap();
        assert!(store.eligible_members(&christmas(), Role::Vocal, &dir, &avail).is_empty());

        // Inactive members are never suggested
        let drums: Vec<&str> = store
            .eligible_members(&christmas(), Role::Drums, &dir, &avail)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(drums, vec!["M1"]);
    }

    #[test]
    fn test_restore_skips_availability_but_keeps_uniqueness() {
        let mut store = RosterStore::new();
        let event = christmas();
        store.restore(Assignment::new(&event, Role::Drums, id("M1"))).unwrap();
        assert!(store
            .restore(Assignment::new(&event, Role::Drums, id("M2")))
            .is_err());
        assert!(store
            .restore(Assignment::new(&event, Role::Vocal, id("M1")))
            .is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration_and_ranges() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let dec18 = event_on(date(2024, 12, 18), EventType::Wednesday).unwrap();
        store.assign(&christmas(), Role::Drums, &id("M1"), &dir, &avail).unwrap();
        store.assign(&dec18, Role::Drums, &id("M1"), &dir, &avail).unwrap();
        store.assign(&dec18, Role::Bass, &id("M2"), &dir, &avail).unwrap();

        let dates: Vec<NaiveDate> = store.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![date(2024, 12, 18), date(2024, 12, 18), date(2024, 12, 25)]);

        let range = DateRange::new(date(2024, 12, 20), date(2024, 12, 31)).unwrap();
        assert_eq!(store.assignments_in(range).count(), 1);
        assert_eq!(store.assignments_for_member(&id("M1")).len(), 2);
    }
}
