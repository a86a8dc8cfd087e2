//! Participation statistics over recorded assignments.
//!
//! Read-only: nothing here mutates the roster. Orderings are fully
//! deterministic (count, then name, then member id).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::calendar;
use crate::directory::MemberDirectory;
use crate::models::{DateRange, EventType, MemberId, YearMonth};
use crate::roster::RosterStore;
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ParticipationRecord {
    #[serde(rename = "memberId")]
    pub member_id: MemberId,
    pub name: String,
    pub total: usize,
    #[serde(rename = "byType")]
    pub by_type: BTreeMap<EventType, usize>,
}

impl ParticipationRecord {
    fn empty(member_id: MemberId, name: String) -> Self {
        Self {
            member_id,
            name,
            total: 0,
            by_type: BTreeMap::new(),
        }
    }

    pub fn count_for(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).copied().unwrap_or(0)
    }

    /// Ranking order: most assignments first, then name, then id.
    fn rank(a: &Self, b: &Self) -> Ordering {
        b.total
            .cmp(&a.total)
            .then_with(|| cmp_ignore_case(&a.name, &b.name))
            .then_with(|| a.member_id.cmp(&b.member_id))
    }
}

/// Events derived for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: YearMonth,
    pub events: usize,
}

/// Assignments per member in `range`, optionally restricted to one event type.
pub fn aggregate(
    roster: &RosterStore,
    range: DateRange,
    event_type: Option<EventType>,
) -> BTreeMap<MemberId, usize> {
    let mut counts = BTreeMap::new();
    for assignment in roster.assignments_in(range) {
        if event_type.map_or(true, |t| t == assignment.event_type) {
            *counts.entry(assignment.member_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Per-member records for everyone with at least one assignment in `range`,
/// ranked by total descending, ties by ascending name.
pub fn participation_table<D>(
    roster: &RosterStore,
    range: DateRange,
    directory: &D,
) -> Vec<ParticipationRecord>
where
    D: MemberDirectory + ?Sized,
{
    let mut records: BTreeMap<MemberId, ParticipationRecord> = BTreeMap::new();
    for assignment in roster.assignments_in(range) {
        let record = records
            .entry(assignment.member_id.clone())
            .or_insert_with(|| {
                let name = directory.display_name(&assignment.member_id);
                ParticipationRecord::empty(assignment.member_id.clone(), name)
            });
        record.total += 1;
        *record.by_type.entry(assignment.event_type).or_insert(0) += 1;
    }

    let mut table: Vec<ParticipationRecord> = records.into_values().collect();
    table.sort_by(ParticipationRecord::rank);
    table
}

/// The member with the most assignments in `range`; ties go to the
/// alphabetically first name.
pub fn top_participant<D>(
    roster: &RosterStore,
    range: DateRange,
    directory: &D,
) -> Option<ParticipationRecord>
where
    D: MemberDirectory + ?Sized,
{
    participation_table(roster, range, directory).into_iter().next()
}

/// One member's record, zero-filled when they have no assignments.
pub fn member_participation<D>(
    roster: &RosterStore,
    member: &MemberId,
    range: DateRange,
    directory: &D,
) -> ParticipationRecord
where
    D: MemberDirectory + ?Sized,
{
    let mut record = ParticipationRecord::empty(member.clone(), directory.display_name(member));
    for assignment in roster
        .assignments_in(range)
        .filter(|a| &a.member_id == member)
    {
        record.total += 1;
        *record.by_type.entry(assignment.event_type).or_insert(0) += 1;
    }
    record
}

/// Number of services in each month from `from` through `to`.
/// Empty when `from` is after `to`.
pub fn monthly_event_counts(from: YearMonth, to: YearMonth) -> Vec<MonthlyCount> {
    let mut counts = Vec::new();
    let mut current = Some(from);
    while let Some(month) = current.filter(|m| *m <= to) {
        counts.push(MonthlyCount {
            month,
            events: calendar::events_in_month(month).count(),
        });
        current = month.next();
    }
    counts
}
