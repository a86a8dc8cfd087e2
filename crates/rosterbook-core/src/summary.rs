//! Month-at-a-glance numbers for the dashboard.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::calendar;
use crate::directory::MemberDirectory;
use crate::models::{DateRange, Event, EventType, MemberId, Role, YearMonth};
use crate::roster::RosterStore;
use crate::utils::percent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: YearMonth,
    #[serde(rename = "totalMembers")]
    pub total_members: usize,
    #[serde(rename = "activeMembers")]
    pub active_members: usize,
    pub wednesdays: usize,
    pub sundays: usize,
    pub events: usize,
    #[serde(rename = "staffedEvents")]
    pub staffed_events: usize,
    #[serde(rename = "openSlots")]
    pub open_slots: usize,
    #[serde(rename = "staffingPercent")]
    pub staffing_percent: u32,
    /// Share of active members serving at least once in the month
    #[serde(rename = "participationPercent")]
    pub participation_percent: u32,
}

impl MonthSummary {
    /// "4 Wednesdays, 5 Sundays"
    pub fn services_display(&self) -> String {
        format!(
            "{} Wednesday{}, {} Sunday{}",
            self.wednesdays,
            if self.wednesdays == 1 { "" } else { "s" },
            self.sundays,
            if self.sundays == 1 { "" } else { "s" },
        )
    }
}

/// An event that still has unfilled roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenSlots {
    pub event: Event,
    pub roles: Vec<Role>,
}

pub fn month_summary<D>(month: YearMonth, directory: &D, roster: &RosterStore) -> MonthSummary
where
    D: MemberDirectory + ?Sized,
{
    let members = directory.members();
    let mut summary = MonthSummary {
        month,
        total_members: members.len(),
        active_members: members.iter().filter(|m| m.active).count(),
        wednesdays: 0,
        sundays: 0,
        events: 0,
        staffed_events: 0,
        open_slots: 0,
        staffing_percent: 0,
        participation_percent: 0,
    };

    for event in calendar::events_in_month(month) {
        summary.events += 1;
        match event.event_type {
            EventType::Wednesday => summary.wednesdays += 1,
            // Count each Sunday once, not once per service
            EventType::SundayMorning => summary.sundays += 1,
            EventType::SundayNight => {}
        }
        let open = roster.open_roles(&event).len();
        if open == 0 {
            summary.staffed_events += 1;
        }
        summary.open_slots += open;
    }
    summary.staffing_percent = percent(summary.staffed_events, summary.events);

    let serving: BTreeSet<MemberId> = roster
        .assignments_in(DateRange::month(month))
        .map(|a| a.member_id)
        .collect();
    let active_serving = members
        .iter()
        .filter(|m| m.active && serving.contains(&m.id))
        .count();
    summary.participation_percent = percent(active_serving, summary.active_members);
    summary
}

/// Events in `month` with at least one unfilled role, in date order.
pub fn unstaffed_events(month: YearMonth, roster: &RosterStore) -> Vec<OpenSlots> {
    calendar::events_in_month(month)
        .filter_map(|event| {
            let roles = roster.open_roles(&event);
            if roles.is_empty() {
                None
            } else {
                Some(OpenSlots { event, roles })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityTracker;
    use crate::calendar::event_on;
    use crate::directory::MemberList;
    use crate::models::{Member, MemberId};
    use chrono::NaiveDate;

    fn members() -> MemberList {
        MemberList::new(vec![
            Member::new("M3", "Pedro Oliveira").with_roles([Role::AcousticGuitar]),
            Member::new("M4", "Ana Costa").with_roles([Role::Vocal]),
            Member::new("M5", "Lucas Ferreira").with_roles([Role::Media]).inactive(),
        ])
    }

    #[test]
    fn test_empty_month_summary() {
        let dir = members();
        let store = RosterStore::new();
        let summary = month_summary(YearMonth::new(2024, 12).unwrap(), &dir, &store);
        assert_eq!(summary.total_members, 3);
        assert_eq!(summary.active_members, 2);
        assert_eq!(summary.wednesdays, 4);
        assert_eq!(summary.sundays, 5);
        assert_eq!(summary.events, 14);
        assert_eq!(summary.staffed_events, 0);
        // 9 five-role services + 5 two-role Sunday schools
        assert_eq!(summary.open_slots, 9 * 5 + 5 * 2);
        assert_eq!(summary.staffing_percent, 0);
        assert_eq!(summary.participation_percent, 0);
        assert_eq!(summary.services_display(), "4 Wednesdays, 5 Sundays");
    }

    #[test]
    fn test_staffed_event_counts() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let morning = event_on(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(), EventType::SundayMorning).unwrap();
        store
            .assign(&morning, Role::AcousticGuitar, &MemberId::from("M3"), &dir, &avail)
            .unwrap();
        store
            .assign(&morning, Role::Vocal, &MemberId::from("M4"), &dir, &avail)
            .unwrap();

        let month = YearMonth::new(2024, 12).unwrap();
        let summary = month_summary(month, &dir, &store);
        assert_eq!(summary.staffed_events, 1);
        assert_eq!(summary.staffing_percent, 7);
        assert_eq!(summary.participation_percent, 100);

        let open = unstaffed_events(month, &store);
        assert_eq!(open.len(), 13);
        assert!(open.iter().all(|o| o.event != morning));
        assert_eq!(open[0].event.event_type, EventType::SundayNight);
    }

    #[test]
    fn test_participation_counts_active_members_in_month() {
        let dir = members();
        let avail = AvailabilityTracker::new();
        let mut store = RosterStore::new();
        let wed = event_on(NaiveDate::from_ymd_opt(2024, 12, 4).unwrap(), EventType::Wednesday).unwrap();
        let november = event_on(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(), EventType::SundayMorning).unwrap();
        store
            .assign(&wed, Role::Vocal, &MemberId::from("M4"), &dir, &avail)
            .unwrap();
        // Inactive members may serve but do not count
        store
            .assign(&wed, Role::Media, &MemberId::from("M5"), &dir, &avail)
            .unwrap();
        // Outside the month
        store
            .assign(&november, Role::AcousticGuitar, &MemberId::from("M3"), &dir, &avail)
            .unwrap();

        let summary = month_summary(YearMonth::new(2024, 12).unwrap(), &dir, &store);
        assert_eq!(summary.participation_percent, 50);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["participationPercent"], 50);
    }

    #[test]
    fn test_participation_without_active_members() {
        let dir = MemberList::new(vec![Member::new("M5", "Lucas Ferreira")
            .with_roles([Role::Media])
            .inactive()]);
        let summary = month_summary(YearMonth::new(2024, 12).unwrap(), &dir, &RosterStore::new());
        assert_eq!(summary.active_members, 0);
        assert_eq!(summary.participation_percent, 0);
    }
}
