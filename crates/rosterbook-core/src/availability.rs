//! Per-member unavailable dates.
//!
//! A date is either blocked or not; absence means available. Unknown members
//! simply have no blocks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{AvailabilityBlock, DateRange, MemberId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityTracker {
    blocks: BTreeMap<MemberId, BTreeSet<NaiveDate>>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the blocked state of (member, date). Returns `true` when the date
    /// is blocked after the call.
    pub fn toggle_block(&mut self, member: &MemberId, date: NaiveDate) -> bool {
        if let Some(dates) = self.blocks.get_mut(member) {
            if dates.remove(&date) {
                if dates.is_empty() {
                    self.blocks.remove(member);
                }
                return false;
            }
            dates.insert(date);
            return true;
        }
        self.blocks
            .entry(member.clone())
            .or_default()
            .insert(date);
        true
    }

    pub fn is_blocked(&self, member: &MemberId, date: NaiveDate) -> bool {
        self.blocks
            .get(member)
            .map(|dates| dates.contains(&date))
            .unwrap_or(false)
    }

    /// Blocked dates for a member, ascending.
    pub fn list_blocked(&self, member: &MemberId) -> Vec<NaiveDate> {
        self.blocks
            .get(member)
            .map(|dates| dates.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn block_count(&self, member: &MemberId) -> usize {
        self.blocks.get(member).map(|d| d.len()).unwrap_or(0)
    }

    pub fn blocked_in(&self, member: &MemberId, range: DateRange) -> Vec<NaiveDate> {
        self.blocks
            .get(member)
            .map(|dates| {
                dates
                    .range(range.start()..=range.end())
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Members unavailable on `date`, ordered by id.
    pub fn blocked_members_on(&self, date: NaiveDate) -> Vec<MemberId> {
        self.blocks
            .iter()
            .filter(|(_, dates)| dates.contains(&date))
            .map(|(member, _)| member.clone())
            .collect()
    }

    /// Re-insert a persisted block. Returns `false` if it was already present.
    pub fn restore(&mut self, block: AvailabilityBlock) -> bool {
        self.blocks
            .entry(block.member_id)
            .or_default()
            .insert(block.date)
    }

    pub fn iter(&self) -> impl Iterator<Item = AvailabilityBlock> + '_ {
        self.blocks.iter().flat_map(|(member, dates)| {
            dates
                .iter()
                .map(move |date| AvailabilityBlock::new(member.clone(), *date))
        })
    }

    pub fn len(&self) -> usize {
        self.blocks.values().map(|d| d.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
