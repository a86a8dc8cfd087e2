use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Assignment, AvailabilityBlock, DateRange, MemberId, SlotKey};

/// Durable storage for assignments and availability blocks.
///
/// Assignments are keyed by (date, event type, role); blocks by
/// (member, date). Inserting an existing key replaces the record.
pub trait RosterRepository {
    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<()>;

    /// Returns `true` if a record was removed.
    fn delete_assignment(&mut self, key: &SlotKey) -> Result<bool>;

    fn insert_block(&mut self, block: &AvailabilityBlock) -> Result<()>;

    /// Returns `true` if a record was removed.
    fn delete_block(&mut self, member: &MemberId, date: NaiveDate) -> Result<bool>;

    /// Assignments with a date in `range`, ordered by key.
    fn assignments_in(&self, range: DateRange) -> Result<Vec<Assignment>>;

    /// Blocks with a date in `range`, ordered by date then member.
    fn blocks_in(&self, range: DateRange) -> Result<Vec<AvailabilityBlock>>;
}

/// Non-durable repository, useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    assignments: BTreeMap<SlotKey, Assignment>,
    blocks: BTreeMap<(NaiveDate, MemberId), AvailabilityBlock>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

pub(crate) fn in_range<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    range: DateRange,
    date_of: impl Fn(&T) -> NaiveDate,
) -> Vec<T>
where
    T: Clone,
{
    items
        .into_iter()
        .filter(|item| range.contains(date_of(*item)))
        .cloned()
        .collect()
}

impl RosterRepository for MemoryRepository {
    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        self.assignments.insert(assignment.slot(), assignment.clone());
        Ok(())
    }

    fn delete_assignment(&mut self, key: &SlotKey) -> Result<bool> {
        Ok(self.assignments.remove(key).is_some())
    }

    fn insert_block(&mut self, block: &AvailabilityBlock) -> Result<()> {
        self.blocks
            .insert((block.date, block.member_id.clone()), block.clone());
        Ok(())
    }

    fn delete_block(&mut self, member: &MemberId, date: NaiveDate) -> Result<bool> {
        Ok(self.blocks.remove(&(date, member.clone())).is_some())
    }

    fn assignments_in(&self, range: DateRange) -> Result<Vec<Assignment>> {
        Ok(in_range(self.assignments.values(), range, |a| a.date))
    }

    fn blocks_in(&self, range: DateRange) -> Result<Vec<AvailabilityBlock>> {
        Ok(in_range(self.blocks.values(), range, |b| b.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event_on;
    use crate::models::{EventType, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assignment_insert_replace_delete() {
        let mut repo = MemoryRepository::new();
        let event = event_on(date(2024, 12, 25), EventType::Wednesday).unwrap();
        let first = Assignment::new(&event, Role::Drums, MemberId::from("M1"));
        let second = Assignment::new(&event, Role::Drums, MemberId::from("M5"));

        repo.insert_assignment(&first).unwrap();
        repo.insert_assignment(&second).unwrap();
        assert_eq!(repo.assignment_count(), 1);
        assert_eq!(repo.assignments_in(DateRange::all()).unwrap(), vec![second.clone()]);

        assert!(repo.delete_assignment(&second.slot()).unwrap());
        assert!(!repo.delete_assignment(&second.slot()).unwrap());
    }

    #[test]
    fn test_range_queries() {
        let mut repo = MemoryRepository::new();
        for day in [1, 8, 15] {
            repo.insert_block(&AvailabilityBlock::new(MemberId::from("M1"), date(2024, 12, day)))
                .unwrap();
        }
        let range = DateRange::new(date(2024, 12, 2), date(2024, 12, 15)).unwrap();
        let blocks = repo.blocks_in(range).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].date, date(2024, 12, 8));

        assert!(repo.delete_block(&MemberId::from("M1"), date(2024, 12, 8)).unwrap());
        assert_eq!(repo.block_count(), 2);
    }
}
