use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::directory::MemberList;
use crate::models::{Assignment, AvailabilityBlock, DateRange, Member, MemberId, SlotKey};
use crate::store::{MemoryRepository, RosterRepository};

const ASSIGNMENTS_FILE: &str = "assignments";
const AVAILABILITY_FILE: &str = "availability";
const MEMBERS_FILE: &str = "members";

/// File payload wrapper recording when it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredData<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> StoredData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        age_display(self.saved_at)
    }
}

/// Relative age of a write time, e.g. "5m ago".
pub fn age_display(saved_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - saved_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Repository persisting each record kind as a pretty-printed JSON file in
/// the data directory. Every mutation rewrites the affected file; the
/// in-memory copy is only replaced once the write succeeded.
pub struct JsonRepository {
    data_dir: PathBuf,
    records: MemoryRepository,
}

impl JsonRepository {
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let mut repo = Self {
            data_dir,
            records: MemoryRepository::new(),
        };

        let assignments: Vec<Assignment> = repo
            .load(ASSIGNMENTS_FILE)?
            .map(|stored| stored.data)
            .unwrap_or_default();
        let blocks: Vec<AvailabilityBlock> = repo
            .load(AVAILABILITY_FILE)?
            .map(|stored| stored.data)
            .unwrap_or_default();

        for assignment in &assignments {
            repo.records.insert_assignment(assignment)?;
        }
        for block in &blocks {
            repo.records.insert_block(block)?;
        }
        debug!(
            dir = %repo.data_dir.display(),
            assignments = assignments.len(),
            blocks = blocks.len(),
            "Opened JSON repository"
        );
        Ok(repo)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<StoredData<T>>> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read data file: {}", name))?;

        let stored: StoredData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse data file: {}", name))?;

        Ok(Some(stored))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json.tmp", name))
    }

    /// Write to a sibling temp file, then rename it over the target so a
    /// crash mid-write never leaves a truncated data file.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let stored = StoredData::new(data);
        let path = self.file_path(name);
        let temp = self.temp_path(name);
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&temp, contents)
            .with_context(|| format!("Failed to write data file: {}", name))?;
        std::fs::rename(&temp, &path)
            .with_context(|| format!("Failed to replace data file: {}", name))?;
        debug!(file = name, "Saved data file");
        Ok(())
    }

    /// Apply `change` to a copy of the records, persist the copy, then swap it in.
    fn commit<R>(
        &mut self,
        file: &str,
        change: impl FnOnce(&mut MemoryRepository) -> Result<R>,
    ) -> Result<R> {
        let mut next = self.records.clone();
        let outcome = change(&mut next)?;
        if file == ASSIGNMENTS_FILE {
            self.save(file, &next.assignments_in(DateRange::all())?)?;
        } else {
            self.save(file, &next.blocks_in(DateRange::all())?)?;
        }
        self.records = next;
        Ok(outcome)
    }

    // ===== Members =====

    pub fn load_members(&self) -> Result<MemberList> {
        let members: Vec<Member> = self
            .load(MEMBERS_FILE)?
            .map(|stored| stored.data)
            .unwrap_or_default();
        Ok(MemberList::new(members))
    }

    pub fn save_members(&self, members: &[Member]) -> Result<()> {
        self.save(MEMBERS_FILE, &members)
    }

    // ===== File Age Information =====

    /// Helper to read a file's write time without failing
    fn load_saved_at<T: DeserializeOwned>(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.load::<T>(name) {
            Ok(Some(stored)) => Some(stored.saved_at),
            Ok(None) => None,
            Err(e) => {
                debug!(file = name, error = %e, "Failed to load data file for age display");
                None
            }
        }
    }

    pub fn file_ages(&self) -> StoreAges {
        StoreAges {
            assignments: self.load_saved_at::<Vec<Assignment>>(ASSIGNMENTS_FILE),
            availability: self.load_saved_at::<Vec<AvailabilityBlock>>(AVAILABILITY_FILE),
            members: self.load_saved_at::<Vec<Member>>(MEMBERS_FILE),
        }
    }
}

impl RosterRepository for JsonRepository {
    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        self.commit(ASSIGNMENTS_FILE, |records| records.insert_assignment(assignment))
    }

    fn delete_assignment(&mut self, key: &SlotKey) -> Result<bool> {
        self.commit(ASSIGNMENTS_FILE, |records| records.delete_assignment(key))
    }

    fn insert_block(&mut self, block: &AvailabilityBlock) -> Result<()> {
        self.commit(AVAILABILITY_FILE, |records| records.insert_block(block))
    }

    fn delete_block(&mut self, member: &MemberId, date: NaiveDate) -> Result<bool> {
        self.commit(AVAILABILITY_FILE, |records| records.delete_block(member, date))
    }

    fn assignments_in(&self, range: DateRange) -> Result<Vec<Assignment>> {
        self.records.assignments_in(range)
    }

    fn blocks_in(&self, range: DateRange) -> Result<Vec<AvailabilityBlock>> {
        self.records.blocks_in(range)
    }
}

#[derive(Debug, Default)]
pub struct StoreAges {
    pub assignments: Option<DateTime<Utc>>,
    pub availability: Option<DateTime<Utc>>,
    pub members: Option<DateTime<Utc>>,
}

impl StoreAges {
    /// Write time of the most recently saved schedule file
    pub fn last_schedule_change(&self) -> Option<DateTime<Utc>> {
        self.assignments.into_iter().chain(self.availability).max()
    }

    /// Most recent schedule change, or "never"
    pub fn last_updated(&self) -> String {
        self.last_schedule_change()
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }

    pub fn members_display(&self) -> String {
        self.members
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
