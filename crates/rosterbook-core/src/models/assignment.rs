use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Event, EventType, MemberId, Role};

/// Storage key of an assignment: one role at one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    pub role: Role,
}

impl SlotKey {
    pub fn new(event: &Event, role: Role) -> Self {
        Self {
            date: event.date,
            event_type: event.event_type,
            role,
        }
    }

    pub fn event(&self) -> Event {
        Event::new(self.date, self.event_type)
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.date, self.event_type, self.role.key())
    }
}

/// Binding of one member to one role at one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Assignment {
    pub date: NaiveDate,
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    pub role: Role,
    #[serde(rename = "memberId")]
    pub member_id: MemberId,
}

impl Assignment {
    pub fn new(event: &Event, role: Role, member_id: MemberId) -> Self {
        Self {
            date: event.date,
            event_type: event.event_type,
            role,
            member_id,
        }
    }

    pub fn event(&self) -> Event {
        Event::new(self.date, self.event_type)
    }

    pub fn slot(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            event_type: self.event_type,
            role: self.role,
        }
    }
}

/// A member's declaration of being unavailable on a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AvailabilityBlock {
    #[serde(rename = "memberId")]
    pub member_id: MemberId,
    pub date: NaiveDate,
}

impl AvailabilityBlock {
    pub fn new(member_id: MemberId, date: NaiveDate) -> Self {
        Self { member_id, date }
    }
}
