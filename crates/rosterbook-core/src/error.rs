use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{EventType, MemberId, Role};

/// Broad category of a roster failure, used by front ends to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::NotFound => write!(f, "not found"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid month '{0}': expected YYYY-MM")]
    MalformedMonth(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("{role} is not needed at a {event_type} event")]
    RoleNotRequired { event_type: EventType, role: Role },

    #[error("Member {member} is not qualified for {role}")]
    NotQualified { member: MemberId, role: Role },

    #[error("{role} on {date} ({event_type}) is already taken by {holder}")]
    SlotFilled {
        date: NaiveDate,
        event_type: EventType,
        role: Role,
        holder: MemberId,
    },

    #[error("Member {member} already serves as {current_role} on {date} ({event_type})")]
    AlreadyServing {
        member: MemberId,
        date: NaiveDate,
        event_type: EventType,
        current_role: Role,
    },

    #[error("Member {member} is unavailable on {date}")]
    MemberBlocked { member: MemberId, date: NaiveDate },

    #[error("No {event_type} event on {date}")]
    EventNotScheduled { date: NaiveDate, event_type: EventType },

    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    #[error("Nobody is assigned to {role} on {date} ({event_type})")]
    SlotEmpty {
        date: NaiveDate,
        event_type: EventType,
        role: Role,
    },
}

impl RosterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RosterError::InvalidMonth { .. }
            | RosterError::MalformedMonth(_)
            | RosterError::InvalidRange { .. }
            | RosterError::UnknownRole(_)
            | RosterError::UnknownEventType(_)
            | RosterError::RoleNotRequired { .. }
            | RosterError::NotQualified { .. } => ErrorKind::Validation,
            RosterError::SlotFilled { .. }
            | RosterError::AlreadyServing { .. }
            | RosterError::MemberBlocked { .. } => ErrorKind::Conflict,
            RosterError::EventNotScheduled { .. }
            | RosterError::UnknownMember(_)
            | RosterError::SlotEmpty { .. } => ErrorKind::NotFound,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
