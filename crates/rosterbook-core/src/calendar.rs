//! Service calendar derivation.
//!
//! Events are never stored: every Wednesday yields one `wednesday` event and
//! every Sunday yields `sunday-morning` followed by `sunday-night`. All other
//! weekdays are empty.

use std::iter::FusedIterator;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{Result, RosterError};
use crate::models::{DateRange, Event, EventType, YearMonth};

/// Number of days to look ahead when searching for the next service.
/// Every week has a Wednesday and a Sunday, so one week always suffices.
const NEXT_EVENT_WINDOW_DAYS: u64 = 6;

/// Date-ordered iterator over the services in a date range.
///
/// Cheap to clone; a clone restarts from the same position.
#[derive(Debug, Clone)]
pub struct ServiceDays {
    current: Option<NaiveDate>,
    last: NaiveDate,
    type_index: usize,
}

impl ServiceDays {
    fn new(range: DateRange) -> Self {
        Self {
            current: Some(range.start()),
            last: range.end(),
            type_index: 0,
        }
    }
}

impl Iterator for ServiceDays {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let day = self.current?;
            let types = EventType::on_weekday(day.weekday());
            if let Some(event_type) = types.get(self.type_index) {
                self.type_index += 1;
                return Some(Event::new(day, *event_type));
            }
            self.current = if day < self.last { day.succ_opt() } else { None };
            self.type_index = 0;
        }
    }
}

impl FusedIterator for ServiceDays {}

/// All services in `month`, ordered by date then within-day order.
pub fn events_in_month(month: YearMonth) -> ServiceDays {
    ServiceDays::new(DateRange::month(month))
}

/// Convenience wrapper validating a raw year and month number first.
pub fn events_for(year: i32, month: u32) -> Result<ServiceDays> {
    Ok(events_in_month(YearMonth::new(year, month)?))
}

pub fn events_in_range(range: DateRange) -> ServiceDays {
    ServiceDays::new(range)
}

/// Services held on a single date (zero, one or two).
pub fn events_on(date: NaiveDate) -> Vec<Event> {
    EventType::on_weekday(date.weekday())
        .iter()
        .map(|t| Event::new(date, *t))
        .collect()
}

/// Resolve a (date, type) pair to a real service, rejecting pairs the
/// calendar never produces (e.g. a `wednesday` event on a Tuesday).
pub fn event_on(date: NaiveDate, event_type: EventType) -> Result<Event> {
    if event_type.weekday() == date.weekday() {
        Ok(Event::new(date, event_type))
    } else {
        Err(RosterError::EventNotScheduled { date, event_type })
    }
}

/// First service on or after `date`.
pub fn next_event(date: NaiveDate) -> Option<Event> {
    let end = date
        .checked_add_days(Days::new(NEXT_EVENT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let range = DateRange::new(date, end).ok()?;
    events_in_range(range).next()
}
