use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};
use crate::models::Role;

/// Kind of recurring service.
///
/// Declaration order is also the within-day order: a Sunday morning service
/// sorts before the Sunday night one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Wednesday,
    SundayMorning,
    SundayNight,
}

const FULL_BAND: [Role; 5] = [Role::Drums, Role::Bass, Role::Guitar, Role::Vocal, Role::Media];
const SUNDAY_SCHOOL: [Role; 2] = [Role::AcousticGuitar, Role::Vocal];

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::Wednesday,
        EventType::SundayMorning,
        EventType::SundayNight,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EventType::Wednesday => "wednesday",
            EventType::SundayMorning => "sunday-morning",
            EventType::SundayNight => "sunday-night",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            EventType::Wednesday => "Wednesday Service",
            EventType::SundayMorning => "Sunday School",
            EventType::SundayNight => "Sunday Evening Service",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            EventType::Wednesday => Weekday::Wed,
            EventType::SundayMorning | EventType::SundayNight => Weekday::Sun,
        }
    }

    /// Roles that must be filled for the service, in display order.
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            EventType::Wednesday | EventType::SundayNight => &FULL_BAND,
            EventType::SundayMorning => &SUNDAY_SCHOOL,
        }
    }

    pub fn requires(&self, role: Role) -> bool {
        self.required_roles().contains(&role)
    }

    /// Position of `role` in the required-role order
    pub fn role_position(&self, role: Role) -> Option<usize> {
        self.required_roles().iter().position(|r| *r == role)
    }

    /// Services held on the given weekday, in within-day order.
    pub fn on_weekday(weekday: Weekday) -> &'static [EventType] {
        match weekday {
            Weekday::Wed => &[EventType::Wednesday],
            Weekday::Sun => &[EventType::SundayMorning, EventType::SundayNight],
            _ => &[],
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EventType {
    type Err = RosterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.key() == normalized)
            .ok_or_else(|| RosterError::UnknownEventType(s.to_string()))
    }
}

/// A single service occurrence. Identity is (date, type); events are derived
/// from the calendar, never created on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Event {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

impl Event {
    pub(crate) fn new(date: NaiveDate, event_type: EventType) -> Self {
        Self { date, event_type }
    }

    pub fn required_roles(&self) -> &'static [Role] {
        self.event_type.required_roles()
    }

    pub fn title(&self) -> &'static str {
        self.event_type.title()
    }

    /// "Wed, Dec 25, 2024"
    pub fn formatted_date(&self) -> String {
        self.date.format("%a, %b %d, %Y").to_string()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.event_type)
    }
}

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let invalid = || RosterError::InvalidMonth { year, month };
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last = (28..=31)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(invalid)?;
        Ok(Self { first, last })
    }

    pub fn of(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn next(&self) -> Option<Self> {
        match self.month() {
            12 => Self::new(self.year() + 1, 1).ok(),
            m => Self::new(self.year(), m + 1).ok(),
        }
    }

    pub fn prev(&self) -> Option<Self> {
        match self.month() {
            1 => Self::new(self.year() - 1, 12).ok(),
            m => Self::new(self.year(), m - 1).ok(),
        }
    }

    /// "December 2024"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = RosterError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s.trim();
        let malformed = || RosterError::MalformedMonth(raw.to_string());
        let (year, month) = raw.split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = RosterError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

/// Inclusive date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RosterError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn month(month: YearMonth) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }

    /// Every representable date
    pub fn all() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_required_roles() {
        assert_eq!(
            EventType::Wednesday.required_roles(),
            &[Role::Drums, Role::Bass, Role::Guitar, Role::Vocal, Role::Media]
        );
        assert_eq!(
            EventType::SundayMorning.required_roles(),
            &[Role::AcousticGuitar, Role::Vocal]
        );
        assert!(EventType::SundayNight.requires(Role::Media));
        assert!(!EventType::SundayMorning.requires(Role::Drums));
        assert_eq!(EventType::Wednesday.role_position(Role::Vocal), Some(3));
    }

    #[test]
    fn test_event_type_parse_and_display() {
        assert_eq!("sunday-morning".parse::<EventType>().unwrap(), EventType::SundayMorning);
        assert_eq!("Sunday Night".parse::<EventType>().unwrap(), EventType::SundayNight);
        assert!("friday".parse::<EventType>().is_err());
        assert_eq!(EventType::SundayNight.to_string(), "sunday-night");
    }

    #[test]
    fn test_event_type_on_weekday() {
        assert_eq!(EventType::on_weekday(Weekday::Wed), &[EventType::Wednesday]);
        assert_eq!(
            EventType::on_weekday(Weekday::Sun),
            &[EventType::SundayMorning, EventType::SundayNight]
        );
        assert!(EventType::on_weekday(Weekday::Mon).is_empty());
    }

    #[test]
    fn test_event_ordering_within_sunday() {
        let morning = Event::new(date(2024, 12, 29), EventType::SundayMorning);
        let night = Event::new(date(2024, 12, 29), EventType::SundayNight);
        let wednesday = Event::new(date(2024, 12, 25), EventType::Wednesday);
        assert!(wednesday < morning);
        assert!(morning < night);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(date(2024, 12, 25), EventType::Wednesday);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"date":"2024-12-25","type":"wednesday"}"#);
        assert_eq!(event.formatted_date(), "Wed, Dec 25, 2024");
    }

    #[test]
    fn test_year_month_bounds() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), date(2024, 2, 29));
        let feb = YearMonth::new(2023, 2).unwrap();
        assert_eq!(feb.last_day(), date(2023, 2, 28));
        assert_eq!(YearMonth::new(2024, 4).unwrap().last_day(), date(2024, 4, 30));
        assert!(matches!(
            YearMonth::new(2024, 13),
            Err(RosterError::InvalidMonth { year: 2024, month: 13 })
        ));
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn test_year_month_navigation() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next().unwrap(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.prev().unwrap(), YearMonth::new(2024, 11).unwrap());
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.prev().unwrap(), dec);
        assert_eq!(dec.label(), "December 2024");
    }

    #[test]
    fn test_year_month_parse() {
        let month: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 12);
        assert_eq!(month.to_string(), "2024-12");
        assert_eq!(
            "2024".parse::<YearMonth>(),
            Err(RosterError::MalformedMonth("2024".to_string()))
        );
        let err = "2024-xx".parse::<YearMonth>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid month '2024-xx': expected YYYY-MM");
        assert!(err.is_validation());
        assert!(matches!(
            "2024-13".parse::<YearMonth>(),
            Err(RosterError::InvalidMonth { year: 2024, month: 13 })
        ));
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2024-12\"");
    }

    #[test]
    fn test_date_range() {
        assert!(DateRange::new(date(2024, 12, 31), date(2024, 12, 1)).is_err());
        let range = DateRange::new(date(2024, 12, 1), date(2024, 12, 3)).unwrap();
        assert!(range.contains(date(2024, 12, 1)));
        assert!(range.contains(date(2024, 12, 3)));
        assert!(!range.contains(date(2024, 12, 4)));
        assert_eq!(range.days().count(), 3);
        assert_eq!(DateRange::single(date(2024, 12, 25)).days().count(), 1);
    }
}
