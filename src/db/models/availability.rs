use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::{OffsetDateTime, Weekday};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(type_name = "day_of_week", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekday of a consultant's recurring template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub enabled: bool,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            enabled: true,
            time_slots: Vec::new(),
        }
    }
}

/// Weekday-keyed availability template as stored and served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyAvailability(BTreeMap<DayOfWeek, DaySchedule>);

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete 7-day view of the stored rows. Weekdays without a row read as
    /// enabled with no slots.
    pub fn with_defaults<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (DayOfWeek, DaySchedule)>,
    {
        let mut days: BTreeMap<DayOfWeek, DaySchedule> = rows.into_iter().collect();
        for day in DayOfWeek::ALL {
            days.entry(day).or_default();
        }
        Self(days)
    }

    pub fn with_day(mut self, day: DayOfWeek, schedule: DaySchedule) -> Self {
        self.0.insert(day, schedule);
        self
    }

    pub fn get(&self, day: DayOfWeek) -> Option<&DaySchedule> {
        self.0.get(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DaySchedule)> {
        self.0.iter().map(|(day, schedule)| (*day, schedule))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilityTemplateRow {
    pub consultant_id: String,
    pub day_of_week: DayOfWeek,
    pub enabled: bool,
    pub time_slots: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl AvailabilityTemplateRow {
    pub fn into_entry(self) -> (DayOfWeek, DaySchedule) {
        (
            self.day_of_week,
            DaySchedule {
                enabled: self.enabled,
                time_slots: self.time_slots,
            },
        )
    }
}
