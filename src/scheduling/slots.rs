use std::collections::HashSet;

use time::macros::format_description;
use time::{Date, Time};

use crate::db::{DayOfWeek, WeeklyAvailability};
use crate::scheduling::{SchedulingError, SchedulingResult};

/// Weekday of a naive calendar date.
pub fn weekday_of(date: Date) -> DayOfWeek {
    date.weekday().into()
}

/// Slot start times offered on `date`, verbatim and in stored order.
///
/// Disabled or missing weekdays offer nothing. No sorting or format checks
/// happen here; the template is validated when it is written.
pub fn generate_slots_for_date(template: &WeeklyAvailability, date: Date) -> &[String] {
    match template.get(weekday_of(date)) {
        Some(day) if day.enabled => &day.time_slots,
        _ => &[],
    }
}

/// Parses a strict 24-hour `HH:mm` value.
pub fn parse_slot_time(value: &str) -> Option<Time> {
    let format = format_description!("[hour repr:24 padding:zero]:[minute padding:zero]");
    Time::parse(value, &format).ok()
}

pub fn validate_slot_time(value: &str) -> SchedulingResult<()> {
    match parse_slot_time(value) {
        Some(_) => Ok(()),
        None => Err(SchedulingError::validation(format!(
            "'{}' is not a valid HH:mm time",
            value
        ))),
    }
}

/// Rejects malformed or repeated time strings before a template is stored.
pub fn validate_template(template: &WeeklyAvailability) -> SchedulingResult<()> {
    for (day, schedule) in template.iter() {
        let mut seen = HashSet::new();
        for slot in &schedule.time_slots {
            if parse_slot_time(slot).is_none() {
                return Err(SchedulingError::validation(format!(
                    "{}: '{}' is not a valid HH:mm time",
                    day, slot
                )));
            }
            if !seen.insert(slot.as_str()) {
                return Err(SchedulingError::validation(format!(
                    "{}: '{}' is listed more than once",
                    day, slot
                )));
            }
        }
    }
    Ok(())
}
