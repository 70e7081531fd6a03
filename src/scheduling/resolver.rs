use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use time::{Date, Duration};

use crate::db::{Appointment, DayOfWeek, WeeklyAvailability};
use crate::scheduling::slots::{generate_slots_for_date, weekday_of};

/// Longest window the bookable-dates listing will scan.
pub const MAX_LOOKAHEAD_DAYS: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub time: String,
    pub is_booked: bool,
}

/// Why a (date, time) cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRejection {
    DayDisabled(DayOfWeek),
    NotOffered { day: DayOfWeek, time: String },
    Occupied { date: Date, time: String },
}

impl fmt::Display for SlotRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRejection::DayDisabled(day) => {
                write!(f, "the consultant is not available on {}", day)
            }
            SlotRejection::NotOffered { day, time } => {
                write!(f, "{} is not an offered slot on {}", time, day)
            }
            SlotRejection::Occupied { date, time } => {
                write!(f, "the slot {} at {} is already booked", date, time)
            }
        }
    }
}

/// Times held on `date` by `consultant_id`'s appointments. Cancelled
/// appointments never hold a slot, whatever the caller passed in.
pub fn occupied_times<'a>(
    consultant_id: &str,
    date: Date,
    appointments: &'a [Appointment],
) -> HashSet<&'a str> {
    appointments
        .iter()
        .filter(|a| a.consultant_id == consultant_id && a.date == date && a.status.occupies_slot())
        .map(|a| a.time.as_str())
        .collect()
}

pub fn resolve_day(
    consultant_id: &str,
    date: Date,
    template: &WeeklyAvailability,
    appointments: &[Appointment],
) -> Vec<SlotView> {
    let occupied = occupied_times(consultant_id, date, appointments);

    generate_slots_for_date(template, date)
        .iter()
        .map(|time| SlotView {
            time: time.clone(),
            is_booked: occupied.contains(time.as_str()),
        })
        .collect()
}

pub fn check_slot(
    consultant_id: &str,
    date: Date,
    time: &str,
    template: &WeeklyAvailability,
    appointments: &[Appointment],
) -> Result<(), SlotRejection> {
    let day = weekday_of(date);
    match template.get(day) {
        Some(schedule) if schedule.enabled => {
            if !schedule.time_slots.iter().any(|slot| slot == time) {
                return Err(SlotRejection::NotOffered {
                    day,
                    time: time.to_string(),
                });
            }
        }
        _ => return Err(SlotRejection::DayDisabled(day)),
    }

    if occupied_times(consultant_id, date, appointments).contains(time) {
        return Err(SlotRejection::Occupied {
            date,
            time: time.to_string(),
        });
    }

    Ok(())
}

pub fn is_bookable(
    consultant_id: &str,
    date: Date,
    time: &str,
    template: &WeeklyAvailability,
    appointments: &[Appointment],
) -> bool {
    check_slot(consultant_id, date, time, template, appointments).is_ok()
}

/// Dates strictly before `today` are never offered.
pub fn is_past(date: Date, today: Date) -> bool {
    date < today
}

/// Dates in `[from, from + days)` that are not in the past and still have a
/// free slot.
pub fn bookable_dates(
    consultant_id: &str,
    template: &WeeklyAvailability,
    appointments: &[Appointment],
    from: Date,
    days: u32,
    today: Date,
) -> Vec<Date> {
    let days = days.min(MAX_LOOKAHEAD_DAYS);

    (0..days)
        .filter_map(|offset| from.checked_add(Duration::days(i64::from(offset))))
        .filter(|date| !is_past(*date, today))
        .filter(|date| {
            resolve_day(consultant_id, *date, template, appointments)
                .iter()
                .any(|slot| !slot.is_booked)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AppointmentStatus, DaySchedule, PaymentStatus};
    use rust_decimal::Decimal;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    const CONSULTANT: &str = "consultant-1";

    fn monday_template() -> WeeklyAvailability {
        WeeklyAvailability::with_defaults(vec![(
            DayOfWeek::Monday,
            DaySchedule {
                enabled: true,
                time_slots: vec!["09:00".to_string(), "10:00".to_string()],
            },
        )])
    }

    fn appointment(date: Date, time: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::now_v7(),
            client_id: "client-1".to_string(),
            consultant_id: CONSULTANT.to_string(),
            date,
            time: time.to_string(),
            duration_minutes: 60,
            mode: "video".to_string(),
            amount: Decimal::new(10000, 2),
            status,
            payment_status: PaymentStatus::Paid,
            payment_method: "card".to_string(),
            notes: None,
            reschedule_reason: None,
            rescheduled_by: None,
            cancellation_reason: None,
            cancelled_by: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn slot(time: &str, is_booked: bool) -> SlotView {
        SlotView {
            time: time.to_string(),
            is_booked,
        }
    }

    #[test]
    fn free_monday() {
        let slots = resolve_day(CONSULTANT, date!(2025 - 01 - 20), &monday_template(), &[]);
        assert_eq!(slots, vec![slot("09:00", false), slot("10:00", false)]);
    }

    #[test]
    fn upcoming_appointment_marks_its_slot() {
        let booked = [appointment(date!(2025 - 01 - 20), "09:00", AppointmentStatus::Upcoming)];
        let slots = resolve_day(CONSULTANT, date!(2025 - 01 - 20), &monday_template(), &booked);
        assert_eq!(slots, vec![slot("09:00", true), slot("10:00", false)]);
    }

    #[test]
    fn cancelled_appointment_does_not_hold_its_slot() {
        let booked = [appointment(date!(2025 - 01 - 20), "09:00", AppointmentStatus::Cancelled)];
        let slots = resolve_day(CONSULTANT, date!(2025 - 01 - 20), &monday_template(), &booked);
        assert_eq!(slots, vec![slot("09:00", false), slot("10:00", false)]);
        assert!(is_bookable(CONSULTANT, date!(2025 - 01 - 20), "09:00", &monday_template(), &booked));
    }

    #[test]
    fn completed_appointment_still_holds_its_slot() {
        let booked = [appointment(date!(2025 - 01 - 20), "10:00", AppointmentStatus::Completed)];
        assert!(!is_bookable(CONSULTANT, date!(2025 - 01 - 20), "10:00", &monday_template(), &booked));
    }

    #[test]
    fn appointments_on_other_dates_or_consultants_are_ignored() {
        let mut other_consultant = appointment(date!(2025 - 01 - 20), "09:00", AppointmentStatus::Upcoming);
        other_consultant.consultant_id = "consultant-2".to_string();
        let booked = [
            appointment(date!(2025 - 01 - 27), "09:00", AppointmentStatus::Upcoming),
            other_consultant,
        ];

        let slots = resolve_day(CONSULTANT, date!(2025 - 01 - 20), &monday_template(), &booked);
        assert!(slots.iter().all(|slot| !slot.is_booked));
    }

    #[test]
    fn check_slot_reports_the_reason() {
        let template = monday_template();
        let booked = [appointment(date!(2025 - 01 - 20), "09:00", AppointmentStatus::Upcoming)];

        assert_eq!(
            check_slot(CONSULTANT, date!(2025 - 01 - 20), "09:00", &template, &booked),
            Err(SlotRejection::Occupied {
                date: date!(2025 - 01 - 20),
                time: "09:00".to_string()
            })
        );
        assert_eq!(
            check_slot(CONSULTANT, date!(2025 - 01 - 20), "11:00", &template, &booked),
            Err(SlotRejection::NotOffered {
                day: DayOfWeek::Monday,
                time: "11:00".to_string()
            })
        );
        assert_eq!(
            check_slot(CONSULTANT, date!(2025 - 01 - 20), "10:00", &template, &booked),
            Ok(())
        );
    }

    #[test]
    fn disabled_day_rejects_even_listed_times() {
        let template = WeeklyAvailability::with_defaults(vec![(
            DayOfWeek::Monday,
            DaySchedule {
                enabled: false,
                time_slots: vec!["09:00".to_string()],
            },
        )]);

        assert_eq!(
            check_slot(CONSULTANT, date!(2025 - 01 - 20), "09:00", &template, &[]),
            Err(SlotRejection::DayDisabled(DayOfWeek::Monday))
        );
    }

    #[test]
    fn past_dates() {
        assert!(is_past(date!(2025 - 01 - 19), date!(2025 - 01 - 20)));
        assert!(!is_past(date!(2025 - 01 - 20), date!(2025 - 01 - 20)));
        assert!(!is_past(date!(2025 - 01 - 21), date!(2025 - 01 - 20)));
    }

    #[test]
    fn bookable_dates_skip_past_full_and_empty_days() {
        let template = WeeklyAvailability::with_defaults(vec![(
            DayOfWeek::Monday,
            DaySchedule {
                enabled: true,
                time_slots: vec!["09:00".to_string()],
            },
        )]);
        let booked = [appointment(date!(2025 - 01 - 27), "09:00", AppointmentStatus::Upcoming)];

        let dates = bookable_dates(
            CONSULTANT,
            &template,
            &booked,
            date!(2025 - 01 - 13),
            28,
            date!(2025 - 01 - 15),
        );

        // 01-13 is past, 01-27 is full
        assert_eq!(dates, vec![date!(2025 - 01 - 20), date!(2025 - 02 - 03)]);
    }

    #[test]
    fn bookable_dates_window_is_capped() {
        let template = WeeklyAvailability::with_defaults(
            DayOfWeek::ALL
                .into_iter()
                .map(|day| {
                    (
                        day,
                        DaySchedule {
                            enabled: true,
                            time_slots: vec!["09:00".to_string()],
                        },
                    )
                })
                .collect::<Vec<_>>(),
        );

        let dates = bookable_dates(CONSULTANT, &template, &[], date!(2025 - 01 - 01), 365, date!(2025 - 01 - 01));
        assert_eq!(dates.len(), MAX_LOOKAHEAD_DAYS as usize);
    }
}
