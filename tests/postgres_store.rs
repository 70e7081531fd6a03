//! Runs against a live database; `cargo test -- --ignored` with
//! `TEST_DATABASE_URL` pointing at a disposable PostgreSQL instance.

use consultbook_backend::db::{
    AppointmentRepository, AppointmentStatus, AppointmentStore, AvailabilityRepository,
    AvailabilityStore, ConsultantTermsRepository, ConsultantTermsStore, DayOfWeek, DaySchedule,
    NewAppointment, UpdateConsultantTerms, WeeklyAvailability,
};
use consultbook_backend::db::Actor;
use consultbook_backend::scheduling::Transition;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use time::macros::{date, datetime};
use uuid::Uuid;

async fn create_test_db_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/consultbook_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("test database should be reachable");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");
    pool
}

/// Each test works on its own consultant so runs never collide.
fn consultant() -> String {
    format!("consultant-{}", Uuid::now_v7())
}

fn new_appointment(consultant_id: &str, time: &str) -> NewAppointment {
    NewAppointment {
        id: Uuid::now_v7(),
        client_id: "client-1".to_string(),
        consultant_id: consultant_id.to_string(),
        date: date!(2025 - 01 - 20),
        time: time.to_string(),
        duration_minutes: 60,
        mode: "video".to_string(),
        amount: Decimal::new(10000, 2),
        payment_method: "card".to_string(),
        notes: None,
    }
}

#[tokio::test]
#[ignore]
async fn availability_upsert_is_idempotent() {
    let repo = AvailabilityRepository::new(create_test_db_pool().await);
    let consultant_id = consultant();

    let empty = repo.get(&consultant_id).await.unwrap();
    assert_eq!(empty.len(), 7);
    assert_eq!(empty.get(DayOfWeek::Monday), Some(&DaySchedule::default()));

    let template = WeeklyAvailability::new()
        .with_day(
            DayOfWeek::Monday,
            DaySchedule {
                enabled: true,
                time_slots: vec!["09:00".to_string(), "10:00".to_string()],
            },
        )
        .with_day(
            DayOfWeek::Sunday,
            DaySchedule {
                enabled: false,
                time_slots: Vec::new(),
            },
        );
    repo.set(&consultant_id, &template).await.unwrap();
    repo.set(&consultant_id, &template).await.unwrap();

    let stored = repo.get(&consultant_id).await.unwrap();
    assert_eq!(stored.get(DayOfWeek::Monday), template.get(DayOfWeek::Monday));
    assert_eq!(stored.get(DayOfWeek::Sunday), template.get(DayOfWeek::Sunday));
    assert_eq!(stored.get(DayOfWeek::Friday), Some(&DaySchedule::default()));
}

#[tokio::test]
#[ignore]
async fn unique_index_rejects_a_second_live_booking() {
    let repo = AppointmentRepository::new(create_test_db_pool().await);
    let consultant_id = consultant();

    let first = repo.insert(&new_appointment(&consultant_id, "09:00")).await.unwrap();
    assert_eq!(first.status, AppointmentStatus::Upcoming);

    let err = repo
        .insert(&new_appointment(&consultant_id, "09:00"))
        .await
        .unwrap_err();
    assert!(err.is_slot_conflict());

    let cancelled = repo
        .apply(
            first.id,
            &Transition::Cancel {
                actor: Actor::Client,
                reason: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    // A cancelled row no longer holds the slot.
    repo.insert(&new_appointment(&consultant_id, "09:00")).await.unwrap();

    // Terminal rows are left alone.
    assert!(repo.apply(first.id, &Transition::Complete).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn reschedule_and_sweep() {
    let repo = AppointmentRepository::new(create_test_db_pool().await);
    let consultant_id = consultant();

    let a = repo.insert(&new_appointment(&consultant_id, "09:00")).await.unwrap();
    repo.insert(&new_appointment(&consultant_id, "11:00")).await.unwrap();

    let err = repo
        .apply(
            a.id,
            &Transition::Reschedule {
                actor: Actor::Consultant,
                date: date!(2025 - 01 - 20),
                time: "11:00".to_string(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_slot_conflict());

    let moved = repo
        .apply(
            a.id,
            &Transition::Reschedule {
                actor: Actor::Consultant,
                date: date!(2025 - 01 - 20),
                time: "10:00".to_string(),
                reason: Some("clash".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.time, "10:00");
    assert_eq!(moved.rescheduled_by, Some(Actor::Consultant));

    let day = repo
        .list_for_consultant(&consultant_id, date!(2025 - 01 - 20), date!(2025 - 01 - 20))
        .await
        .unwrap();
    assert_eq!(day.len(), 2);

    repo.complete_elapsed(datetime!(2025-01-20 11:00)).await.unwrap();
    let after = repo.get(a.id).await.unwrap().unwrap();
    assert_eq!(after.status, AppointmentStatus::Completed);
}

#[tokio::test]
#[ignore]
async fn terms_upsert_returns_the_stored_row() {
    let repo = ConsultantTermsRepository::new(create_test_db_pool().await);
    let consultant_id = consultant();

    assert!(repo.get(&consultant_id).await.unwrap().is_none());

    let stored = repo
        .set(
            &consultant_id,
            &UpdateConsultantTerms {
                hourly_rate: Decimal::new(7550, 2),
                consultation_modes: vec!["phone".to_string()],
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.hourly_rate, Decimal::new(7550, 2));
    assert!(stored.offers_mode("phone"));

    let reread = repo.get(&consultant_id).await.unwrap().unwrap();
    assert_eq!(reread, stored);
}
