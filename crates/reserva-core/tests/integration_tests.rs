use chrono::{DateTime, Datelike, Duration, Utc};
use reserva_core::db::establish_connection;
use reserva_core::error::CoreError;
use reserva_core::models::*;
use reserva_core::recurrence::MaterializationPolicy;
use reserva_core::repository::{
    BookingRepository, MaterializationRepository, PatternRepository, ReminderRepository,
    ServiceRepository, SqliteRepository, StaffRepository,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with_policy(MaterializationPolicy::default()).await
}

async fn setup_test_db_with_policy(
    policy: MaterializationPolicy,
) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let repository = SqliteRepository::new(pool, policy);

    (repository, temp_dir)
}

/// Helper function to create a test service
async fn create_test_service(repo: &SqliteRepository, name: &str) -> Service {
    repo.add_service(NewServiceData {
        name: name.to_string(),
        description: Some(format!("Test service: {name}")),
        duration_minutes: 60,
        price_cents: 9000,
    })
    .await
    .expect("Failed to create test service")
}

/// Helper function to create a test staff member
async fn create_test_staff(repo: &SqliteRepository, name: &str) -> Staff {
    repo.add_staff(NewStaffData {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        time_zone: "UTC".to_string(),
    })
    .await
    .expect("Failed to create test staff")
}

/// Tomorrow at noon UTC: deterministic within a test run, comfortably inside
/// the materialization window.
fn tomorrow_noon() -> DateTime<Utc> {
    (Utc::now() + Duration::days(1))
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

fn weekly_pattern_data(service: &Service, staff: &Staff, start: DateTime<Utc>) -> NewPatternData {
    NewPatternData {
        service_id: service.id,
        staff_id: staff.id,
        client_name: "Ada Lovelace".to_string(),
        client_email: "ada@example.com".to_string(),
        frequency: Frequency::Weekly,
        interval: None,
        day_of_week: Some(i64::from(start.weekday().num_days_from_sunday())),
        day_of_month: None,
        start_at: start,
        time_zone: "UTC".to_string(),
        duration_minutes: None,
        end_date: None,
        occurrences: None,
    }
}

#[tokio::test]
async fn test_catalog_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;

    let service = create_test_service(&repo, "Coaching Session").await;
    assert_eq!(service.duration_minutes, 60);
    assert!(service.active);

    let staff = create_test_staff(&repo, "Grace Hopper").await;
    assert_eq!(staff.time_zone, "UTC");

    let services = repo.find_services().await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].id, service.id);

    let all_staff = repo.find_staff().await.unwrap();
    assert_eq!(all_staff.len(), 1);

    repo.deactivate_service(service.id).await.unwrap();
    let reloaded = repo.find_service_by_id(service.id).await.unwrap().unwrap();
    assert!(!reloaded.active);

    // Deactivating an unknown id reports NotFound.
    let result = repo.deactivate_service(Uuid::now_v7()).await;
    assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_staff_timezone_is_validated() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo
        .add_staff(NewStaffData {
            name: "Bad Zone".to_string(),
            email: "bad@example.com".to_string(),
            time_zone: "Invalid/Timezone".to_string(),
        })
        .await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidTimezone(_)));
}

#[tokio::test]
async fn test_single_booking_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Consultation").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let booking = repo
        .create_booking(NewBookingData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            start_at: start,
            end_at: None,
            notes: Some("First session".to_string()),
            status: None,
            pattern_id: None,
        })
        .await
        .unwrap();

    // End defaults to start + service duration; status defaults to pending.
    assert_eq!(booking.end_at, start + Duration::minutes(60));
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = repo
        .update_booking_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let listed = repo
        .find_bookings(&BookingFilter {
            staff_id: Some(staff.id),
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, booking.id);

    let completed = repo
        .update_booking_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Completed is terminal.
    let result = repo
        .update_booking_status(booking.id, BookingStatus::Pending)
        .await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn test_create_booking_rejects_conflicting_slot() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Consultation").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let data = NewBookingData {
        service_id: service.id,
        staff_id: staff.id,
        client_name: "Ada Lovelace".to_string(),
        client_email: "ada@example.com".to_string(),
        start_at: start,
        end_at: None,
        notes: None,
        status: None,
        pattern_id: None,
    };

    repo.create_booking(data.clone()).await.unwrap();

    // Overlapping request for the same provider is rejected at insert time.
    let overlapping = NewBookingData {
        start_at: start + Duration::minutes(30),
        client_name: "Charles Babbage".to_string(),
        ..data.clone()
    };
    let result = repo.create_booking(overlapping).await;
    assert!(matches!(result.unwrap_err(), CoreError::SlotConflict { .. }));

    // A back-to-back session touching the boundary is fine.
    let back_to_back = NewBookingData {
        start_at: start + Duration::minutes(60),
        client_name: "Charles Babbage".to_string(),
        ..data.clone()
    };
    assert!(repo.create_booking(back_to_back).await.is_ok());

    // A different provider is unaffected.
    let other_staff = create_test_staff(&repo, "Katherine Johnson").await;
    let other = NewBookingData {
        staff_id: other_staff.id,
        ..data
    };
    assert!(repo.create_booking(other).await.is_ok());
}

#[tokio::test]
async fn test_cancelled_bookings_release_their_slot() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Consultation").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let data = NewBookingData {
        service_id: service.id,
        staff_id: staff.id,
        client_name: "Ada Lovelace".to_string(),
        client_email: "ada@example.com".to_string(),
        start_at: start,
        end_at: None,
        notes: None,
        status: None,
        pattern_id: None,
    };

    let booking = repo.create_booking(data.clone()).await.unwrap();
    repo.update_booking_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    // The slot opens up again once the original booking is cancelled.
    assert!(repo.create_booking(data).await.is_ok());
}

#[tokio::test]
async fn test_reschedule_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Consultation").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let booking = repo
        .create_booking(NewBookingData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            start_at: start,
            end_at: None,
            notes: None,
            status: Some(BookingStatus::Confirmed),
            pattern_id: None,
        })
        .await
        .unwrap();

    // Moving within the booking's own slot works because the booking is
    // excluded from its own conflict check.
    let moved = repo
        .reschedule_booking(booking.id, start + Duration::minutes(30), None)
        .await
        .unwrap();
    assert_eq!(moved.start_at, start + Duration::minutes(30));
    assert_eq!(moved.end_at, start + Duration::minutes(90));
    assert_eq!(moved.status, BookingStatus::Rescheduled);

    // A second provider booking now occupies 14:00; moving onto it fails.
    repo.create_booking(NewBookingData {
        service_id: service.id,
        staff_id: staff.id,
        client_name: "Charles Babbage".to_string(),
        client_email: "charles@example.com".to_string(),
        start_at: start + Duration::hours(2),
        end_at: None,
        notes: None,
        status: Some(BookingStatus::Confirmed),
        pattern_id: None,
    })
    .await
    .unwrap();

    let result = repo
        .reschedule_booking(booking.id, start + Duration::hours(2), None)
        .await;
    assert!(matches!(result.unwrap_err(), CoreError::SlotConflict { .. }));

    // Terminal bookings cannot be moved.
    repo.update_booking_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let result = repo
        .reschedule_booking(booking.id, start + Duration::hours(5), None)
        .await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn test_pattern_creation_validation() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    // Weekly without a day of week is rejected.
    let mut data = weekly_pattern_data(&service, &staff, start);
    data.day_of_week = None;
    let result = repo.create_pattern(data).await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidPattern(_)));

    // An anchor that does not sit on the requested weekday is rejected.
    let mut data = weekly_pattern_data(&service, &staff, start);
    data.day_of_week = Some((data.day_of_week.unwrap() + 1) % 7);
    let result = repo.create_pattern(data).await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidInput(_)));

    // Unknown timezone is rejected.
    let mut data = weekly_pattern_data(&service, &staff, start);
    data.time_zone = "Mars/Olympus_Mons".to_string();
    let result = repo.create_pattern(data).await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidTimezone(_)));

    // A valid pattern lands with an active status and a wall-clock label.
    let pattern = repo
        .create_pattern(weekly_pattern_data(&service, &staff, start))
        .await
        .unwrap();
    assert_eq!(pattern.status, PatternStatus::Active);
    assert_eq!(pattern.start_time, "12:00");
    assert_eq!(pattern.generated_count(), 0);
}

#[tokio::test]
async fn test_recurring_series_materialization() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let mut data = weekly_pattern_data(&service, &staff, start);
    data.occurrences = Some(3);
    let pattern = repo.create_pattern(data).await.unwrap();

    let outcome = repo.materialize_pattern(pattern.id).await.unwrap();

    assert_eq!(outcome.created.len(), 3);
    assert!(outcome.skipped_conflicts.is_empty());
    assert!(outcome.exhausted);

    // Bookings land on consecutive weeks, first one on the anchor itself.
    assert_eq!(outcome.created[0].start_at, start);
    assert_eq!(outcome.created[1].start_at, start + Duration::days(7));
    assert_eq!(outcome.created[2].start_at, start + Duration::days(14));
    for booking in &outcome.created {
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.pattern_id, Some(pattern.id));
        assert_eq!(booking.end_at, booking.start_at + Duration::minutes(60));
    }

    // The pattern recorded the generated ids in order and was completed by
    // the run once the cap was reached.
    let reloaded = repo.find_pattern_by_id(pattern.id).await.unwrap().unwrap();
    assert_eq!(reloaded.generated_count(), 3);
    let created_ids: Vec<Uuid> = outcome.created.iter().map(|b| b.id).collect();
    assert_eq!(reloaded.generated_booking_ids.0, created_ids);
    assert_eq!(reloaded.status, PatternStatus::Completed);
}

#[tokio::test]
async fn test_materialization_is_idempotent_within_a_window() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;

    let pattern = repo
        .create_pattern(weekly_pattern_data(&service, &staff, tomorrow_noon()))
        .await
        .unwrap();

    let first = repo.materialize_pattern(pattern.id).await.unwrap();
    assert!(!first.created.is_empty());
    assert!(!first.exhausted);

    // A second run straight after finds nothing new inside the horizon.
    let second = repo.materialize_pattern(pattern.id).await.unwrap();
    assert!(second.created.is_empty());
    assert!(!second.exhausted);

    let bookings = repo
        .find_bookings(&BookingFilter {
            staff_id: Some(staff.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bookings.len(), first.created.len());
}

#[tokio::test]
async fn test_materialization_respects_batch_size() {
    let policy = MaterializationPolicy {
        max_batch_size: 2,
        ..Default::default()
    };
    let (repo, _temp_dir) = setup_test_db_with_policy(policy).await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;

    let mut data = weekly_pattern_data(&service, &staff, tomorrow_noon());
    data.occurrences = Some(3);
    let pattern = repo.create_pattern(data).await.unwrap();

    let first = repo.materialize_pattern(pattern.id).await.unwrap();
    assert_eq!(first.created.len(), 2);
    assert!(!first.exhausted);
    let reloaded = repo.find_pattern_by_id(pattern.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, PatternStatus::Active);

    // The next run finishes the series and completes the pattern.
    let second = repo.materialize_pattern(pattern.id).await.unwrap();
    assert_eq!(second.created.len(), 1);
    assert!(second.exhausted);
    let reloaded = repo.find_pattern_by_id(pattern.id).await.unwrap().unwrap();
    assert_eq!(reloaded.generated_count(), 3);
    assert_eq!(reloaded.status, PatternStatus::Completed);
}

#[tokio::test]
async fn test_materialization_skips_conflicting_occurrences() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    // A one-off booking already covers part of the second occurrence's slot.
    repo.create_booking(NewBookingData {
        service_id: service.id,
        staff_id: staff.id,
        client_name: "Charles Babbage".to_string(),
        client_email: "charles@example.com".to_string(),
        start_at: start + Duration::days(7) - Duration::minutes(30),
        end_at: None,
        notes: None,
        status: Some(BookingStatus::Confirmed),
        pattern_id: None,
    })
    .await
    .unwrap();

    let mut data = weekly_pattern_data(&service, &staff, start);
    data.occurrences = Some(3);
    let pattern = repo.create_pattern(data).await.unwrap();

    let outcome = repo.materialize_pattern(pattern.id).await.unwrap();

    // The blocked occurrence is reported and does not consume the cap: the
    // series runs one week longer instead.
    assert_eq!(outcome.skipped_conflicts, vec![start + Duration::days(7)]);
    assert_eq!(outcome.created.len(), 3);
    assert_eq!(outcome.created[0].start_at, start);
    assert_eq!(outcome.created[1].start_at, start + Duration::days(14));
    assert_eq!(outcome.created[2].start_at, start + Duration::days(21));
    assert!(outcome.exhausted);

    let reloaded = repo.find_pattern_by_id(pattern.id).await.unwrap().unwrap();
    assert_eq!(reloaded.generated_count(), 3);
}

#[tokio::test]
async fn test_end_date_bounds_materialization() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let start = tomorrow_noon();

    let mut data = weekly_pattern_data(&service, &staff, start);
    // Inclusive boundary: the occurrence exactly on end_date still runs.
    data.end_date = Some(start + Duration::days(14));
    let pattern = repo.create_pattern(data).await.unwrap();

    let outcome = repo.materialize_pattern(pattern.id).await.unwrap();
    assert_eq!(outcome.created.len(), 3);
    assert!(outcome.exhausted);

    let reloaded = repo.find_pattern_by_id(pattern.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, PatternStatus::Completed);
}

#[tokio::test]
async fn test_paused_series_do_not_materialize() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;

    let pattern = repo
        .create_pattern(weekly_pattern_data(&service, &staff, tomorrow_noon()))
        .await
        .unwrap();

    repo.set_pattern_status(pattern.id, PatternStatus::Paused)
        .await
        .unwrap();

    let result = repo.materialize_pattern(pattern.id).await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidInput(_)));

    // Paused series are excluded from bulk runs rather than erroring them.
    let outcomes = repo.materialize_active_patterns().await.unwrap();
    assert!(outcomes.is_empty());

    // Resume and the series materializes again.
    repo.set_pattern_status(pattern.id, PatternStatus::Active)
        .await
        .unwrap();
    let outcome = repo.materialize_pattern(pattern.id).await.unwrap();
    assert!(!outcome.created.is_empty());
}

#[tokio::test]
async fn test_pattern_status_transitions() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;

    let pattern = repo
        .create_pattern(weekly_pattern_data(&service, &staff, tomorrow_noon()))
        .await
        .unwrap();

    let cancelled = repo
        .set_pattern_status(pattern.id, PatternStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, PatternStatus::Cancelled);

    // Cancelled is terminal.
    let result = repo
        .set_pattern_status(pattern.id, PatternStatus::Active)
        .await;
    assert!(matches!(result.unwrap_err(), CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn test_reminder_windows() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;
    let now = Utc::now();

    let tomorrow_session = repo
        .create_booking(NewBookingData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            start_at: now + Duration::hours(24),
            end_at: None,
            notes: None,
            status: Some(BookingStatus::Confirmed),
            pattern_id: None,
        })
        .await
        .unwrap();

    let upcoming_session = repo
        .create_booking(NewBookingData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            start_at: now + Duration::hours(1),
            end_at: None,
            notes: None,
            status: Some(BookingStatus::Confirmed),
            pattern_id: None,
        })
        .await
        .unwrap();

    // Each booking shows up in its own window only.
    let day_due = repo
        .find_bookings_due_for_reminder(ReminderWindow::DayBefore, now)
        .await
        .unwrap();
    assert_eq!(day_due.len(), 1);
    assert_eq!(day_due[0].id, tomorrow_session.id);

    let hour_due = repo
        .find_bookings_due_for_reminder(ReminderWindow::HourBefore, now)
        .await
        .unwrap();
    assert_eq!(hour_due.len(), 1);
    assert_eq!(hour_due[0].id, upcoming_session.id);

    // Once flagged, a booking leaves the window.
    repo.mark_reminder_sent(tomorrow_session.id, ReminderWindow::DayBefore)
        .await
        .unwrap();
    let day_due = repo
        .find_bookings_due_for_reminder(ReminderWindow::DayBefore, now)
        .await
        .unwrap();
    assert!(day_due.is_empty());

    // Cancelled sessions are never reminded about.
    repo.update_booking_status(upcoming_session.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let hour_due = repo
        .find_bookings_due_for_reminder(ReminderWindow::HourBefore, now)
        .await
        .unwrap();
    assert!(hour_due.is_empty());
}

#[tokio::test]
async fn test_short_id_prefix_resolution() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = create_test_service(&repo, "Coaching").await;
    let staff = create_test_staff(&repo, "Grace Hopper").await;

    let booking = repo
        .create_booking(NewBookingData {
            service_id: service.id,
            staff_id: staff.id,
            client_name: "Ada Lovelace".to_string(),
            client_email: "ada@example.com".to_string(),
            start_at: tomorrow_noon(),
            end_at: None,
            notes: None,
            status: None,
            pattern_id: None,
        })
        .await
        .unwrap();

    let prefix = booking.id.simple().to_string()[..8].to_string();
    let matches = repo.find_bookings_by_short_id_prefix(&prefix).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, booking.id);

    let matches = repo.find_bookings_by_short_id_prefix("ffffffff").await.unwrap();
    assert!(matches.is_empty());
}
