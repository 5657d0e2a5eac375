use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reserva_core::availability::is_slot_available;
use reserva_core::models::{Booking, BookingStatus, Frequency, RecurrencePattern};
use reserva_core::recurrence::RecurrenceSchedule;
use uuid::Uuid;

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 4, 14, 0, 0).unwrap()
}

fn weekly_pattern() -> RecurrencePattern {
    let start = anchor();
    RecurrencePattern {
        frequency: Frequency::Weekly,
        interval: 1,
        day_of_week: Some(i64::from(start.weekday().num_days_from_sunday())),
        day_of_month: None,
        start_at: start,
        ..Default::default()
    }
}

fn monthly_pattern() -> RecurrencePattern {
    RecurrencePattern {
        frequency: Frequency::Monthly,
        interval: 1,
        day_of_week: None,
        day_of_month: Some(31),
        start_at: Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap(),
        ..Default::default()
    }
}

fn bench_next_occurrence(c: &mut Criterion) {
    let weekly = weekly_pattern();
    let monthly = monthly_pattern();

    let mut group = c.benchmark_group("next_occurrence");

    for years_out in [1i64, 5, 20].iter() {
        let from = anchor() + Duration::days(365 * years_out);
        group.bench_with_input(
            BenchmarkId::new("weekly_years_out", years_out),
            years_out,
            |b, _| {
                let schedule = RecurrenceSchedule::new(&weekly).unwrap();
                b.iter(|| schedule.next_occurrence(black_box(from)))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("monthly_years_out", years_out),
            years_out,
            |b, _| {
                let schedule = RecurrenceSchedule::new(&monthly).unwrap();
                b.iter(|| schedule.next_occurrence(black_box(from)))
            },
        );
    }
    group.finish();
}

fn bench_occurrence_dates(c: &mut Criterion) {
    let pattern = weekly_pattern();

    let mut group = c.benchmark_group("occurrence_dates");
    for count in [10usize, 52, 260].iter() {
        group.bench_with_input(BenchmarkId::new("count", count), count, |b, &count| {
            let schedule = RecurrenceSchedule::new(&pattern).unwrap();
            b.iter(|| schedule.occurrence_dates(black_box(count)))
        });
    }
    group.finish();
}

fn bench_slot_conflict_scan(c: &mut Criterion) {
    let staff_id = Uuid::now_v7();
    let day_start = anchor();

    // A dense calendar: back-to-back hour sessions over many days.
    let calendar: Vec<Booking> = (0..500)
        .map(|i| Booking {
            staff_id,
            start_at: day_start + Duration::hours(i),
            end_at: day_start + Duration::hours(i + 1),
            status: BookingStatus::Confirmed,
            ..Default::default()
        })
        .collect();

    // Probe random half-hour offsets so the scan cost is not dominated by one
    // fixed position.
    let probes: Vec<DateTime<Utc>> = (0..64)
        .map(|_| day_start + Duration::minutes(fastrand::i64(0..500 * 60)))
        .collect();

    c.bench_function("is_slot_available_dense_calendar", |b| {
        let mut index = 0;
        b.iter(|| {
            let proposed_start = probes[index % probes.len()];
            index += 1;
            is_slot_available(
                black_box(staff_id),
                black_box(proposed_start),
                black_box(proposed_start + Duration::hours(1)),
                black_box(&calendar),
                None,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_next_occurrence,
    bench_occurrence_dates,
    bench_slot_conflict_scan
);
criterion_main!(benches);
