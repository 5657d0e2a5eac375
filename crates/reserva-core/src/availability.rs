use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Booking;

/// Whether an existing booking occupies any part of the proposed interval.
///
/// Three distinct cases are checked:
///   (a) the proposed start falls inside the existing booking, including
///       exactly at its start;
///   (b) the proposed end falls inside the existing booking, including
///       exactly at its end;
///   (c) the existing booking sits fully inside the proposed interval.
///
/// A booking that merely touches the proposal at a boundary triggers none of
/// the three: an existing 10:00-11:00 session and a proposed 11:00-12:00
/// session coexist, so back-to-back appointments stay bookable.
fn occupies_interval(
    existing: &Booking,
    proposed_start: DateTime<Utc>,
    proposed_end: DateTime<Utc>,
) -> bool {
    let starts_inside = existing.start_at <= proposed_start && existing.end_at > proposed_start;
    let ends_inside = existing.start_at < proposed_end && existing.end_at >= proposed_end;
    let fully_contained = existing.start_at >= proposed_start && existing.end_at <= proposed_end;

    starts_inside || ends_inside || fully_contained
}

/// Collects the bookings that block the proposed interval on a provider's
/// calendar.
///
/// `existing_bookings` is expected to be pre-scoped to `staff_id` by the
/// caller's query; entries for other providers are ignored either way.
/// Cancelled and no-show bookings never block, and `exclude_booking_id`
/// removes the booking being rescheduled from consideration.
pub fn conflicting_bookings<'a>(
    staff_id: Uuid,
    proposed_start: DateTime<Utc>,
    proposed_end: DateTime<Utc>,
    existing_bookings: &'a [Booking],
    exclude_booking_id: Option<Uuid>,
) -> Vec<&'a Booking> {
    existing_bookings
        .iter()
        .filter(|booking| booking.staff_id == staff_id)
        .filter(|booking| booking.status.is_blocking())
        .filter(|booking| Some(booking.id) != exclude_booking_id)
        .filter(|booking| occupies_interval(booking, proposed_start, proposed_end))
        .collect()
}

/// Pure availability predicate: true iff no existing booking blocks the
/// proposed interval.
///
/// This answer is advisory. Two callers can both observe an open slot and
/// race to book it; whoever persists bookings must re-run this check inside
/// the insert transaction to make the reservation atomic (see
/// `BookingRepository::create_booking`).
pub fn is_slot_available(
    staff_id: Uuid,
    proposed_start: DateTime<Utc>,
    proposed_end: DateTime<Utc>,
    existing_bookings: &[Booking],
    exclude_booking_id: Option<Uuid>,
) -> bool {
    conflicting_bookings(
        staff_id,
        proposed_start,
        proposed_end,
        existing_bookings,
        exclude_booking_id,
    )
    .is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 4, h, m, 0).unwrap()
    }

    fn booking_for(staff_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            staff_id,
            start_at: start,
            end_at: end,
            status: BookingStatus::Confirmed,
            ..Default::default()
        }
    }

    #[test]
    fn empty_calendar_is_trivially_available() {
        let staff = Uuid::now_v7();
        assert!(is_slot_available(staff, at(10, 0), at(11, 0), &[], None));
    }

    #[test]
    fn overlapping_proposal_is_rejected() {
        // Existing 10:00-11:00, proposed 10:30-11:30.
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(11, 0))];
        assert!(!is_slot_available(staff, at(10, 30), at(11, 30), &existing, None));
    }

    #[test]
    fn back_to_back_after_an_existing_booking_is_available() {
        // Existing 10:00-11:00, proposed 11:00-12:00: boundary touch only.
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(11, 0))];
        assert!(is_slot_available(staff, at(11, 0), at(12, 0), &existing, None));
    }

    #[test]
    fn back_to_back_before_an_existing_booking_is_available() {
        // Existing 10:00-11:00, proposed 9:00-10:00.
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(11, 0))];
        assert!(is_slot_available(staff, at(9, 0), at(10, 0), &existing, None));
    }

    #[test]
    fn identical_interval_is_rejected() {
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(11, 0))];
        assert!(!is_slot_available(staff, at(10, 0), at(11, 0), &existing, None));
    }

    #[test]
    fn proposal_containing_an_existing_booking_is_rejected() {
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(10, 30))];
        assert!(!is_slot_available(staff, at(9, 0), at(12, 0), &existing, None));
    }

    #[test]
    fn proposal_inside_an_existing_booking_is_rejected() {
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(9, 0), at(12, 0))];
        assert!(!is_slot_available(staff, at(10, 0), at(10, 30), &existing, None));
    }

    #[rstest]
    #[case(BookingStatus::Pending, false)]
    #[case(BookingStatus::Confirmed, false)]
    #[case(BookingStatus::Completed, false)]
    #[case(BookingStatus::Rescheduled, false)]
    #[case(BookingStatus::Cancelled, true)]
    #[case(BookingStatus::NoShow, true)]
    fn only_cancelled_and_no_show_release_the_slot(
        #[case] status: BookingStatus,
        #[case] expected_available: bool,
    ) {
        let staff = Uuid::now_v7();
        let mut existing = booking_for(staff, at(10, 0), at(11, 0));
        existing.status = status;
        assert_eq!(
            is_slot_available(staff, at(10, 0), at(11, 0), &[existing], None),
            expected_available
        );
    }

    #[test]
    fn excluded_booking_does_not_block_its_own_reschedule() {
        let staff = Uuid::now_v7();
        let existing = booking_for(staff, at(10, 0), at(11, 0));
        let id = existing.id;

        // Without the exclusion the overlap blocks; with it the slot opens.
        assert!(!is_slot_available(staff, at(10, 30), at(11, 30), &[existing.clone()], None));
        assert!(is_slot_available(staff, at(10, 30), at(11, 30), &[existing], Some(id)));
    }

    #[test]
    fn exclusion_leaves_other_bookings_blocking() {
        let staff = Uuid::now_v7();
        let first = booking_for(staff, at(10, 0), at(11, 0));
        let second = booking_for(staff, at(11, 0), at(12, 0));
        let excluded = first.id;

        let existing = vec![first, second];
        assert!(!is_slot_available(staff, at(10, 30), at(11, 30), &existing, Some(excluded)));
    }

    #[test]
    fn other_providers_bookings_are_ignored() {
        let staff = Uuid::now_v7();
        let other_staff = Uuid::now_v7();
        let existing = vec![booking_for(other_staff, at(10, 0), at(11, 0))];
        assert!(is_slot_available(staff, at(10, 0), at(11, 0), &existing, None));
    }

    #[test]
    fn conflicting_bookings_reports_every_blocker() {
        let staff = Uuid::now_v7();
        let first = booking_for(staff, at(10, 0), at(10, 45));
        let second = booking_for(staff, at(11, 15), at(12, 0));
        let mut cancelled = booking_for(staff, at(10, 45), at(11, 15));
        cancelled.status = BookingStatus::Cancelled;

        let existing = vec![first.clone(), second.clone(), cancelled];
        let blockers = conflicting_bookings(staff, at(10, 0), at(12, 0), &existing, None);
        let ids: Vec<Uuid> = blockers.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[rstest]
    // Overlap at the front of the existing booking.
    #[case(9, 30, 10, 30, false)]
    // Overlap at the tail of the existing booking.
    #[case(10, 30, 11, 30, false)]
    // Touching boundaries on either side.
    #[case(9, 0, 10, 0, true)]
    #[case(11, 0, 12, 0, true)]
    // Clear of the existing booking entirely.
    #[case(8, 0, 9, 0, true)]
    #[case(12, 0, 13, 0, true)]
    fn boundary_grid_against_a_ten_to_eleven_booking(
        #[case] start_h: u32,
        #[case] start_m: u32,
        #[case] end_h: u32,
        #[case] end_m: u32,
        #[case] expected_available: bool,
    ) {
        let staff = Uuid::now_v7();
        let existing = vec![booking_for(staff, at(10, 0), at(11, 0))];
        assert_eq!(
            is_slot_available(staff, at(start_h, start_m), at(end_h, end_m), &existing, None),
            expected_available
        );
    }
}
