use chrono::{DateTime, TimeZone, Utc};

use super::arbitrator::{evaluate_request, ApprovedDetail, CatalogSnapshot, Conflict};
use super::interval::{find_conflicts, parse_clock, spans_overlap, BookingWindow, ScheduleEntry, WindowError};
use crate::models::loan::{DetailPayload, LoanDetail};
use crate::models::enums::ResourceKind;

fn t(value: &str) -> chrono::NaiveTime {
    parse_clock(value).unwrap()
}

fn entry(starts_at: &str, ends_at: &str, booked_by: &str) -> ScheduleEntry {
    ScheduleEntry {
        starts_at: t(starts_at),
        ends_at: t(ends_at),
        booked_by: booked_by.to_string(),
    }
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 27, hour, min, 0).unwrap()
}

fn item_detail(id: i32, resource_id: i32, quantity: i32) -> LoanDetail {
    LoanDetail {
        id,
        resource_id,
        payload: DetailPayload::Item { quantity },
    }
}

fn room_detail(id: i32, resource_id: i32, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> LoanDetail {
    LoanDetail {
        id,
        resource_id,
        payload: DetailPayload::Room { starts_at, ends_at },
    }
}

fn slot_detail(id: i32, resource_id: i32) -> LoanDetail {
    LoanDetail {
        id,
        resource_id,
        payload: DetailPayload::AttendanceSlot,
    }
}

fn approved(request_id: i32, detail: LoanDetail) -> ApprovedDetail {
    ApprovedDetail { request_id, detail }
}

// ---------------------------------------------------------------------------
// Clock parsing and window validation
// ---------------------------------------------------------------------------

#[test]
fn parse_clock_accepts_zero_padded_24h() {
    assert_eq!(t("00:00"), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    assert_eq!(t("09:30"), chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    assert_eq!(t("23:59"), chrono::NaiveTime::from_hms_opt(23, 59, 0).unwrap());
}

#[test]
fn parse_clock_rejects_malformed_input() {
    for bad in ["9:30", "0930", "09:60", "24:00", "09:3", "aa:bb", "", "09:30:00"] {
        assert!(
            matches!(parse_clock(bad), Err(WindowError::InvalidTime { .. })),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn window_rejects_start_not_before_end() {
    // Reversed input fails before any overlap evaluation happens
    assert_eq!(
        BookingWindow::parse("13:00", "12:00").unwrap_err(),
        WindowError::InvalidOrder
    );
    assert_eq!(
        BookingWindow::parse("12:00", "12:00").unwrap_err(),
        WindowError::InvalidOrder
    );
}

// ---------------------------------------------------------------------------
// Interval conflict checking
// ---------------------------------------------------------------------------

#[test]
fn touching_windows_do_not_conflict() {
    let schedule = vec![entry("10:00", "12:00", "Budi")];

    // Starts exactly when the existing booking ends
    let after = BookingWindow::parse("12:00", "13:00").unwrap();
    assert!(find_conflicts(&after, &schedule).is_empty());

    // Ends exactly when the existing booking starts
    let before = BookingWindow::parse("08:00", "10:00").unwrap();
    assert!(find_conflicts(&before, &schedule).is_empty());
}

#[test]
fn overlapping_window_reports_owner() {
    let schedule = vec![entry("10:00", "12:00", "Budi")];
    let window = BookingWindow::parse("11:00", "13:00").unwrap();

    let conflicts = find_conflicts(&window, &schedule);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].booked_by, "Budi");
}

#[test]
fn containment_conflicts_both_ways() {
    let schedule = vec![entry("10:00", "12:00", "Budi")];

    let covering = BookingWindow::parse("09:00", "14:00").unwrap();
    assert_eq!(find_conflicts(&covering, &schedule).len(), 1);

    let inside = BookingWindow::parse("10:30", "11:30").unwrap();
    assert_eq!(find_conflicts(&inside, &schedule).len(), 1);
}

#[test]
fn every_overlapping_booking_is_reported() {
    let schedule = vec![
        entry("08:00", "10:00", "Budi"),
        entry("10:00", "11:00", "Sari"),
        entry("13:00", "15:00", "Andi"),
    ];
    let window = BookingWindow::parse("09:00", "14:00").unwrap();

    let conflicts = find_conflicts(&window, &schedule);
    let owners: Vec<_> = conflicts.iter().map(|c| c.booked_by.as_str()).collect();
    assert_eq!(owners, vec!["Budi", "Sari", "Andi"]);
}

#[test]
fn overlap_is_symmetric() {
    let pairs = [
        (("09:00", "11:00"), ("10:00", "12:00")),
        (("10:00", "12:00"), ("12:00", "13:00")),
        (("08:00", "16:00"), ("10:00", "11:00")),
        (("09:00", "10:00"), ("14:00", "15:00")),
    ];
    for ((a1, a2), (b1, b2)) in pairs {
        assert_eq!(
            spans_overlap(t(a1), t(a2), t(b1), t(b2)),
            spans_overlap(t(b1), t(b2), t(a1), t(a2)),
            "overlap({a1}-{a2}, {b1}-{b2}) not symmetric"
        );
    }
}

// ---------------------------------------------------------------------------
// Availability arbitration
// ---------------------------------------------------------------------------

#[test]
fn item_over_stock_is_a_conflict() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Proyektor", 3);

    // Two approved requests already consume 2 of 3 units
    let approved_set = vec![
        approved(10, item_detail(100, 1, 1)),
        approved(11, item_detail(101, 1, 1)),
    ];
    let candidate = vec![item_detail(1, 1, 2)];

    let conflicts = evaluate_request(20, &candidate, &approved_set, &catalog);
    assert_eq!(
        conflicts,
        vec![Conflict::Item {
            resource_id: 1,
            resource_name: "Proyektor".to_string(),
            available: 1,
            requested: 2,
        }]
    );
}

#[test]
fn item_within_stock_is_approvable() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Proyektor", 3);

    let approved_set = vec![approved(10, item_detail(100, 1, 1))];
    let candidate = vec![item_detail(1, 1, 2)];

    assert!(evaluate_request(20, &candidate, &approved_set, &catalog).is_empty());
}

#[test]
fn room_overlap_is_a_conflict() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_room(5, "204");

    let approved_set = vec![approved(10, room_detail(100, 5, at(10, 0), at(12, 0)))];
    let candidate = vec![room_detail(1, 5, at(11, 0), at(13, 0))];

    let conflicts = evaluate_request(20, &candidate, &approved_set, &catalog);
    assert_eq!(
        conflicts,
        vec![Conflict::Room {
            resource_id: 5,
            resource_name: "204".to_string(),
        }]
    );
}

#[test]
fn adjacent_room_windows_are_approvable() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_room(5, "204");

    let approved_set = vec![approved(10, room_detail(100, 5, at(10, 0), at(12, 0)))];
    let candidate = vec![room_detail(1, 5, at(12, 0), at(13, 0))];

    assert!(evaluate_request(20, &candidate, &approved_set, &catalog).is_empty());
}

#[test]
fn claimed_attendance_slot_is_a_conflict() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_attendance_slot(7, "Kalkulus-A-Sem1");

    let approved_set = vec![approved(10, slot_detail(100, 7))];
    let candidate = vec![slot_detail(1, 7)];

    let conflicts = evaluate_request(20, &candidate, &approved_set, &catalog);
    assert_eq!(
        conflicts,
        vec![Conflict::AttendanceSlot {
            resource_id: 7,
            resource_name: "Kalkulus-A-Sem1".to_string(),
        }]
    );
    assert!(conflicts[0].to_string().contains("already claimed"));
}

#[test]
fn unclaimed_attendance_slot_is_approvable() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_attendance_slot(7, "Kalkulus-A-Sem1");

    assert!(evaluate_request(20, &[slot_detail(1, 7)], &[], &catalog).is_empty());
}

#[test]
fn deleted_resource_blocks_approval() {
    // Empty catalog: every referenced resource has been deleted
    let catalog = CatalogSnapshot::new();
    let candidate = vec![item_detail(1, 1, 1), room_detail(2, 5, at(10, 0), at(11, 0))];

    let conflicts = evaluate_request(20, &candidate, &[], &catalog);
    assert_eq!(
        conflicts,
        vec![
            Conflict::MissingResource {
                resource_kind: ResourceKind::Item,
                resource_id: 1,
            },
            Conflict::MissingResource {
                resource_kind: ResourceKind::Room,
                resource_id: 5,
            },
        ]
    );
}

#[test]
fn all_conflicts_are_collected_across_details() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Proyektor", 1);
    catalog.add_room(5, "204");
    catalog.add_attendance_slot(7, "Kalkulus-A-Sem1");

    let approved_set = vec![
        approved(10, item_detail(100, 1, 1)),
        approved(11, room_detail(101, 5, at(10, 0), at(12, 0))),
        approved(12, slot_detail(102, 7)),
    ];
    let candidate = vec![
        item_detail(1, 1, 1),
        room_detail(2, 5, at(11, 0), at(13, 0)),
        slot_detail(3, 7),
    ];

    let conflicts = evaluate_request(20, &candidate, &approved_set, &catalog);
    assert_eq!(conflicts.len(), 3, "every blocking reason must be reported");
}

#[test]
fn conflict_set_is_order_invariant() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Proyektor", 0);
    catalog.add_room(5, "204");
    catalog.add_attendance_slot(7, "Kalkulus-A-Sem1");

    let approved_set = vec![
        approved(10, room_detail(101, 5, at(10, 0), at(12, 0))),
        approved(12, slot_detail(102, 7)),
    ];
    let mut candidate = vec![
        item_detail(1, 1, 1),
        room_detail(2, 5, at(11, 0), at(13, 0)),
        slot_detail(3, 7),
    ];

    let forward = evaluate_request(20, &candidate, &approved_set, &catalog);
    candidate.reverse();
    let backward = evaluate_request(20, &candidate, &approved_set, &catalog);

    assert_eq!(forward.len(), backward.len());
    for conflict in &forward {
        assert!(backward.contains(conflict));
    }
}

#[test]
fn re_evaluation_is_idempotent() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Proyektor", 3);
    catalog.add_room(5, "204");

    let approved_set = vec![
        approved(10, item_detail(100, 1, 2)),
        approved(11, room_detail(101, 5, at(10, 0), at(12, 0))),
    ];
    let candidate = vec![item_detail(1, 1, 2), room_detail(2, 5, at(11, 0), at(12, 30))];

    let first = evaluate_request(20, &candidate, &approved_set, &catalog);
    let second = evaluate_request(20, &candidate, &approved_set, &catalog);
    assert_eq!(first, second);
}

#[test]
fn candidate_does_not_conflict_with_itself() {
    let mut catalog = CatalogSnapshot::new();
    catalog.add_room(5, "204");

    // The candidate's own (already persisted) details must be excluded,
    // so re-running arbitration on an approved request stays clean
    let approved_set = vec![approved(20, room_detail(1, 5, at(10, 0), at(12, 0)))];
    let candidate = vec![room_detail(1, 5, at(10, 0), at(12, 0))];

    assert!(evaluate_request(20, &candidate, &approved_set, &catalog).is_empty());
}

#[test]
fn sequential_approvals_never_exceed_stock() {
    let total_stock = 5;
    let mut catalog = CatalogSnapshot::new();
    catalog.add_item(1, "Kabel HDMI", total_stock);

    // Feed each successful approval forward into the approved set
    let mut approved_set: Vec<ApprovedDetail> = Vec::new();
    let mut granted = 0;

    for (request_id, quantity) in [(10, 2), (11, 2), (12, 2), (13, 1)] {
        let candidate = vec![item_detail(request_id, 1, quantity)];
        let conflicts = evaluate_request(request_id, &candidate, &approved_set, &catalog);
        if conflicts.is_empty() {
            granted += quantity;
            approved_set.push(approved(request_id, item_detail(request_id, 1, quantity)));
        }
        assert!(granted <= total_stock, "approved {} of {}", granted, total_stock);
    }

    // The first two requests fit, the third is refused, the final 1 fits
    assert_eq!(granted, 5);
}
