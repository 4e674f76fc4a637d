use chrono::{DateTime, Duration, TimeZone, Utc};
use harvest_core::{
    detect_rejection, HarvestRequest, RequestStatus, TrackingEntry, NO_REASON, UNKNOWN_AGRONOMIST,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn stamp(at: DateTime<Utc>) -> Option<String> {
    Some(at.to_rfc3339())
}

fn rejection_at(at: DateTime<Utc>) -> TrackingEntry {
    TrackingEntry {
        progress: "assignment rejected".to_string(),
        notes: Some("Too far from my base".to_string()),
        agronomist_name: Some("Jane Doe".to_string()),
        updated_at: stamp(at),
        event: None,
    }
}

fn request(id: &str, status: RequestStatus, tracking: Vec<TrackingEntry>) -> HarvestRequest {
    HarvestRequest {
        farmer_name: Some(format!("Farmer {id}")),
        crop: Some("Maize".to_string()),
        status,
        tracking,
        ..HarvestRequest::pending(id)
    }
}

#[test]
fn recent_rejection_on_pending_request_is_reported() {
    let requests = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![rejection_at(now() - Duration::minutes(2))],
    )];

    let notice = detect_rejection(&requests, now()).expect("notice");
    assert_eq!(notice.request_id, "r1");
    assert_eq!(notice.farmer_name.as_deref(), Some("Farmer r1"));
    assert_eq!(notice.crop.as_deref(), Some("Maize"));
    assert_eq!(notice.reason, "Too far from my base");
    assert_eq!(notice.agronomist_name, "Jane Doe");
    assert!(!notice.is_old_data);
}

#[test]
fn rejection_outside_window_is_ignored() {
    let requests = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![rejection_at(now() - Duration::minutes(10))],
    )];
    assert_eq!(detect_rejection(&requests, now()), None);
}

#[test]
fn window_boundary_is_exclusive() {
    let requests = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![rejection_at(now() - Duration::minutes(5))],
    )];
    assert_eq!(detect_rejection(&requests, now()), None);

    let just_inside = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![rejection_at(now() - Duration::minutes(5) + Duration::seconds(1))],
    )];
    assert!(detect_rejection(&just_inside, now()).is_some());
}

#[test]
fn requests_that_moved_on_never_notify() {
    let history = vec![rejection_at(now() - Duration::minutes(1))];
    for status in [
        RequestStatus::Assigned,
        RequestStatus::Accepted,
        RequestStatus::Completed,
    ] {
        let requests = vec![request("r1", status, history.clone())];
        assert_eq!(detect_rejection(&requests, now()), None, "{status}");
    }
}

#[test]
fn only_first_recent_rejection_is_reported() {
    let requests = vec![
        request(
            "old",
            RequestStatus::Pending,
            vec![rejection_at(now() - Duration::hours(1))],
        ),
        request(
            "first",
            RequestStatus::Pending,
            vec![
                TrackingEntry {
                    progress: "Assigned to Jane Doe".to_string(),
                    updated_at: stamp(now() - Duration::minutes(3)),
                    ..TrackingEntry::default()
                },
                rejection_at(now() - Duration::minutes(2)),
            ],
        ),
        request(
            "second",
            RequestStatus::Pending,
            vec![rejection_at(now() - Duration::seconds(30))],
        ),
    ];

    let notice = detect_rejection(&requests, now()).expect("notice");
    assert_eq!(notice.request_id, "first");
}

#[test]
fn legacy_entry_without_details_is_old_data() {
    let requests = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![TrackingEntry {
            progress: "Request rejected by agronomist".to_string(),
            updated_at: stamp(now() - Duration::minutes(1)),
            ..TrackingEntry::default()
        }],
    )];

    let notice = detect_rejection(&requests, now()).expect("notice");
    assert_eq!(notice.reason, NO_REASON);
    assert_eq!(notice.agronomist_name, UNKNOWN_AGRONOMIST);
    assert!(notice.is_old_data);
}

#[test]
fn missing_either_detail_marks_old_data() {
    let mut entry = rejection_at(now() - Duration::minutes(1));
    entry.notes = None;
    let requests = vec![request("r1", RequestStatus::Pending, vec![entry])];

    let notice = detect_rejection(&requests, now()).expect("notice");
    assert_eq!(notice.reason, NO_REASON);
    assert_eq!(notice.agronomist_name, "Jane Doe");
    assert!(notice.is_old_data);
}

#[test]
fn tagged_rejection_is_detected_without_marker_text() {
    let requests = vec![request(
        "r1",
        RequestStatus::Pending,
        vec![TrackingEntry {
            progress: "Declined".to_string(),
            event: Some("REJECTED".to_string()),
            notes: Some("Fully booked".to_string()),
            agronomist_name: Some("Ali".to_string()),
            updated_at: stamp(now() - Duration::minutes(1)),
        }],
    )];

    let notice = detect_rejection(&requests, now()).expect("notice");
    assert_eq!(notice.reason, "Fully booked");
}

#[test]
fn unparsable_timestamps_are_never_recent() {
    let mut garbled = rejection_at(now());
    garbled.updated_at = Some("not a date".to_string());
    let mut missing = rejection_at(now());
    missing.updated_at = None;
    let requests = vec![request("r1", RequestStatus::Pending, vec![garbled, missing])];

    assert_eq!(detect_rejection(&requests, now()), None);
}
