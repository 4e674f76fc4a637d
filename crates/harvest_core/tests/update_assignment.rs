use std::sync::Once;

use chrono::{TimeZone, Utc};
use harvest_core::{
    update, validate_assignment, Agronomist, AgronomistList, AppState, AssignmentCommand,
    AssignmentError, DialogId, Effect, HarvestRequest, Msg, NoticeLevel, RequestStatus, ASSIGNED_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn agronomist(id: &str, name: &str, available: bool) -> Agronomist {
    Agronomist {
        id: id.to_string(),
        full_name: name.to_string(),
        expertise: Some("Horticulture".to_string()),
        availability: available,
    }
}

fn tomato_request() -> HarvestRequest {
    HarvestRequest {
        farmer_name: Some("Kofi".to_string()),
        crop: Some("Tomato".to_string()),
        created_at: Some("2024-05-01".to_string()),
        ..HarvestRequest::pending("R1")
    }
}

fn with_snapshot(state: AppState, requests: Vec<HarvestRequest>) -> AppState {
    let (state, effects) = update(state, Msg::RefreshRequested);
    let refresh_id = match effects.as_slice() {
        [Effect::FetchRequests { refresh_id }] => *refresh_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::RefreshCompleted {
            refresh_id,
            result: Ok(requests),
            received_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        },
    );
    state
}

fn open_dialog(state: AppState, request_id: &str) -> (AppState, DialogId) {
    let (state, effects) = update(
        state,
        Msg::AssignDialogOpened {
            request_id: request_id.to_string(),
        },
    );
    match effects.as_slice() {
        [Effect::FetchAvailableAgronomists {
            dialog_id,
            request_id: asked_for,
        }] if asked_for == request_id => {
            let dialog_id = *dialog_id;
            (state, dialog_id)
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

fn agronomists_loaded(
    dialog_id: DialogId,
    request_id: &str,
    result: Result<Vec<Agronomist>, String>,
) -> Msg {
    Msg::AgronomistsLoaded {
        dialog_id,
        request_id: request_id.to_string(),
        result,
    }
}

fn open_dialog_with(state: AppState, request_id: &str, agronomists: Vec<Agronomist>) -> AppState {
    let (state, dialog_id) = open_dialog(state, request_id);
    let (state, effects) = update(
        state,
        agronomists_loaded(dialog_id, request_id, Ok(agronomists)),
    );
    assert!(effects.is_empty());
    state
}

fn submit(state: AppState, expert_id: &str, expert_name: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::AssignSubmitted {
            request_id: "R1".to_string(),
            expert_id: Some(expert_id.to_string()),
            expert_name: Some(expert_name.to_string()),
            admin_advice: "water daily".to_string(),
        },
    )
}

#[test]
fn dialog_lists_only_available_agronomists() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let state = open_dialog_with(
        state,
        "R1",
        vec![
            agronomist("A1", "Jane Doe", true),
            agronomist("A2", "Busy Bee", false),
        ],
    );

    let dialog = state.view().dialog.expect("dialog");
    assert_eq!(
        dialog.agronomists,
        AgronomistList::Loaded(vec![agronomist("A1", "Jane Doe", true)])
    );
    assert!(dialog.can_submit);
    assert!(!dialog.submitting);
}

#[test]
fn dialog_refuses_non_pending_request() {
    init_logging();
    let mut request = tomato_request();
    request.status = RequestStatus::Accepted;
    let state = with_snapshot(AppState::new(), vec![request]);

    let (state, effects) = update(
        state,
        Msg::AssignDialogOpened {
            request_id: "R1".to_string(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.dialog.is_none());
    assert_eq!(view.notice.unwrap().level, NoticeLevel::Error);
}

#[test]
fn submit_emits_single_assignment_and_blocks_duplicates() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);

    let (state, effects) = submit(state, "A1", "Jane Doe");
    assert_eq!(
        effects,
        vec![Effect::SubmitAssignment {
            request_id: "R1".to_string(),
            command: AssignmentCommand {
                expert_id: "A1".to_string(),
                expert_name: "Jane Doe".to_string(),
                admin_advice: "water daily".to_string(),
            },
        }]
    );
    let dialog = state.view().dialog.expect("dialog");
    assert!(dialog.submitting);
    assert!(!dialog.can_submit);

    let (state, effects) = submit(state, "A1", "Jane Doe");
    assert!(effects.is_empty());
    assert_eq!(
        state.view().notice.unwrap().message,
        AssignmentError::AssignmentInFlight.to_string()
    );
}

#[test]
fn unknown_expert_is_refused() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let state = open_dialog_with(
        state,
        "R1",
        vec![
            agronomist("A1", "Jane Doe", true),
            agronomist("A2", "Busy Bee", false),
        ],
    );

    let (state, effects) = submit(state, "A2", "Busy Bee");
    assert!(effects.is_empty());
    assert!(!state.is_assigning());
    assert_eq!(
        state.view().notice.unwrap().message,
        AssignmentError::ExpertNotAvailable("A2".to_string()).to_string()
    );
}

#[test]
fn id_and_name_must_come_together() {
    let requests = vec![tomato_request()];
    let state = with_snapshot(AppState::new(), requests.clone());
    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);

    let err = validate_assignment(&requests, state.dialog(), false, "R1", Some("A1"), None, "")
        .unwrap_err();
    assert_eq!(err, AssignmentError::MissingExpert);

    let err = validate_assignment(&requests, state.dialog(), false, "R1", None, Some(" "), "")
        .unwrap_err();
    assert_eq!(err, AssignmentError::MissingExpert);
}

#[test]
fn precondition_failures_are_typed() {
    let mut assigned = tomato_request();
    assigned.status = RequestStatus::Assigned;
    let pending = vec![tomato_request()];
    let state = with_snapshot(AppState::new(), pending.clone());

    // Dialog never opened.
    let err = validate_assignment(&pending, None, false, "R1", Some("A1"), Some("Jane"), "")
        .unwrap_err();
    assert_eq!(err, AssignmentError::AgronomistsNotLoaded("R1".to_string()));

    // Dialog open but list still loading.
    let (state, _) = update(
        state,
        Msg::AssignDialogOpened {
            request_id: "R1".to_string(),
        },
    );
    let err = validate_assignment(&pending, state.dialog(), false, "R1", Some("A1"), Some("Jane"), "")
        .unwrap_err();
    assert_eq!(err, AssignmentError::AgronomistsNotLoaded("R1".to_string()));

    // Request moved on since the dialog opened.
    let err = validate_assignment(
        &[assigned],
        state.dialog(),
        false,
        "R1",
        Some("A1"),
        Some("Jane"),
        "",
    )
    .unwrap_err();
    assert_eq!(
        err,
        AssignmentError::RequestNotPending {
            request_id: "R1".to_string(),
            status: RequestStatus::Assigned,
        }
    );

    let err = validate_assignment(&[], state.dialog(), false, "R1", Some("A1"), Some("Jane"), "")
        .unwrap_err();
    assert_eq!(err, AssignmentError::RequestNotFound("R1".to_string()));
}

#[test]
fn server_error_is_shown_verbatim_without_local_change() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);
    let (state, _) = submit(state, "A1", "Jane Doe");

    let (state, effects) = update(
        state,
        Msg::AssignCompleted {
            request_id: "R1".to_string(),
            result: Err("Agronomist is no longer available".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    let notice = view.notice.expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Agronomist is no longer available");
    assert_eq!(view.rows[0].status, RequestStatus::Pending);
    let dialog = view.dialog.expect("dialog stays open");
    assert!(!dialog.submitting);
    assert!(dialog.can_submit);
}

#[test]
fn assignment_end_to_end_updates_statistics_through_refresh() {
    init_logging();
    let other = HarvestRequest {
        crop: Some("Maize".to_string()),
        ..HarvestRequest::pending("R2")
    };
    let state = with_snapshot(AppState::new(), vec![tomato_request(), other.clone()]);
    let before = state.view().statistics.status;
    assert_eq!(before.pending, 2);
    assert_eq!(before.ongoing, 0);

    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);
    let (state, _) = submit(state, "A1", "Jane Doe");
    let (state, effects) = update(
        state,
        Msg::AssignCompleted {
            request_id: "R1".to_string(),
            result: Ok(()),
        },
    );

    // Success never patches locally; it asks for a refresh.
    let refresh_id = match effects.as_slice() {
        [Effect::FetchRequests { refresh_id }] => *refresh_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let view = state.view();
    assert!(view.dialog.is_none());
    assert_eq!(view.notice.unwrap().message, ASSIGNED_MESSAGE);
    assert_eq!(view.rows[0].status, RequestStatus::Pending);

    let assigned = HarvestRequest {
        status: RequestStatus::Assigned,
        assigned_expert_id: Some("A1".to_string()),
        assigned_expert_name: Some("Jane Doe".to_string()),
        admin_advice: Some("water daily".to_string()),
        ..tomato_request()
    };
    let (state, _) = update(
        state,
        Msg::RefreshCompleted {
            refresh_id,
            result: Ok(vec![assigned, other]),
            received_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 5, 0).unwrap(),
        },
    );

    let view = state.view();
    assert_eq!(view.rows[0].status, RequestStatus::Assigned);
    assert_eq!(view.rows[0].assigned_expert_name.as_deref(), Some("Jane Doe"));
    assert!(!view.rows[0].assignable);
    assert_eq!(view.statistics.status.pending, before.pending - 1);
    assert_eq!(view.statistics.status.ongoing, before.ongoing + 1);
    assert_eq!(view.statistics.monthly[0].label, "May 2024");
}

#[test]
fn closing_dialog_keeps_outstanding_submission_blocked() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);
    let (state, _) = submit(state, "A1", "Jane Doe");
    let (state, _) = update(state, Msg::AssignDialogClosed);
    let state = open_dialog_with(state, "R1", vec![agronomist("A1", "Jane Doe", true)]);

    let (state, effects) = submit(state, "A1", "Jane Doe");
    assert!(effects.is_empty());
    assert!(state.view().dialog.unwrap().submitting);
}

#[test]
fn agronomist_failure_is_surfaced_in_dialog() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let (state, dialog_id) = open_dialog(state, "R1");
    let (state, _) = update(
        state,
        agronomists_loaded(dialog_id, "R1", Err("service unavailable".to_string())),
    );

    let view = state.view();
    let dialog = view.dialog.expect("dialog");
    assert_eq!(
        dialog.agronomists,
        AgronomistList::Failed("service unavailable".to_string())
    );
    assert!(!dialog.can_submit);
    assert_eq!(view.notice.unwrap().level, NoticeLevel::Error);
}

#[test]
fn reopened_dialog_ignores_answer_for_earlier_opening() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let (state, first) = open_dialog(state, "R1");
    let (state, _) = update(state, Msg::AssignDialogClosed);
    let (state, second) = open_dialog(state, "R1");
    assert!(second > first);

    let (state, _) = update(
        state,
        agronomists_loaded(second, "R1", Ok(vec![agronomist("A1", "Jane Doe", true)])),
    );
    // The first lookup resolves last with an outdated list.
    let (state, effects) = update(
        state,
        agronomists_loaded(first, "R1", Ok(vec![agronomist("A9", "Gone Away", true)])),
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.view().dialog.expect("dialog").agronomists,
        AgronomistList::Loaded(vec![agronomist("A1", "Jane Doe", true)])
    );
}

#[test]
fn late_failure_for_closed_dialog_raises_no_notice() {
    init_logging();
    let state = with_snapshot(AppState::new(), vec![tomato_request()]);
    let (state, dialog_id) = open_dialog(state, "R1");
    let (state, _) = update(state, Msg::AssignDialogClosed);

    let (state, _) = update(
        state,
        agronomists_loaded(dialog_id, "R1", Err("service unavailable".to_string())),
    );

    let view = state.view();
    assert!(view.dialog.is_none());
    assert!(view.notice.is_none());
}
