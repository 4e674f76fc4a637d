use console_logging::{console_debug, console_info, console_warn};

use crate::assignment::{available_only, check_assignable, validate_assignment, AgronomistList};
use crate::{AppState, Effect, Msg, Notice};

pub const ASSIGNED_MESSAGE: &str = "Agronomist assigned successfully";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => {
            let refresh_id = state.issue_refresh();
            vec![Effect::FetchRequests { refresh_id }]
        }
        Msg::RefreshCompleted {
            refresh_id,
            result,
            received_at,
        } => {
            if !state.is_latest_refresh(refresh_id) {
                console_debug!("Discarding stale refresh {}", refresh_id);
                return (state, Vec::new());
            }
            match result {
                Ok(requests) => state.apply_snapshot(refresh_id, requests, received_at),
                Err(message) => state.fail_refresh(&message),
            }
            Vec::new()
        }
        Msg::SearchChanged(query) => {
            state.set_search(query);
            Vec::new()
        }
        Msg::AssignDialogOpened { request_id } => {
            match check_assignable(state.requests(), &request_id).map(|_| ()) {
                Ok(()) => {
                    let dialog_id = state.open_dialog(request_id.clone());
                    vec![Effect::FetchAvailableAgronomists {
                        dialog_id,
                        request_id,
                    }]
                }
                Err(err) => {
                    state.set_notice(Notice::error(err.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::AssignDialogClosed => {
            state.close_dialog();
            Vec::new()
        }
        Msg::AgronomistsLoaded {
            dialog_id,
            request_id,
            result,
        } => {
            if !state.is_open_dialog(dialog_id) {
                console_debug!(
                    "Dropping agronomist list for dialog {} ({}), no longer open",
                    dialog_id,
                    request_id
                );
                return (state, Vec::new());
            }
            let list = match result {
                Ok(agronomists) => AgronomistList::Loaded(available_only(agronomists)),
                Err(message) => {
                    console_warn!("Loading agronomists for {} failed: {}", request_id, message);
                    state.set_notice(Notice::error(message.clone()));
                    AgronomistList::Failed(message)
                }
            };
            state.load_agronomists(dialog_id, list);
            Vec::new()
        }
        Msg::AssignSubmitted {
            request_id,
            expert_id,
            expert_name,
            admin_advice,
        } => {
            match validate_assignment(
                state.requests(),
                state.dialog(),
                state.is_assigning(),
                &request_id,
                expert_id.as_deref(),
                expert_name.as_deref(),
                &admin_advice,
            ) {
                Ok(command) => {
                    console_info!(
                        "Assigning request {} to agronomist {}",
                        request_id,
                        command.expert_id
                    );
                    state.start_assignment(request_id.clone());
                    vec![Effect::SubmitAssignment {
                        request_id,
                        command,
                    }]
                }
                Err(err) => {
                    console_warn!("Assignment of {} refused: {}", request_id, err);
                    state.set_notice(Notice::error(err.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::AssignCompleted { request_id, result } => {
            if !state.finish_assignment(&request_id) {
                console_warn!(
                    "Unexpected assignment completion for {} (in flight: {:?})",
                    request_id,
                    state.assigning_request()
                );
            }
            match result {
                Ok(()) => {
                    console_info!("Request {} assigned", request_id);
                    if state
                        .dialog()
                        .is_some_and(|dialog| dialog.request_id == request_id)
                    {
                        state.close_dialog();
                    }
                    state.set_notice(Notice::success(ASSIGNED_MESSAGE));
                    let refresh_id = state.issue_refresh();
                    vec![Effect::FetchRequests { refresh_id }]
                }
                Err(message) => {
                    console_warn!("Assignment of {} failed: {}", request_id, message);
                    state.set_notice(Notice::error(message));
                    Vec::new()
                }
            }
        }
        Msg::RejectionDismissed => {
            state.dismiss_rejection();
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.clear_notice();
            Vec::new()
        }
    };

    (state, effects)
}
