use std::time::Duration;

use chrono::Utc;
use console_logging::{console_info, console_warn};
use harvest_client::{ServiceEvent, ServiceHandle};
use harvest_core::{Effect, Msg};

pub struct EffectRunner {
    service: ServiceHandle,
}

impl EffectRunner {
    pub fn new(service: ServiceHandle) -> Self {
        Self { service }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchRequests { refresh_id } => {
                    console_info!("FetchRequests refresh_id={}", refresh_id);
                    self.service.fetch_requests(refresh_id);
                }
                Effect::FetchAvailableAgronomists {
                    dialog_id,
                    request_id,
                } => {
                    console_info!(
                        "FetchAvailableAgronomists dialog_id={} request_id={}",
                        dialog_id,
                        request_id
                    );
                    self.service.fetch_available_agronomists(dialog_id, request_id);
                }
                Effect::SubmitAssignment {
                    request_id,
                    command,
                } => {
                    console_info!(
                        "SubmitAssignment request_id={} expert_id={}",
                        request_id,
                        command.expert_id
                    );
                    self.service.assign(request_id, command);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next service answer.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.service.recv_timeout(timeout).map(to_msg)
    }
}

fn to_msg(event: ServiceEvent) -> Msg {
    match event {
        ServiceEvent::RequestsFetched { refresh_id, result } => Msg::RefreshCompleted {
            refresh_id,
            result: result.map_err(|err| {
                console_warn!("Refresh {} failed ({}): {}", refresh_id, err.kind, err);
                err.message
            }),
            received_at: Utc::now(),
        },
        ServiceEvent::AgronomistsFetched {
            dialog_id,
            request_id,
            result,
        } => Msg::AgronomistsLoaded {
            dialog_id,
            request_id,
            result: result.map_err(|err| err.message),
        },
        ServiceEvent::AssignmentFinished { request_id, result } => Msg::AssignCompleted {
            request_id,
            result: result.map_err(|err| err.message),
        },
    }
}
