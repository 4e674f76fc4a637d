use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::{console_debug, console_error};
use harvest_core::{AssignmentCommand, DialogId, RefreshId, RequestId};

use crate::service::{ClientSettings, HarvestService, ReqwestHarvestService};
use crate::ServiceEvent;

enum ServiceCommand {
    FetchRequests { refresh_id: RefreshId },
    FetchAgronomists {
        dialog_id: DialogId,
        request_id: RequestId,
    },
    Assign {
        request_id: RequestId,
        command: AssignmentCommand,
    },
}

/// Runs service calls on a background tokio runtime.
///
/// Every command becomes its own task, so a call that never answers does not
/// hold up the others. Results come back as [`ServiceEvent`]s in completion
/// order.
pub struct ServiceHandle {
    cmd_tx: mpsc::Sender<ServiceCommand>,
    event_rx: mpsc::Receiver<ServiceEvent>,
}

impl ServiceHandle {
    pub fn new(settings: ClientSettings) -> io::Result<Self> {
        Self::with_service(Arc::new(ReqwestHarvestService::new(settings)))
    }

    pub fn with_service(service: Arc<dyn HarvestService>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let service = service.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(service.as_ref(), command, event_tx).await;
                });
            }
            console_debug!("Service command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_requests(&self, refresh_id: RefreshId) {
        self.send(ServiceCommand::FetchRequests { refresh_id });
    }

    pub fn fetch_available_agronomists(
        &self,
        dialog_id: DialogId,
        request_id: impl Into<RequestId>,
    ) {
        self.send(ServiceCommand::FetchAgronomists {
            dialog_id,
            request_id: request_id.into(),
        });
    }

    pub fn assign(&self, request_id: impl Into<RequestId>, command: AssignmentCommand) {
        self.send(ServiceCommand::Assign {
            request_id: request_id.into(),
            command,
        });
    }

    pub fn try_recv(&self) -> Option<ServiceEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ServiceEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: ServiceCommand) {
        if self.cmd_tx.send(command).is_err() {
            console_error!("Service worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    service: &dyn HarvestService,
    command: ServiceCommand,
    event_tx: mpsc::Sender<ServiceEvent>,
) {
    let event = match command {
        ServiceCommand::FetchRequests { refresh_id } => ServiceEvent::RequestsFetched {
            refresh_id,
            result: service.fetch_requests().await,
        },
        ServiceCommand::FetchAgronomists {
            dialog_id,
            request_id,
        } => {
            let result = service.fetch_available_agronomists().await;
            ServiceEvent::AgronomistsFetched {
                dialog_id,
                request_id,
                result,
            }
        }
        ServiceCommand::Assign {
            request_id,
            command,
        } => {
            let result = service.assign(&request_id, &command).await;
            ServiceEvent::AssignmentFinished { request_id, result }
        }
    };
    let _ = event_tx.send(event);
}
