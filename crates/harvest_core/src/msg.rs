use chrono::{DateTime, Utc};

use crate::{Agronomist, DialogId, HarvestRequest, RefreshId, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User or navigation asked for fresh data.
    RefreshRequested,
    /// Service answered a refresh. `received_at` is the clock reading used
    /// for rejection recency.
    RefreshCompleted {
        refresh_id: RefreshId,
        result: Result<Vec<HarvestRequest>, String>,
        received_at: DateTime<Utc>,
    },
    /// User edited the search box.
    SearchChanged(String),
    /// User opened the assignment dialog for a request.
    AssignDialogOpened { request_id: RequestId },
    AssignDialogClosed,
    /// Service answered the available-agronomist query issued when dialog
    /// `dialog_id` opened.
    AgronomistsLoaded {
        dialog_id: DialogId,
        request_id: RequestId,
        result: Result<Vec<Agronomist>, String>,
    },
    /// User pressed Assign in the dialog.
    AssignSubmitted {
        request_id: RequestId,
        expert_id: Option<String>,
        expert_name: Option<String>,
        admin_advice: String,
    },
    /// Service answered an assignment. The error text is shown as is.
    AssignCompleted {
        request_id: RequestId,
        result: Result<(), String>,
    },
    RejectionDismissed,
    NoticeDismissed,
}
