use crate::{AssignmentCommand, DialogId, RefreshId, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchRequests { refresh_id: RefreshId },
    FetchAvailableAgronomists {
        dialog_id: DialogId,
        request_id: RequestId,
    },
    SubmitAssignment {
        request_id: RequestId,
        command: AssignmentCommand,
    },
}
