use crate::assignment::AgronomistList;
use crate::filter::filter_requests;
use crate::rejection::RejectionNotice;
use crate::stats::Statistics;
use crate::{AppState, HarvestRequest, Notice, RefreshId, RequestId, RequestStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub snapshot_version: RefreshId,
    pub refreshing: bool,
    pub total_requests: usize,
    pub search: String,
    pub rows: Vec<RequestRowView>,
    pub statistics: Statistics,
    pub rejection: Option<RejectionNotice>,
    pub notice: Option<Notice>,
    pub dialog: Option<AssignDialogView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRowView {
    pub request_id: RequestId,
    pub farmer_name: String,
    pub crop: String,
    pub variety: Option<String>,
    pub location: Option<String>,
    pub status: RequestStatus,
    pub assigned_expert_name: Option<String>,
    pub created_at: Option<String>,
    pub assignable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignDialogView {
    pub request_id: RequestId,
    pub agronomists: AgronomistList,
    pub submitting: bool,
    /// Assign button state: list loaded and nothing outstanding.
    pub can_submit: bool,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let rows = filter_requests(state.requests(), state.search())
            .into_iter()
            .map(RequestRowView::from_request)
            .collect();

        let dialog = state.dialog().map(|dialog| {
            let submitting = state.is_assigning();
            AssignDialogView {
                request_id: dialog.request_id.clone(),
                agronomists: dialog.agronomists.clone(),
                submitting,
                can_submit: !submitting && !dialog.available().is_empty(),
            }
        });

        Self {
            snapshot_version: state.snapshot().version,
            refreshing: state.is_refreshing(),
            total_requests: state.requests().len(),
            search: state.search().to_string(),
            rows,
            statistics: state.statistics().clone(),
            rejection: state.rejection().cloned(),
            notice: state.notice().cloned(),
            dialog,
            dirty: state.is_dirty(),
        }
    }
}

impl RequestRowView {
    fn from_request(request: &HarvestRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            farmer_name: request
                .farmer_name
                .clone()
                .unwrap_or_else(|| "Unknown farmer".to_string()),
            crop: request
                .crop
                .clone()
                .filter(|crop| !crop.trim().is_empty())
                .unwrap_or_else(|| crate::stats::UNKNOWN_CROP.to_string()),
            variety: request.variety().map(ToOwned::to_owned),
            location: request.location().map(ToOwned::to_owned),
            status: request.status,
            assigned_expert_name: request.assigned_expert_name.clone(),
            created_at: request.created_at.clone(),
            assignable: request.is_assignable(),
        }
    }
}
