use std::collections::HashMap;

use chrono::{DateTime, Utc};
use console_logging::{console_debug, console_info, console_warn};

use crate::assignment::{AgronomistList, AssignDialog};
use crate::rejection::{detect_rejection, RejectionNotice};
use crate::stats::Statistics;
use crate::view_model::AppViewModel;
use crate::{HarvestRequest, RequestId, RequestStatus};

/// Monotonic id handed to every issued refresh.
pub type RefreshId = u64;

/// Monotonic id handed to every opening of the assignment dialog.
pub type DialogId = u64;

/// The last applied collection of requests, tagged with the refresh that
/// produced it. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestSnapshot {
    pub version: RefreshId,
    pub requests: Vec<HarvestRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Non-blocking message for the administrator (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    snapshot: RequestSnapshot,
    statistics: Statistics,
    rejection: Option<RejectionNotice>,
    last_issued_refresh: RefreshId,
    refresh_pending: bool,
    last_opened_dialog: DialogId,
    dialog: Option<AssignDialog>,
    assigning: Option<RequestId>,
    search: String,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn snapshot(&self) -> &RequestSnapshot {
        &self.snapshot
    }

    pub fn requests(&self) -> &[HarvestRequest] {
        &self.snapshot.requests
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn rejection(&self) -> Option<&RejectionNotice> {
        self.rejection.as_ref()
    }

    pub fn dialog(&self) -> Option<&AssignDialog> {
        self.dialog.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_pending
    }

    pub fn is_assigning(&self) -> bool {
        self.assigning.is_some()
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn issue_refresh(&mut self) -> RefreshId {
        self.last_issued_refresh += 1;
        self.refresh_pending = true;
        self.mark_dirty();
        console_debug!("Issued refresh {}", self.last_issued_refresh);
        self.last_issued_refresh
    }

    /// Only the most recently issued refresh may touch the snapshot.
    pub(crate) fn is_latest_refresh(&self, refresh_id: RefreshId) -> bool {
        refresh_id == self.last_issued_refresh
    }

    pub(crate) fn apply_snapshot(
        &mut self,
        refresh_id: RefreshId,
        requests: Vec<HarvestRequest>,
        now: DateTime<Utc>,
    ) {
        self.refresh_pending = false;
        log_unexpected_transitions(&self.snapshot.requests, &requests);

        self.snapshot = RequestSnapshot {
            version: refresh_id,
            requests,
        };
        // Re-derived from scratch; a previous notice never survives a refresh.
        self.rejection = detect_rejection(&self.snapshot.requests, now);
        if let Some(notice) = &self.rejection {
            console_info!(
                "Recent rejection on request {} by {}",
                notice.request_id,
                notice.agronomist_name
            );
        }
        self.statistics = Statistics::compute(&self.snapshot.requests);
        console_info!(
            "Applied snapshot version={} requests={}",
            refresh_id,
            self.snapshot.requests.len()
        );
        self.mark_dirty();
    }

    pub(crate) fn fail_refresh(&mut self, message: &str) {
        self.refresh_pending = false;
        console_warn!(
            "Refresh failed, keeping snapshot version={}: {}",
            self.snapshot.version,
            message
        );
        self.set_notice(Notice::error(format!(
            "Failed to load harvest requests: {message}"
        )));
    }

    pub(crate) fn set_search(&mut self, query: String) {
        if self.search != query {
            self.search = query;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn dismiss_rejection(&mut self) {
        if self.rejection.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Opens a fresh dialog; any answer addressed to an earlier one is stale.
    pub(crate) fn open_dialog(&mut self, request_id: RequestId) -> DialogId {
        self.last_opened_dialog += 1;
        let dialog_id = self.last_opened_dialog;
        self.dialog = Some(AssignDialog::open(dialog_id, request_id));
        self.mark_dirty();
        dialog_id
    }

    pub(crate) fn is_open_dialog(&self, dialog_id: DialogId) -> bool {
        self.dialog
            .as_ref()
            .is_some_and(|dialog| dialog.dialog_id == dialog_id)
    }

    pub(crate) fn close_dialog(&mut self) {
        if self.dialog.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn load_agronomists(&mut self, dialog_id: DialogId, list: AgronomistList) {
        if let Some(dialog) = self
            .dialog
            .as_mut()
            .filter(|dialog| dialog.dialog_id == dialog_id)
        {
            dialog.agronomists = list;
            self.mark_dirty();
        }
    }

    pub(crate) fn start_assignment(&mut self, request_id: RequestId) {
        self.assigning = Some(request_id);
        self.mark_dirty();
    }

    /// Clears the in-flight marker; returns false for an unexpected completion.
    pub(crate) fn finish_assignment(&mut self, request_id: &str) -> bool {
        if self.assigning.as_deref() == Some(request_id) {
            self.assigning = None;
            self.mark_dirty();
            true
        } else {
            false
        }
    }

    pub(crate) fn assigning_request(&self) -> Option<&str> {
        self.assigning.as_deref()
    }
}

fn log_unexpected_transitions(previous: &[HarvestRequest], next: &[HarvestRequest]) {
    let before: HashMap<&str, RequestStatus> = previous
        .iter()
        .map(|request| (request.id.as_str(), request.status))
        .collect();
    for request in next {
        let Some(old) = before.get(request.id.as_str()) else {
            continue;
        };
        if !old.can_transition_to(request.status) {
            console_warn!(
                "Request {} moved {} -> {}, outside the known lifecycle",
                request.id,
                old,
                request.status
            );
        }
    }
}
