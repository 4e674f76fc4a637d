//! Harvest core: pure state machine for the harvest request console.
//!
//! Holds the request snapshot, derives statistics and rejection notices from
//! it, and decides which remote calls to make. No IO happens here; the shell
//! executes [`Effect`]s and feeds results back as [`Msg`]s.
mod assignment;
mod effect;
mod filter;
mod model;
mod msg;
mod rejection;
mod state;
mod stats;
mod update;
mod view_model;

pub use assignment::{
    available_only, check_assignable, validate_assignment, AgronomistList, AssignDialog,
    AssignmentError,
};
pub use effect::Effect;
pub use filter::filter_requests;
pub use model::{
    parse_timestamp, Agronomist, AssignmentCommand, HarvestRequest, PersonalizedData, RequestId,
    RequestStatus, TrackingEntry, TrackingEventKind,
};
pub use msg::Msg;
pub use rejection::{
    detect_rejection, RejectionNotice, NO_REASON, RECENCY_WINDOW, UNKNOWN_AGRONOMIST,
};
pub use state::{AppState, DialogId, Notice, NoticeLevel, RefreshId, RequestSnapshot};
pub use stats::{
    crop_distribution, monthly_trend, percentage, status_distribution, CropShare, MonthBucket,
    Statistics, StatusDistribution, UNKNOWN_CROP,
};
pub use update::{update, ASSIGNED_MESSAGE};
pub use view_model::{AppViewModel, AssignDialogView, RequestRowView};
