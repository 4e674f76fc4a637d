use chrono::{DateTime, Duration, Utc};

use crate::{HarvestRequest, RequestId, RequestStatus, TrackingEventKind};

/// How long a rejection stays worth telling the administrator about.
pub const RECENCY_WINDOW: Duration = Duration::minutes(5);

pub const NO_REASON: &str = "No reason provided";
pub const UNKNOWN_AGRONOMIST: &str = "Unknown agronomist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionNotice {
    pub request_id: RequestId,
    pub farmer_name: Option<String>,
    pub crop: Option<String>,
    pub reason: String,
    pub agronomist_name: String,
    /// Entry predates the format that records both reason and agronomist.
    pub is_old_data: bool,
}

/// Finds the first recent rejection among pending requests.
///
/// Requests are scanned in snapshot order and their tracking entries oldest
/// first; the first hit wins. Holds no state between calls.
pub fn detect_rejection(requests: &[HarvestRequest], now: DateTime<Utc>) -> Option<RejectionNotice> {
    requests
        .iter()
        .filter(|request| request.status == RequestStatus::Pending)
        .find_map(|request| {
            request.tracking.iter().find_map(|entry| {
                let TrackingEventKind::Rejected { reason, agronomist } = entry.kind() else {
                    return None;
                };
                let updated_at = entry.updated_at()?;
                if now.signed_duration_since(updated_at) >= RECENCY_WINDOW {
                    return None;
                }
                Some(RejectionNotice {
                    request_id: request.id.clone(),
                    farmer_name: request.farmer_name.clone(),
                    crop: request.crop.clone(),
                    reason: reason.unwrap_or(NO_REASON).to_string(),
                    agronomist_name: agronomist.unwrap_or(UNKNOWN_AGRONOMIST).to_string(),
                    is_old_data: is_blank(agronomist) || is_blank(reason),
                })
            })
        })
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}
