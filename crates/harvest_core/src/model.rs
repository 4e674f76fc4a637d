use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type RequestId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[serde(rename = "REQUEST_PENDING")]
    Pending,
    Assigned,
    Accepted,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        RequestStatus::Pending,
        RequestStatus::Assigned,
        RequestStatus::Accepted,
        RequestStatus::Scheduled,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_wire(self) -> &'static str {
        match self {
            RequestStatus::Pending => "REQUEST_PENDING",
            RequestStatus::Assigned => "ASSIGNED",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Scheduled => "SCHEDULED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Assigned and every later non-terminal status.
    pub fn is_ongoing(self) -> bool {
        matches!(
            self,
            RequestStatus::Assigned
                | RequestStatus::Accepted
                | RequestStatus::Scheduled
                | RequestStatus::InProgress
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Staying put is always allowed. Only pending -> assigned is driven by
    /// this console; every other move comes from the remote service and is
    /// merely observed.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Assigned, Accepted)
                | (Assigned, Pending)
                | (Accepted, Scheduled)
                | (Scheduled, InProgress)
                | (InProgress, Completed)
                | (_, Cancelled)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Farm attributes captured by the farmer flow. Display-only apart from the
/// search layer reading `location` and `variety`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalizedData {
    pub location: Option<String>,
    pub farm_size: Option<String>,
    pub variety: Option<String>,
    pub soil_type: Option<String>,
    pub irrigation: Option<String>,
    pub constraints: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRequest {
    #[serde(alias = "_id")]
    pub id: RequestId,
    #[serde(default)]
    pub farmer_id: Option<String>,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub expected_yield_kg: Option<f64>,
    #[serde(default)]
    pub harvest_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub personalized_data: Option<PersonalizedData>,
    pub status: RequestStatus,
    #[serde(default)]
    pub assigned_expert_id: Option<String>,
    #[serde(default)]
    pub assigned_expert_name: Option<String>,
    #[serde(default)]
    pub admin_advice: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracking: Vec<TrackingEntry>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HarvestRequest {
    /// A bare pending request, mostly useful for building fixtures.
    pub fn pending(id: impl Into<RequestId>) -> Self {
        Self {
            id: id.into(),
            farmer_id: None,
            farmer_name: None,
            crop: None,
            expected_yield_kg: None,
            harvest_date: None,
            notes: None,
            personalized_data: None,
            status: RequestStatus::Pending,
            assigned_expert_id: None,
            assigned_expert_name: None,
            admin_advice: None,
            tracking: Vec::new(),
            created_at: None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn is_assignable(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn location(&self) -> Option<&str> {
        self.personalized_data
            .as_ref()
            .and_then(|data| data.location.as_deref())
    }

    pub fn variety(&self) -> Option<&str> {
        self.personalized_data
            .as_ref()
            .and_then(|data| data.variety.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub progress: String,
    pub notes: Option<String>,
    pub agronomist_name: Option<String>,
    pub updated_at: Option<String>,
    /// Explicit event tag written by newer services; absent on legacy entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

const REJECTED_EVENT: &str = "REJECTED";
const LEGACY_REJECTED_MARKER: &str = "rejected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingEventKind<'a> {
    Rejected {
        reason: Option<&'a str>,
        agronomist: Option<&'a str>,
    },
    Progress {
        label: &'a str,
    },
}

impl TrackingEntry {
    /// Classifies the entry. Legacy entries carry no tag and signal a
    /// rejection by a `progress` label containing "rejected".
    pub fn kind(&self) -> TrackingEventKind<'_> {
        let tagged = self
            .event
            .as_deref()
            .is_some_and(|event| event.eq_ignore_ascii_case(REJECTED_EVENT));
        if tagged || self.progress.contains(LEGACY_REJECTED_MARKER) {
            TrackingEventKind::Rejected {
                reason: self.notes.as_deref(),
                agronomist: self.agronomist_name.as_deref(),
            }
        } else {
            TrackingEventKind::Progress {
                label: &self.progress,
            }
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agronomist {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub availability: bool,
}

/// Body of the assign call. Id and name always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCommand {
    pub expert_id: String,
    pub expert_name: String,
    pub admin_advice: String,
}

/// Parses the timestamp formats the harvest service is known to emit.
/// Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(flag)) => flag,
        Some(serde_json::Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(serde_json::Value::String(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "available" | "yes" | "1"
        ),
        _ => false,
    })
}

/// Numbers, numeric strings, or nothing. Anything else reads as unknown.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|quantity| quantity.is_finite()))
}
