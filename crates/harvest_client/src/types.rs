use std::fmt;

use harvest_core::{Agronomist, DialogId, HarvestRequest, RefreshId, RequestId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    RequestsFetched {
        refresh_id: RefreshId,
        result: Result<Vec<HarvestRequest>, ServiceError>,
    },
    AgronomistsFetched {
        dialog_id: DialogId,
        request_id: RequestId,
        result: Result<Vec<Agronomist>, ServiceError>,
    },
    AssignmentFinished {
        request_id: RequestId,
        result: Result<(), ServiceError>,
    },
}

/// A failed call to the harvest service. `message` is what the
/// administrator sees; for HTTP errors it is the server's own text when it
/// sent one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}
