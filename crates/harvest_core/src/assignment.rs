use thiserror::Error;

use crate::{Agronomist, AssignmentCommand, DialogId, HarvestRequest, RequestId, RequestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("request {0} is not in the current snapshot")]
    RequestNotFound(RequestId),
    #[error("request {request_id} is {status}, only pending requests can be assigned")]
    RequestNotPending {
        request_id: RequestId,
        status: RequestStatus,
    },
    #[error("an agronomist id and name must both be given")]
    MissingExpert,
    #[error("agronomist {0} is not in the available list")]
    ExpertNotAvailable(String),
    #[error("available agronomists have not been loaded for request {0}")]
    AgronomistsNotLoaded(RequestId),
    #[error("an assignment is already being submitted")]
    AssignmentInFlight,
}

/// Agronomist list for the assignment dialog, as loaded for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgronomistList {
    Loading,
    Loaded(Vec<Agronomist>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignDialog {
    pub dialog_id: DialogId,
    pub request_id: RequestId,
    pub agronomists: AgronomistList,
}

impl AssignDialog {
    pub(crate) fn open(dialog_id: DialogId, request_id: RequestId) -> Self {
        Self {
            dialog_id,
            request_id,
            agronomists: AgronomistList::Loading,
        }
    }

    pub fn available(&self) -> &[Agronomist] {
        match &self.agronomists {
            AgronomistList::Loaded(list) => list.as_slice(),
            AgronomistList::Loading | AgronomistList::Failed(_) => &[],
        }
    }
}

/// Keeps only agronomists flagged available for new work.
pub fn available_only(agronomists: Vec<Agronomist>) -> Vec<Agronomist> {
    agronomists
        .into_iter()
        .filter(|agronomist| agronomist.availability)
        .collect()
}

/// The request must be pending in the latest snapshot.
pub fn check_assignable<'a>(
    requests: &'a [HarvestRequest],
    request_id: &str,
) -> Result<&'a HarvestRequest, AssignmentError> {
    let request = requests
        .iter()
        .find(|request| request.id == request_id)
        .ok_or_else(|| AssignmentError::RequestNotFound(request_id.to_string()))?;
    if !request.is_assignable() {
        return Err(AssignmentError::RequestNotPending {
            request_id: request.id.clone(),
            status: request.status,
        });
    }
    Ok(request)
}

/// Checks every precondition of an assignment and builds the command to send.
pub fn validate_assignment(
    requests: &[HarvestRequest],
    dialog: Option<&AssignDialog>,
    in_flight: bool,
    request_id: &str,
    expert_id: Option<&str>,
    expert_name: Option<&str>,
    admin_advice: &str,
) -> Result<AssignmentCommand, AssignmentError> {
    if in_flight {
        return Err(AssignmentError::AssignmentInFlight);
    }
    let dialog = dialog
        .filter(|dialog| dialog.request_id == request_id)
        .ok_or_else(|| AssignmentError::AgronomistsNotLoaded(request_id.to_string()))?;
    check_assignable(requests, request_id)?;

    let present = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
    };
    let (expert_id, expert_name) = match (present(expert_id), present(expert_name)) {
        (Some(id), Some(name)) => (id, name),
        _ => return Err(AssignmentError::MissingExpert),
    };

    let AgronomistList::Loaded(list) = &dialog.agronomists else {
        return Err(AssignmentError::AgronomistsNotLoaded(request_id.to_string()));
    };
    if !list
        .iter()
        .any(|agronomist| agronomist.id == expert_id && agronomist.availability)
    {
        return Err(AssignmentError::ExpertNotAvailable(expert_id));
    }

    Ok(AssignmentCommand {
        expert_id,
        expert_name,
        admin_advice: admin_advice.trim().to_string(),
    })
}
