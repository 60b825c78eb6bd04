use serde_json::Value;

use crate::core::{MutationFailure, RecordId};
use crate::state::{ModelState, RequestStatus};

/// A request status reshaped for direct display.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome<'a> {
    /// No request recorded for the operation.
    Idle,
    Pending { id: Option<RecordId> },
    /// `record` is the affected record as currently cached, if any.
    Succeeded {
        id: Option<RecordId>,
        record: Option<&'a Value>,
    },
    Failed {
        id: Option<RecordId>,
        error: MutationFailure,
    },
}

impl ActionOutcome<'_> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionOutcome::Pending { .. })
    }
}

pub(super) fn outcome<'a>(
    model: Option<&'a ModelState>,
    status: Option<&'a RequestStatus>,
) -> ActionOutcome<'a> {
    let Some(status) = status else {
        return ActionOutcome::Idle;
    };
    if status.pending {
        return ActionOutcome::Pending {
            id: status.id.clone(),
        };
    }
    match status.is_success {
        Some(true) => ActionOutcome::Succeeded {
            id: status.id.clone(),
            record: status
                .id
                .as_ref()
                .and_then(|id| model?.by_id.get(id))
                .and_then(|entry| entry.record.as_ref()),
        },
        Some(false) => ActionOutcome::Failed {
            id: status.id.clone(),
            error: MutationFailure {
                message: status.message.clone(),
                errors: status.errors.clone(),
            },
        },
        None => ActionOutcome::Idle,
    }
}
