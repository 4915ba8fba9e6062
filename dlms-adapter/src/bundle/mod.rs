//! Bundles: ordered operations executed over one device session
//!
//! A [`Bundle`] is a list of [`BundleAction`]s. Each action carries its
//! request and, once executed, its response. Actions that already have a
//! response are skipped when the bundle runs again, so a bundle aborted by
//! a lost connection resumes where it stopped.

pub mod request;
pub mod response;
pub mod service;

pub use request::{ActionRequest, ActionRequestKind};
pub use response::{ActionResponse, FaultParameter, FaultResponse};
pub use service::BundleService;

use serde::{Deserialize, Serialize};

/// One request of a bundle with its response, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleAction {
    pub request: ActionRequest,
    pub response: Option<ActionResponse>,
}

impl BundleAction {
    pub fn new(request: ActionRequest) -> Self {
        Self {
            request,
            response: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.response.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub actions: Vec<BundleAction>,
}

impl Bundle {
    pub fn new(requests: impl IntoIterator<Item = ActionRequest>) -> Self {
        Self {
            actions: requests.into_iter().map(BundleAction::new).collect(),
        }
    }

    /// Actions still waiting for a response
    pub fn pending(&self) -> usize {
        self.actions.iter().filter(|action| !action.is_completed()).count()
    }

    pub fn is_completed(&self) -> bool {
        self.pending() == 0
    }

    /// Responses in request order, `None` for actions not executed yet
    pub fn responses(&self) -> Vec<Option<&ActionResponse>> {
        self.actions.iter().map(|action| action.response.as_ref()).collect()
    }
}
