//! Global request status shared by every synchronization operation

use crate::types::RequestStatus;
use serde::Serialize;

/// Status flag plus the last reported error message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppStatusState {
    /// Status of the most recent request
    pub status: RequestStatus,
    /// Last reported error, if any
    pub error: Option<String>,
}

impl AppStatusState {
    /// Marks a request as started
    pub const fn start_request(&mut self) {
        self.status = RequestStatus::Loading;
    }

    /// Marks the latest request as succeeded
    pub const fn succeed(&mut self) {
        self.status = RequestStatus::Succeeded;
    }

    /// Marks the latest request as failed with `message`
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RequestStatus::Failed;
        self.error = Some(message.into());
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }
}
