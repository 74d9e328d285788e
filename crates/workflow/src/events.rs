//! Workflow events and classification of service responses.

use client_core::ClientError;
use shared::{domain::OptIn, protocol::ApiRequest};

/// Shown when a request never produced a response.
pub const UNREACHABLE_MESSAGE: &str = "We could not reach the alert service. Please try again.";

pub fn unreadable_response_message(status: u16) -> String {
    format!("The alert service returned an unexpected response (status {status}). Please try again.")
}

/// What the service acknowledged, carrying the values the next stage keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    Subscribed { phone: String, opt_in: OptIn },
    SubscriptionVerified,
    Unsubscribed { phone: String },
    UnsubscriptionVerified,
}

impl Acknowledgement {
    pub fn for_request(request: &ApiRequest) -> Self {
        match request {
            ApiRequest::Subscribe(form) => Self::Subscribed {
                phone: form.phone.clone(),
                opt_in: form.opt_in,
            },
            ApiRequest::VerifySubscription(_) => Self::SubscriptionVerified,
            ApiRequest::Unsubscribe(form) => Self::Unsubscribed {
                phone: form.phone.clone(),
            },
            ApiRequest::VerifyUnsubscription(_) => Self::UnsubscriptionVerified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Acknowledgement),
    Rejected { message: String },
    Unreachable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// User picked the unsubscribe control on the home form.
    UnsubscribeSelected,
    /// A request left for the service; starts a new generation.
    RequestDispatched,
    ResponseReceived { generation: u64, outcome: Outcome },
}

impl WorkflowEvent {
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::ResponseReceived { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

pub fn outcome_for(request: &ApiRequest, result: Result<(), ClientError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Accepted(Acknowledgement::for_request(request)),
        Err(ClientError::Rejected(rejection)) => Outcome::Rejected {
            message: rejection.message,
        },
        Err(ClientError::UnreadableRejection { status, .. }) => Outcome::Rejected {
            message: unreadable_response_message(status),
        },
        Err(err) => Outcome::Unreachable {
            reason: err.to_string(),
        },
    }
}
