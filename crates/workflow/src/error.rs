use thiserror::Error;

use crate::state::Flow;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("a request is already in flight; wait for the response before resubmitting")]
    RequestInFlight,
    #[error("the {0} stage accepts no further input")]
    Terminal(Flow),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("'{action}' is not available from the {flow} stage")]
    ActionUnavailable { action: &'static str, flow: Flow },
}
