//! Subscription workflow: a small state machine that sequences the subscribe,
//! verify, unsubscribe and verify-unsubscribe forms against the alert service.

pub mod controller;
pub mod error;
pub mod events;
pub mod form;
pub mod reducer;
pub mod state;
pub mod view;

pub use controller::WorkflowController;
pub use error::WorkflowError;
pub use events::{Acknowledgement, Outcome, WorkflowEvent};
pub use form::{request_for, FormInput};
pub use state::{Flow, SessionState};
pub use view::{form_for, FieldKind, FieldSpec, FormView, LocalAction};
