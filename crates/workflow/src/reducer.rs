//! Pure state transitions: `apply(state, event) -> state`.

use crate::{
    events::{Acknowledgement, Outcome, WorkflowEvent, UNREACHABLE_MESSAGE},
    state::{Flow, SessionState},
};

pub fn apply(state: &SessionState, event: WorkflowEvent) -> SessionState {
    match event {
        WorkflowEvent::UnsubscribeSelected => select_unsubscribe(state),
        WorkflowEvent::RequestDispatched => dispatch(state),
        WorkflowEvent::ResponseReceived {
            generation,
            outcome,
        } => receive(state, generation, outcome),
    }
}

/// Whether a response tagged with `generation` would be applied to `state`.
pub fn is_current(state: &SessionState, generation: u64) -> bool {
    state.in_flight && state.generation == generation
}

fn select_unsubscribe(state: &SessionState) -> SessionState {
    if state.flow != Flow::Home {
        return state.clone();
    }
    SessionState {
        flow: Flow::Unsubscribe,
        current_error: String::new(),
        generation: state.generation + 1,
        in_flight: false,
        ..state.clone()
    }
}

fn dispatch(state: &SessionState) -> SessionState {
    if state.flow.is_terminal() {
        return state.clone();
    }
    SessionState {
        generation: state.generation + 1,
        in_flight: true,
        ..state.clone()
    }
}

fn receive(state: &SessionState, generation: u64, outcome: Outcome) -> SessionState {
    if !is_current(state, generation) {
        return state.clone();
    }

    let settled = SessionState {
        in_flight: false,
        ..state.clone()
    };

    match outcome {
        Outcome::Accepted(ack) => advance(settled, ack),
        Outcome::Rejected { message } => SessionState {
            current_error: message,
            ..settled
        },
        Outcome::Unreachable { .. } => SessionState {
            current_error: UNREACHABLE_MESSAGE.to_string(),
            ..settled
        },
    }
}

fn advance(settled: SessionState, ack: Acknowledgement) -> SessionState {
    let Some(next) = settled.flow.next_on_success() else {
        return settled;
    };

    let (phone, opt_in) = match (next, ack) {
        (Flow::ConfirmSubscription, Acknowledgement::Subscribed { phone, opt_in }) => {
            (phone, opt_in)
        }
        (Flow::ConfirmUnsubscribe, Acknowledgement::Unsubscribed { phone }) => {
            (phone, settled.opt_in)
        }
        (Flow::SubscriptionConfirmed, Acknowledgement::SubscriptionVerified)
        | (Flow::UnsubscriptionConfirmed, Acknowledgement::UnsubscriptionVerified) => {
            (settled.phone.clone(), settled.opt_in)
        }
        // Acknowledgement for a different stage: drop it but release the form.
        _ => return settled,
    };

    if next.requires_phone() && phone.trim().is_empty() {
        return settled;
    }

    SessionState {
        flow: next,
        phone,
        opt_in,
        current_error: String::new(),
        ..settled
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
