//! Drives one session: builds requests, runs them as tasks, applies responses.

use std::sync::Arc;

use client_core::{dispatch, SubscriptionApi};
use shared::domain::redact_phone;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    error::WorkflowError,
    events::{outcome_for, Outcome, WorkflowEvent},
    form::{request_for, FormInput},
    reducer,
    state::{Flow, SessionState},
    view::{form_for, FormView},
};

enum Wake {
    Event(Option<WorkflowEvent>),
    TaskEnded(Result<(), JoinError>),
}

/// Owns the session state and the single outstanding request.
///
/// Responses come back over a channel tagged with the generation they were
/// dispatched under; anything not matching the current generation is dropped
/// by the reducer. Spawning requires a running tokio runtime.
pub struct WorkflowController {
    api: Arc<dyn SubscriptionApi>,
    state: SessionState,
    events_tx: mpsc::UnboundedSender<WorkflowEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkflowEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl WorkflowController {
    pub fn new(api: Arc<dyn SubscriptionApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: SessionState::new(),
            events_tx,
            events_rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> FormView {
        form_for(&self.state)
    }

    pub fn apply(&mut self, event: WorkflowEvent) {
        if let Some(generation) = event.generation() {
            if !reducer::is_current(&self.state, generation) {
                debug!(
                    generation,
                    current = self.state.generation(),
                    "ignoring stale response"
                );
            }
        }

        let next = reducer::apply(&self.state, event);
        if next.flow() != self.state.flow() {
            info!(from = %self.state.flow(), to = %next.flow(), "workflow stage changed");
        }
        if next.current_error() != self.state.current_error() && !next.current_error().is_empty()
        {
            warn!(flow = %next.flow(), message = next.current_error(), "request failed");
        }
        if !next.in_flight() {
            self.in_flight = None;
        }
        self.state = next;
    }

    /// Local home → unsubscribe transition. Issues no request and cancels any
    /// request still outstanding from the home form.
    pub fn select_unsubscribe(&mut self) -> Result<(), WorkflowError> {
        if self.state.flow() != Flow::Home {
            return Err(WorkflowError::ActionUnavailable {
                action: "unsubscribe",
                flow: self.state.flow(),
            });
        }
        self.cancel_in_flight();
        self.apply(WorkflowEvent::UnsubscribeSelected);
        Ok(())
    }

    /// Sends the current stage's form. Returns the generation the response
    /// will be matched against.
    pub fn submit(&mut self, input: &FormInput) -> Result<u64, WorkflowError> {
        if self.state.flow().is_terminal() {
            return Err(WorkflowError::Terminal(self.state.flow()));
        }
        if self.state.in_flight() {
            return Err(WorkflowError::RequestInFlight);
        }

        let request = request_for(&self.state, input)?;
        self.apply(WorkflowEvent::RequestDispatched);
        let generation = self.state.generation();
        info!(
            generation,
            route = request.route(),
            phone = %redact_phone(request.phone()),
            "dispatching request"
        );

        let api = Arc::clone(&self.api);
        let events_tx = self.events_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = dispatch(api.as_ref(), &request).await;
            let outcome = outcome_for(&request, result);
            if let Outcome::Unreachable { reason } = &outcome {
                warn!(
                    generation,
                    route = request.route(),
                    reason = %reason,
                    "alert service unreachable"
                );
            }
            let _ = events_tx.send(WorkflowEvent::ResponseReceived {
                generation,
                outcome,
            });
        }));
        Ok(generation)
    }

    /// Waits for the outstanding response, if any, and applies it.
    ///
    /// A request task that ends without reporting (it panicked, or no task was
    /// ever spawned for the pending generation) releases the form with the
    /// unreachable message.
    pub async fn settle(&mut self) -> &SessionState {
        while self.state.in_flight() {
            let Some(task) = self.in_flight.as_mut() else {
                self.release_orphaned("no request task is running".to_string());
                break;
            };

            let wake = tokio::select! {
                biased;
                event = self.events_rx.recv() => Wake::Event(event),
                joined = task => Wake::TaskEnded(joined),
            };

            match wake {
                Wake::Event(Some(event)) => self.apply(event),
                Wake::Event(None) => break,
                Wake::TaskEnded(joined) => {
                    self.in_flight = None;
                    while let Ok(event) = self.events_rx.try_recv() {
                        self.apply(event);
                    }
                    if self.state.in_flight() {
                        let reason = match joined {
                            Ok(()) => "request task ended without a response".to_string(),
                            Err(err) => err.to_string(),
                        };
                        self.release_orphaned(reason);
                    }
                }
            }
        }
        &self.state
    }

    pub async fn submit_and_settle(
        &mut self,
        input: &FormInput,
    ) -> Result<&SessionState, WorkflowError> {
        self.submit(input)?;
        Ok(self.settle().await)
    }

    fn release_orphaned(&mut self, reason: String) {
        let generation = self.state.generation();
        warn!(generation, reason = %reason, "request ended without a response");
        self.apply(WorkflowEvent::ResponseReceived {
            generation,
            outcome: Outcome::Unreachable { reason },
        });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            debug!(
                generation = self.state.generation(),
                "cancelling in-flight request"
            );
            task.abort();
        }
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
