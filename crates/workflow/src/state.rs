//! Session record for one subscription/unsubscription visit.

use std::fmt;

use shared::domain::OptIn;

/// Workflow stage. `Home` with a request in flight is the "subscribe pending"
/// stage; it only advances once the service acknowledges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flow {
    #[default]
    Home,
    ConfirmSubscription,
    SubscriptionConfirmed,
    Unsubscribe,
    ConfirmUnsubscribe,
    UnsubscriptionConfirmed,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ConfirmSubscription => "confirm_subscription",
            Self::SubscriptionConfirmed => "subscription_confirmed",
            Self::Unsubscribe => "unsubscribe",
            Self::ConfirmUnsubscribe => "confirm_unsubscribe",
            Self::UnsubscriptionConfirmed => "unsubscription_confirmed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::SubscriptionConfirmed | Self::UnsubscriptionConfirmed
        )
    }

    /// Stages that may only be entered with a recorded phone number.
    pub fn requires_phone(self) -> bool {
        !matches!(self, Self::Home | Self::Unsubscribe)
    }

    /// The stage a successful submission from `self` leads to.
    pub fn next_on_success(self) -> Option<Flow> {
        match self {
            Self::Home => Some(Self::ConfirmSubscription),
            Self::ConfirmSubscription => Some(Self::SubscriptionConfirmed),
            Self::Unsubscribe => Some(Self::ConfirmUnsubscribe),
            Self::ConfirmUnsubscribe => Some(Self::UnsubscriptionConfirmed),
            Self::SubscriptionConfirmed | Self::UnsubscriptionConfirmed => None,
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the session. Every transition produces a new one
/// through [`crate::reducer::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub(crate) flow: Flow,
    pub(crate) phone: String,
    pub(crate) opt_in: OptIn,
    pub(crate) current_error: String,
    pub(crate) generation: u64,
    pub(crate) in_flight: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn opt_in(&self) -> OptIn {
        self.opt_in
    }

    /// Last message reported by the service, empty when there is none.
    pub fn current_error(&self) -> &str {
        &self.current_error
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_subscribe_pending(&self) -> bool {
        self.flow == Flow::Home && self.in_flight
    }
}
