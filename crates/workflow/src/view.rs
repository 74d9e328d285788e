//! Describes the form a front end should show for the current stage.

use shared::domain::AlertLevel;

use crate::{
    form::{CODE_FIELD, OPT_IN_FIELD, PHONE_FIELD, TOPIC_FIELD},
    state::{Flow, SessionState},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Numeric verification code delivered out-of-band.
    Code,
    Choice(Vec<ChoiceOption>),
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Controls that change stage locally without contacting the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAction {
    Unsubscribe,
}

impl LocalAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unsubscribe => "Unsubscribe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub flow: Flow,
    pub title: &'static str,
    pub intro: String,
    pub fields: Vec<FieldSpec>,
    pub actions: Vec<LocalAction>,
    pub submit_label: Option<&'static str>,
    pub submit_enabled: bool,
    pub error: Option<String>,
}

impl FormView {
    pub fn is_terminal(&self) -> bool {
        self.flow.is_terminal()
    }
}

pub fn form_for(state: &SessionState) -> FormView {
    let error = (!state.current_error().is_empty()).then(|| state.current_error().to_string());
    let submit_enabled = !state.in_flight() && !state.flow().is_terminal();

    let (title, intro, fields, actions, submit_label) = match state.flow() {
        Flow::Home => (
            "Subscribe to air pollution alerts",
            "Enter your phone number and choose the alert level you want to hear about."
                .to_string(),
            vec![phone_field(), topic_field(), opt_in_field()],
            vec![LocalAction::Unsubscribe],
            Some("Subscribe"),
        ),
        Flow::ConfirmSubscription => (
            "Confirm your subscription",
            format!(
                "We sent a verification code to {}. Enter it below to start receiving alerts.",
                state.phone()
            ),
            vec![code_field()],
            Vec::new(),
            Some("Confirm"),
        ),
        Flow::SubscriptionConfirmed => (
            "You're subscribed",
            format!("Alerts will be sent to {}.", state.phone()),
            Vec::new(),
            Vec::new(),
            None,
        ),
        Flow::Unsubscribe => (
            "Unsubscribe from air pollution alerts",
            "Enter the phone number you subscribed with.".to_string(),
            vec![phone_field()],
            Vec::new(),
            Some("Unsubscribe"),
        ),
        Flow::ConfirmUnsubscribe => (
            "Confirm unsubscription",
            format!(
                "We sent a verification code to {}. Enter it below to stop receiving alerts.",
                state.phone()
            ),
            vec![code_field()],
            Vec::new(),
            Some("Confirm"),
        ),
        Flow::UnsubscriptionConfirmed => (
            "You're unsubscribed",
            format!("{} will no longer receive alerts.", state.phone()),
            Vec::new(),
            Vec::new(),
            None,
        ),
    };

    FormView {
        flow: state.flow(),
        title,
        intro,
        fields,
        actions: if state.in_flight() { Vec::new() } else { actions },
        submit_label,
        submit_enabled,
        error,
    }
}

fn phone_field() -> FieldSpec {
    FieldSpec {
        name: PHONE_FIELD,
        label: "Phone number",
        kind: FieldKind::Text,
    }
}

fn topic_field() -> FieldSpec {
    FieldSpec {
        name: TOPIC_FIELD,
        label: "Alert level",
        kind: FieldKind::Choice(
            AlertLevel::ALL
                .into_iter()
                .map(|level| ChoiceOption {
                    value: level.as_str(),
                    label: format!("{level}: {}", level.describe()),
                })
                .collect(),
        ),
    }
}

fn opt_in_field() -> FieldSpec {
    FieldSpec {
        name: OPT_IN_FIELD,
        label: "Send me occasional news and updates",
        kind: FieldKind::Checkbox,
    }
}

fn code_field() -> FieldSpec {
    FieldSpec {
        name: CODE_FIELD,
        label: "Verification code",
        kind: FieldKind::Code,
    }
}
