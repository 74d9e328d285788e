//! Form input captured from the visible fields and its mapping to a service request.

use std::collections::BTreeMap;

use shared::{
    domain::{AlertLevel, OptIn},
    protocol::{
        ApiRequest, SubscribeForm, UnsubscribeForm, VerifySubscriptionForm,
        VerifyUnsubscriptionForm,
    },
};

use crate::{
    error::WorkflowError,
    state::{Flow, SessionState},
};

pub const PHONE_FIELD: &str = "phone";
pub const TOPIC_FIELD: &str = "topic";
pub const OPT_IN_FIELD: &str = "opt-in";
pub const CODE_FIELD: &str = "code";

/// Values of the visible input fields at submit time. Unchecked checkboxes
/// are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: BTreeMap<String, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for FormInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = Self::new();
        for (name, value) in iter {
            input.set(name, value);
        }
        input
    }
}

/// Builds the request for the current stage from the visible fields plus the
/// values carried forward in `state`.
///
/// Phone numbers and codes are passed through untouched; the service owns
/// their validation. A blank phone is refused because confirmation stages
/// must always have one to carry.
pub fn request_for(state: &SessionState, input: &FormInput) -> Result<ApiRequest, WorkflowError> {
    match state.flow() {
        Flow::Home => Ok(ApiRequest::Subscribe(SubscribeForm {
            phone: required_phone(input)?,
            topic: topic(input)?,
            opt_in: OptIn::from_checkbox(input.get(OPT_IN_FIELD)),
        })),
        Flow::ConfirmSubscription => Ok(ApiRequest::VerifySubscription(VerifySubscriptionForm {
            code: code(input),
            phone: state.phone().to_string(),
            opt_in: state.opt_in(),
        })),
        Flow::Unsubscribe => Ok(ApiRequest::Unsubscribe(UnsubscribeForm {
            phone: required_phone(input)?,
        })),
        Flow::ConfirmUnsubscribe => Ok(ApiRequest::VerifyUnsubscription(
            VerifyUnsubscriptionForm {
                code: code(input),
                phone: state.phone().to_string(),
            },
        )),
        flow @ (Flow::SubscriptionConfirmed | Flow::UnsubscriptionConfirmed) => {
            Err(WorkflowError::Terminal(flow))
        }
    }
}

fn required_phone(input: &FormInput) -> Result<String, WorkflowError> {
    match input.get(PHONE_FIELD) {
        Some(phone) if !phone.trim().is_empty() => Ok(phone.to_string()),
        _ => Err(WorkflowError::MissingField(PHONE_FIELD)),
    }
}

fn topic(input: &FormInput) -> Result<AlertLevel, WorkflowError> {
    match input.get(TOPIC_FIELD) {
        None => Ok(AlertLevel::default()),
        Some(raw) => raw.parse().map_err(|err| WorkflowError::InvalidField {
            field: TOPIC_FIELD,
            reason: format!("{err}"),
        }),
    }
}

fn code(input: &FormInput) -> String {
    input.get(CODE_FIELD).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::WorkflowEvent, reducer};

    fn state_at(flow: Flow, phone: &str, opt_in: OptIn) -> SessionState {
        SessionState {
            flow,
            phone: phone.to_string(),
            opt_in,
            ..SessionState::default()
        }
    }

    #[test]
    fn home_builds_subscribe_request_from_visible_fields() {
        let input = FormInput::new()
            .with(PHONE_FIELD, "07719143007")
            .with(TOPIC_FIELD, "amber");
        let request = request_for(&SessionState::new(), &input).expect("request");
        assert_eq!(
            request,
            ApiRequest::Subscribe(SubscribeForm {
                phone: "07719143007".to_string(),
                topic: AlertLevel::Amber,
                opt_in: OptIn::Off,
            })
        );
    }

    #[test]
    fn checked_opt_in_is_forwarded() {
        let input: FormInput = [
            (PHONE_FIELD, "07719143007"),
            (TOPIC_FIELD, "Red"),
            (OPT_IN_FIELD, "on"),
        ]
        .into_iter()
        .collect();
        match request_for(&SessionState::new(), &input).expect("request") {
            ApiRequest::Subscribe(form) => {
                assert_eq!(form.topic, AlertLevel::Red);
                assert_eq!(form.opt_in, OptIn::On);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn missing_topic_defaults_to_lowest_level() {
        let input = FormInput::new().with(PHONE_FIELD, "07719143007");
        match request_for(&SessionState::new(), &input).expect("request") {
            ApiRequest::Subscribe(form) => assert_eq!(form.topic, AlertLevel::Green),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn unknown_topic_is_refused() {
        let input = FormInput::new()
            .with(PHONE_FIELD, "07719143007")
            .with(TOPIC_FIELD, "purple");
        let err = request_for(&SessionState::new(), &input).expect_err("must refuse");
        assert!(matches!(err, WorkflowError::InvalidField { field: "topic", .. }));
    }

    #[test]
    fn blank_phone_is_refused_on_entry_forms() {
        let blank = FormInput::new().with(PHONE_FIELD, "   ");
        assert_eq!(
            request_for(&SessionState::new(), &blank),
            Err(WorkflowError::MissingField(PHONE_FIELD))
        );
        let unsubscribe = reducer::apply(&SessionState::new(), WorkflowEvent::UnsubscribeSelected);
        assert_eq!(
            request_for(&unsubscribe, &FormInput::new()),
            Err(WorkflowError::MissingField(PHONE_FIELD))
        );
    }

    #[test]
    fn malformed_phone_is_left_for_the_service_to_judge() {
        let input = FormInput::new().with(PHONE_FIELD, "not-a-number");
        assert_eq!(
            request_for(&SessionState::new(), &input)
                .expect("request")
                .phone(),
            "not-a-number"
        );
    }

    #[test]
    fn confirmation_carries_phone_and_opt_in_forward() {
        let state = state_at(Flow::ConfirmSubscription, "07719143007", OptIn::On);
        // A stray phone field on the code form must not replace the carried one.
        let input = FormInput::new()
            .with(CODE_FIELD, "123456")
            .with(PHONE_FIELD, "07000000000");
        assert_eq!(
            request_for(&state, &input),
            Ok(ApiRequest::VerifySubscription(VerifySubscriptionForm {
                code: "123456".to_string(),
                phone: "07719143007".to_string(),
                opt_in: OptIn::On,
            }))
        );
    }

    #[test]
    fn unsubscribe_confirmation_carries_phone_forward() {
        let state = state_at(Flow::ConfirmUnsubscribe, "07719143007", OptIn::Off);
        let input = FormInput::new().with(CODE_FIELD, "654321");
        assert_eq!(
            request_for(&state, &input),
            Ok(ApiRequest::VerifyUnsubscription(VerifyUnsubscriptionForm {
                code: "654321".to_string(),
                phone: "07719143007".to_string(),
            }))
        );
    }

    #[test]
    fn terminal_stages_build_no_request() {
        let state = state_at(Flow::UnsubscriptionConfirmed, "07719143007", OptIn::Off);
        assert_eq!(
            request_for(&state, &FormInput::new()),
            Err(WorkflowError::Terminal(Flow::UnsubscriptionConfirmed))
        );
    }
}
