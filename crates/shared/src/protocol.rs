use serde::{Deserialize, Serialize};

use crate::domain::{AlertLevel, OptIn};

pub fn subscribe_route() -> &'static str {
    "/api/subscribe"
}

pub fn subscribe_verify_route() -> &'static str {
    "/api/subscribe/verify"
}

pub fn unsubscribe_route() -> &'static str {
    "/api/unsubscribe"
}

pub fn unsubscribe_verify_route() -> &'static str {
    "/api/unsubscribe/verify"
}

/// Body of `POST /api/subscribe`. The `opt-in` field is only sent when the
/// consent box was ticked, matching checkbox form semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeForm {
    pub phone: String,
    pub topic: AlertLevel,
    #[serde(rename = "opt-in", default, skip_serializing_if = "OptIn::is_off")]
    pub opt_in: OptIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySubscriptionForm {
    pub code: String,
    pub phone: String,
    #[serde(rename = "opt-in")]
    pub opt_in: OptIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeForm {
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyUnsubscriptionForm {
    pub code: String,
    pub phone: String,
}

/// One outbound call to the alert service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    Subscribe(SubscribeForm),
    VerifySubscription(VerifySubscriptionForm),
    Unsubscribe(UnsubscribeForm),
    VerifyUnsubscription(VerifyUnsubscriptionForm),
}

impl ApiRequest {
    pub fn route(&self) -> &'static str {
        match self {
            Self::Subscribe(_) => subscribe_route(),
            Self::VerifySubscription(_) => subscribe_verify_route(),
            Self::Unsubscribe(_) => unsubscribe_route(),
            Self::VerifyUnsubscription(_) => unsubscribe_verify_route(),
        }
    }

    pub fn phone(&self) -> &str {
        match self {
            Self::Subscribe(form) => &form.phone,
            Self::VerifySubscription(form) => &form.phone,
            Self::Unsubscribe(form) => &form.phone,
            Self::VerifyUnsubscription(form) => &form.phone,
        }
    }
}
