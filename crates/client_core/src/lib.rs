use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::redact_phone,
    error::{ApiError, ApiException},
    protocol::{
        subscribe_route, subscribe_verify_route, unsubscribe_route, unsubscribe_verify_route,
        ApiRequest, SubscribeForm, UnsubscribeForm, VerifySubscriptionForm,
        VerifyUnsubscriptionForm,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("alert service rejected the request: {0}")]
    Rejected(#[from] ApiException),
    #[error("alert service returned status {status} with an unreadable error body")]
    UnreadableRejection { status: u16, body: String },
    #[error("failed to reach alert service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid alert service url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl ClientError {
    /// The message the service asked us to show, if it sent a readable one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(rejection) => Some(&rejection.message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected(rejection) => Some(rejection.status),
            Self::UnreadableRejection { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::InvalidBaseUrl(_) => None,
        }
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// The four alert-service endpoints the subscription workflow drives.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn subscribe(&self, form: &SubscribeForm) -> Result<(), ClientError>;
    async fn verify_subscription(&self, form: &VerifySubscriptionForm) -> Result<(), ClientError>;
    async fn unsubscribe(&self, form: &UnsubscribeForm) -> Result<(), ClientError>;
    async fn verify_unsubscription(
        &self,
        form: &VerifyUnsubscriptionForm,
    ) -> Result<(), ClientError>;
}

pub async fn dispatch(api: &dyn SubscriptionApi, request: &ApiRequest) -> Result<(), ClientError> {
    match request {
        ApiRequest::Subscribe(form) => api.subscribe(form).await,
        ApiRequest::VerifySubscription(form) => api.verify_subscription(form).await,
        ApiRequest::Unsubscribe(form) => api.unsubscribe(form).await,
        ApiRequest::VerifyUnsubscription(form) => api.verify_unsubscription(form).await,
    }
}

pub struct HttpSubscriptionClient {
    http: Client,
    /// Always ends in `/` so endpoint routes join beneath any path prefix.
    server_url: Url,
}

impl HttpSubscriptionClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut parsed = Url::parse(server_url.trim())?;
        if parsed.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server_url: parsed,
        })
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.server_url.join(route.trim_start_matches('/'))?)
    }

    async fn post_form<T>(
        &self,
        route: &'static str,
        phone: &str,
        form: &T,
    ) -> Result<(), ClientError>
    where
        T: Serialize + ?Sized + Sync,
    {
        debug!(route, phone = %redact_phone(phone), "posting form to alert service");
        let response = self
            .http
            .post(self.endpoint(route)?)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(route, status = status.as_u16(), "alert service accepted request");
            return Ok(());
        }

        let body = response.text().await?;
        match serde_json::from_str::<ApiError>(&body) {
            Ok(api_error) => {
                warn!(
                    route,
                    status = status.as_u16(),
                    message = %api_error.message,
                    "alert service rejected request"
                );
                Err(ApiException::new(status.as_u16(), api_error.message).into())
            }
            Err(err) => {
                warn!(
                    route,
                    status = status.as_u16(),
                    error = %err,
                    "alert service returned an unreadable error body"
                );
                Err(ClientError::UnreadableRejection {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl SubscriptionApi for HttpSubscriptionClient {
    async fn subscribe(&self, form: &SubscribeForm) -> Result<(), ClientError> {
        self.post_form(subscribe_route(), &form.phone, form).await
    }

    async fn verify_subscription(&self, form: &VerifySubscriptionForm) -> Result<(), ClientError> {
        self.post_form(subscribe_verify_route(), &form.phone, form)
            .await
    }

    async fn unsubscribe(&self, form: &UnsubscribeForm) -> Result<(), ClientError> {
        self.post_form(unsubscribe_route(), &form.phone, form).await
    }

    async fn verify_unsubscription(
        &self,
        form: &VerifyUnsubscriptionForm,
    ) -> Result<(), ClientError> {
        self.post_form(unsubscribe_verify_route(), &form.phone, form)
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
