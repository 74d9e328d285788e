use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{extract::State, http::StatusCode, routing::post, Form, Router};
use client_core::HttpSubscriptionClient;
use shared::{
    domain::OptIn,
    error::ApiError,
    protocol::{subscribe_route, subscribe_verify_route, unsubscribe_route, unsubscribe_verify_route},
};
use tokio::{net::TcpListener, sync::Mutex};
use workflow::{
    form::{CODE_FIELD, OPT_IN_FIELD, PHONE_FIELD, TOPIC_FIELD},
    Flow, FormInput, WorkflowController,
};

const ISSUED_CODE: &str = "123456";

/// Minimal stand-in for the alert service: UK mobile numbers only, one fixed code.
#[derive(Clone, Default)]
struct FakeAlertService {
    pending: Arc<Mutex<HashSet<String>>>,
    subscribers: Arc<Mutex<HashMap<String, (String, String)>>>,
}

type Reply = (StatusCode, String);

fn reject(message: &str) -> Reply {
    let body = serde_json::to_string(&ApiError::new(message)).expect("error body");
    (StatusCode::BAD_REQUEST, body)
}

fn accept() -> Reply {
    (StatusCode::OK, String::new())
}

fn is_uk_mobile(phone: &str) -> bool {
    phone.len() == 11 && phone.starts_with("07") && phone.chars().all(|c| c.is_ascii_digit())
}

async fn subscribe(
    State(service): State<FakeAlertService>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let phone = form.get("phone").cloned().unwrap_or_default();
    if !is_uk_mobile(&phone) {
        return reject("invalid phone number");
    }
    service.pending.lock().await.insert(phone);
    accept()
}

async fn subscribe_verify(
    State(service): State<FakeAlertService>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let phone = form.get("phone").cloned().unwrap_or_default();
    if form.get("code").map(String::as_str) != Some(ISSUED_CODE)
        || !service.pending.lock().await.remove(&phone)
    {
        return reject("verification code does not match");
    }
    let opt_in = form.get("opt-in").cloned().unwrap_or_default();
    service
        .subscribers
        .lock()
        .await
        .insert(phone, ("subscribed".to_string(), opt_in));
    accept()
}

async fn unsubscribe(
    State(service): State<FakeAlertService>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let phone = form.get("phone").cloned().unwrap_or_default();
    if !service.subscribers.lock().await.contains_key(&phone) {
        return reject("phone number is not subscribed");
    }
    service.pending.lock().await.insert(phone);
    accept()
}

async fn unsubscribe_verify(
    State(service): State<FakeAlertService>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let phone = form.get("phone").cloned().unwrap_or_default();
    if form.get("code").map(String::as_str) != Some(ISSUED_CODE)
        || !service.pending.lock().await.remove(&phone)
    {
        return reject("verification code does not match");
    }
    service.subscribers.lock().await.remove(&phone);
    accept()
}

async fn spawn_service(service: FakeAlertService) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route(subscribe_route(), post(subscribe))
        .route(subscribe_verify_route(), post(subscribe_verify))
        .route(unsubscribe_route(), post(unsubscribe))
        .route(unsubscribe_verify_route(), post(unsubscribe_verify))
        .with_state(service);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn controller_for(service: &FakeAlertService) -> WorkflowController {
    let server_url = spawn_service(service.clone()).await;
    let client = HttpSubscriptionClient::new(&server_url).expect("client");
    WorkflowController::new(Arc::new(client))
}

#[tokio::test]
async fn full_subscribe_then_unsubscribe_over_http() {
    let service = FakeAlertService::default();
    let mut controller = controller_for(&service).await;

    let state = controller
        .submit_and_settle(
            &FormInput::new()
                .with(PHONE_FIELD, "07719143007")
                .with(TOPIC_FIELD, "amber"),
        )
        .await
        .expect("subscribe");
    assert_eq!(state.flow(), Flow::ConfirmSubscription);
    assert_eq!(state.phone(), "07719143007");
    assert_eq!(state.opt_in(), OptIn::Off);

    let state = controller
        .submit_and_settle(&FormInput::new().with(CODE_FIELD, ISSUED_CODE))
        .await
        .expect("verify");
    assert_eq!(state.flow(), Flow::SubscriptionConfirmed);
    assert_eq!(state.current_error(), "");
    assert_eq!(
        service.subscribers.lock().await.get("07719143007"),
        Some(&("subscribed".to_string(), "off".to_string()))
    );

    let mut controller = controller_for(&service).await;
    controller.select_unsubscribe().expect("unsubscribe control");
    let state = controller
        .submit_and_settle(&FormInput::new().with(PHONE_FIELD, "07719143007"))
        .await
        .expect("unsubscribe");
    assert_eq!(state.flow(), Flow::ConfirmUnsubscribe);
    assert_eq!(state.phone(), "07719143007");

    let state = controller
        .submit_and_settle(&FormInput::new().with(CODE_FIELD, ISSUED_CODE))
        .await
        .expect("verify unsubscribe");
    assert_eq!(state.flow(), Flow::UnsubscriptionConfirmed);
    assert!(service.subscribers.lock().await.is_empty());
}

#[tokio::test]
async fn service_rejections_are_shown_verbatim_and_retryable() {
    let service = FakeAlertService::default();
    let mut controller = controller_for(&service).await;

    let state = controller
        .submit_and_settle(
            &FormInput::new()
                .with(PHONE_FIELD, "12345")
                .with(TOPIC_FIELD, "red"),
        )
        .await
        .expect("subscribe");
    assert_eq!(state.flow(), Flow::Home);
    assert_eq!(state.current_error(), "invalid phone number");

    let state = controller
        .submit_and_settle(
            &FormInput::new()
                .with(PHONE_FIELD, "07719143007")
                .with(TOPIC_FIELD, "red")
                .with(OPT_IN_FIELD, "on"),
        )
        .await
        .expect("subscribe retry");
    assert_eq!(state.flow(), Flow::ConfirmSubscription);
    assert_eq!(state.current_error(), "");

    let state = controller
        .submit_and_settle(&FormInput::new().with(CODE_FIELD, "999999"))
        .await
        .expect("wrong code");
    assert_eq!(state.flow(), Flow::ConfirmSubscription);
    assert_eq!(state.current_error(), "verification code does not match");
    assert_eq!(state.opt_in(), OptIn::On);
}

#[tokio::test]
async fn unsubscribing_an_unknown_number_is_rejected() {
    let service = FakeAlertService::default();
    let mut controller = controller_for(&service).await;
    controller.select_unsubscribe().expect("unsubscribe control");

    let state = controller
        .submit_and_settle(&FormInput::new().with(PHONE_FIELD, "07719143007"))
        .await
        .expect("unsubscribe");

    assert_eq!(state.flow(), Flow::Unsubscribe);
    assert_eq!(state.current_error(), "phone number is not subscribed");
}
