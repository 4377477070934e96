use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use contact_relay::{
    service::ContactService,
    transport::{Mailer, OutgoingEmail, TransportError},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use std::sync::{Arc, Mutex};

/// Records every email instead of delivering it.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub fail_with: Option<String>,
}

impl RecordingMailer {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(email);
        match &self.fail_with {
            Some(reason) => Err(TransportError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

pub fn create_test_app(mailer: RecordingMailer, expose_transport_errors: bool) -> Router {
    let service = ContactService::new(
        Box::new(mailer),
        "Avera Website <website@example.com>".parse().unwrap(),
        "inbox@example.com".parse().unwrap(),
        expose_transport_errors,
    );
    contact_relay::router(Arc::new(service))
}

pub async fn post(
    app: Router,
    content_type: &str,
    body: impl Into<String>,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/send-email")
                .header("content-type", content_type)
                .body(Body::from(body.into()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).expect("response should be JSON");
    (status, json)
}

pub async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    post(app, "application/json", body.to_string()).await
}
