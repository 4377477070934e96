use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::sync::Arc;

use crate::service::{ContactError, ContactService};

use crate::dto::{Outcome, Submission};

/// Accepts the submission as JSON or as an urlencoded form.
pub struct SubmissionBody(pub Submission);

fn content_type(req: &Request) -> Option<&str> {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

impl<S> FromRequest<S> for SubmissionBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = content_type(&req)
            .map(|value| value.starts_with("application/x-www-form-urlencoded"));

        let parsed = match urlencoded {
            // No declared body type: nothing to read, let validation answer.
            None => Ok(Submission::default()),
            Some(true) => {
                Form::<Submission>::from_request(req, state)
                    .await
                    .map(|Form(submission)| submission)
                    .map_err(|e| e.body_text())
            }
            Some(false) => Json::<Submission>::from_request(req, state)
                .await
                .map(|Json(submission)| submission)
                .map_err(|e| e.body_text()),
        };

        parsed.map(Self).map_err(|reason| {
            tracing::debug!("Rejected contact form body: {reason}");
            (
                StatusCode::BAD_REQUEST,
                Json(Outcome::failure(Outcome::INVALID_BODY, None)),
            )
                .into_response()
        })
    }
}

#[debug_handler]
pub async fn send_email(
    State(service): State<Arc<ContactService>>,
    SubmissionBody(submission): SubmissionBody,
) -> Response {
    match service.handle(submission).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            let status = match &e {
                ContactError::Validation(_) => {
                    tracing::debug!("Rejected contact form: {e}");
                    StatusCode::BAD_REQUEST
                }
                ContactError::Transport(_) => {
                    tracing::error!("Error sending email: {e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(e.outcome(service.expose_transport_errors()))).into_response()
        }
    }
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Email API is running").into_response()
}
