//! Admission webhook server.
//!
//! Owns the HTTP request/response lifecycle for two hosting shapes that
//! terminate in the same policy:
//!
//! - `POST /validate`: the standalone handler. Reads raw bytes, negotiates
//!   content-type, and drives the envelope codec end-to-end.
//! - `POST /validate-policycontroller`: the framework-hosted handler. The
//!   extractor decodes the envelope; the handler dispatches the decoded
//!   object to the typed validator hooks.
//!
//! Policy denials always answer HTTP 200 with `allowed: false`; non-2xx
//! statuses are reserved for transport failures and carry plain text.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionReview, Operation};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::health::HealthState;
use crate::webhooks::decision::correlate;
use crate::webhooks::envelope::{DecodeError, EnvelopeCodec};
use crate::webhooks::policies::{self, Verdict};
use crate::webhooks::validator::PolicyControllerValidator;

/// Shared state for webhook handlers
pub struct WebhookState {
    pub config: GatewayConfig,
    codec: EnvelopeCodec,
    validator: PolicyControllerValidator,
    health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(config: GatewayConfig, health: Arc<HealthState>) -> Self {
        let validator = PolicyControllerValidator::new(config.clone());
        Self {
            config,
            codec: EnvelopeCodec::new(),
            validator,
            health,
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate", post(serve_validate))
        .route("/validate-policycontroller", post(validate_policycontroller))
        .with_state(state)
}

/// Standalone admission handler: owns decode and encode of the envelope.
async fn serve_validate(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/json") {
        warn!(content_type = %content_type, "Rejecting request, expect application/json");
        state.health.metrics.record_rejection("unsupported_media_type");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "invalid Content-Type, expect application/json",
        )
            .into_response();
    }

    let request = match state.codec.decode(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to decode AdmissionReview");
            state.health.metrics.record_rejection(rejection_reason(&e));
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let verdict = policies::evaluate(&state.config, &request);
    log_and_record(&state, &request, &verdict);

    let response = correlate(&request, verdict);
    match state.codec.encode(response) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            error!(error = %e, uid = %request.uid, "Failed to encode AdmissionReview response");
            state.health.metrics.record_rejection("encode_failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to encode AdmissionReview response",
            )
                .into_response()
        }
    }
}

/// Framework-hosted admission handler: the envelope is already decoded, the
/// object is dispatched to the typed validator hooks per operation.
async fn validate_policycontroller(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> Response {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            state.health.metrics.record_rejection("missing_request");
            return (StatusCode::BAD_REQUEST, format!("invalid AdmissionReview: {e}"))
                .into_response();
        }
    };

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let hook_result = match request.operation {
        Operation::Delete => state.validator.validate_delete(),
        Operation::Update => match request.object.as_ref() {
            Some(obj) => state
                .validator
                .validate_update(request.old_object.as_ref(), obj),
            None => Ok(Verdict::Deny("missing object in request".to_string())),
        },
        _ => match request.object.as_ref() {
            Some(obj) => state.validator.validate_create(obj),
            None => Ok(Verdict::Deny("missing object in request".to_string())),
        },
    };

    // A type mismatch is a hosting misconfiguration, not a policy decision:
    // it surfaces as a transport failure instead of a 200/deny.
    let verdict = match hook_result {
        Ok(verdict) => verdict,
        Err(e) => {
            error!(error = %e, uid = %request.uid, "Admission request carries an unexpected object type");
            state.health.metrics.record_rejection("unexpected_object_type");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    log_and_record(&state, &request, &verdict);
    (
        StatusCode::OK,
        Json(correlate(&request, verdict).into_review()),
    )
        .into_response()
}

fn log_and_record(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
    verdict: &Verdict,
) {
    match verdict {
        Verdict::Allow => info!(uid = %request.uid, "Admission request allowed"),
        Verdict::Deny(message) => {
            warn!(uid = %request.uid, message = %message, "Admission request denied");
        }
    }
    let operation = format!("{:?}", request.operation).to_uppercase();
    state
        .health
        .metrics
        .record_decision(&operation, verdict.is_allowed());
}

fn rejection_reason(err: &DecodeError) -> &'static str {
    match err {
        DecodeError::Malformed(_) => "malformed_envelope",
        DecodeError::WrongEnvelopeType { .. } => "wrong_envelope_type",
        DecodeError::MissingRequest => "missing_request",
    }
}

/// Errors that can occur when running the webhook server
#[derive(Debug, Error)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to the configured listen address and serves both admission
/// endpoints. TLS certificates are loaded from the configured PEM paths;
/// certificate provisioning itself is the hosting platform's concern.
pub async fn run_webhook_server(state: Arc<WebhookState>) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::path::PathBuf;

    let addr = state.config.listen_addr;
    let tls = RustlsConfig::from_pem_file(
        PathBuf::from(&state.config.tls_cert_path),
        PathBuf::from(&state.config.tls_key_path),
    )
    .await
    .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let app = create_webhook_router(state);
    info!(addr = %addr, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
