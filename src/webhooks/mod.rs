//! Webhook module for validating admission requests.
//!
//! The admission pipeline is: transport handler (content negotiation,
//! status mapping) -> envelope codec (decode) -> policies (verdict) ->
//! decision correlator (uid/typing echo) -> envelope codec (encode).
//! The typed validator hooks are the second hosting shape and feed the
//! same policies.

pub mod decision;
pub mod envelope;
pub mod policies;
mod server;
pub mod validator;

pub use envelope::{DecodeError, EnvelopeCodec};
pub use policies::Verdict;
pub use server::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};
pub use validator::{PolicyControllerValidator, UnexpectedTypeError};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
