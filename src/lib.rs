//! policy-controller-webhook library crate
//!
//! Validating admission webhook gateway for the PolicyController custom
//! resource. The gateway answers AdmissionReview envelopes; it never talks
//! to the cluster itself. The reconciliation side of the operator only ever
//! observes objects this gateway has allowed to be persisted.

pub mod config;
pub mod health;
pub mod webhooks;

pub use config::GatewayConfig;
pub use health::HealthState;
pub use webhooks::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};
