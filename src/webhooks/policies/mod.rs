//! Admission policies for PolicyController resources.
//!
//! Policies are pure functions from an admission request to a [`Verdict`];
//! they perform no cluster or network I/O and keep no state across requests.
//! Both hosting shapes (the raw HTTP handler and the typed validator hooks)
//! terminate here so the rules are never duplicated.

pub mod namespace;

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, Operation};

use crate::config::GatewayConfig;

/// Outcome of evaluating an admission policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Admit the object
    Allow,
    /// Reject the object with an operator-facing explanation
    Deny(String),
}

impl Verdict {
    /// Whether this verdict admits the object
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Evaluate the admission policy for one request.
///
/// Total over every decoded request:
/// - a request for a resource other than the governed one is denied (the
///   decision stays HTTP 200; only transport failures are non-2xx);
/// - DELETE is always allowed, regardless of namespace, so a misplaced
///   object never becomes undeletable;
/// - everything else runs the namespace pinning rule.
pub fn evaluate(config: &GatewayConfig, request: &AdmissionRequest<DynamicObject>) -> Verdict {
    let resource = &request.resource;
    if resource.group != config.group
        || resource.version != config.version
        || resource.resource != config.resource
    {
        return Verdict::Deny(unexpected_resource(config, resource));
    }

    if request.operation == Operation::Delete {
        return Verdict::Allow;
    }

    // The API server sets request.namespace for namespaced resources; fall
    // back to the object's own metadata when the envelope omits it.
    let ns = request.namespace.as_deref().or_else(|| {
        request
            .object
            .as_ref()
            .and_then(|obj| obj.metadata.namespace.as_deref())
    });
    namespace::evaluate(&config.kind, &config.install_namespace, ns)
}

fn unexpected_resource(config: &GatewayConfig, got: &kube::core::GroupVersionResource) -> String {
    format!(
        "unexpected resource {}/{}, Resource={}: this webhook only validates {}",
        got.group,
        got.version,
        got.resource,
        config.governed_identity()
    )
}
