//! Namespace pinning policy.
//!
//! PolicyController objects may only live in the operator's install
//! namespace. The denial message names the kind and both namespaces so an
//! operator can self-diagnose from the `kubectl` error alone.

use super::Verdict;

/// Deny unless `namespace` equals the configured install namespace.
pub fn evaluate(kind: &str, install_namespace: &str, namespace: Option<&str>) -> Verdict {
    let ns = namespace.unwrap_or_default();
    if ns == install_namespace {
        return Verdict::Allow;
    }
    Verdict::Deny(format!(
        "{} objects may only be created in the \"{}\" namespace (got \"{}\")",
        kind, install_namespace, ns
    ))
}
