//! Gateway configuration.
//!
//! The governed resource identity and install namespace are compiled-in
//! constants; listen address and TLS material paths can be overridden
//! through the environment. Configuration is immutable after startup and
//! shared read-only across request handlers.

use std::net::SocketAddr;

/// API group of the governed custom resource
pub const POLICY_CONTROLLER_GROUP: &str = "rhtas.charts.redhat.com";
/// API version of the governed custom resource
pub const POLICY_CONTROLLER_VERSION: &str = "v1alpha1";
/// Plural resource name of the governed custom resource
pub const POLICY_CONTROLLER_RESOURCE: &str = "policycontrollers";
/// Kind of the governed custom resource
pub const POLICY_CONTROLLER_KIND: &str = "PolicyController";
/// The only namespace PolicyController objects may be created in
pub const POLICY_CONTROLLER_INSTALL_NS: &str = "policy-controller-operator";

/// Default path to the webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/tmp/k8s-webhook-server/serving-certs/tls.crt";
/// Default path to the webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/tmp/k8s-webhook-server/serving-certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Immutable gateway configuration, resolved once at startup.
///
/// `group`/`version`/`resource`/`kind` identify the one resource type this
/// gateway governs; admission requests for anything else are denied.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub kind: String,
    pub install_namespace: String,
    pub listen_addr: SocketAddr,
    pub tls_cert_path: String,
    pub tls_key_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            group: POLICY_CONTROLLER_GROUP.to_string(),
            version: POLICY_CONTROLLER_VERSION.to_string(),
            resource: POLICY_CONTROLLER_RESOURCE.to_string(),
            kind: POLICY_CONTROLLER_KIND.to_string(),
            install_namespace: POLICY_CONTROLLER_INSTALL_NS.to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], WEBHOOK_PORT)),
            tls_cert_path: WEBHOOK_CERT_PATH.to_string(),
            tls_key_path: WEBHOOK_KEY_PATH.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Resolve the configuration, applying environment overrides on top of
    /// the compiled defaults.
    ///
    /// Recognized variables: `WEBHOOK_ADDR`, `WEBHOOK_TLS_CERT`,
    /// `WEBHOOK_TLS_KEY`. An unparsable `WEBHOOK_ADDR` falls back to the
    /// default listen address.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("WEBHOOK_ADDR") {
            match addr.parse() {
                Ok(addr) => config.listen_addr = addr,
                Err(e) => {
                    tracing::warn!(addr = %addr, error = %e, "Ignoring unparsable WEBHOOK_ADDR");
                }
            }
        }
        if let Ok(path) = std::env::var("WEBHOOK_TLS_CERT") {
            config.tls_cert_path = path;
        }
        if let Ok(path) = std::env::var("WEBHOOK_TLS_KEY") {
            config.tls_key_path = path;
        }

        config
    }

    /// `group/version, Resource=resource` rendering of the governed identity,
    /// used in denial messages and logs.
    pub fn governed_identity(&self) -> String {
        format!(
            "{}/{}, Resource={}",
            self.group, self.version, self.resource
        )
    }
}
