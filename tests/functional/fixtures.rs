//! Test fixtures and builder patterns for AdmissionReview envelopes.

use policy_controller_webhook::config::{
    POLICY_CONTROLLER_GROUP, POLICY_CONTROLLER_INSTALL_NS, POLICY_CONTROLLER_KIND,
    POLICY_CONTROLLER_RESOURCE, POLICY_CONTROLLER_VERSION,
};
use serde_json::{Value, json};

/// Builder for AdmissionReview request envelopes.
///
/// Defaults describe a well-formed CREATE of a PolicyController in the
/// install namespace; every field the tests care about can be overridden.
#[derive(Clone, Debug)]
pub struct AdmissionReviewBuilder {
    uid: String,
    name: String,
    namespace: String,
    operation: String,
    group: String,
    version: String,
    resource: String,
    object_api_version: String,
    object_kind: String,
    wrapper_api_version: String,
    wrapper_kind: String,
    include_object: bool,
}

impl Default for AdmissionReviewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionReviewBuilder {
    pub fn new() -> Self {
        Self {
            uid: "705ab4f5-6393-11e8-b7cc-42010a800002".to_string(),
            name: "example".to_string(),
            namespace: POLICY_CONTROLLER_INSTALL_NS.to_string(),
            operation: "CREATE".to_string(),
            group: POLICY_CONTROLLER_GROUP.to_string(),
            version: POLICY_CONTROLLER_VERSION.to_string(),
            resource: POLICY_CONTROLLER_RESOURCE.to_string(),
            object_api_version: format!(
                "{}/{}",
                POLICY_CONTROLLER_GROUP, POLICY_CONTROLLER_VERSION
            ),
            object_kind: POLICY_CONTROLLER_KIND.to_string(),
            wrapper_api_version: "admission.k8s.io/v1".to_string(),
            wrapper_kind: "AdmissionReview".to_string(),
            include_object: true,
        }
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Override the request's resource identity (group/version/resource).
    pub fn resource(
        mut self,
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        self.group = group.into();
        self.version = version.into();
        self.resource = resource.into();
        self
    }

    /// Override the embedded object's type metadata.
    pub fn object_type(
        mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.object_api_version = api_version.into();
        self.object_kind = kind.into();
        self
    }

    /// Override the envelope wrapper's own type metadata.
    pub fn wrapper(
        mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        self.wrapper_api_version = api_version.into();
        self.wrapper_kind = kind.into();
        self
    }

    /// Drop the embedded object, as DELETE requests do.
    pub fn without_object(mut self) -> Self {
        self.include_object = false;
        self
    }

    pub fn build(self) -> Value {
        let mut request = json!({
            "uid": self.uid,
            "kind": {
                "group": self.group,
                "version": self.version,
                "kind": self.object_kind,
            },
            "resource": {
                "group": self.group,
                "version": self.version,
                "resource": self.resource,
            },
            "operation": self.operation,
            "name": self.name,
            "namespace": self.namespace,
            "userInfo": {"username": "kubernetes-admin"},
        });
        if self.include_object {
            request["object"] = json!({
                "apiVersion": self.object_api_version,
                "kind": self.object_kind,
                "metadata": {"name": self.name, "namespace": self.namespace},
                "spec": {},
            });
        }
        json!({
            "apiVersion": self.wrapper_api_version,
            "kind": self.wrapper_kind,
            "request": request,
        })
    }

    pub fn body(self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).unwrap()
    }
}
