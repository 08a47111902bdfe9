//! Typed validator hooks for framework-hosted admission.
//!
//! This is the second hosting shape: the surrounding admission framework has
//! already decoded the envelope and hands the hooks a decoded object. The
//! hooks route into the same namespace policy as the raw HTTP handler.
//!
//! An object whose type metadata does not identify a PolicyController is a
//! hosting misconfiguration, reported as [`UnexpectedTypeError`] rather than
//! a policy deny.

use kube::core::DynamicObject;
use thiserror::Error;

use super::policies::{self, Verdict};
use crate::config::GatewayConfig;

/// The decoded object is not the governed resource type.
#[derive(Debug, Error)]
#[error("expected a {expected} object, got {got}")]
pub struct UnexpectedTypeError {
    pub expected: String,
    pub got: String,
}

/// Validator for PolicyController admission, dispatched per operation.
#[derive(Clone, Debug)]
pub struct PolicyControllerValidator {
    config: GatewayConfig,
}

impl PolicyControllerValidator {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Hook for CREATE operations.
    pub fn validate_create(&self, obj: &DynamicObject) -> Result<Verdict, UnexpectedTypeError> {
        self.validate(obj)
    }

    /// Hook for UPDATE operations. Only the incoming object is validated.
    pub fn validate_update(
        &self,
        _old: Option<&DynamicObject>,
        new: &DynamicObject,
    ) -> Result<Verdict, UnexpectedTypeError> {
        self.validate(new)
    }

    /// Hook for DELETE operations. Deletes are always allowed so a
    /// misplaced object stays deletable.
    pub fn validate_delete(&self) -> Result<Verdict, UnexpectedTypeError> {
        Ok(Verdict::Allow)
    }

    fn validate(&self, obj: &DynamicObject) -> Result<Verdict, UnexpectedTypeError> {
        self.check_type(obj)?;
        Ok(policies::namespace::evaluate(
            &self.config.kind,
            &self.config.install_namespace,
            obj.metadata.namespace.as_deref(),
        ))
    }

    fn check_type(&self, obj: &DynamicObject) -> Result<(), UnexpectedTypeError> {
        let expected_api_version = format!("{}/{}", self.config.group, self.config.version);
        match &obj.types {
            Some(types)
                if types.api_version == expected_api_version && types.kind == self.config.kind =>
            {
                Ok(())
            }
            Some(types) => Err(self.unexpected(format!("{} {}", types.api_version, types.kind))),
            None => Err(self.unexpected("an object without type metadata".to_string())),
        }
    }

    fn unexpected(&self, got: String) -> UnexpectedTypeError {
        UnexpectedTypeError {
            expected: format!(
                "{}/{} {}",
                self.config.group, self.config.version, self.config.kind
            ),
            got,
        }
    }
}
