//! AdmissionReview envelope codec.
//!
//! Translates between raw request bytes and the in-memory admission types.
//! The codec is constructed once at startup with the wrapper type it
//! recognizes and is held by the transport handler; there is no process-wide
//! type registry.

use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::{DynamicObject, TypeMeta};
use thiserror::Error;

/// Envelope apiVersion this gateway speaks
const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";
/// Envelope kind this gateway speaks
const ADMISSION_KIND: &str = "AdmissionReview";

/// Why a request body could not be turned into an [`AdmissionRequest`].
///
/// Every variant is a transport-level failure (HTTP 4xx); none of them ever
/// produce an allow/deny decision.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not a well-formed envelope
    #[error("cannot decode AdmissionReview: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body parsed, but the wrapper identifies a type this gateway
    /// does not recognize
    #[error(
        "unexpected envelope type {api_version}/{kind}, expected {expected_api_version}/{expected_kind}"
    )]
    WrongEnvelopeType {
        api_version: String,
        kind: String,
        expected_api_version: String,
        expected_kind: String,
    },

    /// A recognized envelope that carries no request half
    #[error("AdmissionReview contains no request")]
    MissingRequest,
}

/// Codec for the `admission.k8s.io/v1` `AdmissionReview` wrapper.
///
/// The recognized wrapper type is carried as data so the transport handler
/// owns it explicitly instead of consulting an ambient registry.
#[derive(Clone, Debug)]
pub struct EnvelopeCodec {
    expected: TypeMeta,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self {
            expected: TypeMeta {
                api_version: ADMISSION_API_VERSION.to_string(),
                kind: ADMISSION_KIND.to_string(),
            },
        }
    }

    /// Decode one request envelope.
    ///
    /// The wrapper's own apiVersion/kind travel with the returned request
    /// (`request.types`) so the response envelope echoes them unchanged.
    pub fn decode(&self, body: &[u8]) -> Result<AdmissionRequest<DynamicObject>, DecodeError> {
        let review: AdmissionReview<DynamicObject> = serde_json::from_slice(body)?;

        if review.types.kind != self.expected.kind
            || review.types.api_version != self.expected.api_version
        {
            return Err(DecodeError::WrongEnvelopeType {
                api_version: review.types.api_version,
                kind: review.types.kind,
                expected_api_version: self.expected.api_version.clone(),
                expected_kind: self.expected.kind.clone(),
            });
        }

        review.try_into().map_err(|_| DecodeError::MissingRequest)
    }

    /// Encode one response envelope.
    ///
    /// A serialization failure here is an internal bug, not a policy
    /// decision; the transport layer logs it and answers 5xx.
    pub fn encode(&self, response: AdmissionResponse) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&response.into_review())
    }
}
