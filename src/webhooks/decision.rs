//! Decision correlation.
//!
//! The single place a [`Verdict`] becomes a wire [`AdmissionResponse`]: the
//! correlation UID and the echoed envelope typing are copied from the
//! original request, and `allowed` is written here and nowhere else. New
//! policies therefore cannot bypass correlation.

use kube::Resource;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};

use super::policies::Verdict;

/// Bind a verdict to the request it answers.
pub fn correlate<T: Resource>(request: &AdmissionRequest<T>, verdict: Verdict) -> AdmissionResponse {
    // AdmissionResponse::from copies the request UID and envelope TypeMeta.
    let response = AdmissionResponse::from(request);
    match verdict {
        Verdict::Allow => response,
        Verdict::Deny(reason) => response.deny(reason),
    }
}
