//! Normalization of NIC verification results.
//!
//! Whatever the NIC verification call produced (a service response, a
//! structured service failure, or a bare transport failure) is collapsed into
//! one [`VerificationOutcome`] whose `data` always carries a success flag, a
//! message and, on failure, non-empty user guidance.
//!
//! Branches, in priority order:
//! 1. the service answered: its envelope is authoritative and copied through;
//! 2. the request failed but carried a service envelope: classified as
//!    `SYSTEM_ERROR`, service guidance kept, gaps filled with fixed fallbacks;
//! 3. the request failed with no envelope: fixed network-failure outcome.
//!
//! Normalization is pure: the same input always yields the same outcome.

use idv_types::{RawServiceResponse, TransportFailure, VerificationDetail, VerificationOutcome};
use serde_json::Value;

/// Error class assigned to every failed NIC verification.
pub const SYSTEM_ERROR: &str = "SYSTEM_ERROR";

pub const NIC_VERIFICATION_FAILED: &str = "NIC verification failed";
pub const NETWORK_ERROR: &str = "Network error occurred";

pub const TECHNICAL_ISSUE_USER_MESSAGE: &str =
    "We encountered a technical issue while processing your verification.";
pub const CONNECTION_USER_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection and try again.";

/// Guidance when the service failed without suggesting anything itself.
pub const SERVICE_FAILURE_SUGGESTIONS: [&str; 4] = [
    "Check your internet connection",
    "Ensure the image file is not corrupted",
    "Try a different image format (JPG or PNG)",
    "Contact support if the problem persists",
];

/// Guidance when the service could not be reached at all.
pub const NETWORK_FAILURE_SUGGESTIONS: [&str; 3] = [
    "Check your internet connection",
    "Try again in a few moments",
    "Contact support if the problem persists",
];

// Fields a structured failure's payload may not override.
const PINNED_ON_FAILURE: [&str; 3] = ["success", "message", "error"];

/// Key under which a non-object `data` payload is kept.
const SCALAR_PAYLOAD_KEY: &str = "data";

/// Collapse the result of a NIC verification call into a canonical outcome.
pub fn normalize_nic_verification(
    result: Result<RawServiceResponse, TransportFailure>,
) -> VerificationOutcome {
    match result {
        Ok(response) => from_service_response(response),
        Err(TransportFailure {
            body: Some(body),
            diagnostic,
            ..
        }) => from_structured_failure(body, &diagnostic),
        Err(failure) => from_transport_failure(&failure),
    }
}

fn from_service_response(response: RawServiceResponse) -> VerificationOutcome {
    tracing::debug!(success = response.success, "normalizing service response");

    let message = response.message.unwrap_or_default();
    let mut data = VerificationDetail::new(response.success, message.clone());
    if let Some(payload) = response.data {
        merge_payload(&mut data, payload, Merge::Verbatim);
    }

    VerificationOutcome {
        success: response.success,
        message,
        data,
    }
}

fn from_structured_failure(body: RawServiceResponse, diagnostic: &str) -> VerificationOutcome {
    tracing::debug!(diagnostic, "normalizing structured service failure");

    let message = non_blank(body.message.as_deref())
        .unwrap_or(NIC_VERIFICATION_FAILED)
        .to_string();

    let mut data = VerificationDetail::new(false, message.clone());
    data.error = Some(SYSTEM_ERROR.to_string());
    if let Some(payload) = body.data {
        merge_payload(&mut data, payload, Merge::Coerced(&PINNED_ON_FAILURE));
    }

    if non_blank(Some(data.user_message.as_str())).is_none() {
        data.user_message = TECHNICAL_ISSUE_USER_MESSAGE.to_string();
    }
    if data.suggestions.is_empty() {
        data.suggestions = owned(&SERVICE_FAILURE_SUGGESTIONS);
    }
    if non_blank(data.technical_error.as_deref()).is_none() {
        data.technical_error = Some(diagnostic.to_string());
    }

    VerificationOutcome {
        success: false,
        message,
        data,
    }
}

fn from_transport_failure(failure: &TransportFailure) -> VerificationOutcome {
    tracing::debug!(kind = ?failure.kind, "normalizing transport failure");

    let data = VerificationDetail {
        error: Some(SYSTEM_ERROR.to_string()),
        user_message: CONNECTION_USER_MESSAGE.to_string(),
        suggestions: owned(&NETWORK_FAILURE_SUGGESTIONS),
        technical_error: Some(failure.diagnostic.clone()),
        ..VerificationDetail::new(false, NETWORK_ERROR)
    };

    VerificationOutcome {
        success: false,
        message: NETWORK_ERROR.to_string(),
        data,
    }
}

#[derive(Clone, Copy)]
enum Merge<'a> {
    /// Fields kept exactly as the service sent them.
    Verbatim,
    /// Fields coerced into the typed slots; the listed keys are skipped.
    Coerced(&'a [&'a str]),
}

/// Merge every field of a service payload into `detail`.
fn merge_payload(detail: &mut VerificationDetail, payload: Value, merge: Merge<'_>) {
    match payload {
        Value::Object(fields) => {
            for (key, value) in fields {
                match merge {
                    Merge::Verbatim => detail.insert_verbatim(&key, value),
                    Merge::Coerced(pinned) if pinned.contains(&key.as_str()) => {}
                    Merge::Coerced(_) => {
                        if !detail.insert(&key, value) {
                            tracing::warn!(field = %key, "ignoring mistyped service field");
                        }
                    }
                }
            }
        }
        Value::Null => {}
        scalar => {
            detail.extra.insert(SCALAR_PAYLOAD_KEY.to_string(), scalar);
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
