use thiserror::Error;

/// Failure taxonomy for a single invocation.
///
/// None of these are ever raised to the invoking runtime. The [`Bridge`](crate::bridge::Bridge)
/// logs them and converts them into a least-common-denominator envelope with status 500 and
/// the error text as body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The payload carried none of the structural markers of a known envelope
    /// (or was not JSON at all).
    #[error("unsupported request type: {0}")]
    UnsupportedFormat(String),
    /// A field was present but could not be decoded (bad percent escape, invalid
    /// header name, wrong JSON shape for the detected format, ...).
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// The final envelope could not be serialized.
    #[error("failed to transcode response: {0}")]
    TranscodeFailure(String),
}

impl BridgeError {
    /// Short stable label used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::UnsupportedFormat(_) => "unsupported_format",
            BridgeError::MalformedRequest(_) => "malformed_request",
            BridgeError::TranscodeFailure(_) => "transcode_failure",
        }
    }
}
