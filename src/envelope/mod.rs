//! # Envelope Module
//!
//! Classifies an untagged Lambda payload into one of the known HTTP event envelopes.
//!
//! ## Detection
//!
//! The three formats carry no explicit type tag, and their markers are not mutually
//! exclusive (HTTP API 2.0 events also carry an `accountId`). Detection is an ordered
//! table of predicates; the first match wins:
//!
//! | Priority | Marker                                    | Format                    |
//! |----------|-------------------------------------------|---------------------------|
//! | 1        | non-empty `requestContext.elb.targetGroupArn` | [`Format::LoadBalancer`] |
//! | 2        | `version == "2.0"`                        | [`Format::GatewayV2`]     |
//! | 3        | non-empty `requestContext.accountId`      | [`Format::GatewayV1`]     |
//!
//! Anything else is [`BridgeError::UnsupportedFormat`].
//!
//! ## Usage
//!
//! ```rust
//! use httpbridge::envelope::{classify, Format};
//!
//! let payload = br#"{"version":"2.0","rawPath":"/","requestContext":{"http":{"method":"GET"}}}"#;
//! let classified = classify(payload).unwrap();
//! assert_eq!(classified.format(), Format::GatewayV2);
//! ```

pub mod events;

use crate::error::BridgeError;
use crate::transcode::ResponseEnvelope;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub use events::{GatewayV1Request, GatewayV2Request, LoadBalancerRequest};

/// The envelope format of an invocation, fixed once at classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// API Gateway REST API proxy event (payload format 1.0)
    GatewayV1,
    /// API Gateway HTTP API event (payload format 2.0)
    GatewayV2,
    /// Application Load Balancer target-group event
    LoadBalancer,
}

impl Format {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::GatewayV1 => "apigateway_v1",
            Format::GatewayV2 => "apigateway_v2",
            Format::LoadBalancer => "alb",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified inbound event, one variant per format.
#[derive(Debug, Clone)]
pub enum LambdaRequest {
    GatewayV1(GatewayV1Request),
    GatewayV2(GatewayV2Request),
    LoadBalancer(LoadBalancerRequest),
}

impl LambdaRequest {
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            LambdaRequest::GatewayV1(_) => Format::GatewayV1,
            LambdaRequest::GatewayV2(_) => Format::GatewayV2,
            LambdaRequest::LoadBalancer(_) => Format::LoadBalancer,
        }
    }

    /// Empty response envelope matching this request's format.
    ///
    /// Prepared at classification time so the transcoder always has a target shape,
    /// even when the handler fails to produce anything.
    #[must_use]
    pub fn prepared_response(&self) -> ResponseEnvelope {
        ResponseEnvelope::empty_for(Some(self.format()))
    }
}

type Marker = fn(&Value) -> bool;

/// Detection order. Evaluated top to bottom; the first matching marker decides.
const DETECTION_ORDER: [(Marker, Format); 3] = [
    (has_target_group_arn, Format::LoadBalancer),
    (is_version_2, Format::GatewayV2),
    (has_account_id, Format::GatewayV1),
];

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

fn has_target_group_arn(payload: &Value) -> bool {
    non_empty_str(payload.pointer("/requestContext/elb/targetGroupArn"))
}

fn is_version_2(payload: &Value) -> bool {
    payload.get("version").and_then(Value::as_str) == Some("2.0")
}

fn has_account_id(payload: &Value) -> bool {
    non_empty_str(payload.pointer("/requestContext/accountId"))
}

/// Detect the envelope format of a parsed payload without deserializing it.
#[must_use]
pub fn detect_format(payload: &Value) -> Option<Format> {
    DETECTION_ORDER
        .iter()
        .find(|(marker, _)| marker(payload))
        .map(|(_, format)| *format)
}

fn decode<T: DeserializeOwned>(payload: Value, format: Format) -> Result<T, BridgeError> {
    serde_json::from_value(payload).map_err(|e| {
        BridgeError::MalformedRequest(format!("failed to decode {format} request: {e}"))
    })
}

/// Classify an already-parsed payload.
pub fn classify_value(payload: Value) -> Result<LambdaRequest, BridgeError> {
    let format = detect_format(&payload).ok_or_else(|| {
        BridgeError::UnsupportedFormat(
            "payload matches no known Lambda HTTP event envelope".to_string(),
        )
    })?;
    decode_value_as(format, payload)
}

/// Decode an already-parsed payload as `format`, skipping detection.
pub fn decode_value_as(format: Format, payload: Value) -> Result<LambdaRequest, BridgeError> {
    let request = match format {
        Format::LoadBalancer => LambdaRequest::LoadBalancer(decode(payload, format)?),
        Format::GatewayV2 => LambdaRequest::GatewayV2(decode(payload, format)?),
        Format::GatewayV1 => LambdaRequest::GatewayV1(decode(payload, format)?),
    };
    Ok(request)
}

/// Decode raw JSON bytes as `format`, skipping detection.
///
/// For deployments wired to a single front end. Bytes that are not JSON are a
/// [`BridgeError::MalformedRequest`], since the format is already known.
pub fn decode_as(format: Format, payload: &[u8]) -> Result<LambdaRequest, BridgeError> {
    let value: Value = serde_json::from_slice(payload).map_err(|e| {
        BridgeError::MalformedRequest(format!("failed to decode {format} request: {e}"))
    })?;
    decode_value_as(format, value)
}

/// Classify raw JSON bytes.
///
/// Bytes that are not JSON at all are reported as [`BridgeError::UnsupportedFormat`].
pub fn classify(payload: &[u8]) -> Result<LambdaRequest, BridgeError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| BridgeError::UnsupportedFormat(format!("payload is not JSON: {e}")))?;
    classify_value(value)
}
