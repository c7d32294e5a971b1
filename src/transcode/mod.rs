//! # Transcode Module
//!
//! Converts a populated [`CaptureBuffer`] into the reply envelope matching the
//! invocation's [`Format`], or into the least-common-denominator (LCD) shape when no
//! format is known.
//!
//! ## Per-format rules
//!
//! | Format        | Single-value headers | Multi-value headers          | `Set-Cookie`         | Extra                |
//! |---------------|----------------------|------------------------------|----------------------|----------------------|
//! | REST API (v1) | `headers`            | `multiValueHeaders`          | as any header        |                      |
//! | HTTP API (v2) | `headers`            | comma-joined into `headers`  | `cookies` array      |                      |
//! | ALB           | `headers`            | `multiValueHeaders`          | as any header        | `statusDescription`  |
//! | LCD           | dropped              | dropped                      | dropped              |                      |
//!
//! A key with exactly one value goes to `headers`, more than one to
//! `multiValueHeaders`, never both.
//!
//! ## Binary bodies
//!
//! The body is base64-encoded (and `isBase64Encoded` set) only when `Content-Type` is
//! exactly `application/octet-stream`. Other binary types such as `image/png` are
//! emitted as (lossy UTF-8) text. This is deliberately narrow and kept for wire
//! compatibility with existing deployments.

mod envelopes;

use crate::envelope::Format;
use crate::error::BridgeError;
use crate::response::CaptureBuffer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::SET_COOKIE;
use http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

pub use envelopes::{
    GatewayV1Response, GatewayV2Response, LeastCommonDenominatorResponse, LoadBalancerResponse,
};

pub const MIME_APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Outbound envelope, serialized as the inner shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    GatewayV1(GatewayV1Response),
    GatewayV2(GatewayV2Response),
    LoadBalancer(LoadBalancerResponse),
    LeastCommonDenominator(LeastCommonDenominatorResponse),
}

/// Canonical MIME form of a header name: `x-request-id` → `X-Request-Id`.
#[must_use]
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Header values grouped by canonical key, ordered by key.
fn grouped_headers(buf: &CaptureBuffer) -> BTreeMap<String, Vec<String>> {
    let mut grouped = BTreeMap::new();
    for name in buf.headers().keys() {
        let values: Vec<String> = buf
            .headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        grouped.insert(canonical_header_key(name.as_str()), values);
    }
    grouped
}

/// Split grouped headers into single- and multi-value maps.
fn split_headers(
    grouped: BTreeMap<String, Vec<String>>,
) -> (BTreeMap<String, String>, BTreeMap<String, Vec<String>>) {
    let mut single = BTreeMap::new();
    let mut multi = BTreeMap::new();
    for (key, mut values) in grouped {
        match values.len() {
            0 => {}
            1 => {
                single.insert(key, values.remove(0));
            }
            _ => {
                multi.insert(key, values);
            }
        }
    }
    (single, multi)
}

/// Body text and base64 flag under the octet-stream rule.
fn encode_body(buf: &CaptureBuffer) -> (String, bool) {
    if buf.content_type() == Some(MIME_APPLICATION_OCTET_STREAM) {
        (STANDARD.encode(buf.body()), true)
    } else {
        (String::from_utf8_lossy(buf.body()).into_owned(), false)
    }
}

/// `"<code> <reason>"`, or just the code when it has no canonical reason.
fn status_description(code: u16) -> String {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| code.to_string(), |reason| format!("{code} {reason}"))
}

impl ResponseEnvelope {
    /// Empty envelope of the shape expected for `format`; LCD when unknown.
    #[must_use]
    pub fn empty_for(format: Option<Format>) -> Self {
        match format {
            Some(Format::GatewayV1) => ResponseEnvelope::GatewayV1(GatewayV1Response::default()),
            Some(Format::GatewayV2) => ResponseEnvelope::GatewayV2(GatewayV2Response::default()),
            Some(Format::LoadBalancer) => {
                ResponseEnvelope::LoadBalancer(LoadBalancerResponse::default())
            }
            None => ResponseEnvelope::LeastCommonDenominator(
                LeastCommonDenominatorResponse::default(),
            ),
        }
    }

    /// LCD error reply carrying `message` as a text body.
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::error_for(None, status, message)
    }

    /// Error reply in the shape of `format`, LCD when unknown.
    ///
    /// Maps and arrays stay empty; only status and text body are set.
    #[must_use]
    pub fn error_for(format: Option<Format>, status: StatusCode, message: impl Into<String>) -> Self {
        let status_code = status.as_u16();
        let body = message.into();
        match Self::empty_for(format) {
            ResponseEnvelope::GatewayV1(r) => ResponseEnvelope::GatewayV1(GatewayV1Response {
                status_code,
                body,
                ..r
            }),
            ResponseEnvelope::GatewayV2(r) => ResponseEnvelope::GatewayV2(GatewayV2Response {
                status_code,
                body,
                ..r
            }),
            ResponseEnvelope::LoadBalancer(r) => {
                ResponseEnvelope::LoadBalancer(LoadBalancerResponse {
                    status_code,
                    status_description: status_description(status_code),
                    body,
                    ..r
                })
            }
            ResponseEnvelope::LeastCommonDenominator(r) => {
                ResponseEnvelope::LeastCommonDenominator(LeastCommonDenominatorResponse {
                    status_code,
                    body,
                    ..r
                })
            }
        }
    }

    /// Format of this envelope, `None` for LCD.
    #[must_use]
    pub fn format(&self) -> Option<Format> {
        match self {
            ResponseEnvelope::GatewayV1(_) => Some(Format::GatewayV1),
            ResponseEnvelope::GatewayV2(_) => Some(Format::GatewayV2),
            ResponseEnvelope::LoadBalancer(_) => Some(Format::LoadBalancer),
            ResponseEnvelope::LeastCommonDenominator(_) => None,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseEnvelope::GatewayV1(r) => r.status_code,
            ResponseEnvelope::GatewayV2(r) => r.status_code,
            ResponseEnvelope::LoadBalancer(r) => r.status_code,
            ResponseEnvelope::LeastCommonDenominator(r) => r.status_code,
        }
    }

    #[must_use]
    pub fn is_base64_encoded(&self) -> bool {
        match self {
            ResponseEnvelope::GatewayV1(r) => r.is_base64_encoded,
            ResponseEnvelope::GatewayV2(r) => r.is_base64_encoded,
            ResponseEnvelope::LoadBalancer(r) => r.is_base64_encoded,
            ResponseEnvelope::LeastCommonDenominator(r) => r.is_base64_encoded,
        }
    }

    /// Populate this (prepared) envelope from the captured response.
    #[must_use]
    pub fn transcode_from(self, buf: &CaptureBuffer) -> Self {
        let status_code = buf.status_code();
        let (body, is_base64_encoded) = encode_body(buf);

        match self {
            ResponseEnvelope::GatewayV1(_) => {
                let (headers, multi_value_headers) = split_headers(grouped_headers(buf));
                ResponseEnvelope::GatewayV1(GatewayV1Response {
                    status_code,
                    headers,
                    multi_value_headers,
                    body,
                    is_base64_encoded,
                })
            }
            ResponseEnvelope::LoadBalancer(_) => {
                let (headers, multi_value_headers) = split_headers(grouped_headers(buf));
                ResponseEnvelope::LoadBalancer(LoadBalancerResponse {
                    status_code,
                    status_description: status_description(status_code),
                    headers,
                    multi_value_headers,
                    body,
                    is_base64_encoded,
                })
            }
            ResponseEnvelope::GatewayV2(_) => {
                let set_cookie = canonical_header_key(SET_COOKIE.as_str());
                let mut grouped = grouped_headers(buf);
                let cookies = grouped.remove(&set_cookie).unwrap_or_default();
                let headers = grouped
                    .into_iter()
                    .map(|(k, v)| (k, v.join(",")))
                    .collect();
                ResponseEnvelope::GatewayV2(GatewayV2Response {
                    status_code,
                    headers,
                    cookies,
                    body,
                    is_base64_encoded,
                })
            }
            ResponseEnvelope::LeastCommonDenominator(_) => {
                ResponseEnvelope::LeastCommonDenominator(LeastCommonDenominatorResponse {
                    status_code,
                    body,
                    is_base64_encoded,
                })
            }
        }
    }

    /// Serialize to the JSON reply bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, BridgeError> {
        serde_json::to_vec(self).map_err(|e| {
            BridgeError::TranscodeFailure(format!("failed to marshal response to JSON: {e}"))
        })
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, BridgeError> {
        serde_json::to_value(self).map_err(|e| {
            BridgeError::TranscodeFailure(format!("failed to marshal response to JSON: {e}"))
        })
    }
}
