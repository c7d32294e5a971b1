//! # Request Module
//!
//! Canonicalization of classified Lambda envelopes into a single
//! [`CanonicalRequest`] model.
//!
//! Each format stores the same HTTP concepts differently:
//!
//! | Concept      | REST API (v1)                         | HTTP API (v2)                 | ALB                                  |
//! |--------------|---------------------------------------|-------------------------------|--------------------------------------|
//! | Method       | `httpMethod`                          | `requestContext.http.method`  | `httpMethod`                         |
//! | Path         | `path`                                | `rawPath`                     | `path`                               |
//! | Query        | single + multi-value maps             | `rawQueryString`              | single + multi-value maps            |
//! | Headers      | single + multi-value maps             | `headers` (+ `cookies`)       | single + multi-value maps            |
//! | Client IP    | `requestContext.identity.sourceIp`    | `requestContext.http.sourceIp`| first `X-Forwarded-For` address      |
//!
//! Paths are strictly percent-decoded; a bad escape is a
//! [`BridgeError::MalformedRequest`](crate::error::BridgeError::MalformedRequest).

mod canonical;
mod canonize;
mod escape;

pub use canonical::{Body, CanonicalRequest, InvocationContext};
pub use escape::{escape_path, unescape_path};
