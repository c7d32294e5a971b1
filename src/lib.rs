//! # httpbridge
//!
//! **httpbridge** runs request handlers written against a plain synchronous HTTP
//! abstraction behind AWS Lambda's HTTP front ends, without the handler knowing which
//! one invoked it.
//!
//! ## Overview
//!
//! Lambda delivers HTTP traffic in three different, untagged JSON envelopes:
//!
//! - API Gateway REST API proxy events (payload format 1.0)
//! - API Gateway HTTP API events (payload format 2.0)
//! - Application Load Balancer target-group events
//!
//! Each expects a reply in its own envelope shape. The bridge classifies the payload,
//! canonicalizes it into one request model, runs the handler against an in-memory
//! response writer, and transcodes the captured response back into the matching
//! envelope.
//!
//! ## Architecture
//!
//! - **[`envelope`]** - Format detection and inbound wire types
//! - **[`request`]** - Canonicalization into [`CanonicalRequest`]
//! - **[`response`]** - The [`ResponseWriter`] seam and [`CaptureBuffer`]
//! - **[`transcode`]** - Outbound envelopes and per-format header/cookie/body rules
//! - **[`bridge`]** - The invocation orchestrator
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Runtime as Lambda runtime
//!     participant Bridge
//!     participant Classifier as envelope::classify
//!     participant Canon as LambdaRequest::canonicalize
//!     participant Handler
//!     participant Buffer as CaptureBuffer
//!     participant Transcoder as ResponseEnvelope
//!
//!     Runtime->>Bridge: invoke(payload)
//!     Bridge->>Classifier: classify(payload)
//!     alt no known markers
//!         Classifier-->>Bridge: UnsupportedFormat
//!         Bridge-->>Runtime: {"statusCode":500,...}
//!     end
//!     Classifier-->>Bridge: LambdaRequest + prepared envelope
//!     Bridge->>Canon: canonicalize(ctx)
//!     Canon-->>Bridge: CanonicalRequest
//!     Bridge->>Handler: serve(req, &mut buffer)
//!     Handler->>Buffer: headers_mut / write_status / write
//!     Bridge->>Transcoder: transcode_from(&buffer)
//!     Transcoder-->>Bridge: format-specific envelope
//!     Bridge-->>Runtime: JSON reply
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use httpbridge::{Bridge, CanonicalRequest, ResponseWriter};
//! use http::header::{HeaderValue, CONTENT_TYPE};
//! use http::StatusCode;
//!
//! fn hello(req: CanonicalRequest, w: &mut dyn ResponseWriter) {
//!     w.headers_mut()
//!         .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
//!     w.write_status(StatusCode::OK);
//!     w.write(format!(r#"{{"path":"{}"}}"#, req.path).as_bytes());
//! }
//!
//! let bridge = Bridge::new(hello);
//! let reply = bridge.invoke(br#"{
//!     "httpMethod": "GET",
//!     "path": "/hello",
//!     "requestContext": {"accountId": "123456789012", "identity": {"sourceIp": "192.0.2.1"}}
//! }"#);
//! let reply: serde_json::Value = serde_json::from_slice(&reply).unwrap();
//! assert_eq!(reply["statusCode"], 200);
//! assert_eq!(reply["headers"]["Content-Type"], "application/json");
//! ```
//!
//! ## Runtime Considerations
//!
//! The bridge is fully synchronous: one invocation, one thread, one buffer. Wiring
//! [`Bridge::invoke`] into a Lambda runtime loop is left to the caller.
//!
//! ## Configuration
//!
//! - `HTTPBRIDGE_LOG_PAYLOADS`, `HTTPBRIDGE_MAX_LOGGED_BODY` - see [`runtime_config`]
//! - `HTTPBRIDGE_LOG_LEVEL`, `HTTPBRIDGE_LOG_FORMAT`, `HTTPBRIDGE_LOG_TARGET_FILTER`,
//!   `HTTPBRIDGE_LOG_INCLUDE_LOCATION` - see [`otel`]

pub mod bridge;
pub mod cli;
pub mod echo;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod ids;
pub mod otel;
pub mod request;
pub mod response;
pub mod runtime_config;
pub mod transcode;

pub use bridge::Bridge;
pub use envelope::{classify, classify_value, decode_as, Format, LambdaRequest};
pub use error::BridgeError;
pub use handler::Handler;
pub use request::{Body, CanonicalRequest, InvocationContext};
pub use response::{CaptureBuffer, ResponseWriter};
pub use transcode::ResponseEnvelope;
