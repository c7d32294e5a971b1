//! # Bridge Module
//!
//! The invocation orchestrator: one raw Lambda payload in, one JSON reply out.
//!
//! ```text
//! Received ─▶ Classified ─▶ Canonicalized ─▶ Invoked ─▶ Captured ─▶ Transcoded ─▶ Serialized
//!                 │               │                                     │
//!                 └───────────────┴──────────── error ──────────────────┴─▶ LCD 500 envelope
//! ```
//!
//! Every failure is terminal for the invocation and is returned as an ordinary reply
//! (`{"statusCode":500,"body":"<error>","isBase64Encoded":false}`), never raised: a
//! raised error would make the platform retry or dead-letter the event, which does not
//! help with a payload-shape mismatch.
//!
//! Functions wired to a single front end can use [`Bridge::invoke_as`]: detection is
//! skipped, and the 500 reply uses that front end's envelope with empty header maps.
//!
//! ## Usage
//!
//! ```rust
//! use httpbridge::{Bridge, CanonicalRequest, ResponseWriter};
//! use httpbridge::runtime_config::BridgeConfig;
//!
//! let bridge = Bridge::with_config(
//!     |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
//!         w.write(b"hello");
//!     },
//!     BridgeConfig::default(),
//! );
//! let reply = bridge.invoke(br#"{"version":"2.0","rawPath":"/","requestContext":{"http":{"method":"GET"}}}"#);
//! let reply: serde_json::Value = serde_json::from_slice(&reply).unwrap();
//! assert_eq!(reply["body"], "hello");
//! ```

use crate::envelope::{classify, classify_value, decode_as, Format, LambdaRequest};
use crate::error::BridgeError;
use crate::handler::Handler;
use crate::request::InvocationContext;
use crate::response::{CaptureBuffer, ResponseWriter};
use crate::runtime_config::BridgeConfig;
use crate::transcode::ResponseEnvelope;
use http::StatusCode;
use serde_json::Value;
use tracing::{debug, error, field, info, info_span, Span};

/// Reply used if even the error envelope cannot be serialized.
const LAST_RESORT_REPLY: &[u8] =
    br#"{"statusCode":500,"body":"failed to serialize error response","isBase64Encoded":false}"#;

/// Runs a [`Handler`] behind any supported Lambda HTTP envelope.
///
/// Holds no per-invocation state; a single `Bridge` can serve any number of
/// sequential or concurrent invocations.
pub struct Bridge<H> {
    handler: H,
    config: BridgeConfig,
}

fn invocation_span(ctx: &InvocationContext) -> Span {
    info_span!(
        "invocation",
        invocation_id = %ctx.invocation_id,
        format = field::Empty,
        status = field::Empty
    )
}

impl<H: Handler> Bridge<H> {
    /// Create a bridge configured from the environment.
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, BridgeConfig::from_env())
    }

    pub fn with_config(handler: H, config: BridgeConfig) -> Self {
        Self { handler, config }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle one raw payload with a fresh invocation context.
    #[must_use]
    pub fn invoke(&self, payload: &[u8]) -> Vec<u8> {
        self.invoke_with_context(payload, InvocationContext::new())
    }

    /// Handle one raw payload, passing `ctx` through to the handler.
    #[must_use]
    pub fn invoke_with_context(&self, payload: &[u8], ctx: InvocationContext) -> Vec<u8> {
        self.invoke_bytes(payload, ctx, None)
    }

    /// Handle one raw payload known to be in `format`.
    ///
    /// Detection is skipped, and failures are answered in `format`'s own envelope
    /// rather than the least-common-denominator shape.
    #[must_use]
    pub fn invoke_as(&self, format: Format, payload: &[u8]) -> Vec<u8> {
        self.invoke_as_with_context(format, payload, InvocationContext::new())
    }

    #[must_use]
    pub fn invoke_as_with_context(
        &self,
        format: Format,
        payload: &[u8],
        ctx: InvocationContext,
    ) -> Vec<u8> {
        self.invoke_bytes(payload, ctx, Some(format))
    }

    /// Handle a payload the runtime already parsed into JSON.
    #[must_use]
    pub fn invoke_value(&self, payload: Value) -> Value {
        let ctx = InvocationContext::new();
        let span = invocation_span(&ctx);
        let _guard = span.enter();

        if self.config.log_payloads {
            self.log_received(&serde_json::to_vec(&payload).unwrap_or_default());
        }

        let envelope = self.run(classify_value(payload), ctx, None);
        span.record("status", envelope.status_code());
        let reply = envelope.to_value().unwrap_or_else(|err| {
            let reply = self.serialize_error(&err, None);
            serde_json::from_slice(&reply).unwrap_or(Value::Null)
        });

        if self.config.log_payloads {
            self.log_reply(&serde_json::to_vec(&reply).unwrap_or_default());
        }
        reply
    }

    fn invoke_bytes(
        &self,
        payload: &[u8],
        ctx: InvocationContext,
        fixed: Option<Format>,
    ) -> Vec<u8> {
        let span = invocation_span(&ctx);
        let _guard = span.enter();

        if self.config.log_payloads {
            self.log_received(payload);
        }

        let classified = match fixed {
            Some(format) => decode_as(format, payload),
            None => classify(payload),
        };
        let envelope = self.run(classified, ctx, fixed);
        let reply = envelope
            .to_vec()
            .unwrap_or_else(|err| self.serialize_error(&err, fixed));
        span.record("status", envelope.status_code());

        if self.config.log_payloads {
            self.log_reply(&reply);
        }
        reply
    }

    fn log_received(&self, payload: &[u8]) {
        debug!(payload = %self.config.preview(payload), "Received request payload");
    }

    fn log_reply(&self, reply: &[u8]) {
        debug!(reply = %self.config.preview(reply), "Serialized reply");
    }

    /// Classified → Canonicalized → Invoked → Captured → Transcoded.
    ///
    /// Failures are answered in `fixed`'s envelope when the format was given up
    /// front, otherwise in the LCD shape.
    fn run(
        &self,
        classified: Result<LambdaRequest, BridgeError>,
        ctx: InvocationContext,
        fixed: Option<Format>,
    ) -> ResponseEnvelope {
        if let Some(format) = fixed {
            Span::current().record("format", format.as_str());
        }
        let request = match classified {
            Ok(request) => request,
            Err(err) => {
                let stage = match fixed {
                    Some(_) => "failed to decode request",
                    None => "failed to demux ambiguous request",
                };
                return failure(stage, &err, fixed);
            }
        };
        let format = request.format();
        Span::current().record("format", format.as_str());
        let prepared = request.prepared_response();

        let canonical = match request.canonicalize(ctx) {
            Ok(canonical) => canonical,
            Err(err) => return failure("failed to canonize request", &err, fixed),
        };

        info!(
            method = %canonical.method,
            path = %canonical.path,
            host = canonical.host().unwrap_or(""),
            remote_addr = %canonical.remote_addr,
            "Invoking handler"
        );

        let mut buffer = CaptureBuffer::new();
        self.handler.serve(canonical, &mut buffer);
        // A handler that returned without writing anything still answered 200.
        buffer.flush();

        let envelope = prepared.transcode_from(&buffer);
        info!(
            status = buffer.status_code(),
            content_type = buffer.content_type().unwrap_or(""),
            body_len = buffer.body().len(),
            base64 = envelope.is_base64_encoded(),
            "Wrote response in memory"
        );
        envelope
    }

    fn serialize_error(&self, err: &BridgeError, fixed: Option<Format>) -> Vec<u8> {
        failure("failed to transcode response", err, fixed)
            .to_vec()
            .unwrap_or_else(|_| LAST_RESORT_REPLY.to_vec())
    }
}

fn failure(stage: &str, err: &BridgeError, fixed: Option<Format>) -> ResponseEnvelope {
    error!(error = %err, kind = err.kind(), "{}", stage);
    ResponseEnvelope::error_for(fixed, StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CanonicalRequest;
    use serde_json::json;

    fn bridge() -> Bridge<impl Handler> {
        Bridge::with_config(
            |req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                w.write(req.path.as_bytes());
            },
            BridgeConfig::default(),
        )
    }

    #[test]
    fn test_unsupported_format_is_lcd_500() {
        let reply: Value = serde_json::from_slice(&bridge().invoke(b"{}")).unwrap();
        assert_eq!(reply["statusCode"], json!(500));
        assert_eq!(reply["isBase64Encoded"], json!(false));
        assert!(reply["body"]
            .as_str()
            .unwrap()
            .starts_with("unsupported request type"));
        assert!(reply.get("headers").is_none());
    }

    #[test]
    fn test_invoke_value_round_trip() {
        let reply = bridge().invoke_value(json!({
            "version": "2.0",
            "rawPath": "/hello",
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert_eq!(reply["statusCode"], json!(200));
        assert_eq!(reply["body"], json!("/hello"));
        assert_eq!(reply["cookies"], json!([]));
    }

    #[test]
    fn test_silent_handler_yields_200() {
        let bridge = Bridge::with_config(
            |_req: CanonicalRequest, _w: &mut dyn ResponseWriter| {},
            BridgeConfig::default(),
        );
        let reply = bridge.invoke_value(json!({
            "httpMethod": "GET",
            "path": "/",
            "requestContext": {"accountId": "123456789012"}
        }));
        assert_eq!(reply["statusCode"], json!(200));
        assert_eq!(reply["body"], json!(""));
        assert_eq!(reply["headers"], json!({}));
    }

    #[derive(Clone, Default)]
    struct SharedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let log = SharedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_payload_logging_matches_across_entry_points() {
        let config = BridgeConfig {
            log_payloads: true,
            ..BridgeConfig::default()
        };
        let bridge = Bridge::with_config(
            |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
                w.write(b"ok");
            },
            config,
        );
        let payload = json!({"httpMethod": "GET", "path": "/logged", "requestContext": {"accountId": "1"}});

        let from_bytes = captured_logs(|| {
            let _ = bridge.invoke(&serde_json::to_vec(&payload).unwrap());
        });
        let from_value = captured_logs(|| {
            let _ = bridge.invoke_value(payload.clone());
        });
        for logs in [&from_bytes, &from_value] {
            assert!(logs.contains("Received request payload"), "{logs}");
            assert!(logs.contains("/logged"), "{logs}");
            assert!(logs.contains("Serialized reply"), "{logs}");
        }
    }

    #[test]
    fn test_payload_logging_off_by_default() {
        let logs = captured_logs(|| {
            let _ = bridge().invoke(b"{}");
        });
        assert!(!logs.contains("Received request payload"), "{logs}");
    }

    #[test]
    fn test_invoke_as_answers_failures_in_fixed_shape() {
        let reply: Value =
            serde_json::from_slice(&bridge().invoke_as(Format::GatewayV2, b"not json")).unwrap();
        assert_eq!(reply["statusCode"], json!(500));
        assert_eq!(reply["cookies"], json!([]));
        assert!(reply["body"]
            .as_str()
            .unwrap()
            .starts_with("malformed request"));
    }
}
