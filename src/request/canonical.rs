use crate::ids::InvocationId;
use crate::request::escape::escape_path;
use base64::engine::general_purpose::{GeneralPurpose, STANDARD};
use base64::read::DecoderReader;
use http::header::{HeaderMap, HOST};
use http::Method;
use std::fmt;
use std::io::{self, Cursor, Read};
use std::time::{Duration, SystemTime};

/// Per-invocation context passed through from the invoking runtime to the handler.
///
/// The bridge does not act on the deadline; it only carries it so handlers can
/// cooperate with the runtime's timeout.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Correlation id for logs of this invocation
    pub invocation_id: InvocationId,
    /// Request id assigned by the front end (`requestContext.requestId`), if any
    pub upstream_request_id: Option<String>,
    /// Wall-clock deadline of the invocation, if the runtime supplied one
    pub deadline: Option<SystemTime>,
}

impl InvocationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: SystemTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Time left before the deadline; `None` when no deadline was supplied.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO))
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining() == Some(Duration::ZERO)
    }
}

enum BodyInner {
    Text(Cursor<Vec<u8>>),
    Base64(DecoderReader<'static, GeneralPurpose, Cursor<Vec<u8>>>),
}

/// Request body as a byte stream.
///
/// Bodies flagged `isBase64Encoded` are decoded lazily while reading; a malformed
/// base64 body surfaces as an `io::Error` from [`Read::read`].
pub struct Body {
    inner: BodyInner,
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Self::text(String::new())
    }

    /// Raw text body; bytes are passed through unchanged.
    #[must_use]
    pub fn text(body: String) -> Self {
        Self {
            inner: BodyInner::Text(Cursor::new(body.into_bytes())),
        }
    }

    /// Standard-alphabet base64 body, decoded on read.
    #[must_use]
    pub fn base64(body: String) -> Self {
        Self {
            inner: BodyInner::Base64(DecoderReader::new(
                Cursor::new(body.into_bytes()),
                &STANDARD,
            )),
        }
    }

    /// Build from an envelope's `body` / `isBase64Encoded` pair.
    #[must_use]
    pub fn from_envelope(body: String, is_base64_encoded: bool) -> Self {
        if is_base64_encoded {
            Self::base64(body)
        } else {
            Self::text(body)
        }
    }

    #[must_use]
    pub fn is_base64(&self) -> bool {
        matches!(self.inner, BodyInner::Base64(_))
    }

    /// Drain the remaining body into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        Ok(out)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            BodyInner::Text(cursor) => cursor.read(buf),
            BodyInner::Base64(decoder) => decoder.read(buf),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_base64() { "base64" } else { "text" };
        f.debug_struct("Body").field("encoding", &kind).finish()
    }
}

/// Format-independent HTTP request handed to the handler.
///
/// Built once per invocation by a canonicalizer and owned by that invocation.
#[derive(Debug)]
pub struct CanonicalRequest {
    /// HTTP method
    pub method: Method,
    /// Percent-decoded request path
    pub path: String,
    /// Encoded query string without the leading `?`
    pub raw_query: String,
    /// Header multimap; every value of a repeated header is kept
    pub headers: HeaderMap,
    /// Client address as reported by the front end, empty when unknown
    pub remote_addr: String,
    /// Request body
    pub body: Body,
    /// Invocation context supplied by the runtime
    pub context: InvocationContext,
}

impl CanonicalRequest {
    /// Host taken from the `host` header.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.headers.get(HOST).and_then(|v| v.to_str().ok())
    }

    /// First value of a header, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query parameters in wire order; repeated keys appear repeatedly.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.raw_query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Last value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.raw_query.as_bytes())
            .filter(|(k, _)| k == name)
            .last()
            .map(|(_, v)| v.into_owned())
    }

    /// Escaped path plus query, as it would appear on an HTTP request line.
    #[must_use]
    pub fn request_uri(&self) -> String {
        let path = escape_path(&self.path);
        if self.raw_query.is_empty() {
            path
        } else {
            format!("{}?{}", path, self.raw_query)
        }
    }
}
