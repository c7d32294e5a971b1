use crate::response::sniff::detect_content_type;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE, TRANSFER_ENCODING};
use http::StatusCode;
use std::fmt;
use std::io;

/// Handler-facing response sink with incremental-write semantics.
///
/// Headers may be changed freely until the status is finalized, either explicitly by
/// [`write_status`](ResponseWriter::write_status) or implicitly by the first
/// [`write`](ResponseWriter::write) or [`flush`](ResponseWriter::flush). The first
/// finalization wins; later attempts to change the status are ignored.
pub trait ResponseWriter {
    /// Mutable header multimap.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Append body bytes, finalizing the status to 200 first if it is still open.
    /// Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Finalize the status to `status` if it is still open.
    fn write_status(&mut self, status: StatusCode);

    /// Finalize the status to 200 if it is still open, without content-type inference.
    fn flush(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Finalized(StatusCode),
}

/// In-memory [`ResponseWriter`] that records everything a handler produces.
///
/// Status and the sniffed content-type are decided at most once; body bytes keep
/// accumulating after that.
pub struct CaptureBuffer {
    state: WriterState,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl CaptureBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WriterState::Open,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Finalized status, `None` while still open.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.state {
            WriterState::Open => None,
            WriterState::Finalized(status) => Some(status),
        }
    }

    /// Numeric status with `0` as the unset sentinel.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status().map_or(0, |s| s.as_u16())
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        matches!(self.state, WriterState::Finalized(_))
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `content-type` at the time of the call, if set and visible ASCII.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    fn finalize_for_write(&mut self, data: &[u8]) {
        if self.is_finalized() {
            return;
        }
        self.state = WriterState::Finalized(StatusCode::OK);

        let has_type = self.headers.contains_key(CONTENT_TYPE);
        let has_te = self
            .headers
            .get(TRANSFER_ENCODING)
            .is_some_and(|v| !v.is_empty());
        if !has_type && !has_te {
            self.headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(detect_content_type(data)),
            );
        }
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for CaptureBuffer {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.finalize_for_write(data);
        self.body.extend_from_slice(data);
        data.len()
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.is_finalized() {
            return;
        }
        self.state = WriterState::Finalized(status);
    }

    fn flush(&mut self) {
        if self.is_finalized() {
            return;
        }
        self.state = WriterState::Finalized(StatusCode::OK);
    }
}

/// Lets handlers use `write!` and `io::copy` against the buffer.
impl io::Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ResponseWriter::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        ResponseWriter::flush(self);
        Ok(())
    }
}

impl fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("status", &self.status_code())
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}
