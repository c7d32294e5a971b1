//! # Response Module
//!
//! The handler-facing [`ResponseWriter`] seam and the in-memory [`CaptureBuffer`]
//! behind it.
//!
//! ## Write-once semantics
//!
//! ```text
//!   Open ──write_status(code)──▶ Finalized(code)
//!    │                              ▲
//!    ├──write(bytes)───────────────┤ status 200, content-type sniffed
//!    │                              │ from bytes when unset
//!    └──flush()────────────────────┘ status 200, no sniffing
//! ```
//!
//! Once finalized, the status and the sniffed content-type never change. Body bytes
//! keep accumulating.

mod capture;
pub mod sniff;

pub use capture::{CaptureBuffer, ResponseWriter};
pub use sniff::detect_content_type;
