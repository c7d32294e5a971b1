use crate::request::CanonicalRequest;
use crate::response::ResponseWriter;

/// Synchronous HTTP handler run by the [`Bridge`](crate::bridge::Bridge).
///
/// The handler owns the request for the duration of the call and writes its
/// response incrementally through `w`. It never sees which envelope format the
/// request arrived in.
///
/// Closures with the matching signature implement this trait:
///
/// ```rust
/// use httpbridge::{CanonicalRequest, Handler, ResponseWriter};
/// use http::StatusCode;
///
/// let handler = |_req: CanonicalRequest, w: &mut dyn ResponseWriter| {
///     w.write_status(StatusCode::NO_CONTENT);
/// };
/// fn assert_handler<H: Handler>(_: &H) {}
/// assert_handler(&handler);
/// ```
pub trait Handler: Send + Sync {
    fn serve(&self, req: CanonicalRequest, w: &mut dyn ResponseWriter);
}

impl<F> Handler for F
where
    F: Fn(CanonicalRequest, &mut dyn ResponseWriter) + Send + Sync,
{
    fn serve(&self, req: CanonicalRequest, w: &mut dyn ResponseWriter) {
        self(req, w)
    }
}
