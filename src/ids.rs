use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Per-invocation correlation id backed by ULID.
///
/// Minted by the bridge for every invocation, recorded on the `invocation` span and
/// carried in [`InvocationContext`](crate::InvocationContext). The front end's own
/// request id travels separately as `upstream_request_id`.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct InvocationId(ulid::Ulid);

impl InvocationId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for InvocationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for InvocationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
