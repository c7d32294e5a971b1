use crate::error::BridgeError;

fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// Percent-decode a request path, rejecting malformed escapes.
///
/// `urlencoding::decode` passes an invalid sequence like `%zz` through untouched, so every
/// `%` is checked for two trailing hex digits first. `+` is left alone (paths are not
/// form-encoded). A decoded path that is not UTF-8 is also rejected.
pub fn unescape_path(raw: &str) -> Result<String, BridgeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let ok = i + 2 < bytes.len() && is_hex(bytes[i + 1]) && is_hex(bytes[i + 2]);
            if !ok {
                let end = (i + 3).min(bytes.len());
                let escape = String::from_utf8_lossy(&bytes[i..end]);
                return Err(BridgeError::MalformedRequest(format!(
                    "failed to unescape path {raw} from request: invalid URL escape \"{escape}\""
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            BridgeError::MalformedRequest(format!(
                "failed to unescape path {raw} from request: {e}"
            ))
        })
}

/// Re-escape a decoded path segment by segment, keeping `/` separators.
#[must_use]
pub fn escape_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}
