//! Content-type sniffing for the first body write.
//!
//! Implements the signature table of the WHATWG MIME Sniffing standard
//! (<https://mimesniff.spec.whatwg.org/>) restricted to the patterns that do not need
//! the request's context: HTML and XML markers, document, image, audio/video, font and
//! archive signatures, UTF byte-order marks, and the final text-vs-binary decision.
//! At most the first 512 bytes are examined.

/// Bytes examined when sniffing.
pub const SNIFF_LEN: usize = 512;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

enum Sig {
    /// Exact prefix match
    Exact(&'static [u8], &'static str),
    /// `data & mask == pattern`, optionally after leading whitespace
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
        content_type: &'static str,
    },
    /// Case-insensitive HTML tag followed by a space or `>`
    Html(&'static [u8]),
    Mp4,
    Text,
}

const HTML_UTF8: &str = "text/html; charset=utf-8";

const SIGNATURES: &[Sig] = &[
    Sig::Html(b"<!DOCTYPE HTML"),
    Sig::Html(b"<HTML"),
    Sig::Html(b"<HEAD"),
    Sig::Html(b"<SCRIPT"),
    Sig::Html(b"<IFRAME"),
    Sig::Html(b"<H1"),
    Sig::Html(b"<DIV"),
    Sig::Html(b"<FONT"),
    Sig::Html(b"<TABLE"),
    Sig::Html(b"<A"),
    Sig::Html(b"<STYLE"),
    Sig::Html(b"<TITLE"),
    Sig::Html(b"<B"),
    Sig::Html(b"<BODY"),
    Sig::Html(b"<BR"),
    Sig::Html(b"<P"),
    Sig::Html(b"<!--"),
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_ws: true,
        content_type: "text/xml; charset=utf-8",
    },
    Sig::Exact(b"%PDF-", "application/pdf"),
    Sig::Exact(b"%!PS-Adobe-", "application/postscript"),
    // UTF byte-order marks
    Sig::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFE\xFF\x00\x00",
        skip_ws: false,
        content_type: "text/plain; charset=utf-16be",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFF\xFE\x00\x00",
        skip_ws: false,
        content_type: "text/plain; charset=utf-16le",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\x00",
        pattern: b"\xEF\xBB\xBF\x00",
        skip_ws: false,
        content_type: TEXT_PLAIN_UTF8,
    },
    // Images
    Sig::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Sig::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Sig::Exact(b"BM", "image/bmp"),
    Sig::Exact(b"GIF87a", "image/gif"),
    Sig::Exact(b"GIF89a", "image/gif"),
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_ws: false,
        content_type: "image/webp",
    },
    Sig::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Sig::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    // Audio and video
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_ws: false,
        content_type: "audio/aiff",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF",
        pattern: b"ID3",
        skip_ws: false,
        content_type: "audio/mpeg",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"OggS\x00",
        skip_ws: false,
        content_type: "application/ogg",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"MThd\x00\x00\x00\x06",
        skip_ws: false,
        content_type: "audio/midi",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_ws: false,
        content_type: "video/avi",
    },
    Sig::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_ws: false,
        content_type: "audio/wave",
    },
    Sig::Mp4,
    Sig::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // Fonts
    Sig::Exact(b"OTTO", "font/otf"),
    Sig::Exact(b"ttcf", "font/collection"),
    Sig::Exact(b"wOFF", "font/woff"),
    Sig::Exact(b"wOF2", "font/woff2"),
    // Archives
    Sig::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Sig::Exact(b"PK\x03\x04", "application/zip"),
    Sig::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Sig::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Sig::Exact(b"\x00\x61\x73\x6D", "application/wasm"),
    Sig::Text,
];

fn is_ws(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_tag_terminating(b: u8) -> bool {
    b == b' ' || b == b'>'
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn skip_ws(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|b| !is_ws(*b)).unwrap_or(data.len());
    &data[start..]
}

fn match_masked(data: &[u8], mask: &[u8], pattern: &[u8], ws: bool) -> bool {
    let data = if ws { skip_ws(data) } else { data };
    if data.len() < pattern.len() {
        return false;
    }
    data.iter()
        .zip(mask.iter().zip(pattern))
        .all(|(d, (m, p))| d & m == *p)
}

fn match_html(data: &[u8], tag: &[u8]) -> bool {
    let data = skip_ws(data);
    if data.len() < tag.len() + 1 {
        return false;
    }
    let prefix_matches = data
        .iter()
        .zip(tag)
        .all(|(d, t)| d.to_ascii_uppercase() == *t);
    prefix_matches && is_tag_terminating(data[tag.len()])
}

fn match_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        .filter(|st| *st != 12)
        .any(|st| data.get(st..st + 3) == Some(b"mp4".as_slice()))
}

fn match_text(data: &[u8]) -> bool {
    !skip_ws(data).iter().any(|b| is_binary(*b))
}

/// Detect the content type of `data`.
///
/// Always returns a valid MIME type, falling back to `application/octet-stream`.
/// An empty slice sniffs as UTF-8 plain text.
#[must_use]
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    for sig in SIGNATURES {
        let matched = match sig {
            Sig::Exact(prefix, ct) => data.starts_with(prefix).then_some(*ct),
            Sig::Masked {
                mask,
                pattern,
                skip_ws,
                content_type,
            } => match_masked(data, mask, pattern, *skip_ws).then_some(*content_type),
            Sig::Html(tag) => match_html(data, tag).then_some(HTML_UTF8),
            Sig::Mp4 => match_mp4(data).then_some("video/mp4"),
            Sig::Text => match_text(data).then_some(TEXT_PLAIN_UTF8),
        };
        if let Some(ct) = matched {
            return ct;
        }
    }
    OCTET_STREAM
}
