//! Canonical request paths.
//!
//! Route rules only ever see canonical paths. A path is canonical when it has
//! - no empty segments (`//`)
//! - no `.` / `..` segments
//! - no percent-encoded unreserved characters (`%61` is `a`)
//! - upper-case hex in the remaining percent escapes
//!
//! Anything else is answered with a redirect to its canonical form, so the
//! upstream never receives a spelling the classifier did not check.
use std::borrow::Cow;

pub fn canonicalize(path: &str) -> Cow<'_, str> {
    let decoded = decode_unreserved(path);

    let mut segments: Vec<&str> = Vec::new();
    for seg in decoded.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let trailing = decoded.len() > 1
        && decoded.ends_with('/')
        && !segments.is_empty()
        && !decoded.ends_with("/./")
        && !decoded.ends_with("/../");

    let mut out = String::with_capacity(decoded.len());
    for seg in &segments {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() || trailing {
        out.push('/');
    }

    if out == path {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(out)
    }
}

pub fn is_canonical(path: &str) -> bool {
    matches!(canonicalize(path), Cow::Borrowed(_))
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%XX` escapes of unreserved characters, upper-cases the others.
fn decode_unreserved(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }

    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        let escape = (bytes[i] == b'%' && i + 2 < bytes.len())
            .then(|| Some((hex_value(bytes[i + 1])?, hex_value(bytes[i + 2])?)))
            .flatten();

        match escape {
            Some((hi, lo)) => {
                let b = hi * 16 + lo;
                if is_unreserved(b) {
                    out.push(b as char);
                } else {
                    out.push('%');
                    out.push(bytes[i + 1].to_ascii_uppercase() as char);
                    out.push(bytes[i + 2].to_ascii_uppercase() as char);
                }
                i += 3;
            }
            None => {
                // copy one UTF-8 character as-is
                let ch_len = path[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&path[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    Cow::Owned(out)
}
