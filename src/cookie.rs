//! Cookie header parsing and the percent-encoding used for hint values.
//!
//! Only the read side of the wire format lives here: `name=value` segments
//! separated by `;`. Attributes (`Max-Age`, `Path`, ...) only ever appear in
//! `Set-Cookie` lines, which [`set_cookie_line`] builds.

use std::string::FromUtf8Error;

use indexmap::IndexMap;

/// One year, in seconds.
pub const DEFAULT_MAX_AGE: u64 = 31_536_000;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("malformed percent-escape at byte {offset}")]
    MalformedEscape { offset: usize },
    #[error("decoded bytes are not UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Split one `;`-separated segment into name and value. A segment without
/// `=` is a name with an empty value.
fn split_segment(segment: &str) -> (&str, &str) {
    let segment = segment.trim();
    segment.split_once('=').unwrap_or((segment, ""))
}

/// Raw (still percent-encoded) value of cookie `name` in `header`.
///
/// Segments are scanned left to right and the first exact name match wins.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    if header.is_empty() {
        return None;
    }
    header
        .split(';')
        .map(split_segment)
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
}

/// All cookies in `header`, in order of appearance. Duplicate names keep the
/// first value, matching [`find_cookie`].
pub fn parse_cookies(header: &str) -> IndexMap<&str, &str> {
    let mut cookies = IndexMap::new();
    for segment in header.split(';') {
        if segment.trim().is_empty() {
            continue;
        }
        let (name, value) = split_segment(segment);
        cookies.entry(name).or_insert(value);
    }
    cookies
}

/// Percent-decode a cookie value the way `decodeURIComponent` does: every
/// `%` must start a two-digit hex escape and the result must be UTF-8.
/// `+` is left alone.
pub(crate) fn decode_value(raw: &str) -> Result<String, DecodeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(DecodeError::MalformedEscape { offset: i });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(urlencoding::decode(raw)?.into_owned())
}

pub(crate) fn encode_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `Set-Cookie` header value for a hint cookie.
pub fn set_cookie_line(name: &str, value: &str, max_age: u64) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; SameSite=Lax",
        encode_value(name),
        encode_value(value),
        max_age
    )
}
