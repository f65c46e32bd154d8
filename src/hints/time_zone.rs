use crate::types::ClientHint;

pub const COOKIE_NAME: &str = "CH-time-zone";
pub const PROBE: &str = "Intl.DateTimeFormat().resolvedOptions().timeZone";
pub const FALLBACK: &str = "UTC";

/// IANA time zone name, taken verbatim from the cookie.
pub fn hint() -> ClientHint {
    ClientHint::new(COOKIE_NAME, PROBE, FALLBACK)
}
