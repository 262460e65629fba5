//! HTTP date handling
//!
//! Parses `If-Modified-Since` values and formats `Last-Modified` headers
//! as RFC 7231 IMF-fixdate strings.

use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Parse an HTTP-date header value. Returns `None` for anything malformed.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let parsed = DateTime::parse_from_rfc2822(value).ok()?;
    let secs = parsed.timestamp();
    if secs < 0 {
        return None;
    }
    Some(UNIX_EPOCH + Duration::from_secs(secs as u64))
}

/// Format a timestamp for the `Last-Modified` header.
pub fn format_http_date(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_imf_fixdate() {
        let time = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        let secs = time.duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert_eq!(secs, 1_445_412_480);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_http_date("yesterday").is_none());
        assert!(parse_http_date("").is_none());
    }

    #[test]
    fn round_trips_through_format() {
        let time = UNIX_EPOCH + Duration::from_secs(1_445_412_480);
        let formatted = format_http_date(time);
        assert_eq!(formatted, "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_http_date(&formatted), Some(time));
    }
}
