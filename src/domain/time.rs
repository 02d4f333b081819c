use time::OffsetDateTime;

/// Current UTC time truncated to whole seconds.
///
/// Stored timestamps are compared as RFC 3339 text, so every persisted value
/// carries the same precision.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
