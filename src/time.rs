use chrono::{DateTime, FixedOffset, Utc};

/// Get current Unix timestamp in JST (milliseconds)
pub fn get_jst_timestamp() -> i64 {
    let jst_offset = FixedOffset::east_opt(9 * 3600).unwrap(); // JST is UTC+9
    let now_utc = Utc::now();
    let now_jst: DateTime<FixedOffset> = now_utc.with_timezone(&jst_offset);
    now_jst.timestamp_millis()
}

/// Render a Unix millisecond timestamp as an RFC 3339 string in JST
pub fn timestamp_to_jst_rfc3339(millis: i64) -> String {
    let jst_offset = FixedOffset::east_opt(9 * 3600).unwrap();
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&jst_offset).to_rfc3339())
        .unwrap_or_default()
}

/// Render a Unix millisecond timestamp as a wall-clock `HH:MM` string in JST
pub fn timestamp_to_jst_hhmm(millis: i64) -> String {
    let jst_offset = FixedOffset::east_opt(9 * 3600).unwrap();
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&jst_offset).format("%H:%M").to_string())
        .unwrap_or_default()
}
