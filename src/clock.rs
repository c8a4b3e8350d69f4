use time::OffsetDateTime;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    to_ms(OffsetDateTime::now_utc())
}

pub fn to_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_ms(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}

#[cfg(test)]
mod clock_tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn ms_conversions_agree() {
        let at = datetime!(2024-03-01 12:30:00 UTC);
        let ms = to_ms(at);
        assert_eq!(ms, 1_709_296_200_000);
        assert_eq!(from_ms(ms), Some(at));
    }
}
