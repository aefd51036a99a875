//! Wall-clock helpers. Persisted timestamps are epoch milliseconds.

use time::OffsetDateTime;

/// Milliseconds since the Unix epoch for `at`, saturating at the `i64` range.
#[must_use]
pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(if millis.is_negative() { i64::MIN } else { i64::MAX })
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_epoch_millis() -> i64 {
    epoch_millis(OffsetDateTime::now_utc())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_of_known_instant() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(epoch_millis(at), 1_700_000_000_000);
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now_epoch_millis() > 1_577_836_800_000);
    }
}
