//! Pure number formatters used when writing statistics into the resume.
//!
//! [`round_stat`] is meant for small repository counts, [`abbreviate`] for
//! audience sized numbers. Both are total over `u64`.

/// Round a repository count to a multiple of ten.
///
/// Exact multiples are returned as is. A remainder below five rounds down and
/// gets a `+` suffix ("at least"), five and above rounds up without suffix.
///
/// ```
/// use resume_stats_core::format::round_stat;
/// assert_eq!(round_stat(130), "130");
/// assert_eq!(round_stat(132), "130+");
/// assert_eq!(round_stat(137), "140");
/// ```
pub fn round_stat(value: u64) -> String {
    let remainder = value % 10;
    if remainder == 0 {
        value.to_string()
    } else if remainder < 5 {
        format!("{}+", value - remainder)
    } else {
        // Near u64::MAX the rounded value no longer fits in u64.
        (u128::from(value - remainder) + 10).to_string()
    }
}

/// Abbreviate a large count with a `k` or `M` suffix.
///
/// In integer mode values are floored to whole units (and to tens of thousands
/// between 100k and 1M). In decimal mode one fractional digit is kept,
/// truncated; values from 100k upwards are expressed in millions.
///
/// ```
/// use resume_stats_core::format::abbreviate;
/// assert_eq!(abbreviate(532_000, false), "530k");
/// assert_eq!(abbreviate(532_000, true), "0.5M");
/// ```
pub fn abbreviate(value: u64, decimal: bool) -> String {
    match value {
        1_000_000.. if decimal => tenths(value / 100_000, "M"),
        1_000_000.. => format!("{}M", value / 1_000_000),
        100_000..=999_999 if decimal => tenths(value / 100_000, "M"),
        100_000..=999_999 => format!("{}k", value / 10_000 * 10),
        10_000..=99_999 if decimal => tenths(value / 100, "k"),
        10_000..=99_999 => format!("{}k", value / 1_000),
        _ => value.to_string(),
    }
}

fn tenths(count: u64, unit: &str) -> String {
    format!("{}.{}{}", count / 10, count % 10, unit)
}
