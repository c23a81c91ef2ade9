//! Elapsed-time rendering.
//!
//! Pure presentation helpers, shared by the driver's snapshots and by hosts
//! rendering recorded or adjusted lap times.

/// Format a millisecond duration as `MM:SS.cc`, switching to `HH:MM:SS.cc`
/// once a full hour has elapsed. Centiseconds truncate (`floor`), they do
/// not round.
///
/// ```rust
/// use paceline::format_elapsed;
///
/// assert_eq!(format_elapsed(0), "00:00.00");
/// assert_eq!(format_elapsed(65_432), "01:05.43");
/// assert_eq!(format_elapsed(3_725_678), "01:02:05.67");
/// ```
pub fn format_elapsed(ms: u64) -> String {
    let total_secs = ms / 1000;
    let cs = (ms % 1000) / 10;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}.{cs:02}")
    } else {
        format!("{m:02}:{s:02}.{cs:02}")
    }
}

/// Format a possibly-missing millisecond duration.
///
/// Hosts hold optional elapsed values before a timer has produced one;
/// `None` renders as the zero display rather than failing.
pub fn format_elapsed_opt(ms: Option<u64>) -> String {
    format_elapsed(ms.unwrap_or(0))
}

/// Format a signed millisecond duration, as produced by start-offset
/// adjustment. Negative values carry a leading `-`.
///
/// ```rust
/// use paceline::format_signed;
///
/// assert_eq!(format_signed(125_000), "02:05.00");
/// assert_eq!(format_signed(-900_000), "-15:00.00");
/// ```
pub fn format_signed(ms: i64) -> String {
    if ms < 0 {
        format!("-{}", format_elapsed(ms.unsigned_abs()))
    } else {
        format_elapsed(ms as u64)
    }
}
