//! Staggered-start offset adjustment.
//!
//! Categories in a staggered-start race leave at different scheduled
//! times of day, while one shared stopwatch runs from the base (earliest)
//! start. A lap recorded for a rider therefore includes the gap between
//! their category's start and the base start; these helpers compute that
//! gap and fold it into a recorded lap time to produce the final,
//! comparable time.
//!
//! Parsing is deliberately permissive: a missing or non-numeric component
//! of a time-of-day string counts as zero instead of failing, so a
//! partially configured category never breaks the operator's console. The
//! cost is that a typo in a start time silently reads as `00`; hosts that
//! want strict validation must check the strings before calling in.

use serde::{Deserialize, Serialize};

/// Compute the millisecond gap between a category's scheduled start and the
/// shared base start.
///
/// Both arguments are time-of-day strings in `HH:MM:SS` or `HH:MM` form
/// (seconds optional). The result keeps its sign: a category that starts
/// *before* the base yields a negative offset, and downstream arithmetic
/// depends on that sign being preserved.
///
/// ```rust
/// use paceline::compute_start_offset_ms;
///
/// assert_eq!(compute_start_offset_ms("07:00:00", "07:00:00"), 0);
/// assert_eq!(compute_start_offset_ms("07:15:00", "07:00:00"), 900_000);
/// assert_eq!(compute_start_offset_ms("06:45:00", "07:00:00"), -900_000);
/// ```
pub fn compute_start_offset_ms(category_start: &str, base_start: &str) -> i64 {
    let delta_minutes =
        minutes_since_midnight(category_start) - minutes_since_midnight(base_start);
    (delta_minutes * 60_000.0).round() as i64
}

/// Time-of-day as fractional minutes since midnight.
///
/// Missing or unparsable components default to zero.
fn minutes_since_midnight(time: &str) -> f64 {
    let mut parts = time.trim().split(':');
    let hours = component(parts.next());
    let minutes = component(parts.next());
    let seconds = component(parts.next());
    hours * 60.0 + minutes + seconds / 60.0
}

fn component(part: Option<&str>) -> f64 {
    part.and_then(|p| p.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

/// A category's start offset, ready to fold into recorded lap times.
///
/// Wraps the raw offset so callers can distinguish a genuine adjustment
/// from the neutral case where the category starts with the base group
/// (the console shows "no adjustment" for the latter rather than implying
/// a calculation happened).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAdjustment {
    pub offset_ms: i64,
}

impl StartAdjustment {
    /// Build the adjustment from the category's and the base start times.
    pub fn from_times(category_start: &str, base_start: &str) -> Self {
        Self { offset_ms: compute_start_offset_ms(category_start, base_start) }
    }

    /// The zero adjustment.
    pub fn neutral() -> Self {
        Self { offset_ms: 0 }
    }

    /// Whether applying this adjustment leaves the recorded time unchanged.
    pub fn is_neutral(&self) -> bool {
        self.offset_ms == 0
    }

    /// Final adjusted time for a recorded lap, in milliseconds.
    ///
    /// Signed because a negative offset larger than the recorded time is
    /// representable (a misconfigured base), and masking it with a clamp
    /// would corrupt result ordering.
    pub fn apply(&self, recorded_elapsed_ms: u64) -> i64 {
        recorded_elapsed_ms as i64 + self.offset_ms
    }
}
