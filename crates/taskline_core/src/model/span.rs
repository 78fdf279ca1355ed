//! Optional-bound time windows.
//!
//! # Invariants
//! - Either bound may be unset; an unset bound disables any check that needs it.
//! - Containment is inclusive on both ends.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Pair of optional instants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: Option<EpochMs>,
    pub end: Option<EpochMs>,
}

impl TimeSpan {
    /// Span with neither bound set.
    pub const UNSET: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: Option<EpochMs>, end: Option<EpochMs>) -> Self {
        Self { start, end }
    }

    /// Span with both bounds set. Does not reorder inverted input.
    pub fn between(start: EpochMs, end: EpochMs) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Returns whether both bounds are present.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Returns `(start, end)` when both bounds are present.
    pub fn bounds(&self) -> Option<(EpochMs, EpochMs)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Length of the span in milliseconds.
    ///
    /// Zero when either bound is missing. Negative for an inverted span.
    pub fn duration_ms(&self) -> i64 {
        self.bounds()
            .map_or(0, |(start, end)| end.saturating_sub(start))
    }

    /// Checks `start <= instant <= end`.
    ///
    /// Returns `None` when the span is incomplete and no decision can be made.
    pub fn contains(&self, instant: EpochMs) -> Option<bool> {
        self.bounds()
            .map(|(start, end)| start <= instant && instant <= end)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::TimeSpan;

    #[test]
    fn duration_is_zero_when_a_bound_is_missing() {
        assert_eq!(TimeSpan::new(Some(10), None).duration_ms(), 0);
        assert_eq!(TimeSpan::new(None, Some(10)).duration_ms(), 0);
        assert_eq!(TimeSpan::UNSET.duration_ms(), 0);
        assert_eq!(TimeSpan::between(1_000, 4_500).duration_ms(), 3_500);
    }

    #[test]
    fn contains_is_inclusive_and_undecided_for_partial_spans() {
        let span = TimeSpan::between(100, 200);
        assert_eq!(span.contains(100), Some(true));
        assert_eq!(span.contains(200), Some(true));
        assert_eq!(span.contains(99), Some(false));
        assert_eq!(span.contains(201), Some(false));
        assert_eq!(TimeSpan::new(Some(100), None).contains(150), None);
    }
}
