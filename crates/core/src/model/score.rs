use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("score must be within 0..=100, got {0}")]
    OutOfRange(i64),
}

/// Session score as a whole percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const MAX: Score = Score(100);

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Score)
            .ok_or(ScoreError::OutOfRange(value))
    }

    /// Percentage of `correct` over `total`, rounded half up.
    ///
    /// An empty tally scores zero.
    #[must_use]
    pub fn from_tally(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let correct = u64::from(correct.min(total));
        let total = u64::from(total);
        let pct = (correct * 100 + total / 2) / total;
        // `correct <= total` bounds `pct` to 0..=100.
        Score(u8::try_from(pct).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_scores() {
        assert_eq!(Score::from_tally(7, 10).value(), 70);
        assert_eq!(Score::from_tally(10, 10).value(), 100);
        assert_eq!(Score::from_tally(0, 4).value(), 0);
        assert_eq!(Score::from_tally(0, 0), Score::ZERO);
    }

    #[test]
    fn tally_rounds_half_up() {
        assert_eq!(Score::from_tally(2, 3).value(), 67);
        assert_eq!(Score::from_tally(1, 3).value(), 33);
        assert_eq!(Score::from_tally(1, 8).value(), 13);
    }

    #[test]
    fn new_checks_range() {
        assert_eq!(Score::new(55).unwrap().value(), 55);
        assert_eq!(Score::new(101), Err(ScoreError::OutOfRange(101)));
        assert_eq!(Score::new(-1), Err(ScoreError::OutOfRange(-1)));
    }
}
