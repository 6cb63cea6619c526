use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::Sum,
    ops::Add,
};

use fraction::Fraction;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

use super::fraction_tools::{
    closest_standard, floor_standard, standard_ticks, whole_note_fraction,
};

/// Length of a note, rest or grace figure, in ticks.
///
/// Value is `numerator / denominator + remainder`. Comparison, hashing and
/// arithmetic always use the resolved tick count, so `3/1 + 0` and
/// `6/2 + 0` are the same Duration.
///
/// # Example
/// ```
/// # use score_core::primitives::Duration;
/// let a = Duration::new(3, 1, 0).unwrap();
/// let b = Duration::new(6, 2, 0).unwrap();
/// assert_eq!(a, b);
/// assert_eq!((a + b).ticks(), 6);
/// let (head, tail) = Duration::from_ticks(4096).split(1024).unwrap();
/// assert_eq!(head.ticks() + tail.ticks(), 4096);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "DurationRecord", into = "DurationRecord")]
pub struct Duration {
    numerator: u64,
    denominator: u64,
    remainder: u64,
}
impl Duration {
    pub fn new(
        numerator: u64,
        denominator: u64,
        remainder: u64,
    ) -> ScoreResult<Self> {
        if denominator == 0 {
            return Err(ScoreError::ZeroDenominator);
        }
        Ok(Self {
            numerator,
            denominator,
            remainder,
        })
    }
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            numerator: ticks,
            denominator: 1,
            remainder: 0,
        }
    }

    /// Nearest value that can be notated as a single note.
    pub fn closest_representable(ticks: u64) -> Self {
        Self::from_ticks(closest_standard(ticks))
    }

    /// Materialize a partial note: the longest standard value not exceeding
    /// `ticks`, with whatever is left in the remainder.
    ///
    /// Tick count is preserved exactly.
    pub fn notated(ticks: u64) -> Self {
        match floor_standard(ticks) {
            Some(base) => Self {
                numerator: base,
                denominator: 1,
                remainder: ticks - base,
            },
            None => Self::from_ticks(ticks),
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }
    pub fn denominator(&self) -> u64 {
        self.denominator
    }
    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    /// Resolved tick count.
    pub fn ticks(&self) -> u64 {
        self.numerator / self.denominator + self.remainder
    }

    /// Split at `at` ticks from the start.
    ///
    /// Fails with [ScoreError::InvalidSplit] unless `0 < at < ticks`.
    pub fn split(&self, at: u64) -> ScoreResult<(Self, Self)> {
        let ticks = self.ticks();
        if at == 0 || at >= ticks {
            return Err(ScoreError::InvalidSplit { ticks, at });
        }
        Ok((Self::from_ticks(at), Self::from_ticks(ticks - at)))
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        Some(Self::from_ticks(self.ticks().checked_sub(other.ticks())?))
    }

    /// Length as a fraction of the whole note.
    pub fn as_fraction(&self) -> Fraction {
        whole_note_fraction(self.ticks())
    }

    pub fn is_standard(&self) -> bool {
        standard_ticks().contains(&self.ticks())
    }
}
impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.ticks() == other.ticks()
    }
}
impl Eq for Duration {}
impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks().cmp(&other.ticks())
    }
}
impl Hash for Duration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ticks().hash(state)
    }
}
impl Add for Duration {
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_ticks(self.ticks() + rhs.ticks())
    }
    type Output = Self;
}
impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::from_ticks(0), |acc, d| acc + d)
    }
}
impl From<u64> for Duration {
    fn from(ticks: u64) -> Self {
        Self::from_ticks(ticks)
    }
}
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ticks)", self.as_fraction(), self.ticks())
    }
}

/// Wire form of [Duration]: deserialization goes through
/// [Duration::new], so a zero denominator never gets in.
#[derive(Serialize, Deserialize)]
struct DurationRecord {
    numerator: u64,
    denominator: u64,
    remainder: u64,
}
impl TryFrom<DurationRecord> for Duration {
    type Error = ScoreError;
    fn try_from(value: DurationRecord) -> Result<Self, Self::Error> {
        Self::new(value.numerator, value.denominator, value.remainder)
    }
}
impl From<Duration> for DurationRecord {
    fn from(value: Duration) -> Self {
        Self {
            numerator: value.numerator,
            denominator: value.denominator,
            remainder: value.remainder,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ScoreError;

    use super::Duration;

    fn samples() -> Vec<Duration> {
        vec![
            Duration::from_ticks(0),
            Duration::from_ticks(1),
            Duration::from_ticks(4096),
            Duration::new(8192, 3, 1).unwrap(),
            Duration::new(6, 2, 0).unwrap(),
            Duration::new(2731, 1, 0).unwrap(),
            Duration::new(12288, 2, 17).unwrap(),
        ]
    }

    #[test]
    fn add_keeps_ticks() {
        for a in samples() {
            for b in samples() {
                assert_eq!((a + b).ticks(), a.ticks() + b.ticks());
            }
        }
        let total: Duration = samples().into_iter().sum();
        assert_eq!(
            total.ticks(),
            samples().iter().map(|d| d.ticks()).sum::<u64>()
        );
    }

    #[test]
    fn equality_by_ticks() {
        assert_eq!(
            Duration::new(3, 1, 0).unwrap(),
            Duration::new(6, 2, 0).unwrap()
        );
        assert_eq!(
            Duration::new(8192, 3, 1).unwrap(),
            Duration::from_ticks(2731)
        );
        assert_ne!(Duration::from_ticks(2730), Duration::from_ticks(2731));
        assert!(Duration::from_ticks(2048) < Duration::from_ticks(4096));
    }

    #[test]
    fn zero_denominator() {
        assert!(matches!(
            Duration::new(1, 0, 0),
            Err(ScoreError::ZeroDenominator)
        ));
        let parsed = serde_json::from_str::<Duration>(
            r#"{"numerator":1,"denominator":0,"remainder":0}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn split_sums_to_original() {
        for d in samples() {
            for at in 1..d.ticks().min(300) {
                let (x, y) = d.split(at).unwrap();
                assert_eq!(x.ticks(), at);
                assert_eq!(x.ticks() + y.ticks(), d.ticks());
            }
        }
    }

    #[test]
    fn split_out_of_bounds() {
        let d = Duration::from_ticks(4096);
        assert!(matches!(
            d.split(0),
            Err(ScoreError::InvalidSplit { ticks: 4096, at: 0 })
        ));
        assert!(d.split(4096).is_err());
        assert!(d.split(5000).is_err());
        assert!(Duration::from_ticks(0).split(0).is_err());
    }

    #[test]
    fn closest_representable_prefers_shorter() {
        assert_eq!(Duration::closest_representable(4096).ticks(), 4096);
        assert_eq!(Duration::closest_representable(5120).ticks(), 4096);
        assert_eq!(Duration::closest_representable(2560).ticks(), 2048);
        assert_eq!(Duration::closest_representable(2731).ticks(), 3072);
        assert!(Duration::closest_representable(2731).is_standard());
    }

    #[test]
    fn notated_keeps_ticks() {
        let d = Duration::notated(4095);
        assert_eq!(d.numerator(), 3584);
        assert_eq!(d.remainder(), 511);
        assert_eq!(d.ticks(), 4095);
        let d = Duration::notated(6144);
        assert_eq!(d.remainder(), 0);
        assert!(d.is_standard());
        assert_eq!(Duration::notated(1).ticks(), 1);
    }

    #[test]
    fn serde_record() {
        let d = Duration::new(8192, 3, 1).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"numerator":8192,"denominator":3,"remainder":1}"#);
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(back.denominator(), 3);
        assert_eq!(back, d);
    }
}
