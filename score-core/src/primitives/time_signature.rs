use std::fmt;

use fraction::Fraction;
use serde::{Deserialize, Serialize};

use super::fraction_tools::fraction_to_ticks;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
    /// Measure length as fraction of the whole note.
    pub fn as_fraction(&self) -> Fraction {
        Fraction::new(self.numerator, self.denominator.max(1))
    }
    /// Ticks one measure of this signature holds.
    pub fn capacity_ticks(&self) -> u64 {
        fraction_to_ticks(self.as_fraction()).unwrap_or(0)
    }
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}
impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeSignature;

    #[test]
    fn test_capacity() {
        assert_eq!(TimeSignature::new(4, 4).capacity_ticks(), 16384);
        assert_eq!(TimeSignature::new(3, 4).capacity_ticks(), 12288);
        assert_eq!(TimeSignature::new(7, 8).capacity_ticks(), 14336);
        assert_eq!(TimeSignature::new(6, 8).capacity_ticks(), 12288);
        assert_eq!(TimeSignature::new(9, 8).to_string(), "9/8");
    }
}
