//! Tools for mapping tick counts onto notated musical lengths.

use fraction::Fraction;
use once_cell::sync::Lazy;

use super::TICKS_PER_WHOLE;

/// Plain, dotted and double-dotted values from the breve down to 1/128,
/// longest first.
static STANDARD_TICKS: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut ticks = (0..=8_u32)
        .map(|shift| (TICKS_PER_WHOLE * 2) >> shift)
        .flat_map(|base| [base, base + base / 2, base + base / 2 + base / 4])
        .collect::<Vec<_>>();
    ticks.sort_unstable_by(|a, b| b.cmp(a));
    ticks.dedup();
    ticks
});

/// Tick counts that can be written as a single (possibly dotted) note.
pub fn standard_ticks() -> &'static [u64] {
    &STANDARD_TICKS
}

/// Nearest standard value to `ticks`.
///
/// On a tie the shorter value wins, so an ambiguous length is always drawn
/// with the larger denominator.
///
/// # Example
/// ```
/// # use score_core::primitives::fraction_tools::closest_standard;
/// assert_eq!(closest_standard(4000), 4096);
/// // exactly between a quarter (4096) and a dotted quarter (6144)
/// assert_eq!(closest_standard(5120), 4096);
/// ```
pub fn closest_standard(ticks: u64) -> u64 {
    let mut best = STANDARD_TICKS[0];
    for &candidate in STANDARD_TICKS.iter() {
        if candidate.abs_diff(ticks) <= best.abs_diff(ticks) {
            best = candidate;
        }
    }
    best
}

/// Largest standard value that does not exceed `ticks`.
pub fn floor_standard(ticks: u64) -> Option<u64> {
    STANDARD_TICKS.iter().copied().find(|&s| s <= ticks)
}

/// Fraction of a whole note, occupied by `ticks`.
pub fn whole_note_fraction(ticks: u64) -> Fraction {
    Fraction::new(ticks, TICKS_PER_WHOLE)
}

/// Round non-negative fraction to the nearest integer.
///
/// Returns None for NaN or infinite fractions.
pub fn round_fraction(frac: Fraction) -> Option<u64> {
    let (num, denom) = (*frac.numer()?, *frac.denom()?);
    if denom == 0 {
        return None;
    }
    Some((num + denom / 2) / denom)
}

/// Convert fraction of a whole note into ticks, rounding to the nearest tick.
pub fn fraction_to_ticks(frac: Fraction) -> Option<u64> {
    round_fraction(frac * Fraction::from(TICKS_PER_WHOLE))
}
