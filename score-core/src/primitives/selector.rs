//! Structural addresses inside a score.
//!
//! A [Selector] names a note (or one pitch of a chord) by staff, measure,
//! voice and the note index inside the voice. It never holds a reference:
//! resolving it always walks the score again, so after a structural edit
//! the stored selectors are only valid once the score was renumbered.
//!
//! # Examples
//!
//! ```
//! use std::cmp::Ordering;
//! use score_core::primitives::Selector;
//!
//! let a = Selector::new(0, 1, 0, 3);
//! let b = Selector::new(0, 2, 0, 0);
//! assert_eq!(a.compare(&b), Ordering::Less);
//! let chord_note = a.with_pitch(1);
//! assert!(a < chord_note);
//! assert!(a.same_note(&chord_note));
//! ```

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Ordered by staff, measure, voice, tick and pitch index.
/// Absent pitch index sorts before any present one.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    pub staff: usize,
    pub measure: usize,
    pub voice: usize,
    /// index of the note inside the voice
    pub tick: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_index: Option<usize>,
}
impl Selector {
    pub fn new(staff: usize, measure: usize, voice: usize, tick: usize) -> Self {
        Self {
            staff,
            measure,
            voice,
            tick,
            pitch_index: None,
        }
    }
    /// Selector of the first note of the measure voice.
    pub fn measure_start(staff: usize, measure: usize, voice: usize) -> Self {
        Self::new(staff, measure, voice, 0)
    }
    pub fn with_pitch(mut self, pitch_index: usize) -> Self {
        self.pitch_index = Some(pitch_index);
        self
    }
    pub fn with_tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Same note, regardless of the pitch index.
    pub fn same_note(&self, other: &Self) -> bool {
        self.staff == other.staff
            && self.measure == other.measure
            && self.voice == other.voice
            && self.tick == other.tick
    }

    /// Same staff, measure and voice.
    pub fn same_voice(&self, other: &Self) -> bool {
        self.staff == other.staff
            && self.measure == other.measure
            && self.voice == other.voice
    }
}
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "staff {} measure {} voice {} tick {}",
            self.staff, self.measure, self.voice, self.tick
        )?;
        match self.pitch_index {
            Some(idx) => write!(f, " pitch {idx}"),
            None => Ok(()),
        }
    }
}
