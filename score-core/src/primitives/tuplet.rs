use std::ops::RangeInclusive;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Note;

/// Contiguous run of notes in one voice, played in a non-standard ratio.
///
/// Members are addressed by index inside the owning voice, so replacing a
/// measure never leaves the tuplet pointing at stale notes.
/// `duration_map` is derived from the actual note lengths: the first entry
/// is 1.0, every next one is the ratio to the previous note.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuplet {
    pub id: u32,
    pub voice: usize,
    pub start_index: usize,
    /// inclusive
    pub end_index: usize,
    pub duration_map: Vec<f64>,
    pub total_ticks: u64,
}
impl Tuplet {
    /// Derive tuplet from notes that start at `start_index` of `voice`.
    ///
    /// Returns None for the empty note list.
    ///
    /// # Example
    /// ```
    /// # use score_core::primitives::{Duration, Note, Tuplet};
    /// let notes = [2731, 2731, 2730]
    ///     .map(|t| Note::rest(Duration::from_ticks(t)));
    /// let tuplet = Tuplet::from_notes(0, 0, 0, &notes).unwrap();
    /// assert_eq!(tuplet.total_ticks, 8192);
    /// assert_eq!(tuplet.duration_map[..2], [1.0, 1.0]);
    /// assert!((tuplet.duration_map[2] - 0.9996).abs() < 1e-4);
    /// ```
    pub fn from_notes(
        id: u32,
        voice: usize,
        start_index: usize,
        notes: &[Note],
    ) -> Option<Self> {
        if notes.is_empty() {
            return None;
        }
        let duration_map = std::iter::once(1.0)
            .chain(notes.iter().tuple_windows().map(|(prev, next)| {
                match prev.ticks() {
                    0 => 1.0,
                    prev_ticks => next.ticks() as f64 / prev_ticks as f64,
                }
            }))
            .collect();
        Some(Self {
            id,
            voice,
            start_index,
            end_index: start_index + notes.len() - 1,
            duration_map,
            total_ticks: notes.iter().map(|n| n.ticks()).sum(),
        })
    }

    pub fn num_notes(&self) -> usize {
        self.end_index - self.start_index + 1
    }
    pub fn note_range(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
    pub fn contains(&self, voice: usize, index: usize) -> bool {
        self.voice == voice && self.note_range().contains(&index)
    }

    /// Same tuplet, moved to other position and id.
    pub fn relocated(&self, id: u32, start_index: usize) -> Self {
        Self {
            id,
            start_index,
            end_index: start_index + self.num_notes() - 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::{Duration, Note};

    use super::Tuplet;

    fn notes(ticks: &[u64]) -> Vec<Note> {
        ticks
            .iter()
            .map(|t| Note::new(Vec::new(), Duration::from_ticks(*t)))
            .collect()
    }

    #[test]
    fn test_ratio_map() {
        let tuplet = Tuplet::from_notes(3, 1, 2, &notes(&[2731, 2731, 2730]))
            .unwrap();
        assert_eq!(tuplet.note_range(), 2..=4);
        assert_eq!(tuplet.num_notes(), 3);
        assert_eq!(tuplet.duration_map[0], 1.0);
        assert_eq!(tuplet.duration_map[1], 1.0);
        assert_eq!(tuplet.duration_map[2], 2730.0 / 2731.0);
        assert!(tuplet.contains(1, 4));
        assert!(!tuplet.contains(0, 4));
        assert!(!tuplet.contains(1, 5));
    }

    #[test]
    fn test_inconsistent_durations() {
        let tuplet =
            Tuplet::from_notes(0, 0, 0, &notes(&[2048, 1024, 4096])).unwrap();
        assert_eq!(tuplet.duration_map, vec![1.0, 0.5, 4.0]);
        assert_eq!(tuplet.total_ticks, 7168);
        assert!(Tuplet::from_notes(0, 0, 0, &[]).is_none());
    }

    #[test]
    fn test_relocated() {
        let tuplet =
            Tuplet::from_notes(0, 0, 1, &notes(&[2731, 2731, 2730])).unwrap();
        let moved = tuplet.relocated(5, 4);
        assert_eq!(moved.id, 5);
        assert_eq!(moved.note_range(), 4..=6);
        assert_eq!(moved.duration_map, tuplet.duration_map);
    }
}
