//! Main "ruler" for moving through one voice of a measure.
use std::ops::Range;

use crate::error::{ScoreError, ScoreResult};

use super::Voice;

/// Cumulative-duration index over the notes of a voice.
///
/// `duration_map[i]` is the tick on which note `i` starts,
/// `total_duration` is the sum over the whole voice.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct TickMap {
    pub duration_map: Vec<u64>,
    pub total_duration: u64,
}
impl TickMap {
    /// # Example
    /// ```
    /// # use score_core::primitives::{Duration, Note, TickMap, Voice};
    /// let voice = Voice::new(
    ///     [4096, 2048, 2048]
    ///         .map(|t| Note::rest(Duration::from_ticks(t)))
    ///         .to_vec(),
    /// );
    /// let map = TickMap::build(&voice);
    /// assert_eq!(map.duration_map, vec![0, 4096, 6144]);
    /// assert_eq!(map.total_duration, 8192);
    /// assert_eq!(map.duration_at(6144).unwrap(), 2);
    /// assert!(map.duration_at(5000).is_err());
    /// ```
    pub fn build(voice: &Voice) -> Self {
        let mut duration_map = Vec::with_capacity(voice.notes.len());
        let total_duration =
            voice.notes.iter().fold(0_u64, |cursor, note| {
                duration_map.push(cursor);
                cursor + note.ticks()
            });
        Self {
            duration_map,
            total_duration,
        }
    }

    pub fn len(&self) -> usize {
        self.duration_map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.duration_map.is_empty()
    }

    /// Index of the note that starts exactly at `tick`.
    ///
    /// [ScoreError::NotFound] means that `tick` falls inside a note (or
    /// behind the last one), and the note has to be split there.
    pub fn duration_at(&self, tick: u64) -> ScoreResult<usize> {
        let idx = self.duration_map.partition_point(|&start| start < tick);
        match self.duration_map.get(idx) {
            Some(&start) if start == tick => Ok(idx),
            _ => Err(ScoreError::NotFound(tick)),
        }
    }

    pub fn start_of(&self, index: usize) -> Option<u64> {
        self.duration_map.get(index).copied()
    }
    pub fn end_of(&self, index: usize) -> Option<u64> {
        self.start_of(index)?;
        Some(
            self.duration_map
                .get(index + 1)
                .copied()
                .unwrap_or(self.total_duration),
        )
    }
    /// Ticks occupied by the note at `index`.
    pub fn window(&self, index: usize) -> Option<Range<u64>> {
        Some(self.start_of(index)?..self.end_of(index)?)
    }

    /// Index of the note sounding at `tick`.
    pub fn index_containing(&self, tick: u64) -> Option<usize> {
        (0..self.len())
            .rev()
            .find(|&idx| self.window(idx).is_some_and(|w| w.contains(&tick)))
    }
}
