//! Navigation through the score by [Selector].
//!
//! Every query re-walks the tree. Stepping past the first or the last note
//! gives [ScoreError::OutOfRange], which callers read as "no more
//! elements".

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{Measure, Note, Pitch, Selector},
};

use super::Score;

impl Score {
    /// Resolve selector to the measure it points into.
    pub fn measure_at(&self, selector: &Selector) -> ScoreResult<&Measure> {
        self.staff(selector.staff)
            .and_then(|staff| staff.measure(selector.measure))
            .ok_or(ScoreError::OutOfRange(*selector))
    }

    /// Resolve selector to the note.
    pub fn note_at(&self, selector: &Selector) -> ScoreResult<&Note> {
        self.measure_at(selector)?
            .voice(selector.voice)
            .and_then(|voice| voice.notes.get(selector.tick))
            .ok_or(ScoreError::OutOfRange(*selector))
    }

    /// Resolve selector to a single pitch of a chord.
    pub fn pitch_at(&self, selector: &Selector) -> ScoreResult<&Pitch> {
        let note = self.note_at(selector)?;
        note.pitches
            .get(selector.pitch_index.unwrap_or(0))
            .ok_or(ScoreError::OutOfRange(*selector))
    }

    /// Selector of the first note of the given measure in the given voice.
    pub fn measure_selection(
        &self,
        staff: usize,
        measure: usize,
        voice: usize,
    ) -> ScoreResult<Selector> {
        let selector = Selector::measure_start(staff, measure, voice);
        self.note_at(&selector)?;
        Ok(selector)
    }

    /// The note after `selector` in the same voice, crossing barlines.
    ///
    /// Measures, where the voice is absent or empty, are skipped.
    pub fn next_note_selection(
        &self,
        selector: &Selector,
    ) -> ScoreResult<Selector> {
        let staff = self
            .staff(selector.staff)
            .ok_or(ScoreError::OutOfRange(*selector))?;
        let next = Selector {
            pitch_index: None,
            ..selector.with_tick(selector.tick + 1)
        };
        if self.note_at(&next).is_ok() {
            return Ok(next);
        }
        (selector.measure + 1..staff.measures.len())
            .map(|measure| {
                Selector::measure_start(selector.staff, measure, selector.voice)
            })
            .find(|candidate| self.note_at(candidate).is_ok())
            .ok_or(ScoreError::OutOfRange(*selector))
    }

    /// The note before `selector` in the same voice, crossing barlines.
    pub fn prev_note_selection(
        &self,
        selector: &Selector,
    ) -> ScoreResult<Selector> {
        let base = Selector {
            pitch_index: None,
            ..*selector
        };
        if selector.tick > 0 {
            let prev = base.with_tick(selector.tick - 1);
            if self.note_at(&prev).is_ok() {
                return Ok(prev);
            }
        }
        let staff = self
            .staff(selector.staff)
            .ok_or(ScoreError::OutOfRange(*selector))?;
        (0..selector.measure.min(staff.measures.len()))
            .rev()
            .find_map(|measure| {
                let len = staff.measures[measure]
                    .voice(selector.voice)
                    .map(|v| v.notes.len())
                    .unwrap_or(0);
                (len > 0).then(|| Selector::new(
                    selector.staff,
                    measure,
                    selector.voice,
                    len - 1,
                ))
            })
            .ok_or(ScoreError::OutOfRange(*selector))
    }
}
