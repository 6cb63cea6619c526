use itertools::Itertools;
use log::debug;

use crate::{
    dom::Score,
    error::{ScoreError, ScoreResult},
    primitives::{Note, Selector},
};

/// Notes copied from the score, with the places they were copied from.
///
/// Tuplet markers survive only for tuplets copied as a whole.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PasteBuffer {
    notes: Vec<(Selector, Note)>,
}

/// Piece of the buffer, pasted at once.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum PasteUnit {
    Note(Note),
    Tuplet(Vec<Note>),
}

impl PasteBuffer {
    pub fn new(notes: Vec<(Selector, Note)>) -> Self {
        Self { notes }
    }

    /// Copy notes of one voice from `from` to `to` inclusive, crossing
    /// barlines.
    pub fn copy(
        score: &Score,
        from: &Selector,
        to: &Selector,
    ) -> ScoreResult<Self> {
        if from.staff != to.staff
            || from.voice != to.voice
            || to.compare(from).is_lt()
        {
            return Err(ScoreError::OutOfRange(*to));
        }
        let last = Selector {
            pitch_index: None,
            ..*to
        };
        let mut selector = Selector {
            pitch_index: None,
            ..*from
        };
        let mut notes = vec![(selector, score.note_at(&selector)?.clone())];
        while selector < last {
            selector = match score.next_note_selection(&selector) {
                Ok(next) if next <= last => next,
                _ => break,
            };
            notes.push((selector, score.note_at(&selector)?.clone()));
        }
        let mut buffer = Self { notes };
        buffer.strip_partial_tuplets(score);
        debug!("copied {} notes from {from} to {to}", buffer.len());
        Ok(buffer)
    }

    /// Forget tuplet markers of tuplets, which are not copied entirely.
    fn strip_partial_tuplets(&mut self, score: &Score) {
        let copied = self
            .notes
            .iter()
            .map(|(selector, _)| *selector)
            .collect::<Vec<_>>();
        for (selector, note) in self.notes.iter_mut() {
            let Some(id) = note.tuplet else {
                continue;
            };
            let complete = score
                .measure_at(selector)
                .ok()
                .and_then(|measure| measure.tuplet(id))
                .is_some_and(|tuplet| {
                    tuplet.note_range().all(|idx| {
                        copied.contains(&selector.with_tick(idx))
                    })
                });
            if !complete {
                note.tuplet = None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
    pub fn len(&self) -> usize {
        self.notes.len()
    }
    pub fn notes(&self) -> &[(Selector, Note)] {
        &self.notes
    }
    pub fn total_ticks(&self) -> u64 {
        self.notes.iter().map(|(_, note)| note.ticks()).sum()
    }

    /// Notes grouped into units: consecutive notes of the same tuplet
    /// stick together.
    pub(crate) fn units(&self) -> Vec<PasteUnit> {
        let groups = self.notes.iter().group_by(|(selector, note)| {
            note.tuplet
                .map(|id| (selector.staff, selector.measure, selector.voice, id))
        });
        let units: Vec<_> = groups
            .into_iter()
            .flat_map(|(key, group)| {
                let notes = group.map(|(_, note)| note.clone());
                match key {
                    Some(_) => vec![PasteUnit::Tuplet(notes.collect())],
                    None => notes.map(PasteUnit::Note).collect(),
                }
            })
            .collect();
        units
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dom::{Score, Staff},
        error::ScoreError,
        primitives::{Duration, Measure, Note, Selector, TimeSignature, Tuplet},
    };

    use super::{PasteBuffer, PasteUnit};

    /// Quarter, triplet of eighths, quarter, then 4 quarters.
    fn score() -> Score {
        let rest = |t: u64| Note::rest(Duration::from_ticks(t));
        let mut m0 = Measure::new(0, TimeSignature::new(4, 4), "c");
        let triplet = [2731, 2731, 2730].map(rest);
        m0.tuplets.push(Tuplet::from_notes(0, 0, 1, &triplet).unwrap());
        m0.voice_mut(0).notes = std::iter::once(rest(4096))
            .chain(triplet.into_iter().map(|n| n.in_tuplet_id(0)))
            .chain([rest(4096), rest(4096)])
            .collect();
        let mut m1 = Measure::new(1, TimeSignature::new(4, 4), "c");
        m1.voice_mut(0).notes = vec![rest(4096); 4];
        let mut staff = Staff::new(0, "");
        staff.measures = vec![m0, m1];
        Score::new(vec![staff])
    }

    #[test]
    fn test_copy_across_barline() {
        let score = score();
        let buffer = PasteBuffer::copy(
            &score,
            &Selector::new(0, 0, 0, 4),
            &Selector::new(0, 1, 0, 1),
        )
        .unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.total_ticks(), 4 * 4096);
        assert_eq!(buffer.notes()[2].0, Selector::new(0, 1, 0, 0));
    }

    #[test]
    fn test_tuplet_units() {
        let score = score();
        let whole = PasteBuffer::copy(
            &score,
            &Selector::new(0, 0, 0, 0),
            &Selector::new(0, 0, 0, 4),
        )
        .unwrap();
        let units = whole.units();
        assert_eq!(units.len(), 3);
        assert!(matches!(&units[1], PasteUnit::Tuplet(notes) if notes.len() == 3));

        let partial = PasteBuffer::copy(
            &score,
            &Selector::new(0, 0, 0, 2),
            &Selector::new(0, 0, 0, 4),
        )
        .unwrap();
        assert!(partial.notes().iter().all(|(_, n)| n.tuplet.is_none()));
        assert_eq!(partial.units().len(), 3);
    }

    #[test]
    fn test_bad_range() {
        let score = score();
        let from = Selector::new(0, 1, 0, 0);
        assert!(matches!(
            PasteBuffer::copy(&score, &from, &Selector::new(0, 0, 0, 1)),
            Err(ScoreError::OutOfRange(_))
        ));
        assert!(PasteBuffer::copy(&score, &from, &from.with_tick(9)).is_ok());
        assert!(PasteBuffer::copy(&score, &from.with_tick(9), &from.with_tick(9)).is_err());
    }
}
