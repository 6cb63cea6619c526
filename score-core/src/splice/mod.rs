//! Copy and paste by whole-measure replacement.
//!
//! [paste] never touches the score: it builds the complete list of
//! replacement measures first, and fails without side effects, if the
//! destination runs out of measures. [paste_into] applies the list.

use std::{collections::HashMap, mem};

use log::debug;

use crate::{
    dom::{Score, Staff},
    error::{ScoreError, ScoreResult},
    primitives::{Duration, Measure, Note, Selector, Tuplet},
};

mod buffer;

pub use buffer::PasteBuffer;
use buffer::PasteUnit;

/// Build replacement measures for pasting `buffer` at `destination`.
///
/// Empty buffer gives no measures.
///
/// # Example
/// ```
/// use score_core::dom::{Score, Staff};
/// use score_core::primitives::{Duration, Measure, Note, Selector, TimeSignature};
/// use score_core::splice::{paste, PasteBuffer};
///
/// let mut measure = Measure::new(0, TimeSignature::new(4, 4), "c");
/// measure.voice_mut(0).notes = vec![Note::rest(Duration::from_ticks(4096)); 4];
/// let mut staff = Staff::new(0, "");
/// staff.measures.push(measure);
/// let score = Score::new(vec![staff]);
///
/// let half = Note::new(Vec::new(), Duration::from_ticks(8192));
/// let buffer = PasteBuffer::new(vec![(Selector::new(0, 0, 0, 0), half)]);
/// let measures = paste(&score, &buffer, &Selector::new(0, 0, 0, 1)).unwrap();
/// let ticks = measures[0].voices[0]
///     .notes
///     .iter()
///     .map(|n| n.ticks())
///     .collect::<Vec<_>>();
/// assert_eq!(ticks, vec![4096, 8192, 4096]);
/// ```
pub fn paste(
    score: &Score,
    buffer: &PasteBuffer,
    destination: &Selector,
) -> ScoreResult<Vec<Measure>> {
    if buffer.is_empty() {
        return Ok(Vec::new());
    }
    let staff = score
        .staff(destination.staff)
        .ok_or(ScoreError::OutOfRange(*destination))?;
    let mut splicer = Splicer::start(staff, destination)?;
    for unit in buffer.units() {
        match unit {
            PasteUnit::Note(note) => splicer.place_note(note)?,
            PasteUnit::Tuplet(notes) => splicer.place_tuplet(notes)?,
        }
    }
    Ok(splicer.finish())
}

/// Paste and substitute the measures, or leave the score as it is.
pub fn paste_into(
    score: &mut Score,
    buffer: &PasteBuffer,
    destination: &Selector,
) -> ScoreResult<()> {
    let measures = paste(score, buffer, destination)?;
    debug!(
        "pasting {} notes at {destination}: {} measures replaced",
        buffer.len(),
        measures.len()
    );
    score.replace_measures(destination.staff, measures)
}

/// Builder of replacement measures for one voice.
#[derive(Debug)]
struct Splicer<'a> {
    staff: &'a Staff,
    voice: usize,
    /// original destination measure, being replaced now
    measure: &'a Measure,
    notes: Vec<Note>,
    tuplets: Vec<Tuplet>,
    /// ticks, occupied by `notes`
    used: u64,
    done: Vec<Measure>,
}
impl<'a> Splicer<'a> {
    /// Begin with the pre-fill: original notes before the destination.
    fn start(staff: &'a Staff, destination: &Selector) -> ScoreResult<Self> {
        let measure = staff
            .measure(destination.measure)
            .ok_or(ScoreError::OutOfRange(*destination))?;
        let voice = destination.voice;
        let original = measure.voice(voice).map_or(&[][..], |v| &v.notes[..]);
        if destination.tick > original.len() {
            return Err(ScoreError::OutOfRange(*destination));
        }
        let tuplets = measure
            .tuplets_in_voice(voice)
            .filter(|t| t.end_index < destination.tick)
            .cloned()
            .collect::<Vec<_>>();
        let notes = original[..destination.tick]
            .iter()
            .map(|note| match note.tuplet {
                Some(id) if tuplets.iter().any(|t| t.id == id) => note.clone(),
                _ => note.without_tuplet(),
            })
            .collect::<Vec<_>>();
        let used = notes.iter().map(|n| n.ticks()).sum();
        debug!(
            "pre-fill of measure {}: {} notes, {used} ticks",
            measure.index,
            notes.len()
        );
        Ok(Self {
            staff,
            voice,
            measure,
            notes,
            tuplets,
            used,
            done: Vec::new(),
        })
    }

    fn remaining(&self) -> u64 {
        self.measure.capacity_ticks().saturating_sub(self.used)
    }

    fn push(&mut self, note: Note) {
        self.used += note.ticks();
        self.notes.push(note);
    }

    /// Tuplet id, free in the measure under construction.
    fn next_tuplet_id(&self) -> u32 {
        self.measure
            .tuplets
            .iter()
            .filter(|t| t.voice != self.voice)
            .chain(self.tuplets.iter())
            .map(|t| t.id + 1)
            .max()
            .unwrap_or(0)
    }

    /// Close the current measure and continue into the next one.
    fn advance(&mut self) -> ScoreResult<()> {
        let next = self.measure.index + 1;
        let following = self
            .staff
            .measure(next)
            .ok_or(ScoreError::DestinationExhausted { measure: next })?;
        let notes = mem::take(&mut self.notes);
        let tuplets = mem::take(&mut self.tuplets);
        self.done
            .push(self.measure.with_voice(self.voice, notes, tuplets));
        self.measure = following;
        self.used = 0;
        Ok(())
    }

    /// Append a plain note, splitting it at the barline if needed.
    fn place_note(&mut self, note: Note) -> ScoreResult<()> {
        let mut note = note.without_tuplet();
        loop {
            if self.remaining() == 0 {
                self.advance()?;
            }
            let remaining = self.remaining();
            if note.ticks() <= remaining {
                self.push(note);
                return Ok(());
            }
            let (head, tail) = note.split(remaining)?;
            self.push(head);
            note = tail;
        }
    }

    /// Append tuplet as a whole, re-deriving its ratio map from the
    /// pasted notes.
    ///
    /// When it does not fit, only its first note is kept, truncated to the
    /// rest of the measure, and the tuplet ticks left are carried over as
    /// one note.
    fn place_tuplet(&mut self, notes: Vec<Note>) -> ScoreResult<()> {
        let Some(first) = notes.first() else {
            return Ok(());
        };
        if self.remaining() == 0 {
            self.advance()?;
        }
        let remaining = self.remaining();
        let total = notes.iter().map(|n| n.ticks()).sum::<u64>();
        if total <= remaining {
            let id = self.next_tuplet_id();
            let start = self.notes.len();
            let pasted = notes
                .iter()
                .map(|n| n.in_tuplet_id(id))
                .collect::<Vec<_>>();
            if let Some(tuplet) =
                Tuplet::from_notes(id, self.voice, start, &pasted)
            {
                self.tuplets.push(tuplet);
            }
            for note in pasted {
                self.push(note);
            }
            return Ok(());
        }
        debug!(
            "tuplet of {total} ticks overflows measure {} by {}",
            self.measure.index,
            total - remaining
        );
        // TODO: tie the truncated note to the carried one.
        let carried = first.tail_fragment(total - remaining);
        self.push(
            first
                .without_tuplet()
                .with_duration(Duration::notated(remaining)),
        );
        self.place_note(carried)
    }

    /// Fill the rest of the last measure with its original content, from
    /// the tick where pasting stopped.
    fn post_fill(&mut self) {
        let measure = self.measure;
        let Some(voice) = measure.voice(self.voice) else {
            return;
        };
        let map = voice.tick_map();
        let first_whole = match map.duration_at(self.used) {
            Ok(idx) => idx,
            Err(_) => match map.index_containing(self.used) {
                Some(idx) => {
                    let end = map.end_of(idx).unwrap_or(map.total_duration);
                    let fragment =
                        voice.notes[idx].tail_fragment(end - self.used);
                    self.push(fragment);
                    idx + 1
                }
                None => return,
            },
        };
        let mut relocated = HashMap::new();
        for (idx, note) in voice.notes.iter().enumerate().skip(first_whole) {
            let kept = note.tuplet.and_then(|id| {
                let tuplet = measure.tuplet(id)?;
                if tuplet.start_index < first_whole {
                    return None;
                }
                if tuplet.start_index == idx {
                    let new_id = self.next_tuplet_id();
                    self.tuplets
                        .push(tuplet.relocated(new_id, self.notes.len()));
                    relocated.insert(id, new_id);
                }
                relocated.get(&id).copied()
            });
            let note = match kept {
                Some(id) => note.in_tuplet_id(id),
                None => note.without_tuplet(),
            };
            self.push(note);
        }
    }

    fn finish(mut self) -> Vec<Measure> {
        self.post_fill();
        let notes = mem::take(&mut self.notes);
        let tuplets = mem::take(&mut self.tuplets);
        self.done
            .push(self.measure.with_voice(self.voice, notes, tuplets));
        self.done
    }
}
