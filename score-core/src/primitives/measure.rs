//! Measure contains voices, and voices contain notes.
//!
//! Measures are replaced as a whole by structural edits. That keeps
//! [TickMap]s and [Selector](super::Selector)s trivial to derive again:
//! they are never patched, only rebuilt.

use log::warn;
use serde::{Deserialize, Serialize};

use super::{Note, TickMap, TimeSignature, Tuplet};

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    pub notes: Vec<Note>,
}
impl Voice {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }
    pub fn tick_map(&self) -> TickMap {
        TickMap::build(self)
    }
    pub fn total_ticks(&self) -> u64 {
        self.notes.iter().map(|n| n.ticks()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    /// position of the measure in the staff (0-based)
    pub index: usize,
    /// system (line) the measure is laid out on
    pub line: usize,
    pub time_signature: TimeSignature,
    pub key_signature: String,
    pub voices: Vec<Voice>,
    #[serde(default)]
    pub tuplets: Vec<Tuplet>,
}
impl Measure {
    pub fn new(
        index: usize,
        time_signature: TimeSignature,
        key_signature: impl Into<String>,
    ) -> Self {
        Self {
            index,
            line: 0,
            time_signature,
            key_signature: key_signature.into(),
            voices: vec![Voice::default()],
            tuplets: Vec::new(),
        }
    }

    pub fn capacity_ticks(&self) -> u64 {
        self.time_signature.capacity_ticks()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }
    /// Get voice, creating empty voices up to it.
    pub fn voice_mut(&mut self, index: usize) -> &mut Voice {
        if self.voices.len() <= index {
            self.voices.resize_with(index + 1, Voice::default);
        }
        &mut self.voices[index]
    }

    pub fn tick_map(&self, voice: usize) -> Option<TickMap> {
        Some(self.voice(voice)?.tick_map())
    }

    pub fn tuplets_in_voice(
        &self,
        voice: usize,
    ) -> impl Iterator<Item = &Tuplet> {
        self.tuplets.iter().filter(move |t| t.voice == voice)
    }
    pub fn tuplet(&self, id: u32) -> Option<&Tuplet> {
        self.tuplets.iter().find(|t| t.id == id)
    }
    /// Tuplet, holding note at `index` of `voice`.
    pub fn tuplet_at(&self, voice: usize, index: usize) -> Option<&Tuplet> {
        self.tuplets.iter().find(|t| t.contains(voice, index))
    }
    pub fn next_tuplet_id(&self) -> u32 {
        self.tuplets.iter().map(|t| t.id + 1).max().unwrap_or(0)
    }

    /// Check, that every voice fills the time signature.
    ///
    /// Partially entered measures are allowed, so this only warns.
    pub fn check_capacity(&self) -> bool {
        let capacity = self.capacity_ticks();
        let mut complete = true;
        for (idx, voice) in self.voices.iter().enumerate() {
            let total = voice.total_ticks();
            if total != capacity {
                warn!(
                    "measure {} voice {idx} holds {total} ticks of {capacity}",
                    self.index
                );
                complete = false;
            }
        }
        complete
    }

    /// Copy of the measure, where one voice and its tuplets are replaced.
    pub fn with_voice(
        &self,
        voice: usize,
        notes: Vec<Note>,
        tuplets: Vec<Tuplet>,
    ) -> Self {
        let mut measure = self.clone();
        measure.voice_mut(voice).notes = notes;
        measure.tuplets.retain(|t| t.voice != voice);
        measure.tuplets.extend(tuplets);
        measure.tuplets.sort_by_key(|t| (t.voice, t.start_index));
        measure
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::{Duration, Note, TimeSignature, Tuplet};

    use super::Measure;

    fn quarters(n: usize) -> Vec<Note> {
        (0..n)
            .map(|_| Note::rest(Duration::from_ticks(4096)))
            .collect()
    }

    #[test]
    fn test_capacity() {
        let mut measure = Measure::new(2, TimeSignature::new(3, 4), "c");
        measure.voice_mut(0).notes = quarters(3);
        assert!(measure.check_capacity());
        measure.voice_mut(1).notes = quarters(2);
        assert_eq!(measure.voices.len(), 2);
        assert!(!measure.check_capacity());
    }

    #[test]
    fn test_with_voice() {
        let mut measure = Measure::new(0, TimeSignature::new(4, 4), "c");
        measure.voice_mut(0).notes = quarters(4);
        measure.voice_mut(1).notes = quarters(4);
        let tuplet = Tuplet::from_notes(0, 1, 0, &quarters(2)).unwrap();
        measure.tuplets.push(tuplet.clone());
        measure
            .tuplets
            .push(Tuplet::from_notes(1, 0, 1, &quarters(2)).unwrap());
        assert_eq!(measure.next_tuplet_id(), 2);

        let replaced = measure.with_voice(0, quarters(2), Vec::new());
        assert_eq!(replaced.voices[0].notes.len(), 2);
        assert_eq!(replaced.voices[1], measure.voices[1]);
        assert_eq!(replaced.tuplets, vec![tuplet]);
        assert_eq!(replaced.tuplet_at(1, 1).map(|t| t.id), Some(0));
        assert!(replaced.tuplet_at(0, 1).is_none());
        // original is untouched
        assert_eq!(measure.voices[0].notes.len(), 4);
    }
}
