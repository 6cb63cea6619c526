//! A smallest piece of music, that is held by Voice.
use serde::{Deserialize, Serialize};

use crate::error::ScoreResult;

use super::{Duration, NoteModifier, Pitch};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum NoteType {
    #[default]
    Note,
    Rest,
}

/// Note, chord or rest.
///
/// A Note is never edited in place by structural algorithms: they build a
/// new one with [Note::with_duration] or [Note::split] and replace the whole
/// voice.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub duration: Duration,
    pub pitches: Vec<Pitch>,
    pub note_type: NoteType,
    #[serde(default)]
    pub end_beam: bool,
    /// id of the measure tuplet this note belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuplet: Option<u32>,
    #[serde(default)]
    pub modifiers: Vec<NoteModifier>,
}
impl Note {
    pub fn new(pitches: Vec<Pitch>, duration: Duration) -> Self {
        Self {
            duration,
            pitches,
            note_type: NoteType::Note,
            end_beam: false,
            tuplet: None,
            modifiers: Vec::new(),
        }
    }
    pub fn rest(duration: Duration) -> Self {
        Self {
            note_type: NoteType::Rest,
            ..Self::new(Vec::new(), duration)
        }
    }

    pub fn ticks(&self) -> u64 {
        self.duration.ticks()
    }
    pub fn is_rest(&self) -> bool {
        self.note_type == NoteType::Rest
    }
    pub fn in_tuplet(&self) -> bool {
        self.tuplet.is_some()
    }

    /// Copy of the note with another duration.
    pub fn with_duration(&self, duration: Duration) -> Self {
        Self {
            duration,
            ..self.clone()
        }
    }
    /// Copy of the note, detached from any tuplet.
    pub fn without_tuplet(&self) -> Self {
        Self {
            tuplet: None,
            ..self.clone()
        }
    }
    /// Copy of the note with the given tuplet marker.
    pub fn in_tuplet_id(&self, id: u32) -> Self {
        Self {
            tuplet: Some(id),
            ..self.clone()
        }
    }

    /// Split note at `at` ticks.
    ///
    /// The head keeps modifiers, the tail is a bare continuation of the
    /// same pitches. Both halves are materialized with
    /// [Duration::notated], so no tick is lost. Neither half belongs to a
    /// tuplet.
    ///
    /// # Example
    /// ```
    /// # use score_core::primitives::{Duration, Note, Pitch, NoteModifier};
    /// let mut note = Note::new(vec![Pitch::from_midi(60, None)], Duration::from_ticks(6144));
    /// note.modifiers.push(NoteModifier::Articulation { name: "accent".into() });
    /// let (head, tail) = note.split(4096).unwrap();
    /// assert_eq!(head.ticks(), 4096);
    /// assert_eq!(tail.ticks(), 2048);
    /// assert_eq!(head.modifiers.len(), 1);
    /// assert!(tail.modifiers.is_empty());
    /// ```
    pub fn split(&self, at: u64) -> ScoreResult<(Self, Self)> {
        let (head, tail) = self.duration.split(at)?;
        let head = Self {
            duration: Duration::notated(head.ticks()),
            tuplet: None,
            end_beam: false,
            ..self.clone()
        };
        let tail = Self {
            duration: Duration::notated(tail.ticks()),
            tuplet: None,
            modifiers: Vec::new(),
            ..self.clone()
        };
        Ok((head, tail))
    }

    /// Tail fragment of `ticks` length, as left after splitting.
    pub fn tail_fragment(&self, ticks: u64) -> Self {
        Self {
            duration: Duration::notated(ticks),
            tuplet: None,
            modifiers: Vec::new(),
            ..self.clone()
        }
    }
}
