use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl NoteName {
    /// semitones above C
    pub fn semitone(&self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }
    pub fn from_step(step: &str) -> Option<Self> {
        match step.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            "G" => Some(Self::G),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default, Serialize, Deserialize,
)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    #[default]
    Natural,
    Sharp,
    DoubleSharp,
}
impl Accidental {
    pub fn from_alter(alter: i32) -> Option<Self> {
        match alter {
            -2 => Some(Self::DoubleFlat),
            -1 => Some(Self::Flat),
            0 => Some(Self::Natural),
            1 => Some(Self::Sharp),
            2 => Some(Self::DoubleSharp),
            _ => None,
        }
    }
    pub fn alter(&self) -> i32 {
        match self {
            Self::DoubleFlat => -2,
            Self::Flat => -1,
            Self::Natural => 0,
            Self::Sharp => 1,
            Self::DoubleSharp => 2,
        }
    }
}

/// Spelled pitch. Octave 4 holds the middle C.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub struct Pitch {
    pub letter: NoteName,
    pub accidental: Accidental,
    pub octave: i8,
}
impl Pitch {
    pub fn new(letter: NoteName, accidental: Accidental, octave: i8) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    /// Spell midi note number, preferring sharps unless flat is asked.
    pub fn from_midi(midi: u8, accidental: Option<Accidental>) -> Self {
        let octave = (midi / 12) as i8 - 1;
        let (letter, acc) = match (midi % 12, accidental) {
            (0, _) => (NoteName::C, Accidental::Natural),
            (1, Some(Accidental::Flat)) => (NoteName::D, Accidental::Flat),
            (1, _) => (NoteName::C, Accidental::Sharp),
            (2, _) => (NoteName::D, Accidental::Natural),
            (3, Some(Accidental::Flat)) => (NoteName::E, Accidental::Flat),
            (3, _) => (NoteName::D, Accidental::Sharp),
            (4, _) => (NoteName::E, Accidental::Natural),
            (5, _) => (NoteName::F, Accidental::Natural),
            (6, Some(Accidental::Flat)) => (NoteName::G, Accidental::Flat),
            (6, _) => (NoteName::F, Accidental::Sharp),
            (7, _) => (NoteName::G, Accidental::Natural),
            (8, Some(Accidental::Flat)) => (NoteName::A, Accidental::Flat),
            (8, _) => (NoteName::G, Accidental::Sharp),
            (9, _) => (NoteName::A, Accidental::Natural),
            (10, Some(Accidental::Flat)) => (NoteName::B, Accidental::Flat),
            (10, _) => (NoteName::A, Accidental::Sharp),
            _ => (NoteName::B, Accidental::Natural),
        };
        Self::new(letter, acc, octave)
    }

    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12
            + self.letter.semitone()
            + self.accidental.alter()
    }
}
impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let acc = match self.accidental {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        };
        write!(f, "{:?}{}{}", self.letter, acc, self.octave)
    }
}
