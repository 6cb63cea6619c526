//! Raw elements, fed to the import state machine in document order.

use crate::primitives::{
    Duration, HairpinKind, NoteModifier, Pitch, TimeSignature,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StartStop {
    Start,
    Stop,
}

/// Numbered start or stop of a slur or a tuplet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SpanMarker {
    pub number: u32,
    pub kind: StartStop,
}
impl SpanMarker {
    pub fn start(number: u32) -> Self {
        Self {
            number,
            kind: StartStop::Start,
        }
    }
    pub fn stop(number: u32) -> Self {
        Self {
            number,
            kind: StartStop::Stop,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BeamMarker {
    Begin,
    Continue,
    End,
}

/// Wedge token. Start and stop tokens are symmetric: whichever comes
/// while no wedge is open, opens one.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WedgeMarker {
    Crescendo,
    Decrescendo,
    Stop,
}
impl WedgeMarker {
    pub fn kind(&self) -> Option<HairpinKind> {
        match self {
            Self::Crescendo => Some(HairpinKind::Crescendo),
            Self::Decrescendo => Some(HairpinKind::Decrescendo),
            Self::Stop => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct NoteElement {
    pub voice: usize,
    pub pitches: Vec<Pitch>,
    pub duration: Duration,
    pub rest: bool,
    pub grace: bool,
    pub slurs: Vec<SpanMarker>,
    pub tuplets: Vec<SpanMarker>,
    pub beam: Option<BeamMarker>,
    /// articulations, ornaments, lyrics and chord symbols
    pub modifiers: Vec<NoteModifier>,
}
impl NoteElement {
    pub fn note(pitches: Vec<Pitch>, ticks: u64) -> Self {
        Self {
            voice: 0,
            pitches,
            duration: Duration::from_ticks(ticks),
            rest: false,
            grace: false,
            slurs: Vec::new(),
            tuplets: Vec::new(),
            beam: None,
            modifiers: Vec::new(),
        }
    }
    pub fn rest(ticks: u64) -> Self {
        Self {
            rest: true,
            ..Self::note(Vec::new(), ticks)
        }
    }
    pub fn grace(pitches: Vec<Pitch>, ticks: u64) -> Self {
        Self {
            grace: true,
            ..Self::note(pitches, ticks)
        }
    }
    pub fn in_voice(mut self, voice: usize) -> Self {
        self.voice = voice;
        self
    }
    pub fn with_slur(mut self, marker: SpanMarker) -> Self {
        self.slurs.push(marker);
        self
    }
    pub fn with_tuplet(mut self, marker: SpanMarker) -> Self {
        self.tuplets.push(marker);
        self
    }
    pub fn with_beam(mut self, marker: BeamMarker) -> Self {
        self.beam = Some(marker);
        self
    }
    pub fn with_modifier(mut self, modifier: NoteModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct DirectionElement {
    pub wedge: Option<WedgeMarker>,
    pub dynamics: Option<String>,
    /// ticks from the current cursor, where the direction applies
    pub offset: i64,
}
impl DirectionElement {
    pub fn wedge(marker: WedgeMarker) -> Self {
        Self {
            wedge: Some(marker),
            ..Default::default()
        }
    }
    pub fn dynamics(text: impl Into<String>, offset: i64) -> Self {
        Self {
            dynamics: Some(text.into()),
            offset,
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ImportElement {
    Attributes {
        time_signature: Option<TimeSignature>,
        key_signature: Option<String>,
    },
    Note(NoteElement),
    Direction(DirectionElement),
}
impl From<NoteElement> for ImportElement {
    fn from(value: NoteElement) -> Self {
        Self::Note(value)
    }
}
impl From<DirectionElement> for ImportElement {
    fn from(value: DirectionElement) -> Self {
        Self::Direction(value)
    }
}

/// One part of the source: elements grouped by measure.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PartElements {
    pub name: String,
    pub measures: Vec<Vec<ImportElement>>,
}
