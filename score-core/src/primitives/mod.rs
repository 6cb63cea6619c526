//! Elements, from which the Timeline is constructed.
//!
//! Every length is counted in ticks: a [Duration] resolves to a whole
//! number of them. Notes live in voices, voices in measures, and a
//! [TickMap] indexes one voice of one measure by cumulative duration.
//! Anything inside a score is addressed by [Selector], never by reference.

pub mod duration;
pub mod fraction_tools;
pub mod measure;
pub mod modifier;
pub mod note;
pub mod pitch;
pub mod selector;
pub mod tick_map;
pub mod time_signature;
pub mod tuplet;

pub use duration::Duration;
pub use measure::{Measure, Voice};
pub use modifier::{HairpinKind, NoteModifier, StaffModifier};
pub use note::{Note, NoteType};
pub use pitch::{Accidental, NoteName, Pitch};
pub use selector::Selector;
pub use tick_map::TickMap;
pub use time_signature::TimeSignature;
pub use tuplet::Tuplet;

/// Ticks in a whole note.
pub const TICKS_PER_WHOLE: u64 = 16384;
/// Ticks in a quarter note.
pub const TICKS_PER_QUARTER: u64 = TICKS_PER_WHOLE / 4;
