//! Closed sets of note-level and staff-level modifiers.
//!
//! Both are serialized with a `ctor` tag naming the variant.

use serde::{Deserialize, Serialize};

use super::{Duration, Pitch, Selector};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum HairpinKind {
    Crescendo,
    Decrescendo,
}

/// Owned by a single note.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "ctor")]
pub enum NoteModifier {
    Articulation { name: String },
    Ornament { name: String },
    Lyric { verse: u32, text: String },
    ChordSymbol { text: String },
    Dynamic { text: String },
    GraceNote { pitches: Vec<Pitch>, duration: Duration },
}
/// Owned by a staff, because its endpoints may live in different measures.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "ctor")]
pub enum StaffModifier {
    #[serde(rename_all = "camelCase")]
    Slur {
        start_selector: Selector,
        end_selector: Selector,
    },
    #[serde(rename_all = "camelCase")]
    Hairpin {
        kind: HairpinKind,
        start_selector: Selector,
        end_selector: Selector,
    },
}
impl StaffModifier {
    pub fn start_selector(&self) -> &Selector {
        match self {
            Self::Slur { start_selector, .. } => start_selector,
            Self::Hairpin { start_selector, .. } => start_selector,
        }
    }
    pub fn end_selector(&self) -> &Selector {
        match self {
            Self::Slur { end_selector, .. } => end_selector,
            Self::Hairpin { end_selector, .. } => end_selector,
        }
    }
    pub fn selectors_mut(&mut self) -> (&mut Selector, &mut Selector) {
        match self {
            Self::Slur {
                start_selector,
                end_selector,
            }
            | Self::Hairpin {
                start_selector,
                end_selector,
                ..
            } => (start_selector, end_selector),
        }
    }
    /// True if any endpoint lies in one of the given measures.
    pub fn touches_measures(&self, measures: &[usize]) -> bool {
        measures.contains(&self.start_selector().measure)
            || measures.contains(&self.end_selector().measure)
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::Selector;

    use super::{HairpinKind, StaffModifier};

    #[test]
    fn tagged_serialization() {
        let slur = StaffModifier::Slur {
            start_selector: Selector::new(0, 0, 0, 2),
            end_selector: Selector::new(0, 1, 0, 0),
        };
        let json = serde_json::to_string(&slur).unwrap();
        assert!(json.starts_with(r#"{"ctor":"Slur","startSelector":"#));
        let back: StaffModifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slur);

        let hairpin = StaffModifier::Hairpin {
            kind: HairpinKind::Decrescendo,
            start_selector: Selector::new(0, 3, 0, 0),
            end_selector: Selector::new(0, 3, 0, 2),
        };
        assert!(hairpin.touches_measures(&[3]));
        assert!(!hairpin.touches_measures(&[0, 1]));
    }
}
