//! Building the Timeline from a stream of source elements.
//!
//! The source is read part by part, measure by measure. Spanning
//! annotations are resolved by [ImportState]; parts are independent, and
//! each becomes one [Staff](crate::dom::Staff).

use log::debug;

use crate::{
    dom::{Score, Staff},
    settings::ImportSettings,
};

pub mod diagnostics;
pub mod element;
pub mod musicxml;
pub mod state;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use element::{
    BeamMarker, DirectionElement, ImportElement, NoteElement, PartElements,
    SpanMarker, StartStop, WedgeMarker,
};
pub use musicxml::{import_musicxml, parse_musicxml};
pub use state::ImportState;

/// Imported score, together with everything that was dropped on the way.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ImportResult {
    pub score: Score,
    pub diagnostics: Vec<Diagnostic>,
}

/// Import one part as the staff `staff`.
pub fn import_part(
    staff: usize,
    part: PartElements,
    settings: &ImportSettings,
) -> (Staff, Vec<Diagnostic>) {
    debug!(
        "importing part {:?} with {} measures as staff {staff}",
        part.name,
        part.measures.len()
    );
    let mut state = ImportState::new(staff, part.name, settings);
    for measure in part.measures {
        for element in measure {
            state.process(element);
        }
        state.end_measure();
    }
    state.finish()
}

/// Import all parts, staff index follows the order of parts.
///
/// # Example
/// ```
/// use score_core::import::{import_score, NoteElement, PartElements};
/// use score_core::settings::ImportSettings;
///
/// let part = PartElements {
///     name: "violin".into(),
///     measures: vec![vec![NoteElement::rest(16384).into()]; 2],
/// };
/// let result = import_score(vec![part], &ImportSettings::default());
/// assert_eq!(result.score.staves[0].measures.len(), 2);
/// assert!(result.diagnostics.is_empty());
/// ```
pub fn import_score(
    parts: Vec<PartElements>,
    settings: &ImportSettings,
) -> ImportResult {
    let mut result = ImportResult::default();
    for (idx, part) in parts.into_iter().enumerate() {
        let (staff, diagnostics) = import_part(idx, part, settings);
        result.score.staves.push(staff);
        result.diagnostics.extend(diagnostics);
    }
    result
}

impl From<ImportResult> for Score {
    fn from(value: ImportResult) -> Self {
        value.score
    }
}
