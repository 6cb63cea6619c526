use std::fmt;

/// What was dropped during import.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DiagnosticKind {
    UnmatchedSlurStop,
    RestartedSlur,
    UnclosedSlur,
    UnmatchedTupletStop,
    UnclosedTuplet,
    BeamRunTooLong,
    HairpinWithoutKind,
    UnresolvedHairpin,
    UnclosedHairpin,
    UnplacedDynamic,
    OrphanGraceNote,
}

/// Record of an annotation, that import dropped instead of failing.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Diagnostic {
    pub staff: usize,
    pub measure: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "staff {} measure {}: {:?}: {}",
            self.staff, self.measure, self.kind, self.message
        )
    }
}
