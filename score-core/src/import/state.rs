//! Deferred resolution of spanning annotations.
//!
//! Slurs, tuplets, beams and wedges are announced by start and stop
//! markers, that arrive at different notes, sometimes in different
//! measures. [ImportState] keeps them pending until both ends are known
//! and only then puts them into the Timeline. Whatever can not be matched
//! is dropped with a [Diagnostic]: a single bad annotation never aborts
//! the import.

use std::{collections::BTreeMap, mem};

use log::{debug, warn};

use crate::{
    dom::Staff,
    primitives::{
        HairpinKind, Measure, Note, NoteModifier, Selector, StaffModifier,
        TickMap, TimeSignature, Tuplet,
    },
    settings::ImportSettings,
};

use super::{
    diagnostics::{Diagnostic, DiagnosticKind},
    element::{
        BeamMarker, DirectionElement, ImportElement, NoteElement, StartStop,
    },
};

#[derive(Debug, Clone, Copy)]
struct PendingTuplet {
    voice: usize,
    start_index: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingWedge {
    kind: Option<HairpinKind>,
    start: u64,
}

/// Wedge with both ends known, in global tick space.
#[derive(Debug, Clone, Copy)]
struct CompletedWedge {
    kind: Option<HairpinKind>,
    start: u64,
    end: u64,
}

#[derive(Debug, Clone)]
struct PendingDynamic {
    text: String,
    at: u64,
}

/// Import state of one part (staff).
///
/// Feed every element of a measure with [ImportState::process], close the
/// measure with [ImportState::end_measure], and take the result with
/// [ImportState::finish].
///
/// # Example
/// ```
/// use score_core::import::{ImportState, NoteElement, SpanMarker};
/// use score_core::settings::ImportSettings;
///
/// let mut state = ImportState::new(0, "flute", &ImportSettings::default());
/// state.process(NoteElement::rest(8192).with_slur(SpanMarker::start(1)).into());
/// state.process(NoteElement::rest(8192).with_slur(SpanMarker::stop(1)).into());
/// state.end_measure();
/// let (staff, diagnostics) = state.finish();
/// assert_eq!(staff.measures.len(), 1);
/// assert_eq!(staff.modifiers.len(), 1);
/// assert!(diagnostics.is_empty());
/// ```
#[derive(Debug)]
pub struct ImportState {
    staff: usize,
    name: String,
    settings: ImportSettings,
    time_signature: TimeSignature,
    key_signature: String,
    /// measure under construction
    measure: Measure,
    /// global tick cursor at the start of the current measure
    measure_start: u64,
    voice_ticks: BTreeMap<usize, u64>,
    current_voice: usize,
    pending_slurs: BTreeMap<u32, Selector>,
    pending_tuplets: BTreeMap<u32, PendingTuplet>,
    beam_runs: BTreeMap<usize, usize>,
    open_wedge: Option<PendingWedge>,
    completed_wedges: Vec<CompletedWedge>,
    pending_dynamics: Vec<PendingDynamic>,
    pending_graces: BTreeMap<usize, Vec<NoteModifier>>,
    measures: Vec<Measure>,
    modifiers: Vec<StaffModifier>,
    diagnostics: Vec<Diagnostic>,
}
impl ImportState {
    pub fn new(
        staff: usize,
        name: impl Into<String>,
        settings: &ImportSettings,
    ) -> Self {
        let mut measure = Measure::new(
            0,
            settings.time_signature,
            settings.key_signature.clone(),
        );
        measure.line = settings.line_of(0);
        Self {
            staff,
            name: name.into(),
            settings: settings.clone(),
            time_signature: settings.time_signature,
            key_signature: settings.key_signature.clone(),
            measure,
            measure_start: 0,
            voice_ticks: BTreeMap::new(),
            current_voice: 0,
            pending_slurs: BTreeMap::new(),
            pending_tuplets: BTreeMap::new(),
            beam_runs: BTreeMap::new(),
            open_wedge: None,
            completed_wedges: Vec::new(),
            pending_dynamics: Vec::new(),
            pending_graces: BTreeMap::new(),
            measures: Vec::new(),
            modifiers: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Global tick cursor: accumulated over all measures of the part.
    pub fn tick_cursor(&self) -> u64 {
        self.measure_start + self.voice_position(self.current_voice)
    }
    pub fn current_measure(&self) -> &Measure {
        &self.measure
    }
    pub fn modifiers(&self) -> &[StaffModifier] {
        &self.modifiers
    }
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn voice_position(&self, voice: usize) -> u64 {
        self.voice_ticks.get(&voice).copied().unwrap_or(0)
    }

    fn diagnose(
        &mut self,
        measure: usize,
        kind: DiagnosticKind,
        message: String,
    ) {
        let diagnostic = Diagnostic {
            staff: self.staff,
            measure,
            kind,
            message,
        };
        warn!("import: {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn process(&mut self, element: ImportElement) {
        match element {
            ImportElement::Attributes {
                time_signature,
                key_signature,
            } => {
                if let Some(time_signature) = time_signature {
                    self.time_signature = time_signature;
                    self.measure.time_signature = time_signature;
                }
                if let Some(key_signature) = key_signature {
                    self.key_signature = key_signature.clone();
                    self.measure.key_signature = key_signature;
                }
            }
            ImportElement::Note(note) => self.process_note(note),
            ImportElement::Direction(direction) => {
                self.process_direction(direction)
            }
        }
    }

    fn process_note(&mut self, element: NoteElement) {
        let voice = element.voice;
        self.current_voice = voice;
        // grace notes never enter the voice, so they stay out of beam runs
        if element.grace {
            match self.settings.keep_grace_notes {
                true => self.pending_graces.entry(voice).or_default().push(
                    NoteModifier::GraceNote {
                        pitches: element.pitches,
                        duration: element.duration,
                    },
                ),
                false => debug!("skipping grace note in voice {voice}"),
            }
            return;
        }

        let index = self.measure.voice_mut(voice).notes.len();
        let selector = Selector::new(self.staff, self.measure.index, voice, index);
        let start = self.measure_start + self.voice_position(voice);

        let mut note = match element.rest {
            true => Note::rest(element.duration),
            false => Note::new(element.pitches, element.duration),
        };
        if let Some(graces) = self.pending_graces.remove(&voice) {
            note.modifiers.extend(graces);
        }
        note.modifiers.extend(element.modifiers);
        self.place_dynamics(&mut note, start);
        *self.voice_ticks.entry(voice).or_insert(0) += note.ticks();
        self.measure.voice_mut(voice).notes.push(note);

        // a note may close one slur and open the next one with the same
        // number
        for marker in element.slurs.iter().filter(|m| m.kind == StartStop::Stop)
        {
            self.stop_slur(marker.number, selector);
        }
        for marker in
            element.slurs.iter().filter(|m| m.kind == StartStop::Start)
        {
            self.start_slur(marker.number, selector);
        }
        // while a single-note tuplet starts and stops on the same note
        for marker in
            element.tuplets.iter().filter(|m| m.kind == StartStop::Start)
        {
            self.start_tuplet(marker.number, voice, index);
        }
        for marker in
            element.tuplets.iter().filter(|m| m.kind == StartStop::Stop)
        {
            self.stop_tuplet(marker.number, voice, index);
        }
        self.count_beam(voice, element.beam);
    }

    /// Attach every waiting dynamics, whose tick is already reached.
    fn place_dynamics(&mut self, note: &mut Note, start: u64) {
        let (ready, waiting): (Vec<_>, Vec<_>) = mem::take(
            &mut self.pending_dynamics,
        )
        .into_iter()
        .partition(|dynamic| dynamic.at <= start);
        self.pending_dynamics = waiting;
        note.modifiers.extend(
            ready
                .into_iter()
                .map(|dynamic| NoteModifier::Dynamic { text: dynamic.text }),
        );
    }

    fn start_slur(&mut self, number: u32, selector: Selector) {
        if let Some(old) = self.pending_slurs.insert(number, selector) {
            self.diagnose(
                old.measure,
                DiagnosticKind::RestartedSlur,
                format!("slur {number} started again, dropping start at {old}"),
            );
        }
    }

    fn stop_slur(&mut self, number: u32, selector: Selector) {
        match self.pending_slurs.remove(&number) {
            Some(start) => {
                debug!("slur {number}: {start} -> {selector}");
                self.modifiers.push(StaffModifier::Slur {
                    start_selector: start,
                    end_selector: selector,
                });
            }
            None => self.diagnose(
                selector.measure,
                DiagnosticKind::UnmatchedSlurStop,
                format!("slur {number} stops at {selector}, but never started"),
            ),
        }
    }

    fn start_tuplet(&mut self, number: u32, voice: usize, start_index: usize) {
        let pending = PendingTuplet { voice, start_index };
        if let Some(old) = self.pending_tuplets.insert(number, pending) {
            self.diagnose(
                self.measure.index,
                DiagnosticKind::UnclosedTuplet,
                format!(
                    "tuplet {number} started again, dropping start at note {} \
                    of voice {}",
                    old.start_index, old.voice
                ),
            );
        }
    }

    fn stop_tuplet(&mut self, number: u32, voice: usize, end_index: usize) {
        match self.pending_tuplets.remove(&number) {
            Some(pending)
                if pending.voice == voice
                    && pending.start_index <= end_index =>
            {
                self.backtrack_tuplet(voice, pending.start_index, end_index)
            }
            Some(pending) => self.diagnose(
                self.measure.index,
                DiagnosticKind::UnmatchedTupletStop,
                format!(
                    "tuplet {number} started in voice {}, but stops in voice \
                    {voice}",
                    pending.voice
                ),
            ),
            None => self.diagnose(
                self.measure.index,
                DiagnosticKind::UnmatchedTupletStop,
                format!("tuplet {number} stops, but never started"),
            ),
        }
    }

    /// Walk notes from the tuplet start to its end and derive the tuplet
    /// from their actual durations.
    fn backtrack_tuplet(&mut self, voice: usize, start: usize, end: usize) {
        let id = self.measure.next_tuplet_id();
        let notes = &mut self.measure.voice_mut(voice).notes[start..=end];
        let Some(tuplet) = Tuplet::from_notes(id, voice, start, notes) else {
            return;
        };
        for note in notes.iter_mut() {
            note.tuplet = Some(id);
        }
        debug!(
            "tuplet {id} in measure {}: notes {start}..={end}, map {:?}",
            self.measure.index, tuplet.duration_map
        );
        self.measure.tuplets.push(tuplet);
    }

    fn count_beam(&mut self, voice: usize, marker: Option<BeamMarker>) {
        match marker {
            Some(BeamMarker::Begin) => {
                self.beam_runs.insert(voice, 1);
            }
            Some(BeamMarker::End) => match self.beam_runs.remove(&voice) {
                Some(run) => self.backtrack_beam(voice, run + 1),
                None => debug!("beam end without begin in voice {voice}"),
            },
            Some(BeamMarker::Continue) | None => {
                if let Some(run) = self.beam_runs.get_mut(&voice) {
                    *run += 1;
                }
            }
        }
    }

    /// Walk back over the beam run: the first visited (the latest) note
    /// ends the beam, the others do not.
    fn backtrack_beam(&mut self, voice: usize, run: usize) {
        let available = self.measure.voice(voice).map_or(0, |v| v.notes.len());
        if run > available {
            self.diagnose(
                self.measure.index,
                DiagnosticKind::BeamRunTooLong,
                format!(
                    "beam of {run} notes, but voice {voice} holds {available}"
                ),
            );
            return;
        }
        let notes = &mut self.measure.voice_mut(voice).notes;
        for (visited, note) in notes.iter_mut().rev().take(run).enumerate() {
            note.end_beam = visited == 0;
        }
    }

    fn process_direction(&mut self, direction: DirectionElement) {
        let cursor = self.tick_cursor();
        if let Some(marker) = direction.wedge {
            match self.open_wedge.take() {
                Some(open) => self.completed_wedges.push(CompletedWedge {
                    kind: open.kind.or(marker.kind()),
                    start: open.start,
                    end: cursor,
                }),
                None => {
                    self.open_wedge = Some(PendingWedge {
                        kind: marker.kind(),
                        start: cursor,
                    })
                }
            }
        }
        if let Some(text) = direction.dynamics {
            self.pending_dynamics.push(PendingDynamic {
                text,
                at: cursor.saturating_add_signed(direction.offset),
            });
        }
    }

    /// Close the current measure.
    ///
    /// Resolves the wedges completed in it, drops tuplets left open and
    /// advances the global cursor.
    pub fn end_measure(&mut self) {
        for wedge in mem::take(&mut self.completed_wedges) {
            self.resolve_hairpin(wedge);
        }
        for (number, pending) in mem::take(&mut self.pending_tuplets) {
            self.diagnose(
                self.measure.index,
                DiagnosticKind::UnclosedTuplet,
                format!(
                    "tuplet {number} from note {} of voice {} never stops",
                    pending.start_index, pending.voice
                ),
            );
        }
        if !self.beam_runs.is_empty() {
            debug!(
                "measure {} ends inside beam runs: {:?}",
                self.measure.index, self.beam_runs
            );
            self.beam_runs.clear();
        }
        self.measure.check_capacity();

        let length = match self.measure.tick_map(0) {
            Some(map) if map.total_duration > 0 => map.total_duration,
            _ => self.measure.capacity_ticks(),
        };
        self.measure_start += length;
        let index = self.measure.index + 1;
        let mut next =
            Measure::new(index, self.time_signature, self.key_signature.clone());
        next.line = self.settings.line_of(index);
        let finished = mem::replace(&mut self.measure, next);
        self.measures.push(finished);
        self.voice_ticks.clear();
        self.current_voice = 0;
    }

    /// Find notes of the first voice under the wedge ends and emit the
    /// hairpin, or drop it.
    fn resolve_hairpin(&mut self, wedge: CompletedWedge) {
        let index = self.measure.index;
        let Some(kind) = wedge.kind else {
            self.diagnose(
                index,
                DiagnosticKind::HairpinWithoutKind,
                format!(
                    "wedge {}..{} has neither crescendo nor decrescendo type",
                    wedge.start, wedge.end
                ),
            );
            return;
        };
        let map = self.measure.tick_map(0).unwrap_or_default();
        let found = match wedge.start >= self.measure_start
            && wedge.end >= wedge.start
        {
            true => {
                let start = wedge.start - self.measure_start;
                let end = wedge.end - self.measure_start;
                let last = if end > start { end - 1 } else { start };
                hairpin_window(&map, start, last)
            }
            false => None,
        };
        match found {
            Some((start_index, end_index)) => {
                self.modifiers.push(StaffModifier::Hairpin {
                    kind,
                    start_selector: Selector::new(self.staff, index, 0, start_index),
                    end_selector: Selector::new(self.staff, index, 0, end_index),
                })
            }
            None => self.diagnose(
                index,
                DiagnosticKind::UnresolvedHairpin,
                format!(
                    "no notes of measure {index} under wedge {}..{}",
                    wedge.start, wedge.end
                ),
            ),
        }
    }

    /// Take the resolved staff and the diagnostics.
    ///
    /// Everything still pending is dropped.
    pub fn finish(mut self) -> (Staff, Vec<Diagnostic>) {
        if self.measure.voices.iter().any(|v| !v.is_empty()) {
            self.end_measure();
        }
        let last = self.measures.len().saturating_sub(1);
        for (number, start) in mem::take(&mut self.pending_slurs) {
            self.diagnose(
                start.measure,
                DiagnosticKind::UnclosedSlur,
                format!("slur {number} from {start} never stops"),
            );
        }
        if let Some(wedge) = self.open_wedge.take() {
            self.diagnose(
                last,
                DiagnosticKind::UnclosedHairpin,
                format!("wedge from tick {} never stops", wedge.start),
            );
        }
        for dynamic in mem::take(&mut self.pending_dynamics) {
            self.diagnose(
                last,
                DiagnosticKind::UnplacedDynamic,
                format!(
                    "no note at or after tick {} for {}",
                    dynamic.at, dynamic.text
                ),
            );
        }
        for (voice, graces) in mem::take(&mut self.pending_graces) {
            self.diagnose(
                last,
                DiagnosticKind::OrphanGraceNote,
                format!(
                    "{} grace notes at the end of voice {voice}",
                    graces.len()
                ),
            );
        }
        let staff = Staff {
            staff_id: self.staff,
            name: self.name,
            measures: self.measures,
            modifiers: self.modifiers,
        };
        (staff, self.diagnostics)
    }
}

/// Walk the map backwards, looking for the note under `last` and then for
/// the note under `start`.
fn hairpin_window(map: &TickMap, start: u64, last: u64) -> Option<(usize, usize)> {
    let mut end_index = None;
    for idx in (0..map.len()).rev() {
        let window = map.window(idx)?;
        if end_index.is_none() && window.contains(&last) {
            end_index = Some(idx);
        }
        if window.contains(&start) {
            return end_index.map(|end| (idx, end));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{
        import::{
            diagnostics::DiagnosticKind,
            element::{
                BeamMarker, DirectionElement, NoteElement, SpanMarker,
                WedgeMarker,
            },
        },
        primitives::{HairpinKind, NoteModifier, Selector, StaffModifier},
        settings::ImportSettings,
    };

    use super::ImportState;

    fn state() -> ImportState {
        ImportState::new(0, "", &ImportSettings::default())
    }

    fn quarter() -> NoteElement {
        NoteElement::rest(4096)
    }

    #[test]
    fn tuplet_backtracking() {
        let mut state = state();
        state.process(quarter().into());
        state.process(
            NoteElement::rest(2731)
                .with_tuplet(SpanMarker::start(1))
                .into(),
        );
        state.process(NoteElement::rest(2731).into());
        state.process(
            NoteElement::rest(2730)
                .with_tuplet(SpanMarker::stop(1))
                .into(),
        );
        state.process(quarter().into());
        let measure = state.current_measure();
        assert_eq!(measure.tuplets.len(), 1);
        let tuplet = &measure.tuplets[0];
        assert_eq!(tuplet.note_range(), 1..=3);
        assert_eq!(tuplet.duration_map[..2], [1.0, 1.0]);
        assert!((tuplet.duration_map[2] - 0.9996).abs() < 1e-4);
        let marked = measure.voices[0]
            .notes
            .iter()
            .map(|n| n.tuplet)
            .collect::<Vec<_>>();
        assert_eq!(marked, vec![None, Some(0), Some(0), Some(0), None]);
        state.end_measure();
        assert!(state.diagnostics().is_empty());
    }

    #[test]
    fn unclosed_tuplet_dropped_at_measure_end() {
        let mut state = state();
        state.process(quarter().with_tuplet(SpanMarker::start(1)).into());
        state.end_measure();
        state.process(quarter().with_tuplet(SpanMarker::stop(1)).into());
        state.end_measure();
        let kinds = state
            .diagnostics()
            .iter()
            .map(|d| d.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UnclosedTuplet,
                DiagnosticKind::UnmatchedTupletStop
            ]
        );
        let (staff, _) = state.finish();
        assert!(staff.measures.iter().all(|m| m.tuplets.is_empty()));
    }

    #[test]
    fn beam_backtracking_flags_latest_note() {
        let mut state = state();
        state.process(quarter().into());
        state.process(NoteElement::rest(2048).with_beam(BeamMarker::Begin).into());
        state.process(
            NoteElement::rest(2048).with_beam(BeamMarker::Continue).into(),
        );
        state.process(NoteElement::rest(2048).into());
        state.process(NoteElement::rest(2048).with_beam(BeamMarker::End).into());
        state.process(quarter().into());
        let flags = state.current_measure().voices[0]
            .notes
            .iter()
            .map(|n| n.end_beam)
            .collect::<Vec<_>>();
        assert_eq!(flags, vec![false, false, false, false, true, false]);
    }

    #[test]
    fn beam_run_too_long() {
        let mut state = state();
        state.process(NoteElement::rest(8192).into());
        // run opened on notes that never reached the voice
        state.count_beam(0, Some(BeamMarker::Begin));
        state.count_beam(0, Some(BeamMarker::Continue));
        state.process(
            NoteElement::rest(8192).with_beam(BeamMarker::End).into(),
        );
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::BeamRunTooLong);
        assert!(staff.measures[0].voices[0].notes.iter().all(|n| !n.end_beam));
    }

    #[test]
    fn beamed_grace_notes_keep_closed_groups() {
        let mut state = state();
        let eighth = |beam| NoteElement::rest(2048).with_beam(beam);
        state.process(eighth(BeamMarker::Begin).into());
        state.process(eighth(BeamMarker::End).into());
        state.process(eighth(BeamMarker::Begin).into());
        state.process(eighth(BeamMarker::End).into());
        for beam in [BeamMarker::Begin, BeamMarker::Continue, BeamMarker::End] {
            state.process(
                NoteElement::grace(Vec::new(), 512).with_beam(beam).into(),
            );
        }
        state.process(NoteElement::rest(8192).into());
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        let notes = &staff.measures[0].voices[0].notes;
        let flags = notes.iter().map(|n| n.end_beam).collect::<Vec<_>>();
        assert_eq!(flags, vec![false, true, false, true, false]);
        assert!(matches!(
            notes[4].modifiers[..],
            [
                NoteModifier::GraceNote { .. },
                NoteModifier::GraceNote { .. },
                NoteModifier::GraceNote { .. }
            ]
        ));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn hairpin_in_one_measure() {
        let mut state = state();
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Crescendo).into());
        state.process(quarter().into());
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Stop).into());
        state.process(quarter().into());
        state.end_measure();
        assert_eq!(
            state.modifiers(),
            &[StaffModifier::Hairpin {
                kind: HairpinKind::Crescendo,
                start_selector: Selector::new(0, 0, 0, 1),
                end_selector: Selector::new(0, 0, 0, 2),
            }]
        );
        assert!(state.diagnostics().is_empty());
    }

    #[test]
    fn repeated_wedge_token_toggles() {
        let mut state = state();
        // bare stop with nothing open is itself a start
        state.process(DirectionElement::wedge(WedgeMarker::Stop).into());
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Decrescendo).into());
        // second decrescendo token opens again
        state.process(DirectionElement::wedge(WedgeMarker::Decrescendo).into());
        state.process(quarter().into());
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Decrescendo).into());
        state.process(quarter().into());
        state.end_measure();
        assert_eq!(
            state.modifiers(),
            &[
                StaffModifier::Hairpin {
                    kind: HairpinKind::Decrescendo,
                    start_selector: Selector::new(0, 0, 0, 0),
                    end_selector: Selector::new(0, 0, 0, 0),
                },
                StaffModifier::Hairpin {
                    kind: HairpinKind::Decrescendo,
                    start_selector: Selector::new(0, 0, 0, 1),
                    end_selector: Selector::new(0, 0, 0, 2),
                },
            ]
        );
    }

    #[test]
    fn hairpin_across_barline_dropped() {
        let mut state = state();
        for _ in 0..3 {
            state.process(quarter().into());
        }
        state.process(DirectionElement::wedge(WedgeMarker::Crescendo).into());
        state.process(quarter().into());
        state.end_measure();
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Stop).into());
        state.end_measure();
        assert!(state.modifiers().is_empty());
        assert_eq!(state.diagnostics().len(), 1);
        assert_eq!(
            state.diagnostics()[0].kind,
            DiagnosticKind::UnresolvedHairpin
        );
        assert_eq!(state.diagnostics()[0].measure, 1);
    }

    #[test]
    fn hairpin_without_kind() {
        let mut state = state();
        state.process(DirectionElement::wedge(WedgeMarker::Stop).into());
        state.process(quarter().into());
        state.process(DirectionElement::wedge(WedgeMarker::Stop).into());
        state.end_measure();
        state.process(DirectionElement::wedge(WedgeMarker::Crescendo).into());
        let (_, diagnostics) = state.finish();
        let kinds = diagnostics.iter().map(|d| d.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::HairpinWithoutKind,
                DiagnosticKind::UnclosedHairpin
            ]
        );
    }

    #[test]
    fn dynamics_wait_for_note() {
        let mut state = state();
        state.process(DirectionElement::dynamics("p", 0).into());
        state.process(DirectionElement::dynamics("f", 6144).into());
        state.process(quarter().into());
        state.process(quarter().into());
        state.process(quarter().into());
        state.process(DirectionElement::dynamics("ff", 4096).into());
        state.process(quarter().into());
        state.end_measure();
        let notes = &state.measures[0].voices[0].notes;
        let dynamics = |idx: usize| {
            notes[idx]
                .modifiers
                .iter()
                .filter_map(|m| match m {
                    NoteModifier::Dynamic { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(dynamics(0), vec!["p"]);
        assert!(dynamics(1).is_empty());
        assert_eq!(dynamics(2), vec!["f"]);
        assert!(dynamics(3).is_empty());
        // "ff" is due at the start of the next measure
        state.process(quarter().into());
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        assert_eq!(
            staff.measures[1].voices[0].notes[0].modifiers,
            vec![NoteModifier::Dynamic { text: "ff".into() }]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn grace_notes_attach_to_next_note() {
        let mut state = state();
        state.process(NoteElement::grace(Vec::new(), 1024).into());
        state.process(NoteElement::grace(Vec::new(), 1024).in_voice(1).into());
        state.process(quarter().into());
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        let note = &staff.measures[0].voices[0].notes[0];
        assert!(matches!(
            note.modifiers[..],
            [NoteModifier::GraceNote { .. }]
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::OrphanGraceNote);
    }

    #[test]
    fn dynamics_unplaced_at_part_end() {
        let mut state = state();
        state.process(quarter().into());
        state.process(DirectionElement::dynamics("sfz", 8192).into());
        state.process(quarter().into());
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnplacedDynamic);
        assert_eq!(diagnostics[0].measure, 0);
        assert!(staff.measures[0].voices[0]
            .notes
            .iter()
            .all(|n| n.modifiers.is_empty()));
    }

    #[test]
    fn grace_notes_dropped_when_disabled() {
        let settings = ImportSettings {
            keep_grace_notes: false,
            ..Default::default()
        };
        let mut state = ImportState::new(0, "", &settings);
        state.process(NoteElement::grace(Vec::new(), 1024).into());
        state.process(quarter().into());
        state.end_measure();
        let (staff, diagnostics) = state.finish();
        let notes = &staff.measures[0].voices[0].notes;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].modifiers.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn cursor_and_lines() {
        let settings = ImportSettings {
            measures_per_line: 2,
            ..Default::default()
        };
        let mut state = ImportState::new(3, "", &settings);
        for _ in 0..3 {
            state.process(NoteElement::rest(16384).into());
            state.end_measure();
        }
        assert_eq!(state.tick_cursor(), 3 * 16384);
        // empty measure still advances by its capacity
        state.end_measure();
        assert_eq!(state.tick_cursor(), 4 * 16384);
        let (staff, _) = state.finish();
        assert_eq!(staff.staff_id, 3);
        let lines = staff.measures.iter().map(|m| m.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![0, 0, 1, 1]);
    }
}
