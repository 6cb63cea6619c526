//! Score tree: staves own measures and staff-level modifiers.
//!
//! The tree mirrors its serialized form exactly, so
//! [Score::to_json] and [Score::from_json] round-trip everything, including
//! modifiers addressed by [Selector].

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{Measure, Selector, StaffModifier},
};

pub mod selection;

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub staff_id: usize,
    #[serde(default)]
    pub name: String,
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub modifiers: Vec<StaffModifier>,
}
impl Staff {
    pub fn new(staff_id: usize, name: impl Into<String>) -> Self {
        Self {
            staff_id,
            name: name.into(),
            measures: Vec::new(),
            modifiers: Vec::new(),
        }
    }
    pub fn measure(&self, index: usize) -> Option<&Measure> {
        self.measures.get(index)
    }
    pub fn add_modifier(&mut self, modifier: StaffModifier) {
        self.modifiers.push(modifier)
    }
    /// Modifiers with at least one endpoint in the measure.
    pub fn modifiers_in_measure(
        &self,
        measure: usize,
    ) -> impl Iterator<Item = &StaffModifier> {
        self.modifiers
            .iter()
            .filter(move |m| m.touches_measures(&[measure]))
    }

    /// Set measure indexes and every selector staff to the actual
    /// position in the tree.
    ///
    /// Selector measures follow their measure by its old `index`. Modifiers
    /// with an endpoint in a measure that is gone are dropped.
    pub fn renumber(&mut self, staff_id: usize) {
        self.staff_id = staff_id;
        let moved = self
            .measures
            .iter()
            .enumerate()
            .map(|(idx, measure)| (measure.index, idx))
            .collect::<HashMap<_, _>>();
        for (idx, measure) in self.measures.iter_mut().enumerate() {
            measure.index = idx;
        }
        self.modifiers.retain_mut(|modifier| {
            let (start_selector, end_selector) = modifier.selectors_mut();
            match (
                moved.get(&start_selector.measure),
                moved.get(&end_selector.measure),
            ) {
                (Some(&start), Some(&end)) => {
                    start_selector.measure = start;
                    end_selector.measure = end;
                    start_selector.staff = staff_id;
                    end_selector.staff = staff_id;
                    true
                }
                _ => {
                    debug!(
                        "dropping modifier {start_selector}..{end_selector}: \
                         measure removed"
                    );
                    false
                }
            }
        });
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    pub staves: Vec<Staff>,
}
impl Score {
    pub fn new(staves: Vec<Staff>) -> Self {
        Self { staves }
    }
    pub fn staff(&self, index: usize) -> Option<&Staff> {
        self.staves.get(index)
    }
    pub fn staff_mut(&mut self, index: usize) -> Option<&mut Staff> {
        self.staves.get_mut(index)
    }

    /// Explicit renumbering step, to run after any structural edit.
    pub fn renumber(&mut self) {
        for (idx, staff) in self.staves.iter_mut().enumerate() {
            staff.renumber(idx);
        }
    }

    /// Substitute whole measures of one staff by their `index`.
    ///
    /// Every index is checked before anything is replaced, so the call
    /// either replaces all measures or none.
    pub fn replace_measures(
        &mut self,
        staff: usize,
        measures: Vec<Measure>,
    ) -> ScoreResult<()> {
        let target = self
            .staves
            .get_mut(staff)
            .ok_or(ScoreError::OutOfRange(Selector::new(staff, 0, 0, 0)))?;
        if let Some(bad) = measures
            .iter()
            .find(|m| m.index >= target.measures.len())
        {
            return Err(ScoreError::OutOfRange(Selector::new(
                staff, bad.index, 0, 0,
            )));
        }
        for measure in measures {
            debug!("replacing measure {} of staff {}", measure.index, staff);
            let idx = measure.index;
            target.measures[idx] = measure;
        }
        Ok(())
    }

    pub fn to_json(&self) -> ScoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    pub fn from_json(json: &str) -> ScoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
