//! Score model for notation editing.
//!
//! Durations are counted in integer ticks, notes are addressed by
//! [Selector](primitives::Selector) values, spanning annotations are
//! resolved while importing, and copy/paste replaces whole measures.

pub mod dom;
pub mod error;
pub mod import;
pub mod primitives;
pub mod settings;
pub mod splice;
