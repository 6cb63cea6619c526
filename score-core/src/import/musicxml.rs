//! MusicXML (score-partwise) reader.
//!
//! Only turns the document into [PartElements]: everything spanning is
//! left for [ImportState](super::ImportState) to resolve.

use std::collections::HashMap;

use fraction::Fraction;
use log::debug;
use roxmltree::{Document, Node};

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{
        fraction_tools::fraction_to_ticks, Accidental, NoteModifier,
        NoteName, Pitch, TimeSignature, TICKS_PER_WHOLE,
    },
    settings::ImportSettings,
};

use super::{
    element::{
        BeamMarker, DirectionElement, ImportElement, NoteElement,
        PartElements, SpanMarker, StartStop, WedgeMarker,
    },
    import_score, ImportResult,
};

/// Parse document and import every part.
pub fn import_musicxml(
    xml: &str,
    settings: &ImportSettings,
) -> ScoreResult<ImportResult> {
    Ok(import_score(parse_musicxml(xml)?, settings))
}

/// Parse document into raw elements, one [PartElements] per `<part>`.
pub fn parse_musicxml(xml: &str) -> ScoreResult<Vec<PartElements>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "score-partwise" {
        return Err(ScoreError::MissingElement("score-partwise".into()));
    }
    let names = part_names(root);
    root.children()
        .filter(|n| n.has_tag_name("part"))
        .map(|part| {
            let id = part.attribute("id").unwrap_or_default();
            let name = names.get(id).cloned().unwrap_or_else(|| id.to_string());
            PartReader::default().read(part, name)
        })
        .collect()
}

fn part_names(root: Node) -> HashMap<String, String> {
    root.children()
        .filter(|n| n.has_tag_name("part-list"))
        .flat_map(|list| list.children())
        .filter(|n| n.has_tag_name("score-part"))
        .filter_map(|part| {
            let id = part.attribute("id")?;
            let name = child_text(part, "part-name").unwrap_or_default();
            Some((id.to_string(), name.to_string()))
        })
        .collect()
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)?.text().map(str::trim)
}

fn parse_child<T: std::str::FromStr>(node: Node, name: &str) -> Option<T> {
    child_text(node, name)?.parse().ok()
}

/// State, that lives through one part: divisions are set once and kept
/// until changed.
#[derive(Debug)]
struct PartReader {
    divisions: u64,
    /// position of every voice from the measure start, in whole notes
    positions: HashMap<usize, Fraction>,
    /// chord symbol, waiting for the next note
    harmony: Option<String>,
}
impl Default for PartReader {
    fn default() -> Self {
        Self {
            divisions: 1,
            positions: HashMap::new(),
            harmony: None,
        }
    }
}
impl PartReader {
    fn read(mut self, part: Node, name: String) -> ScoreResult<PartElements> {
        let mut measures = Vec::new();
        for measure in part.children().filter(|n| n.has_tag_name("measure")) {
            let mut elements = Vec::new();
            self.positions.clear();
            for node in measure.children().filter(|n| n.is_element()) {
                self.read_element(node, &mut elements)?;
            }
            measures.push(elements);
        }
        debug!("part {name:?}: {} measures", measures.len());
        Ok(PartElements { name, measures })
    }

    fn read_element(
        &mut self,
        node: Node,
        elements: &mut Vec<ImportElement>,
    ) -> ScoreResult<()> {
        match node.tag_name().name() {
            "attributes" => elements.push(self.read_attributes(node)),
            "note" => self.read_note(node, elements)?,
            "direction" => elements.push(self.read_direction(node).into()),
            "harmony" => self.harmony = harmony_text(node),
            "forward" => {
                let voice = voice_of(node);
                let ticks =
                    self.advance(voice, parse_child(node, "duration").unwrap_or(0))?;
                elements.push(NoteElement::rest(ticks).in_voice(voice).into());
            }
            other => debug!("skipping <{other}>"),
        }
        Ok(())
    }

    fn ticks(&self, duration: u64) -> ScoreResult<u64> {
        to_ticks(Fraction::new(duration, self.divisions * 4))
    }

    /// Move the voice by `duration` divisions.
    ///
    /// Both ends are rounded to ticks, so the rounding error never
    /// accumulates: three triplet eighths get 1365, 1366 and 1365.
    fn advance(&mut self, voice: usize, duration: u64) -> ScoreResult<u64> {
        let start = self
            .positions
            .get(&voice)
            .cloned()
            .unwrap_or_else(|| Fraction::new(0_u64, 1_u64));
        let end = start.clone() + Fraction::new(duration, self.divisions * 4);
        self.positions.insert(voice, end.clone());
        Ok(to_ticks(end)?.saturating_sub(to_ticks(start)?))
    }

    fn read_attributes(&mut self, node: Node) -> ImportElement {
        if let Some(divisions) = parse_child::<u64>(node, "divisions") {
            self.divisions = divisions.max(1);
        }
        let time_signature = child(node, "time").and_then(|time| {
            Some(TimeSignature::new(
                parse_child(time, "beats")?,
                parse_child(time, "beat-type")?,
            ))
        });
        let key_signature = child(node, "key").and_then(|key| {
            let fifths = parse_child::<i32>(key, "fifths")?;
            let minor = child_text(key, "mode") == Some("minor");
            key_name(fifths, minor)
        });
        ImportElement::Attributes {
            time_signature,
            key_signature,
        }
    }

    fn read_note(
        &mut self,
        node: Node,
        elements: &mut Vec<ImportElement>,
    ) -> ScoreResult<()> {
        let pitch = child(node, "pitch").and_then(read_pitch);
        if child(node, "chord").is_some() {
            let previous = elements.iter_mut().rev().find_map(|e| match e {
                ImportElement::Note(note) => Some(note),
                _ => None,
            });
            match (previous, pitch) {
                (Some(previous), Some(pitch)) => previous.pitches.push(pitch),
                _ => debug!("chord note without a base note, skipping"),
            }
            return Ok(());
        }

        let grace = child(node, "grace").is_some();
        let voice = voice_of(node);
        let ticks = match grace {
            true => type_ticks(node),
            false => {
                self.advance(voice, parse_child(node, "duration").unwrap_or(0))?
            }
        };
        let pitches = pitch.into_iter().collect::<Vec<_>>();
        let mut element = match (grace, child(node, "rest").is_some()) {
            (true, _) => NoteElement::grace(pitches, ticks),
            (false, true) => NoteElement::rest(ticks),
            (false, false) => NoteElement::note(pitches, ticks),
        }
        .in_voice(voice);

        element.beam = node
            .children()
            .find(|n| {
                n.has_tag_name("beam")
                    && n.attribute("number").unwrap_or("1") == "1"
            })
            .and_then(|beam| match beam.text()?.trim() {
                "begin" => Some(BeamMarker::Begin),
                "continue" => Some(BeamMarker::Continue),
                "end" => Some(BeamMarker::End),
                _ => None,
            });
        for notations in node.children().filter(|n| n.has_tag_name("notations"))
        {
            read_notations(notations, &mut element);
        }
        for lyric in node.children().filter(|n| n.has_tag_name("lyric")) {
            if let Some(text) = child_text(lyric, "text") {
                element.modifiers.push(NoteModifier::Lyric {
                    verse: lyric
                        .attribute("number")
                        .and_then(|n| n.parse().ok())
                        .unwrap_or(1),
                    text: text.to_string(),
                });
            }
        }
        if !grace {
            if let Some(text) = self.harmony.take() {
                element.modifiers.push(NoteModifier::ChordSymbol { text });
            }
        }
        elements.push(element.into());
        Ok(())
    }

    fn read_direction(&self, node: Node) -> DirectionElement {
        let mut direction = DirectionElement {
            offset: parse_child::<i64>(node, "offset")
                .map(|offset| {
                    let ticks = self
                        .ticks(offset.unsigned_abs())
                        .unwrap_or_default() as i64;
                    offset.signum() * ticks
                })
                .unwrap_or(0),
            ..Default::default()
        };
        for kind in node
            .children()
            .filter(|n| n.has_tag_name("direction-type"))
            .flat_map(|n| n.children())
            .filter(|n| n.is_element())
        {
            match kind.tag_name().name() {
                "wedge" => {
                    direction.wedge = match kind.attribute("type") {
                        Some("crescendo") => Some(WedgeMarker::Crescendo),
                        Some("diminuendo") => Some(WedgeMarker::Decrescendo),
                        Some("stop") => Some(WedgeMarker::Stop),
                        _ => None,
                    }
                }
                "dynamics" => {
                    direction.dynamics = kind
                        .children()
                        .find(|n| n.is_element())
                        .map(|n| n.tag_name().name().to_string())
                }
                other => debug!("skipping direction <{other}>"),
            }
        }
        direction
    }
}

fn to_ticks(frac: Fraction) -> ScoreResult<u64> {
    fraction_to_ticks(frac)
        .ok_or_else(|| ScoreError::MissingElement("divisions".into()))
}

fn voice_of(node: Node) -> usize {
    parse_child::<usize>(node, "voice")
        .unwrap_or(1)
        .saturating_sub(1)
}

fn read_pitch(node: Node) -> Option<Pitch> {
    let letter = NoteName::from_step(child_text(node, "step")?)?;
    let alter = child_text(node, "alter")
        .and_then(|a| a.parse::<f64>().ok())
        .map_or(0, |a| a.round() as i32);
    Some(Pitch::new(
        letter,
        Accidental::from_alter(alter).unwrap_or_default(),
        parse_child(node, "octave")?,
    ))
}

/// Ticks of a note, given by its `<type>` and dots only.
fn type_ticks(node: Node) -> u64 {
    let base = match child_text(node, "type").unwrap_or("eighth") {
        "breve" => TICKS_PER_WHOLE * 2,
        "whole" => TICKS_PER_WHOLE,
        "half" => TICKS_PER_WHOLE / 2,
        "quarter" => TICKS_PER_WHOLE / 4,
        "16th" => TICKS_PER_WHOLE / 16,
        "32nd" => TICKS_PER_WHOLE / 32,
        "64th" => TICKS_PER_WHOLE / 64,
        "128th" => TICKS_PER_WHOLE / 128,
        _ => TICKS_PER_WHOLE / 8,
    };
    let dots = node.children().filter(|n| n.has_tag_name("dot")).count();
    (1..=dots).fold(base, |ticks, dot| ticks + (base >> dot))
}

fn read_notations(node: Node, element: &mut NoteElement) {
    let marker = |n: Node| {
        let number = n
            .attribute("number")
            .and_then(|num| num.parse().ok())
            .unwrap_or(1);
        match n.attribute("type")? {
            "start" => Some(SpanMarker {
                number,
                kind: StartStop::Start,
            }),
            "stop" => Some(SpanMarker {
                number,
                kind: StartStop::Stop,
            }),
            _ => None,
        }
    };
    for n in node.children().filter(|n| n.is_element()) {
        match n.tag_name().name() {
            "slur" => element.slurs.extend(marker(n)),
            "tuplet" => element.tuplets.extend(marker(n)),
            "articulations" => element.modifiers.extend(
                n.children().filter(|a| a.is_element()).map(|a| {
                    NoteModifier::Articulation {
                        name: a.tag_name().name().to_string(),
                    }
                }),
            ),
            "ornaments" => element.modifiers.extend(
                n.children().filter(|o| o.is_element()).map(|o| {
                    NoteModifier::Ornament {
                        name: o.tag_name().name().to_string(),
                    }
                }),
            ),
            "fermata" => element.modifiers.push(NoteModifier::Ornament {
                name: "fermata".into(),
            }),
            _ => (),
        }
    }
}

fn harmony_text(node: Node) -> Option<String> {
    let root = child(node, "root")?;
    let step = child_text(root, "root-step")?;
    let alter = match parse_child::<i32>(root, "root-alter") {
        Some(a) if a > 0 => "#",
        Some(a) if a < 0 => "b",
        _ => "",
    };
    let kind = child(node, "kind")
        .and_then(|k| k.attribute("text").or(k.text()))
        .map(|k| match k.trim() {
            "major" => "",
            other => other,
        })
        .unwrap_or_default();
    Some(format!("{step}{alter}{kind}"))
}

/// Key name for circle-of-fifths position: "g", "bes", "fis minor".
fn key_name(fifths: i32, minor: bool) -> Option<String> {
    const MAJOR: [&str; 15] = [
        "ces", "ges", "des", "aes", "ees", "bes", "f", "c", "g", "d", "a",
        "e", "b", "fis", "cis",
    ];
    const MINOR: [&str; 15] = [
        "aes", "ees", "bes", "f", "c", "g", "d", "a", "e", "b", "fis", "cis",
        "gis", "dis", "ais",
    ];
    let idx = usize::try_from(fifths + 7).ok()?;
    match minor {
        true => MINOR.get(idx).map(|k| format!("{k} minor")),
        false => MAJOR.get(idx).map(|k| k.to_string()),
    }
}
