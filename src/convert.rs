// jdw-billboarding
// Copyright (C) 2026  Johan Wettergren
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Converts notation elements into engine messages.
//!
//! An [`ElementConverter`] is created per track and carries everything a
//! single element cannot know on its own: the instrument it plays, the
//! track's queue identifier, the instrument kind, the active scale, and an
//! optional fixed external id. Feeding elements through
//! [`ElementConverter::convert`] yields at most one OSC message per element.
//!
//! Suffix symbols take priority over the instrument kind, in fixed order:
//! `@id` modifies an existing note, `x` is an explicit silence, `.` emits
//! nothing at all, [`LOOP_MARKER`] emits a loop-start event, and `$id`
//! starts an open-ended (drone) note. Everything else dispatches on the
//! instrument kind: drones are re-parameterized in place with `/note_modify`,
//! samplers play a sample slot, and synths get a gated `/note_on_timed`.

use crate::notation::{Args, ResolvedElement};
use crate::osc::Message;
use crate::{scale, Config};
use rosc::{OscMessage, OscPacket, OscType};

/// Marker the engine substitutes with the runtime node id when it encounters
/// it inside an external id.
pub const NODE_ID_PLACEHOLDER: &str = "{nodeId}";

/// The loop-start marker glyph. Must match the marker emitted by the
/// notation parser.
pub const LOOP_MARKER: &str = "§";

/// How an instrument turns notes into sound, which decides the default
/// message for elements without a forcing suffix symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Plays sample slots; elements address a sample pack.
    Sampler,
    /// Plays gated notes; elements become timed note-on messages.
    Synth,
    /// Holds one long note; elements re-parameterize it instead of
    /// re-triggering.
    Drone,
}

/// The scale a track's degree-based notes resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleContext {
    /// Root note letter, for example `"c"` or `"eb"`.
    pub root_letter: String,
    /// Key into the interval table; unknown types resolve as major.
    pub scale_type: String,
    /// Extra octave offset applied to degree-based notes. 0 disables the
    /// offset entirely.
    pub start_octave: i32,
}

impl ScaleContext {
    pub fn new(root_letter: impl Into<String>, scale_type: impl Into<String>, start_octave: i32) -> ScaleContext {
        ScaleContext {
            root_letter: root_letter.into(),
            scale_type: scale_type.into(),
            start_octave,
        }
    }
}

impl Default for ScaleContext {
    /// C major, starting at octave 4.
    fn default() -> ScaleContext {
        ScaleContext::new("c", "maj", 4)
    }
}

/// A converted element: the source element together with the engine message
/// it produced. The element is kept so that outer layers can derive timing
/// from its arguments when wrapping the message for queued playback.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementMessage {
    pub element: ResolvedElement,
    pub message: OscMessage,
}

impl ElementMessage {
    pub fn into_packet(self) -> OscPacket {
        OscPacket::Message(self.message)
    }
}

/// Converts the elements of one track into engine messages.
///
/// Each converter owns its state and must stay confined to one thread;
/// separate tracks get separate converters and can safely run in parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementConverter {
    instrument_name: String,
    track_id: String,
    kind: InstrumentKind,
    external_id_override: String,
    scale: ScaleContext,
    // Never advanced; sequential synthesized ids differ only by element
    // index, and the engine's NODE_ID_PLACEHOLDER substitution keeps the
    // voices distinct.
    id_counter: u32,
    config: Config,
}

impl ElementConverter {
    /// Creates a converter for one track.
    ///
    /// # Arguments
    ///
    /// * `instrument_name` - The engine-side instrument the track plays.
    /// * `track_id` - The track's queue identifier, used to diversify
    ///   synthesized external ids across tracks.
    /// * `kind` - The instrument kind to dispatch on.
    pub fn new(
        instrument_name: impl Into<String>,
        track_id: impl Into<String>,
        kind: InstrumentKind,
    ) -> ElementConverter {
        ElementConverter {
            instrument_name: instrument_name.into(),
            track_id: track_id.into(),
            kind,
            external_id_override: String::new(),
            scale: ScaleContext::default(),
            id_counter: 0,
            config: Config::default(),
        }
    }

    /// The scale degree-based notes resolve against. Defaults to C major at
    /// octave 4.
    pub fn scale(mut self, scale: ScaleContext) -> ElementConverter {
        self.scale = scale;
        self
    }

    /// Forces a fixed external id for every note this converter emits.
    /// Used for drone tracks, where all elements re-target the same voice.
    pub fn external_id_override(mut self, external_id: impl Into<String>) -> ElementConverter {
        self.external_id_override = external_id.into();
        self
    }

    /// Engine communication constants. Defaults to [`Config::default`].
    pub fn config(mut self, config: Config) -> ElementConverter {
        self.config = config;
        self
    }

    /// Converts one element, returning its engine message or `None` for
    /// elements that produce nothing (the `.` symbol).
    ///
    /// `transpose_steps` shifts pitched notes by that many semitones.
    /// Explicit `freq` arguments bypass both pitch resolution and the
    /// transpose.
    pub fn convert(
        &mut self,
        element: &ResolvedElement,
        transpose_steps: i32,
    ) -> Option<ElementMessage> {
        let message = if let Some(derived_id) = element.suffix.strip_prefix('@') {
            self.note_modify(element, derived_id, transpose_steps)
        } else if is_symbol(element, "x") {
            Message::addr("/empty_msg").build()
        } else if is_symbol(element, ".") {
            return None;
        } else if is_symbol(element, LOOP_MARKER) {
            Message::addr("/jdw_sc_event_trigger")
                .arg("loop_started".to_owned())
                .arg(self.config.latency_ms)
                .build()
        } else if let Some(external_id) = element.suffix.strip_prefix('$') {
            self.note_on(element, external_id, transpose_steps)
        } else {
            match self.kind {
                InstrumentKind::Drone => self.note_modify(element, "", transpose_steps),
                InstrumentKind::Sampler => self.play_sample(element),
                InstrumentKind::Synth => self.note_on_timed(element, transpose_steps),
            }
        };
        Some(ElementMessage {
            element: element.clone(),
            message,
        })
    }

    fn note_modify(
        &self,
        element: &ResolvedElement,
        derived_id: &str,
        transpose_steps: i32,
    ) -> OscMessage {
        // A track-level override wins over an id derived from the suffix.
        let external_id = if !self.external_id_override.is_empty() {
            self.external_id_override.clone()
        } else if !derived_id.is_empty() {
            derived_id.to_owned()
        } else {
            self.resolve_external_id(element)
        };
        let freq = resolve_frequency(element, &self.scale, transpose_steps);
        Message::addr("/note_modify")
            .arg(external_id)
            .arg(self.config.latency_ms)
            .args(merge_args(&element.args, &[("freq", freq)]))
            .build()
    }

    fn note_on(
        &self,
        element: &ResolvedElement,
        external_id_override: &str,
        transpose_steps: i32,
    ) -> OscMessage {
        let external_id = if external_id_override.is_empty() {
            self.resolve_external_id(element)
        } else {
            external_id_override.to_owned()
        };
        let freq = resolve_frequency(element, &self.scale, transpose_steps);
        Message::addr("/note_on")
            .arg(self.instrument_name.clone())
            .arg(external_id)
            .arg(self.config.latency_ms)
            .args(merge_args(&element.args, &[("freq", freq)]))
            .build()
    }

    fn note_on_timed(&self, element: &ResolvedElement, transpose_steps: i32) -> OscMessage {
        let freq = resolve_frequency(element, &self.scale, transpose_steps);
        let external_id = self.resolve_external_id(element);
        let sus = element.args.get("sus").unwrap_or(0.0);
        if sus == 0.0 {
            log::warn!(
                "timed note element has no sus argument, gate time will be 0: {:?}",
                element
            );
        }
        Message::addr("/note_on_timed")
            .arg(self.instrument_name.clone())
            .arg(external_id)
            // {:?} keeps the decimal point on whole gate times ("0.0", not
            // "0"), which is the text the engine parses.
            .arg(format!("{:?}", sus))
            .arg(self.config.latency_ms)
            .args(merge_args(&element.args, &[("freq", freq)]))
            .build()
    }

    fn play_sample(&self, element: &ResolvedElement) -> OscMessage {
        let freq = resolve_frequency(element, &self.scale, 0);
        Message::addr("/play_sample")
            .arg(self.resolve_external_id(element))
            .arg(self.instrument_name.clone())
            .arg(element.index)
            .arg(element.prefix.clone())
            .arg(self.config.latency_ms)
            .args(merge_args(&element.args, &[("freq", freq)]))
            .build()
    }

    /// Notation-supplied ids (a non-empty suffix) are authoritative, letting
    /// the notation re-target a previously created note. Everything else
    /// gets an id synthesized from the track context.
    fn resolve_external_id(&self, element: &ResolvedElement) -> String {
        if element.suffix.is_empty() {
            format!(
                "{}_{}_{}{}_{}",
                self.track_id, self.instrument_name, self.id_counter, element.index, NODE_ID_PLACEHOLDER
            )
        } else {
            element.suffix.clone()
        }
    }
}

/// Resolves an element's frequency in hertz.
///
/// An explicit `freq` argument is returned as-is, bypassing the transpose.
/// Otherwise a note-letter prefix is interpreted together with the element
/// index as letter+octave (the "3" of `c3`), and anything else treats the
/// index as a degree of the context scale, shifted up by the scale's start
/// octave.
pub fn resolve_frequency(
    element: &ResolvedElement,
    scale_context: &ScaleContext,
    transpose_steps: i32,
) -> f32 {
    if let Some(freq) = element.args.get("freq") {
        return freq;
    }

    match scale::note_letter_to_pitch_class(&element.prefix) {
        Some(pitch_class) => {
            let octave = element.index;
            let octave_offset = if octave > 0 { 12 * (octave - 1) } else { 0 };
            scale::midi_to_hz((pitch_class + octave_offset + transpose_steps) as f32)
        }
        None => {
            let degree = scale::resolve_scale_degree(
                element.index,
                &scale_context.root_letter,
                &scale_context.scale_type,
            );
            let start_octave = scale_context.start_octave;
            let octave_offset = if start_octave > 0 {
                12 * (start_octave + 1)
            } else {
                0
            };
            scale::midi_to_hz((degree + octave_offset + transpose_steps) as f32)
        }
    }
}

fn is_symbol(element: &ResolvedElement, symbol: &str) -> bool {
    element.suffix.to_lowercase() == symbol && element.prefix.is_empty() && element.index == 0
}

/// Flattens arguments into OSC name/value pairs. Override entries come
/// first; element arguments follow in their original order, skipping any
/// name already present in the overrides.
fn merge_args(args: &Args, overrides: &[(&str, f32)]) -> Vec<OscType> {
    let mut osc_args = Vec::with_capacity(2 * (overrides.len() + args.iter().count()));
    for (name, value) in overrides {
        osc_args.push(OscType::String((*name).to_owned()));
        osc_args.push(OscType::Float(*value));
    }
    for (name, value) in args.iter() {
        if overrides.iter().any(|(overridden, _)| *overridden == name) {
            continue;
        }
        osc_args.push(OscType::String(name.to_owned()));
        osc_args.push(OscType::Float(value));
    }
    osc_args
}
