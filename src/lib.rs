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

//! Compiles billboard notation into OSC messages for the jdw-sc
//! SuperCollider engine.
//!
//! A *billboard* is a plain text document describing tracks of musical
//! notation. An external parser turns each track into a sequence of
//! [`ResolvedElement`](notation::ResolvedElement) values; this crate takes it
//! from there and produces the OSC payloads that the engine understands. It
//! contains:
//!
//! * [`notation`] - The parsed element data model consumed by the rest of the
//!   crate, including the JSON interop format used to hand tracks over from
//!   the out-of-process notation parser.
//!
//! * [`scale`] - Pure pitch math: scale generation, scale degree and chord
//!   resolution, and MIDI note to frequency conversion.
//!
//! * [`convert`] - The element converter. One converter is created per track
//!   and decides, element by element, which engine message to emit: note on,
//!   timed note, note modification, sample playback, silence, or a loop
//!   marker event.
//!
//! * [`osc`] - Bundle assembly for the three delivery modes: live queue
//!   updates, batched queue updates, and offline (non-real-time) recording
//!   with size-bounded preload batches.
//!
//! The crate stops at [`OscPacket`](rosc::OscPacket) values. Encoding the
//! packets to bytes and delivering them to the engine is the caller's
//! concern, as is all scheduling; conversion itself is a deterministic fold
//! over the parsed elements with no I/O. Converters are independent per
//! track, so callers may convert tracks in parallel as long as each
//! converter stays on one thread.
//!
//! # Examples
//!
//! Converting a short synth track and wrapping it into a queue update:
//!
//! ```
//! use jdw_billboarding::{
//!     convert::{ElementConverter, InstrumentKind},
//!     notation::ResolvedElement,
//!     osc,
//! };
//!
//! let mut converter = ElementConverter::new("brute", "t1", InstrumentKind::Synth);
//!
//! let elements = vec![
//!     ResolvedElement::new("", "", 0).arg("sus", 0.8),
//!     ResolvedElement::new("", "", 2).arg("sus", 0.8),
//!     ResolvedElement::new("", "x", 0),
//! ];
//!
//! let messages = elements
//!     .iter()
//!     .filter_map(|element| converter.convert(element, 0))
//!     .map(|message| message.into_packet())
//!     .collect::<Vec<_>>();
//!
//! let queue_update = osc::update_queue_bundle("t1", messages)?;
//! # jdw_billboarding::osc::Result::Ok(())
//! ```

pub mod convert;
pub mod notation;
pub mod osc;
pub mod scale;

/// Engine communication constants.
///
/// The defaults match what the jdw-sc engine expects, so most callers will
/// only ever use [`Config::default`]. Both values are deployment tuning
/// knobs rather than notation semantics, which is why they are passed in
/// instead of being baked into the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Round-trip delay in milliseconds appended to every timing-sensitive
    /// message, giving the engine time to process a message before its
    /// scheduled moment.
    pub latency_ms: i32,

    /// Number of preload messages per batch when slicing non-real-time
    /// preload sequences with [`osc::preload_batches`].
    pub preload_batch_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            latency_ms: 70,
            preload_batch_size: 10,
        }
    }
}
