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

//! Parsed notation elements.
//!
//! The notation parser runs as a separate program in the jdw ecosystem and
//! hands each fully resolved track over as JSON. This module defines the
//! Rust side of that handoff: [`ResolvedElement`], one parsed unit of
//! notation with its prefix, suffix, index and arguments already extracted,
//! and [`Args`], the ordered argument list attached to each element.
//!
//! Elements are plain data. All interpretation of prefixes, suffixes and
//! indices happens in the [`convert`](crate::convert) module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized [`Result`] type for notation interop errors.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned when a track handed over by the notation parser
/// cannot be read.
#[derive(Debug, Error)]
pub enum Error {
    /// The track JSON did not match the element interop format.
    #[error("reading notation elements: {0}")]
    MalformedTrack(#[from] serde_json::Error),
}

/// One parsed unit of input notation.
///
/// Depending on context the fields mean different things. `prefix` is a note
/// letter for pitched notes or a sample category for sampler tracks.
/// `suffix` carries symbols (`x`, `.`, the loop marker) or an external id,
/// optionally behind a `@` or `$` modifier. `index` is a scale degree, an
/// octave number when `prefix` is a note letter, or a sample slot. Elements
/// are immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedElement {
    pub prefix: String,
    pub suffix: String,
    pub index: i32,
    #[serde(default)]
    pub args: Args,
}

impl ResolvedElement {
    /// Creates an element with no arguments.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, index: i32) -> ResolvedElement {
        ResolvedElement {
            prefix: prefix.into(),
            suffix: suffix.into(),
            index,
            args: Args::new(),
        }
    }

    /// Adds an argument, replacing any existing argument with the same name.
    pub fn arg(mut self, name: impl Into<String>, value: f32) -> ResolvedElement {
        self.args.set(name, value);
        self
    }
}

/// An ordered list of named argument values.
///
/// Argument order is significant: when arguments are merged into an OSC
/// message the original order must be preserved, so this is a list of pairs
/// rather than a map. Names are unique; [`Args::set`] replaces in place.
///
/// The list serializes as pairs (`[["sus", 0.8], ["amp", 0.5]]`) so that
/// ordering also survives the JSON handoff from the parser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Args(Vec<(String, f32)>);

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Args {
        Args(Vec::new())
    }

    /// Sets an argument value, keeping the original position if the name is
    /// already present and appending otherwise.
    pub fn set(&mut self, name: impl Into<String>, value: f32) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing_value)) => *existing_value = value,
            None => self.0.push((name, value)),
        }
    }

    /// Returns the value of the named argument, if present.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    /// Visits the arguments in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads one track's elements from the JSON handoff format.
///
/// # Errors
///
/// Returns an error if the JSON does not describe a list of elements.
pub fn elements_from_json(json: &str) -> Result<Vec<ResolvedElement>> {
    Ok(serde_json::from_str(json)?)
}
