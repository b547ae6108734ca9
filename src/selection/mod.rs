//! Selection rectangle as read from the producer's status readout
//!
//! The human-readable encoding is the `Display` form of [`SelectionTuple`]
//! (`"x, y, width, height"`); the structured encoding lives in
//! [`structured`]. The reader that extracts tuples lives in [`reader`].

pub mod reader;
pub mod structured;

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::constants::readout::REQUIRED_GROUPS;

/// Rectangular selection region: origin plus size, in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTuple {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SelectionTuple {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a tuple from the first four capture groups of a pattern match.
    /// Returns None if a group is missing or does not fit a u32.
    pub fn from_captures(captures: &regex::Captures<'_>) -> Option<Self> {
        let mut fields = [0u32; REQUIRED_GROUPS];
        for (slot, group) in fields.iter_mut().zip(1..=REQUIRED_GROUPS) {
            *slot = captures.get(group)?.as_str().trim().parse().ok()?;
        }
        let [x, y, width, height] = fields;
        Some(Self::new(x, y, width, height))
    }
}

/// Human encoding: comma-and-space joined decimal fields
impl fmt::Display for SelectionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for SelectionTuple {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, width, height] = fields.as_slice() else {
            anyhow::bail!("expected 4 comma-separated fields, found {}: {s:?}", fields.len());
        };
        let parse = |name: &str, value: &str| -> Result<u32> {
            value
                .parse()
                .context(format!("Invalid {name} field {value:?} in {s:?}"))
        };
        Ok(Self::new(
            parse("x", x)?,
            parse("y", y)?,
            parse("width", width)?,
            parse("height", height)?,
        ))
    }
}
