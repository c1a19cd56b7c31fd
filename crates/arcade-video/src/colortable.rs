//! Per-layer colour tables: raw tile pixel (colour * pens + pen) to palette
//! pen.
//!
//! Board revisions wire the gfx ROM outputs to the palette address lines
//! differently, so each layer's mapping is described by a [`ColorRule`]
//! rather than hard-coded.

use serde::{Deserialize, Serialize};

/// Every `period`-th raw index, offset by `residue`, is see-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparentRule {
    pub period: u16,
    pub residue: u16,
}

/// How one graphics layer maps raw indices to palette pens.
///
/// `pen = (raw ^ xor) + offset`, or the palette's transparent marker when
/// `raw % period == residue` or the sum does not fit in a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    /// Number of raw indices (colours times pens per colour).
    pub entries: u16,
    #[serde(default)]
    pub xor: u16,
    #[serde(default)]
    pub offset: u16,
    #[serde(default)]
    pub transparent: Option<TransparentRule>,
}

impl ColorRule {
    /// Build the lookup table against a palette whose marker pen is
    /// `transparent_pen`.
    #[must_use]
    pub fn build(&self, transparent_pen: u16) -> ColorTable {
        let pens = (0..self.entries)
            .map(|raw| match self.transparent {
                Some(t) if t.period != 0 && raw % t.period == t.residue => transparent_pen,
                _ => (raw ^ self.xor).checked_add(self.offset).unwrap_or(transparent_pen),
            })
            .collect();
        ColorTable {
            pens,
            transparent_pen,
        }
    }
}

/// Built colour table for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    pens: Vec<u16>,
    transparent_pen: u16,
}

impl ColorTable {
    /// Pen for a raw index; indices past the end map to the marker.
    #[must_use]
    #[inline]
    pub fn pen(&self, raw: usize) -> u16 {
        self.pens.get(raw).copied().unwrap_or(self.transparent_pen)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pens.is_empty()
    }

    #[must_use]
    pub fn transparent_pen(&self) -> u16 {
        self.transparent_pen
    }
}
