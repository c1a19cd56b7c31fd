//! Colour PROM decoding.
//!
//! Both board families store 4 bits per channel and convert them through a
//! resistor ladder with weights 0x10, 0x21, 0x46 and 0x88 (summing to 0xFF).
//! Punch-Out drives the monitors through inverting buffers, so its
//! intensities are subtracted from 255.
//!
//! Every decoded palette ends with one extra entry, [`TRANSPARENT_RGB`],
//! used as the colour-key pen by the sprite blitters. No 4-bit ladder value
//! produces 240 (or 15 when inverted), so it cannot collide with a real
//! colour.

use crate::rom::RomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The reserved transparent marker colour.
pub const TRANSPARENT_RGB: Rgb = Rgb::new(240, 240, 240);

/// Resistor-ladder intensity of a 4-bit channel value.
#[must_use]
pub fn ladder(nibble: u8) -> u8 {
    let bit = |n: u8| (nibble >> n) & 1;
    0x10 * bit(0) + 0x21 * bit(1) + 0x46 * bit(2) + 0x88 * bit(3)
}

/// Decoded board palette: real colours followed by the transparent marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    fn with_marker(mut colors: Vec<Rgb>) -> Self {
        colors.push(TRANSPARENT_RGB);
        Self { colors }
    }

    /// Decode one PROM plane per channel (red, green, blue in that order,
    /// `entries` bytes each), low nibble significant, inverted output.
    pub fn planar_inverted(prom: &[u8], entries: usize) -> Result<Self, RomError> {
        let expected = entries * 3;
        if prom.len() < expected {
            return Err(RomError::Undersized {
                table: "color prom",
                expected,
                actual: prom.len(),
            });
        }
        let colors = (0..entries)
            .map(|i| {
                let level = |plane: usize| 255 - ladder(prom[plane * entries + i] & 0x0F);
                Rgb::new(level(0), level(1), level(2))
            })
            .collect();
        Ok(Self::with_marker(colors))
    }

    /// Decode two bytes per entry: red in the low and green in the high
    /// nibble of the first byte, blue in the low nibble of the second.
    pub fn nibble_packed(prom: &[u8], entries: usize) -> Result<Self, RomError> {
        let expected = entries * 2;
        if prom.len() < expected {
            return Err(RomError::Undersized {
                table: "color prom",
                expected,
                actual: prom.len(),
            });
        }
        let colors = prom[..expected]
            .chunks_exact(2)
            .map(|pair| Rgb::new(ladder(pair[0] & 0x0F), ladder(pair[0] >> 4), ladder(pair[1] & 0x0F)))
            .collect();
        Ok(Self::with_marker(colors))
    }

    /// Total number of entries including the transparent marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Pen index of the transparent marker.
    #[must_use]
    pub fn transparent_pen(&self) -> u16 {
        (self.colors.len() - 1) as u16
    }

    /// Colour of a pen; out-of-range pens read as the transparent marker.
    #[must_use]
    pub fn color(&self, pen: u16) -> Rgb {
        self.colors
            .get(usize::from(pen))
            .copied()
            .unwrap_or(TRANSPARENT_RGB)
    }
}
