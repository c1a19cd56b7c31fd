//! Planar 8x8 graphics decoding.
//!
//! Tiles are stored one byte per row (bit 7 leftmost) with each bitplane in
//! its own contiguous slice of the ROM. Plane 0 supplies the least
//! significant bit of the pen.

use crate::rom::RomError;

/// Pixels per tile side.
pub const TILE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxLayout {
    /// Number of tiles.
    pub count: usize,
    /// Bits per pixel.
    pub planes: usize,
    /// Byte distance between consecutive planes.
    pub plane_stride: usize,
}

impl GfxLayout {
    /// Layout with planes packed back to back (`count * 8` bytes each).
    #[must_use]
    pub const fn separated(count: usize, planes: usize) -> Self {
        Self {
            count,
            planes,
            plane_stride: count * TILE,
        }
    }

    /// ROM bytes the layout reads.
    #[must_use]
    pub const fn rom_size(&self) -> usize {
        self.plane_stride * (self.planes - 1) + self.count * TILE
    }
}

/// Decoded tiles, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxSet {
    planes: usize,
    pixels: Vec<u8>,
}

impl GfxSet {
    /// Decode `rom` according to `layout`; `table` names the region in the
    /// error when the ROM is too small.
    pub fn decode(table: &'static str, rom: &[u8], layout: &GfxLayout) -> Result<Self, RomError> {
        let expected = layout.rom_size();
        if rom.len() < expected {
            return Err(RomError::Undersized {
                table,
                expected,
                actual: rom.len(),
            });
        }

        let mut pixels = vec![0u8; layout.count * TILE * TILE];
        for code in 0..layout.count {
            for row in 0..TILE {
                let dest = &mut pixels[(code * TILE + row) * TILE..][..TILE];
                for plane in 0..layout.planes {
                    let byte = rom[plane * layout.plane_stride + code * TILE + row];
                    for (col, px) in dest.iter_mut().enumerate() {
                        *px |= ((byte >> (7 - col)) & 1) << plane;
                    }
                }
            }
        }
        Ok(Self {
            planes: layout.planes,
            pixels,
        })
    }

    /// Number of tiles.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pixels.len() / (TILE * TILE)
    }

    /// Pens per colour: `1 << planes`.
    #[must_use]
    pub fn granularity(&self) -> usize {
        1 << self.planes
    }

    /// The 64 pixels of a tile, row-major. Codes wrap at the tile count.
    #[must_use]
    pub fn tile(&self, code: usize) -> &[u8] {
        let code = code % self.count().max(1);
        &self.pixels[code * TILE * TILE..][..TILE * TILE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_plane_decode() {
        let layout = GfxLayout::separated(2, 2);
        let mut rom = vec![0u8; layout.rom_size()];
        rom[8] = 0b1000_0001; // tile 1 row 0, plane 0
        rom[16 + 8] = 0b1100_0000; // tile 1 row 0, plane 1
        let gfx = GfxSet::decode("test", &rom, &layout).expect("rom large enough");
        let tile = gfx.tile(1);
        assert_eq!(&tile[..8], &[3, 2, 0, 0, 0, 0, 0, 1]);
        assert!(gfx.tile(0).iter().all(|&p| p == 0));
        assert_eq!(gfx.granularity(), 4);
    }

    #[test]
    fn codes_wrap() {
        let layout = GfxLayout::separated(2, 1);
        let mut rom = vec![0u8; layout.rom_size()];
        rom[0] = 0xFF;
        let gfx = GfxSet::decode("test", &rom, &layout).expect("rom large enough");
        assert_eq!(gfx.tile(2), gfx.tile(0));
    }

    #[test]
    fn short_rom_is_rejected() {
        let layout = GfxLayout::separated(4, 3);
        let err = GfxSet::decode("sprites", &[0; 40], &layout).expect_err("too small");
        assert_eq!(
            err,
            RomError::Undersized {
                table: "sprites",
                expected: 96,
                actual: 40
            }
        );
    }
}
