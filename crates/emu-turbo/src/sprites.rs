//! Sixteen zoomable sprites, drawn one scanline at a time.
//!
//! Eight sprite chips each own one ROM and two slots: slot `n` (road group)
//! and slot `n + 8` (off-road group). A chip's pixels occupy its own nibble
//! of the 32-bit line buffer, so overlapping sprites from different chips
//! combine without losing information and the priority PROM sorts them out
//! later.

use arcade_video::RomError;

/// Expanded sprite data end-of-row marker.
pub const END_OF_ROW: u32 = 0x1234_5678;

pub const SLOTS: usize = 16;
pub const CHIPS: usize = 8;
/// ROM bytes per sprite chip.
pub const CHIP_ROM_SIZE: usize = 0x2000;
pub const SPRITE_RAM_SIZE: usize = 0x200;
pub const POSITION_RAM_SIZE: usize = 0x200;
/// Sprite RAM bytes per slot.
const ENTRY_STRIDE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteGroup {
    Road,
    Offroad,
}

impl SpriteGroup {
    fn slots(self) -> std::ops::Range<usize> {
        match self {
            SpriteGroup::Road => 0..8,
            SpriteGroup::Offroad => 8..16,
        }
    }
}

/// Draws a group of sprites into a scanline buffer. `xclip` is the first
/// column the group may touch.
pub trait SpriteDrawer {
    fn draw_group(&mut self, line: &mut [u32], y: usize, group: SpriteGroup, xclip: usize);
}

/// Expand one chip's ROM to a pixel per entry: high nibble first, each
/// shifted into the chip's nibble of the line buffer. A 0xFF byte ends a
/// row and becomes two end markers.
#[must_use]
pub fn expand_chip(rom: &[u8], chip: usize) -> Vec<u32> {
    let shift = 4 * (chip % CHIPS);
    let mut out = Vec::with_capacity(rom.len() * 2);
    for &byte in rom {
        if byte == 0xFF {
            out.extend_from_slice(&[END_OF_ROW, END_OF_ROW]);
        } else {
            out.push(u32::from(byte >> 4) << shift);
            out.push(u32::from(byte & 0x0F) << shift);
        }
    }
    out
}

/// Per-frame parameters of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteParams {
    /// Some column of the position RAM selects this slot.
    pub enabled: bool,
    pub miny: usize,
    /// First row below the sprite.
    pub maxy: usize,
    pub xoffset: usize,
    /// 16.16 source step per screen pixel.
    pub xstep: u32,
    /// 16.16 source rows per screen row.
    pub yscale: u32,
    /// Source bytes per row; negative strides walk the ROM backwards.
    pub stride: i32,
    /// Source byte offset of row 0.
    pub offset: i32,
}

impl SpriteParams {
    fn decode(entry: &[u8]) -> Self {
        let xscale = u32::from(entry[2]);
        Self {
            enabled: false,
            miny: usize::from(entry[0]),
            maxy: usize::from(entry[1]),
            xoffset: 0,
            xstep: ((1280 - 4 * xscale) << 16) / 1280,
            yscale: (4 << 16) / (u32::from(entry[3]) + 4),
            stride: i32::from(i16::from_le_bytes([entry[4], entry[5]])),
            offset: i32::from(u16::from_le_bytes([entry[6], entry[7]]) & 0x1FFF),
        }
    }
}

/// Draw one sprite row into `line`. Returns the number of columns
/// touched.
pub fn draw_one(line: &mut [u32], y: usize, params: &SpriteParams, data: &[u32], xclip: usize) -> usize {
    if !params.enabled || y < params.miny || y >= params.maxy || data.is_empty() {
        return 0;
    }
    let row = ((y - params.miny) as u64 * u64::from(params.yscale)) >> 16;
    let start = (i64::from(params.offset) + row as i64 * i64::from(params.stride)) * 2;
    let len = data.len() as i64;

    let mut xcurr: u64 = 0;
    let mut drawn = 0;
    for x in params.xoffset..line.len() {
        let pixel = data[(start + (xcurr >> 16) as i64).rem_euclid(len) as usize];
        if pixel == END_OF_ROW {
            break;
        }
        if x >= xclip {
            line[x] |= pixel;
        }
        drawn += 1;
        xcurr += u64::from(params.xstep);
    }
    drawn
}

/// Expanded sprite data plus the per-frame slot parameters.
#[derive(Debug, Clone)]
pub struct SpriteTable {
    data: Vec<Vec<u32>>,
    params: [SpriteParams; SLOTS],
}

impl SpriteTable {
    /// `rom` holds the eight chip ROMs back to back.
    pub fn new(rom: &[u8]) -> Result<Self, RomError> {
        let expected = CHIPS * CHIP_ROM_SIZE;
        if rom.len() < expected {
            return Err(RomError::Undersized {
                table: "sprites",
                expected,
                actual: rom.len(),
            });
        }
        let data = rom[..expected]
            .chunks_exact(CHIP_ROM_SIZE)
            .enumerate()
            .map(|(chip, bank)| expand_chip(bank, chip))
            .collect();
        Ok(Self {
            data,
            params: [SpriteParams::default(); SLOTS],
        })
    }

    #[must_use]
    pub fn params(&self) -> &[SpriteParams; SLOTS] {
        &self.params
    }

    /// Recompute every slot from sprite RAM and the position RAM. Byte `i`
    /// of the position RAM covers column `i / 2`; its bits enable slots
    /// 0-7 (even bytes) or 8-15 (odd bytes) starting at that column.
    pub fn update(&mut self, sprite_ram: &[u8], position_ram: &[u8]) {
        for (slot, params) in self.params.iter_mut().enumerate() {
            let entry = sprite_ram
                .get(slot * ENTRY_STRIDE..slot * ENTRY_STRIDE + 8)
                .unwrap_or(&[0; 8]);
            *params = SpriteParams::decode(entry);
        }
        for (i, &bits) in position_ram.iter().enumerate() {
            if bits == 0 {
                continue;
            }
            let base = (i & 1) * 8;
            for bit in 0..8 {
                let params = &mut self.params[base + bit];
                if bits & (1 << bit) != 0 && !params.enabled {
                    params.enabled = true;
                    params.xoffset = i >> 1;
                }
            }
        }
    }
}

impl SpriteDrawer for SpriteTable {
    fn draw_group(&mut self, line: &mut [u32], y: usize, group: SpriteGroup, xclip: usize) {
        for slot in group.slots() {
            draw_one(line, y, &self.params[slot], &self.data[slot % CHIPS], xclip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(miny: usize, maxy: usize, xoffset: usize) -> SpriteParams {
        SpriteParams {
            enabled: true,
            miny,
            maxy,
            xoffset,
            xstep: 0x10000,
            yscale: 0x10000,
            stride: 4,
            offset: 0,
        }
    }

    #[test]
    fn expansion_shifts_into_chip_nibble() {
        assert_eq!(expand_chip(&[0x3A], 2), vec![0x300, 0xA00]);
        assert_eq!(expand_chip(&[0xFF, 0x01], 0), vec![END_OF_ROW, END_OF_ROW, 0, 1]);
    }

    #[test]
    fn end_of_row_stops_drawing() {
        for k in 1..12 {
            let mut data = vec![0x5; 32];
            data[k] = END_OF_ROW;
            let mut line = [0u32; 64];
            let drawn = draw_one(&mut line, 0, &unit(0, 1, 10), &data, 0);
            assert_eq!(drawn, k);
            assert!(line[10..10 + k].iter().all(|&p| p == 0x5));
            assert!(line[10 + k..].iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn rows_outside_the_sprite_are_skipped() {
        let data = vec![0x7; 16];
        let mut line = [0u32; 16];
        assert_eq!(draw_one(&mut line, 4, &unit(5, 9, 0), &data, 0), 0);
        assert_eq!(draw_one(&mut line, 9, &unit(5, 9, 0), &data, 0), 0);
        assert_ne!(draw_one(&mut line, 8, &unit(5, 9, 0), &data, 0), 0);
    }

    #[test]
    fn xclip_masks_columns_but_not_the_walk() {
        let data: Vec<u32> = (1..=8).collect();
        let mut line = [0u32; 8];
        draw_one(&mut line, 0, &unit(0, 1, 0), &data, 3);
        assert_eq!(line, [0, 0, 0, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn chips_or_into_separate_nibbles() {
        let mut line = [0u32; 4];
        draw_one(&mut line, 0, &unit(0, 1, 0), &[0x3, 0x3, 0x3, 0x3], 0);
        draw_one(&mut line, 0, &unit(0, 1, 2), &[0x50, 0x50], 0);
        assert_eq!(line, [0x3, 0x3, 0x53, 0x53]);
    }

    #[test]
    fn decode_entry_scales() {
        let p = SpriteParams::decode(&[10, 20, 0, 0, 0xFE, 0xFF, 0x34, 0xF2]);
        assert_eq!((p.miny, p.maxy), (10, 20));
        assert_eq!(p.xstep, 0x10000);
        assert_eq!(p.yscale, 0x10000);
        assert_eq!(p.stride, -2);
        assert_eq!(p.offset, 0x1234);

        let p = SpriteParams::decode(&[0, 0, 160, 4, 0, 0, 0, 0]);
        assert_eq!(p.xstep, 0x8000);
        assert_eq!(p.yscale, 0x8000);
    }

    #[test]
    fn position_ram_enables_slots() {
        let mut table = SpriteTable::new(&vec![0; CHIPS * CHIP_ROM_SIZE]).expect("rom large enough");
        let mut pos = vec![0u8; POSITION_RAM_SIZE];
        pos[2 * 40] = 0b0000_0100; // column 40, slot 2
        pos[2 * 41] = 0b0000_0100; // later column ignored
        pos[2 * 7 + 1] = 0b1000_0000; // column 7, slot 15
        table.update(&[0; SPRITE_RAM_SIZE], &pos);
        let p = table.params();
        assert!(p[2].enabled && p[2].xoffset == 40);
        assert!(p[15].enabled && p[15].xoffset == 7);
        assert!(!p[0].enabled);
        assert!(!p[10].enabled);
    }
}
