//! Procedural road, priority resolution and collision detection.
//!
//! The road is not stored as graphics: every pixel derives from the
//! scanline, the column and six PPI output registers through four small ROM
//! tables that act as adders against the column counter. The carry bits of
//! those additions form an "area" code that the road-enable PROM maps to a
//! surface type. The same sweep resolves sprite priority, feeds the
//! collision latch and (when the frame is displayed) picks the final
//! colour of every pixel through the overall-priority PROM.

use arcade_video::{DrawPass, Pixel, RomError, RomSet};

use crate::sprites::{SpriteDrawer, SpriteGroup};

pub const LINE_WIDTH: usize = 256;

/// Number of selectable banks in each priority PROM.
pub const PRIORITY_BANKS: usize = 4;

/// Road-enable PROM entry bits.
const SLIPAR: u8 = 0x10;
const ACCIAR: u8 = 0x20;

/// PPI output registers read by the road hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoadRegisters {
    /// Vertical road offset (PPI #0 A).
    pub opa: u8,
    /// Horizontal road offset (PPI #0 B).
    pub opb: u8,
    /// Bit 7 clear flips the road vertically (PPI #0 C).
    pub opc: u8,
    /// Road table selectors left and right of the OPB carry (PPI #1 A/B).
    pub ipa: u8,
    pub ipb: u8,
    /// Road colour nibbles, low for the left side (PPI #1 C).
    pub ipc: u8,
    /// Background colour bank (PPI #3 C low nibble).
    pub fbcol: u8,
    /// Priority PROM bank (PPI #3 C bits 4-5).
    pub prbank: u8,
}

/// ROM and PROM tables of the road board.
#[derive(Debug, Clone)]
pub struct RoadTables {
    road: Vec<u8>,
    edge: Vec<u8>,
    road_enable: Vec<u8>,
    sprite_priority: Vec<u8>,
    overall_priority: Vec<u8>,
    road_palette: Vec<u8>,
    back_palette: Vec<u8>,
}

impl RoadTables {
    pub fn from_roms(roms: &RomSet) -> Result<Self, RomError> {
        Ok(Self {
            road: roms.region("road", 0x4000)?.to_vec(),
            edge: roms.region("edge", LINE_WIDTH / 8)?.to_vec(),
            road_enable: roms.region("road enable", 0x20)?.to_vec(),
            sprite_priority: roms.region("sprite priority", 0x100 * PRIORITY_BANKS)?.to_vec(),
            overall_priority: roms.region("overall priority", 0x20 * PRIORITY_BANKS)?.to_vec(),
            road_palette: roms.region("road palette", 0x80)?.to_vec(),
            back_palette: roms.region("back palette", 0x200)?.to_vec(),
        })
    }

    #[inline]
    fn road(&self, table: usize, index: usize) -> usize {
        usize::from(self.road[table * 0x1000 + index])
    }

    /// Generate one scanline. Road-group sprites are drawn first; the
    /// off-road group is drawn at most once, the first time the sweep
    /// reaches a surface with ACCIAR set, clipped to start at that column.
    /// Returns the collision bits found on the line.
    ///
    /// With a [`FullDraw`](arcade_video::FullDraw) pass, `fore` is the
    /// foreground layer row (pens, `fore_transparent` where empty) and
    /// `out` receives the final pens; a collision-only pass ignores both.
    pub fn scanline<P, D, S>(
        &self,
        y: usize,
        regs: &RoadRegisters,
        sprites: &mut S,
        fore: &[u16],
        fore_transparent: u16,
        out: &mut [P],
    ) -> u8
    where
        P: Pixel,
        D: DrawPass,
        S: SpriteDrawer + ?Sized,
    {
        let mut line = [0u32; LINE_WIDTH];
        sprites.draw_group(&mut line, y, SpriteGroup::Road, 0);
        let mut offroad_drawn = false;
        let mut collision = 0u8;
        let bank = usize::from(regs.prbank) % PRIORITY_BANKS;

        let mut va = (y + usize::from(regs.opa)) & 0xFF;
        if regs.opc & 0x80 == 0 {
            va ^= 0xFF;
        }

        for x in 0..LINE_WIDTH {
            let (sel, coch) = if (x + usize::from(regs.opb)) >> 8 != 0 {
                (usize::from(regs.ipb), regs.ipc >> 4)
            } else {
                (usize::from(regs.ipa), regs.ipc & 0x0F)
            };
            let lo = ((sel & 0x0F) << 8) | va;
            let hi = ((sel & 0xF0) << 4) | va;
            let area = ((self.road(0, lo) + x) >> 8) & 0x01
                | ((self.road(1, lo) + x) >> 7) & 0x02
                | ((self.road(2, hi) + x) >> 6) & 0x04
                | ((self.road(3, hi) + x) >> 5) & 0x08
                | (usize::from(self.edge[x >> 3] >> (x & 7)) & 1) << 4;

            let surface = self.road_enable[area];
            if surface & ACCIAR != 0 && !offroad_drawn {
                sprites.draw_group(&mut line, y, SpriteGroup::Offroad, x);
                offroad_drawn = true;
            }

            let sprite = line[x];
            let mut plb = 0usize;
            for chip in 0..8 {
                if (sprite >> (4 * chip)) & 0x0F != 0 {
                    plb |= 1 << chip;
                }
            }
            let prio = self.sprite_priority[(bank << 8) | plb];

            let mut mask = 0x03;
            if surface & SLIPAR != 0 {
                mask |= 0x04;
            }
            if surface & ACCIAR != 0 {
                mask |= 0x08;
            }
            collision |= (prio >> 4) & mask;

            if D::DRAW {
                let babit = usize::from(surface & 0x07);
                let chip = u32::from(prio & 0x07);
                let sprite_color = ((chip << 4) | ((sprite >> (4 * chip)) & 0x0F)) as u8;
                let sprite_visible = usize::from(prio & 0x08 != 0);

                let road_color = self.road_palette[(usize::from(coch) << 3) | babit] & 0x3F;
                let road_present = usize::from(babit != 0);

                let fg = fore.get(x).copied().unwrap_or(fore_transparent);
                let fore_present = fg != fore_transparent;
                let back_color = if fore_present {
                    (fg & 0x3F) as u8
                } else {
                    let index = (usize::from(regs.fbcol & 0x0F) << 5) | (va >> 3);
                    self.back_palette[index] & 0x3F
                };

                let mux = self.overall_priority[bank << 5
                    | sprite_visible
                    | road_present << 1
                    | usize::from(fore_present) << 2
                    | usize::from((prio >> 4) & 0x03) << 3];

                let mut pen = 0u8;
                if mux & 0x01 != 0 {
                    pen |= sprite_color;
                }
                if mux & 0x02 != 0 {
                    pen |= 0x80 | road_color;
                }
                if mux & 0x04 != 0 {
                    pen |= 0xC0 | back_color;
                }
                if let Some(px) = out.get_mut(x) {
                    *px = P::from_pen(u16::from(pen));
                }
            }
        }
        collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_video::{CollisionOnly, FullDraw};

    fn tables() -> RoadTables {
        RoadTables {
            road: vec![0; 0x4000],
            edge: vec![0; LINE_WIDTH / 8],
            road_enable: vec![0; 0x20],
            sprite_priority: vec![0; 0x100 * PRIORITY_BANKS],
            overall_priority: vec![0; 0x20 * PRIORITY_BANKS],
            road_palette: vec![0; 0x80],
            back_palette: vec![0; 0x200],
        }
    }

    /// Records group draws; the off-road group paints chip 1 everywhere it
    /// is allowed to.
    #[derive(Default)]
    struct Recorder {
        draws: Vec<(usize, SpriteGroup, usize)>,
    }

    impl SpriteDrawer for Recorder {
        fn draw_group(&mut self, line: &mut [u32], y: usize, group: SpriteGroup, xclip: usize) {
            self.draws.push((y, group, xclip));
            if group == SpriteGroup::Offroad {
                for px in &mut line[xclip..] {
                    *px |= 0x10;
                }
            }
        }
    }

    fn registers() -> RoadRegisters {
        RoadRegisters {
            opc: 0x80,
            ..RoadRegisters::default()
        }
    }

    #[test]
    fn offroad_group_fires_once_at_first_offroad_pixel() {
        let mut t = tables();
        // Area bit 4 comes from the edge PROM: on-road, off, on, off.
        for x in (10..20).chain(30..40) {
            t.edge[x >> 3] |= 1 << (x & 7);
        }
        t.road_enable[0x00] = 0x00;
        t.road_enable[0x10] = ACCIAR;

        let mut rec = Recorder::default();
        for y in 16..20 {
            t.scanline::<u8, CollisionOnly, _>(y, &registers(), &mut rec, &[], 0, &mut []);
        }
        let offroad: Vec<_> = rec
            .draws
            .iter()
            .filter(|d| d.1 == SpriteGroup::Offroad)
            .collect();
        assert_eq!(offroad.len(), 4);
        assert!(offroad.iter().all(|d| d.2 == 10));
        let road = rec.draws.iter().filter(|d| d.1 == SpriteGroup::Road).count();
        assert_eq!(road, 4);
    }

    #[test]
    fn no_offroad_surface_no_offroad_draw() {
        let t = tables();
        let mut rec = Recorder::default();
        t.scanline::<u8, CollisionOnly, _>(20, &registers(), &mut rec, &[], 0, &mut []);
        assert_eq!(rec.draws, vec![(20, SpriteGroup::Road, 0)]);
    }

    #[test]
    fn collision_masked_by_surface() {
        let mut t = tables();
        t.edge[50 >> 3] = 1 << (50 & 7);
        t.road_enable[0x10] = ACCIAR;
        // Chip 1 alone: priority PROM reports all four collision bits.
        t.sprite_priority[0x02] = 0xF0;
        let mut rec = Recorder::default();
        let bits = t.scanline::<u8, CollisionOnly, _>(0, &registers(), &mut rec, &[], 0, &mut []);
        // SLIPAR never set: bit 2 masked off.
        assert_eq!(bits, 0x0B);
    }

    #[test]
    fn carry_selects_right_hand_registers() {
        let mut t = tables();
        // Table 0 entry for selector 1: carry bit 0 set for every column.
        let regs = RoadRegisters {
            opb: 0x80,
            ipa: 0x00,
            ipb: 0x01,
            ..registers()
        };
        let va = 5usize;
        t.road[(1 << 8) | va] = 0xFF;
        t.road_enable[0x01] = 0x01; // babit 1
        t.road_palette[(0x3 << 3) | 1] = 0x15;
        t.overall_priority[0x02] = 0x02; // road only
        let regs = RoadRegisters { ipc: 0x30, opa: 5, ..regs };

        let mut out = [0u8; LINE_WIDTH];
        let mut rec = Recorder::default();
        t.scanline::<u8, FullDraw, _>(0, &regs, &mut rec, &[], 0xFFFF, &mut out);
        // x + 0x80 < 0x100 for x < 128: left registers, table entry 0.
        assert_eq!(out[0], 0);
        assert_eq!(out[127], 0);
        assert_eq!(out[128], 0x80 | 0x15);
        assert_eq!(out[255], 0x80 | 0x15);
    }

    #[test]
    fn foreground_beats_background_palette() {
        let mut t = tables();
        t.back_palette[(3 << 5) | (0xFF >> 3)] = 0x2A;
        t.overall_priority[0x00] = 0x04;
        t.overall_priority[0x04] = 0x04;
        let regs = RoadRegisters {
            opc: 0x00, // va inverted: y 0 -> 0xFF
            fbcol: 3,
            ..RoadRegisters::default()
        };
        let mut fore = [256u16; LINE_WIDTH];
        fore[1] = 0xC7;
        let mut out = [0u16; LINE_WIDTH];
        let mut rec = Recorder::default();
        t.scanline::<u16, FullDraw, _>(0, &regs, &mut rec, &fore, 256, &mut out);
        assert_eq!(out[0], 0xC0 | 0x2A);
        assert_eq!(out[1], 0xC0 | 0x07);
    }

    #[test]
    fn visible_sprite_colour_carries_chip_number() {
        let mut t = tables();
        t.edge[0] = 0x01;
        t.road_enable[0x10] = ACCIAR;
        t.sprite_priority[0x02] = 0x08 | 0x01; // chip 1 wins, visible
        t.overall_priority[0x01] = 0x01;
        let mut out = [0u8; LINE_WIDTH];
        let mut rec = Recorder::default();
        t.scanline::<u8, FullDraw, _>(0, &registers(), &mut rec, &[], 0xFFFF, &mut out);
        // Chip 1 pixel value 1 -> colour (1 << 4) | 1.
        assert_eq!(out[0], 0x11);
    }

    #[test]
    fn edge_prom_packs_eight_columns_per_byte() {
        let mut t = tables();
        t.edge[1] = 0x04; // column 10 only
        t.road_enable[0x10] = ACCIAR;
        t.sprite_priority[0x02] = 0x80;
        let mut rec = Recorder::default();
        let bits = t.scanline::<u8, CollisionOnly, _>(0, &registers(), &mut rec, &[], 0, &mut []);
        assert_eq!(bits, 0x08);
        assert!(rec.draws.contains(&(0, SpriteGroup::Offroad, 10)));
    }

    #[test]
    fn priority_bank_switch_changes_winning_source() {
        let mut t = tables();
        // Road everywhere (babit 1) with a sprite from chip 1 on every column.
        t.edge.fill(0xFF);
        t.road_enable[0x10] = ACCIAR | 0x01;
        t.road_palette[1] = 0x15;
        t.sprite_priority[0x02] = 0x08 | 0x01;
        t.sprite_priority[0x100 | 0x02] = 0x08 | 0x01;
        // Sprite visible and road present: bank 0 shows the sprite, bank 1 the road.
        t.overall_priority[0x03] = 0x01;
        t.overall_priority[0x20 | 0x03] = 0x02;

        let mut rec = Recorder::default();
        let mut out = [0u8; LINE_WIDTH];
        t.scanline::<u8, FullDraw, _>(0, &registers(), &mut rec, &[], 0xFFFF, &mut out);
        assert_eq!(out[100], 0x11);

        let regs = RoadRegisters {
            prbank: 1,
            ..registers()
        };
        t.scanline::<u8, FullDraw, _>(0, &regs, &mut rec, &[], 0xFFFF, &mut out);
        assert_eq!(out[100], 0x80 | 0x15);
    }
}
