//! Turbo video: the foreground tile layer feeding the per-scanline road
//! generator.

use std::ops::RangeInclusive;

use arcade_video::{
    Bitmap, CellFormat, CellLayer, ColorRule, ColorTable, DrawPass, GfxLayout, GfxSet, Palette,
    Pixel, RomError, RomSet, TransparentRule,
};
use emu_core::{Observable, Value};

use crate::collision::CollisionLatch;
use crate::config::TurboConfig;
use crate::road::{LINE_WIDTH, RoadRegisters, RoadTables};
use crate::sprites::{CHIP_ROM_SIZE, CHIPS, SpriteTable};

pub const FRAME_WIDTH: usize = LINE_WIDTH;
pub const FRAME_HEIGHT: usize = 256;

/// Foreground pens live in the top quarter of the palette; pen 0 of each
/// tile is see-through.
const FORE_COLORS: ColorRule = ColorRule {
    entries: 64,
    xor: 0,
    offset: 0xC0,
    transparent: Some(TransparentRule { period: 4, residue: 0 }),
};

pub struct TurboVideo<P: Pixel> {
    fore: CellLayer,
    fore_gfx: GfxSet,
    fore_colors: ColorTable,
    palette: Palette,
    road: RoadTables,
    sprites: SpriteTable,
    visible: RangeInclusive<usize>,
    frame: Bitmap<P>,
}

impl<P: Pixel> TurboVideo<P> {
    pub fn new(config: &TurboConfig, roms: &RomSet) -> Result<Self, RomError> {
        let chars = GfxLayout::separated(512, 2);
        let fore_gfx = GfxSet::decode("fg chars", roms.region("fg chars", chars.rom_size())?, &chars)?;
        let palette = Palette::nibble_packed(roms.region("color prom", 0x200)?, 256)?;
        let fore_colors = FORE_COLORS.build(palette.transparent_pen());
        let sprites = SpriteTable::new(roms.region("sprites", CHIPS * CHIP_ROM_SIZE)?)?;
        let last = config.last_visible_line.min(FRAME_HEIGHT - 1);

        Ok(Self {
            fore: CellLayer::new(CellFormat::tile_pair(32, 32, 0x01, 2, 0x0F)),
            fore_gfx,
            fore_colors,
            palette,
            road: RoadTables::from_roms(roms)?,
            sprites,
            visible: config.first_visible_line..=last,
            frame: Bitmap::new(FRAME_WIDTH, FRAME_HEIGHT),
        })
    }

    #[must_use]
    pub fn fore(&self) -> &CellLayer {
        &self.fore
    }

    pub fn fore_mut(&mut self) -> &mut CellLayer {
        &mut self.fore
    }

    #[must_use]
    pub fn sprites(&self) -> &SpriteTable {
        &self.sprites
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn frame(&self) -> &Bitmap<P> {
        &self.frame
    }

    /// Rebuild the sprite table and sweep every visible scanline, feeding
    /// `collision`. A [`FullDraw`](arcade_video::FullDraw) pass also
    /// refreshes the foreground and writes the frame.
    pub fn render<D: DrawPass>(
        &mut self,
        regs: &RoadRegisters,
        sprite_ram: &[u8],
        position_ram: &[u8],
        collision: &CollisionLatch,
    ) {
        if D::DRAW {
            let redrawn = self.fore.render(&self.fore_gfx, &self.fore_colors, 0);
            log::trace!("foreground: {redrawn} cells redrawn");
        }
        self.sprites.update(sprite_ram, position_ram);

        let transparent = self.palette.transparent_pen();
        for y in self.visible.clone() {
            let fore = self.fore.bitmap().row(y);
            let out = self.frame.row_mut(y);
            let bits = self
                .road
                .scanline::<P, D, _>(y, regs, &mut self.sprites, fore, transparent, out);
            collision.accumulate(bits);
        }
    }
}

impl<P: Pixel> Observable for TurboVideo<P> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "dirty" => Some((self.fore.dirty().count() as u32).into()),
            "sprites.enabled" => {
                let mask = self
                    .sprites
                    .params()
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.enabled)
                    .fold(0u16, |acc, (slot, _)| acc | 1 << slot);
                Some(mask.into())
            }
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["dirty", "sprites.enabled"]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arcade_video::{CollisionOnly, FullDraw};

    /// Every table present and zeroed.
    pub(crate) fn blank_roms() -> RomSet {
        RomSet::new()
            .with("program", vec![0; 0x6000])
            .with("fg chars", vec![0; 0x2000])
            .with("sprites", vec![0; 0x10000])
            .with("road", vec![0; 0x4000])
            .with("edge", vec![0; 0x20])
            .with("road enable", vec![0; 0x20])
            .with("sprite priority", vec![0; 0x400])
            .with("overall priority", vec![0; 0x80])
            .with("road palette", vec![0; 0x80])
            .with("back palette", vec![0; 0x200])
            .with("color prom", vec![0; 0x200])
    }

    fn video(roms: &RomSet) -> TurboVideo<u8> {
        TurboVideo::new(&TurboConfig::default(), roms)
            .ok()
            .expect("roms are complete")
    }

    #[test]
    fn missing_road_table_is_reported() {
        let mut roms = blank_roms();
        roms.insert("road enable", vec![0; 0x10]);
        let err = TurboVideo::<u8>::new(&TurboConfig::default(), &roms).err();
        assert!(matches!(
            err,
            Some(RomError::Undersized { table: "road enable", expected: 0x20, actual: 0x10 })
        ));
    }

    #[test]
    fn background_fills_only_visible_lines() {
        let mut roms = blank_roms();
        // Background wins everywhere; bank 0 colour 0x15.
        roms.insert("overall priority", vec![0x04; 0x80]);
        roms.insert("back palette", vec![0x15; 0x200]);
        let mut v = video(&roms);
        let latch = CollisionLatch::new();
        v.render::<FullDraw>(&RoadRegisters::default(), &[0; 0x200], &[0; 0x200], &latch);

        assert_eq!(v.frame().get(0, 15), Some(0));
        assert_eq!(v.frame().get(0, 16), Some(0xD5));
        assert_eq!(v.frame().get(255, 239), Some(0xD5));
        assert_eq!(v.frame().get(0, 240), Some(0));
    }

    #[test]
    fn collision_pass_leaves_frame_untouched() {
        let mut roms = blank_roms();
        roms.insert("overall priority", vec![0x04; 0x80]);
        roms.insert("back palette", vec![0x15; 0x200]);
        // Every empty-sprite pixel reports collision bit 0.
        let mut prio = vec![0u8; 0x400];
        prio[0] = 0x10;
        roms.insert("sprite priority", prio);
        let mut v = video(&roms);
        let latch = CollisionLatch::new();
        v.render::<CollisionOnly>(&RoadRegisters::default(), &[0; 0x200], &[0; 0x200], &latch);

        assert_eq!(latch.read(), 0x01);
        assert!(v.frame().pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn foreground_tile_shows_through_background() {
        let mut roms = blank_roms();
        // Tile 1 solid in plane 0 only: raw pen 1.
        let mut chars = vec![0u8; 0x2000];
        chars[8..16].fill(0xFF);
        roms.insert("fg chars", chars);
        roms.insert("overall priority", vec![0x04; 0x80]);
        let mut v = video(&roms);
        // Cell (row 2, column 0).
        v.fore_mut().write(2 * 64, 0x01);
        let latch = CollisionLatch::new();
        v.render::<FullDraw>(&RoadRegisters::default(), &[0; 0x200], &[0; 0x200], &latch);

        assert_eq!(v.frame().get(0, 16), Some(0xC1));
        assert_eq!(v.frame().get(8, 16), Some(0xC0));
        assert_eq!(v.query("dirty"), Some(Value::U32(0)));
    }
}
