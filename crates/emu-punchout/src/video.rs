//! Punch-Out!! video: two tile layers, two big sprite layers and the
//! dual-monitor composite.
//!
//! The frame stacks the monitors vertically: rows 0-239 are the top
//! monitor, rows 240-479 the bottom one. Each monitor shows layer rows
//! 16-255 of its 256-line tilemap.

use arcade_video::blit::{Zoom, blit_zoomed, copy_bitmap, copy_scrolled};
use arcade_video::{
    Bitmap, CellFormat, CellLayer, ColorTable, GfxLayout, GfxSet, Palette, Rect, RomError, RomSet,
};
use emu_core::{Observable, Value};

use crate::config::{Calibration, PunchOutConfig};

pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 480;

const MONITOR_HEIGHT: i32 = 240;
/// Tilemap rows above the visible area of each monitor.
const HIDDEN_ROWS: i32 = 16;

const TOP_CLIP: Rect = Rect::new(0, FRAME_WIDTH as i32 - 1, 0, MONITOR_HEIGHT - 1);
const BOTTOM_CLIP: Rect = Rect::new(0, FRAME_WIDTH as i32 - 1, MONITOR_HEIGHT, 2 * MONITOR_HEIGHT - 1);

pub const BIG1_CONTROL_SIZE: usize = 8;
pub const BIG2_CONTROL_SIZE: usize = 5;

const TOP: usize = 0;
const BOTTOM: usize = 1;
const BIG1: usize = 2;
const BIG2: usize = 3;

pub struct PunchOutVideo {
    top: CellLayer,
    bottom: CellLayer,
    big1: CellLayer,
    big2: CellLayer,
    big1_control: [u8; BIG1_CONTROL_SIZE],
    big2_control: [u8; BIG2_CONTROL_SIZE],
    /// Unset until the first palette bank write, so that write always
    /// redraws.
    top_bank: Option<u8>,
    bottom_bank: Option<u8>,
    gfx: [GfxSet; 4],
    colors: [ColorTable; 4],
    palette: Palette,
    calibration: Calibration,
    frame: Bitmap<u16>,
}

impl PunchOutVideo {
    pub fn new(config: &PunchOutConfig, roms: &RomSet) -> Result<Self, RomError> {
        let chars = GfxLayout::separated(1024, 2);
        let big1 = GfxLayout::separated(8192, 3);
        let big2 = GfxLayout::separated(4096, 2);
        let gfx = [
            GfxSet::decode("top chars", roms.region("top chars", chars.rom_size())?, &chars)?,
            GfxSet::decode("bottom chars", roms.region("bottom chars", chars.rom_size())?, &chars)?,
            GfxSet::decode("big sprite 1", roms.region("big sprite 1", big1.rom_size())?, &big1)?,
            GfxSet::decode("big sprite 2", roms.region("big sprite 2", big2.rom_size())?, &big2)?,
        ];

        let palette = Palette::planar_inverted(roms.region("color prom", 0xC00)?, 1024)?;
        let transparent = palette.transparent_pen();
        let colors = [
            config.top_colors.build(transparent),
            config.bottom_colors.build(transparent),
            config.big1_colors.build(transparent),
            config.big2_colors.build(transparent),
        ];

        Ok(Self {
            top: CellLayer::new(CellFormat::tile_pair(32, 32, 0x03, 2, 0x1F)),
            bottom: CellLayer::new(CellFormat::tile_pair(64, 32, 0x03, 2, 0x1F)),
            big1: CellLayer::new(config.big1_format),
            big2: CellLayer::new(CellFormat::sprite_cell(16, 32, 0x0F, 0x3F)),
            big1_control: [0; BIG1_CONTROL_SIZE],
            big2_control: [0; BIG2_CONTROL_SIZE],
            top_bank: None,
            bottom_bank: None,
            gfx,
            colors,
            palette,
            calibration: config.calibration,
            frame: Bitmap::filled(FRAME_WIDTH, FRAME_HEIGHT, transparent),
        })
    }

    #[must_use]
    pub fn top(&self) -> &CellLayer {
        &self.top
    }

    pub fn top_mut(&mut self) -> &mut CellLayer {
        &mut self.top
    }

    #[must_use]
    pub fn bottom(&self) -> &CellLayer {
        &self.bottom
    }

    pub fn bottom_mut(&mut self) -> &mut CellLayer {
        &mut self.bottom
    }

    #[must_use]
    pub fn big1(&self) -> &CellLayer {
        &self.big1
    }

    pub fn big1_mut(&mut self) -> &mut CellLayer {
        &mut self.big1
    }

    #[must_use]
    pub fn big2(&self) -> &CellLayer {
        &self.big2
    }

    pub fn big2_mut(&mut self) -> &mut CellLayer {
        &mut self.big2
    }

    pub fn write_big1_control(&mut self, index: usize, data: u8) {
        if let Some(reg) = self.big1_control.get_mut(index) {
            *reg = data;
        }
    }

    pub fn write_big2_control(&mut self, index: usize, data: u8) {
        if let Some(reg) = self.big2_control.get_mut(index) {
            *reg = data;
        }
    }

    /// Bit 1 selects the top monitor bank, bit 0 the bottom one. A change
    /// forces a redraw of that monitor's layers only.
    pub fn write_palette_bank(&mut self, data: u8) {
        let top = (data >> 1) & 1;
        if self.top_bank != Some(top) {
            self.top_bank = Some(top);
            self.top.invalidate();
            self.big1.invalidate();
        }
        let bottom = data & 1;
        if self.bottom_bank != Some(bottom) {
            self.bottom_bank = Some(bottom);
            self.bottom.invalidate();
            self.big2.invalidate();
        }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn frame(&self) -> &Bitmap<u16> {
        &self.frame
    }

    /// Refresh the layer bitmaps and composite the frame.
    pub fn render(&mut self, full_refresh: bool) {
        if full_refresh {
            self.top.invalidate();
            self.bottom.invalidate();
            self.big1.invalidate();
            self.big2.invalidate();
        }

        let top_bank = usize::from(self.top_bank.unwrap_or(0));
        let bottom_bank = usize::from(self.bottom_bank.unwrap_or(0));
        self.top.render(&self.gfx[TOP], &self.colors[TOP], 64 * top_bank);
        self.bottom.render(&self.gfx[BOTTOM], &self.colors[BOTTOM], 64 * bottom_bank);
        self.big1.render(&self.gfx[BIG1], &self.colors[BIG1], 32 * top_bank);
        self.big2.render(&self.gfx[BIG2], &self.colors[BIG2], 64 * bottom_bank);

        self.frame.fill(self.palette.transparent_pen());
        self.composite_tiles();
        self.composite_big1();
        self.composite_big2();
    }

    fn composite_tiles(&mut self) {
        copy_scrolled(&mut self.frame, self.top.bitmap(), &TOP_CLIP, |y| y + HIDDEN_ROWS, |_| 0);

        // One (low, high) scroll pair per tile row, stored over the first
        // 64 bytes of the bottom video RAM.
        let ram = self.bottom.ram();
        let bias = self.calibration.scroll_bias;
        let layer_row = |y: i32| y - (MONITOR_HEIGHT - HIDDEN_ROWS);
        copy_scrolled(&mut self.frame, self.bottom.bitmap(), &BOTTOM_CLIP, layer_row, |y| {
            let row = (layer_row(y) / 8) as usize;
            bias + i32::from(ram[row * 2]) + 256 * i32::from(ram[row * 2 + 1] & 1)
        });
    }

    fn composite_big1(&mut self) {
        let r = self.big1_control;
        let cal = self.calibration;
        let zoom = i64::from(r[0]) + 256 * i64::from(r[1] & 0x0F);
        if zoom == 0 {
            return;
        }

        // x is in quarter pixels.
        let mut sx = 4096 - (i32::from(r[2]) + 256 * i32::from(r[3] & 0x0F));
        if sx > 4096 - 4 * 127 {
            sx -= 4096;
        }
        let mut sy = -(i32::from(r[4]) + 256 * i32::from(r[5] & 1));
        if sy <= -256 + (zoom / 0x40) as i32 {
            sy += 512;
        }
        sy += cal.big1_y_offset;

        let inc = zoom << 6;
        let mut walk = Zoom {
            start_x: -i64::from(sx) * 0x4000 + cal.big1_x_bias * zoom,
            start_y: -i64::from(sy) * 0x10000 - cal.big1_y_bias * zoom,
            inc_x: inc,
            inc_y: inc,
        };
        if r[6] & 1 != 0 {
            walk = walk.flipped_x(self.big1.bitmap().width());
        }

        let transparent = self.palette.transparent_pen();
        if r[7] & 1 != 0 {
            let top = Zoom {
                start_y: walk.start_y + 0x200 * 2 * zoom,
                ..walk
            };
            blit_zoomed(&mut self.frame, self.big1.bitmap(), &TOP_CLIP, (0, -HIDDEN_ROWS), &top, transparent);
        }
        if r[7] & 2 != 0 {
            let bottom = Zoom {
                start_y: walk.start_y - 0x200 * (2 * 30 - 2) * zoom,
                ..walk
            };
            let origin = (0, MONITOR_HEIGHT - HIDDEN_ROWS);
            blit_zoomed(&mut self.frame, self.big1.bitmap(), &BOTTOM_CLIP, origin, &bottom, transparent);
        }
    }

    fn composite_big2(&mut self) {
        let r = self.big2_control;
        let cal = self.calibration;
        let mut sx = 512 - (i32::from(r[0]) + 256 * i32::from(r[1] & 1));
        if sx > 512 - 127 {
            sx -= 512;
        }
        sx -= cal.big2_x_offset;
        let sy = -i32::from(r[2]) + 256 * i32::from(r[3] & 1) + cal.big2_y_offset;

        copy_bitmap(
            &mut self.frame,
            self.big2.bitmap(),
            sx,
            sy + MONITOR_HEIGHT - HIDDEN_ROWS,
            r[4] & 1 != 0,
            &BOTTOM_CLIP,
            Some(self.palette.transparent_pen()),
        );
    }
}

fn bank_value(bank: Option<u8>) -> Value {
    Value::I32(bank.map_or(-1, i32::from))
}

impl Observable for PunchOutVideo {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "palette_bank.top" => Some(bank_value(self.top_bank)),
            "palette_bank.bottom" => Some(bank_value(self.bottom_bank)),
            "big1.control" => Some(self.big1_control.as_slice().into()),
            "big2.control" => Some(self.big2_control.as_slice().into()),
            "dirty.top" => Some((self.top.dirty().count() as u32).into()),
            "dirty.bottom" => Some((self.bottom.dirty().count() as u32).into()),
            "dirty.big1" => Some((self.big1.dirty().count() as u32).into()),
            "dirty.big2" => Some((self.big2.dirty().count() as u32).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "palette_bank.top",
            "palette_bank.bottom",
            "big1.control",
            "big2.control",
            "dirty.top",
            "dirty.bottom",
            "dirty.big1",
            "dirty.big2",
        ]
    }
}
