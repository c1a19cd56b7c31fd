//! Dirty-tracked tile layers.
//!
//! A [`CellLayer`] owns a video RAM region organised as fixed-size cells
//! (tile pairs or four-byte sprite cells), a [`DirtyMap`] with one flag per
//! cell, and a persistent bitmap holding the rendered cells. A write marks
//! its cell dirty only when the stored value actually changes, and
//! [`CellLayer::render`] redraws dirty cells only. Full invalidation is
//! reserved for events that change how every cell decodes (palette bank
//! switches).

use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::colortable::ColorTable;
use crate::gfx::{GfxSet, TILE};

/// How a layer's RAM decodes into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFormat {
    pub columns: usize,
    pub rows: usize,
    /// 2 for tile pairs, 4 for sprite cells.
    pub bytes_per_cell: usize,
    /// Bits of byte 1 forming tile code bits 8 and up.
    pub code_mask: u8,
    /// Byte holding the colour and flip bits.
    pub attr_byte: usize,
    pub color_shift: u8,
    /// Applied after `color_shift`.
    pub color_mask: u8,
    pub flip_mask: u8,
    /// Bit n set: a change of byte n redraws the cell.
    pub watched: u8,
}

impl CellFormat {
    /// Two-byte cells: code low, then code high / colour / flip.
    #[must_use]
    pub const fn tile_pair(columns: usize, rows: usize, code_mask: u8, color_shift: u8, color_mask: u8) -> Self {
        Self {
            columns,
            rows,
            bytes_per_cell: 2,
            code_mask,
            attr_byte: 1,
            color_shift,
            color_mask,
            flip_mask: 0x80,
            watched: 0b11,
        }
    }

    /// Four-byte sprite cells: code low, code high, unused, flip / colour.
    #[must_use]
    pub const fn sprite_cell(columns: usize, rows: usize, code_mask: u8, color_mask: u8) -> Self {
        Self {
            columns,
            rows,
            bytes_per_cell: 4,
            code_mask,
            attr_byte: 3,
            color_shift: 0,
            color_mask,
            flip_mask: 0x80,
            watched: 0b1011,
        }
    }

    #[must_use]
    pub const fn cells(&self) -> usize {
        self.columns * self.rows
    }

    #[must_use]
    pub const fn ram_size(&self) -> usize {
        self.cells() * self.bytes_per_cell
    }
}

/// A decoded cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub code: usize,
    /// Colour before the palette bank offset.
    pub color: usize,
    pub flip_x: bool,
}

/// One flag per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyMap {
    flags: Vec<bool>,
}

impl DirtyMap {
    /// A map with every cell dirty.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        Self {
            flags: vec![true; cells],
        }
    }

    pub fn mark(&mut self, cell: usize) {
        if let Some(flag) = self.flags.get_mut(cell) {
            *flag = true;
        }
    }

    pub fn mark_all(&mut self) {
        self.flags.fill(true);
    }

    pub fn clear_all(&mut self) {
        self.flags.fill(false);
    }

    #[must_use]
    pub fn is_dirty(&self, cell: usize) -> bool {
        self.flags.get(cell).copied().unwrap_or(false)
    }

    /// Number of dirty cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    #[must_use]
    pub fn all_dirty(&self) -> bool {
        self.flags.iter().all(|&f| f)
    }
}

/// A tile or sprite layer with its RAM, dirty map and persistent bitmap.
#[derive(Debug, Clone)]
pub struct CellLayer {
    format: CellFormat,
    ram: Vec<u8>,
    dirty: DirtyMap,
    bitmap: Bitmap<u16>,
}

impl CellLayer {
    /// Zeroed RAM, every cell dirty.
    #[must_use]
    pub fn new(format: CellFormat) -> Self {
        Self {
            format,
            ram: vec![0; format.ram_size()],
            dirty: DirtyMap::new(format.cells()),
            bitmap: Bitmap::new(format.columns * TILE, format.rows * TILE),
        }
    }

    #[must_use]
    pub fn format(&self) -> &CellFormat {
        &self.format
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    #[must_use]
    pub fn read(&self, offset: usize) -> u8 {
        self.ram.get(offset).copied().unwrap_or(0)
    }

    /// CPU write. Returns true when the cell was marked dirty.
    pub fn write(&mut self, offset: usize, value: u8) -> bool {
        let Some(slot) = self.ram.get_mut(offset) else {
            return false;
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        let byte = offset % self.format.bytes_per_cell;
        if self.format.watched & (1 << byte) == 0 {
            return false;
        }
        self.dirty.mark(offset / self.format.bytes_per_cell);
        true
    }

    /// Store a byte without touching the dirty map, for RAM that is also
    /// decoded as something else (row scroll values).
    pub fn poke(&mut self, offset: usize, value: u8) {
        if let Some(slot) = self.ram.get_mut(offset) {
            *slot = value;
        }
    }

    /// Mark every cell for redraw.
    pub fn invalidate(&mut self) {
        self.dirty.mark_all();
    }

    #[must_use]
    pub fn dirty(&self) -> &DirtyMap {
        &self.dirty
    }

    #[must_use]
    pub fn bitmap(&self) -> &Bitmap<u16> {
        &self.bitmap
    }

    /// Decode cell `index`.
    #[must_use]
    pub fn cell(&self, index: usize) -> Cell {
        let f = &self.format;
        let base = index * f.bytes_per_cell;
        let byte = |n: usize| self.ram.get(base + n).copied().unwrap_or(0);
        let attr = byte(f.attr_byte);
        Cell {
            code: usize::from(byte(0)) | usize::from(byte(1) & f.code_mask) << 8,
            color: usize::from((attr >> f.color_shift) & f.color_mask),
            flip_x: attr & f.flip_mask != 0,
        }
    }

    /// Redraw dirty cells into the bitmap (opaque) and clear their flags.
    /// `color_base` is added to every decoded colour. Returns the number of
    /// cells redrawn.
    pub fn render(&mut self, gfx: &GfxSet, colors: &ColorTable, color_base: usize) -> usize {
        let granularity = gfx.granularity();
        let mut drawn = 0;
        for index in 0..self.format.cells() {
            if !self.dirty.is_dirty(index) {
                continue;
            }
            let cell = self.cell(index);
            let tile = gfx.tile(cell.code);
            let color = (cell.color + color_base) * granularity;
            let x0 = (index % self.format.columns) * TILE;
            let y0 = (index / self.format.columns) * TILE;
            for ty in 0..TILE {
                let row = &mut self.bitmap.row_mut(y0 + ty)[x0..x0 + TILE];
                let src = &tile[ty * TILE..(ty + 1) * TILE];
                for (tx, out) in row.iter_mut().enumerate() {
                    let px = if cell.flip_x { src[TILE - 1 - tx] } else { src[tx] };
                    *out = colors.pen(color + usize::from(px));
                }
            }
            self.dirty.flags[index] = false;
            drawn += 1;
        }
        drawn
    }
}
