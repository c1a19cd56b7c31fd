//! Video building blocks for tile-and-sprite arcade boards.
//!
//! The boards in this workspace render into indexed bitmaps: every pixel is
//! a pen number into the board's [`Palette`], and the last pen of every
//! palette is a reserved transparent marker. Layers are kept in persistent
//! off-screen bitmaps that are refreshed only where their RAM changed (see
//! [`CellLayer`]) and composited into the frame once per video frame.

pub mod bitmap;
pub mod blit;
#[cfg(feature = "capture")]
pub mod capture;
pub mod cells;
pub mod colortable;
pub mod gfx;
pub mod palette;
pub mod pixel;
pub mod rom;

pub use bitmap::{Bitmap, Rect};
pub use cells::{CellFormat, CellLayer, DirtyMap};
pub use colortable::{ColorRule, ColorTable, TransparentRule};
pub use gfx::{GfxLayout, GfxSet};
pub use palette::{Palette, Rgb, TRANSPARENT_RGB};
pub use pixel::{CollisionOnly, DrawPass, FullDraw, Pixel};
pub use rom::{RomError, RomSet};

/// Per-frame entry points a board exposes to the host.
pub trait ScreenUpdate {
    /// Pixel storage of the frame bitmap.
    type Pixel: Pixel;

    /// Refresh dirty layers and composite the frame. With `full_refresh`
    /// every layer is redrawn from scratch.
    fn render_frame(&mut self, full_refresh: bool);

    /// Run only the parts of the pipeline with side effects visible to the
    /// CPU (collision detection), producing no pixels.
    fn render_collision_only(&mut self);

    /// The most recently composited frame, as pens into [`Self::palette`].
    fn frame(&self) -> &Bitmap<Self::Pixel>;

    fn palette(&self) -> &Palette;
}
