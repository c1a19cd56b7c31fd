//! Pixel storage and draw-pass selection for the generic draw routines.

use std::fmt::Debug;

/// Storage for one frame pixel: a pen number into the board palette.
///
/// `u8` frames hold up to 256 pens, `u16` frames the full range.
pub trait Pixel: Copy + Default + PartialEq + Eq + Debug + Send + Sync + 'static {
    /// Store a pen. Pens wider than the storage are truncated.
    fn from_pen(pen: u16) -> Self;

    /// The stored pen.
    fn pen(self) -> u16;
}

impl Pixel for u8 {
    #[inline]
    fn from_pen(pen: u16) -> Self {
        pen as u8
    }

    #[inline]
    fn pen(self) -> u16 {
        u16::from(self)
    }
}

impl Pixel for u16 {
    #[inline]
    fn from_pen(pen: u16) -> Self {
        pen
    }

    #[inline]
    fn pen(self) -> u16 {
        self
    }
}

/// Selects whether a render pass produces pixels or only side effects.
pub trait DrawPass {
    /// True when the pass writes frame pixels.
    const DRAW: bool;
}

/// Visible frame: colour composition and pixel output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullDraw;

impl DrawPass for FullDraw {
    const DRAW: bool = true;
}

/// Blanked frame: collision bits only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionOnly;

impl DrawPass for CollisionOnly {
    const DRAW: bool = false;
}
