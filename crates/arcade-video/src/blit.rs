//! Copying layer bitmaps into the frame.

use crate::bitmap::{Bitmap, Rect};
use crate::pixel::Pixel;

/// Copy `src` to `dest` with its top-left corner at (`x`, `y`), optionally
/// mirrored horizontally. Pixels equal to `transparent` are skipped.
pub fn copy_bitmap<P: Pixel>(
    dest: &mut Bitmap<P>,
    src: &Bitmap<u16>,
    x: i32,
    y: i32,
    flip_x: bool,
    clip: &Rect,
    transparent: Option<u16>,
) {
    let placed = Rect::new(x, x + src.width() as i32 - 1, y, y + src.height() as i32 - 1);
    let Some(area) = placed
        .intersect(clip)
        .and_then(|r| r.intersect(&dest.bounds()))
    else {
        return;
    };
    let last = src.width() as i32 - 1;
    for dy in area.min_y..=area.max_y {
        let src_row = src.row((dy - y) as usize);
        let out = dest.row_mut(dy as usize);
        for dx in area.min_x..=area.max_x {
            let sx = if flip_x { last - (dx - x) } else { dx - x };
            let pen = src_row[sx as usize];
            if transparent != Some(pen) {
                out[dx as usize] = P::from_pen(pen);
            }
        }
    }
}

/// Opaque copy with a per-row source mapping: destination row `y` reads
/// source row `src_row(y)` shifted left by `scroll(y)` pixels, wrapping at
/// the source width.
pub fn copy_scrolled<P: Pixel>(
    dest: &mut Bitmap<P>,
    src: &Bitmap<u16>,
    clip: &Rect,
    src_row: impl Fn(i32) -> i32,
    scroll: impl Fn(i32) -> i32,
) {
    let Some(area) = clip.intersect(&dest.bounds()) else {
        return;
    };
    let width = src.width() as i32;
    for y in area.min_y..=area.max_y {
        let sy = src_row(y);
        if sy < 0 || sy as usize >= src.height() {
            continue;
        }
        let line = src.row(sy as usize);
        let shift = scroll(y);
        let out = dest.row_mut(y as usize);
        for x in area.min_x..=area.max_x {
            out[x as usize] = P::from_pen(line[(x + shift).rem_euclid(width) as usize]);
        }
    }
}

/// Fixed-point (16.16) source walk for a zoomed blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    pub start_x: i64,
    pub start_y: i64,
    pub inc_x: i64,
    pub inc_y: i64,
}

impl Zoom {
    /// Mirror horizontally over a source `width` pixels wide.
    #[must_use]
    pub fn flipped_x(self, width: usize) -> Self {
        Self {
            start_x: ((width as i64) << 16) - self.start_x - 1,
            inc_x: -self.inc_x,
            ..self
        }
    }
}

/// Zoomed blit without wraparound. Destination pixel (x, y) samples the
/// source at `(start + (x - origin_x) * inc) >> 16` on each axis; samples
/// outside the source and `transparent` pens are skipped.
pub fn blit_zoomed<P: Pixel>(
    dest: &mut Bitmap<P>,
    src: &Bitmap<u16>,
    clip: &Rect,
    origin: (i32, i32),
    zoom: &Zoom,
    transparent: u16,
) {
    let Some(area) = clip.intersect(&dest.bounds()) else {
        return;
    };
    let (w, h) = (src.width() as i64, src.height() as i64);
    for y in area.min_y..=area.max_y {
        let sy = (zoom.start_y + i64::from(y - origin.1) * zoom.inc_y) >> 16;
        if !(0..h).contains(&sy) {
            continue;
        }
        let line = src.row(sy as usize);
        let out = dest.row_mut(y as usize);
        for x in area.min_x..=area.max_x {
            let sx = (zoom.start_x + i64::from(x - origin.0) * zoom.inc_x) >> 16;
            if !(0..w).contains(&sx) {
                continue;
            }
            let pen = line[sx as usize];
            if pen != transparent {
                out[x as usize] = P::from_pen(pen);
            }
        }
    }
}
