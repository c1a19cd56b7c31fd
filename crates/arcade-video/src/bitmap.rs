//! Indexed bitmaps and clip rectangles.

use crate::pixel::Pixel;

/// Inclusive clip rectangle in bitmap coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Intersection with another rectangle, `None` when they do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        };
        (r.min_x <= r.max_x && r.min_y <= r.max_y).then_some(r)
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// A row-major bitmap of pens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<P> {
    width: usize,
    height: usize,
    pixels: Vec<P>,
}

impl<P: Pixel> Bitmap<P> {
    /// A bitmap filled with pen 0.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, P::default())
    }

    #[must_use]
    pub fn filled(width: usize, height: usize, value: P) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds as a clip rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.width as i32 - 1, 0, self.height as i32 - 1)
    }

    #[must_use]
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[P] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        &mut self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Pixel at (x, y), `None` outside the bitmap.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<P> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width + x as usize])
    }

    /// Set a pixel; writes outside the bitmap are dropped.
    pub fn set(&mut self, x: i32, y: i32, value: P) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = value;
    }

    pub fn fill(&mut self, value: P) {
        self.pixels.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut bmp: Bitmap<u16> = Bitmap::new(4, 3);
        bmp.set(-1, 0, 7);
        bmp.set(4, 0, 7);
        bmp.set(0, 3, 7);
        assert!(bmp.pixels().iter().all(|&p| p == 0));
        assert_eq!(bmp.get(5, 1), None);
    }

    #[test]
    fn disjoint_rects_do_not_intersect() {
        let a = Rect::new(0, 3, 0, 3);
        let b = Rect::new(4, 7, 0, 3);
        assert_eq!(a.intersect(&b), None);
        assert!(a.contains(3, 3));
        assert!(!a.contains(4, 0));
    }
}
