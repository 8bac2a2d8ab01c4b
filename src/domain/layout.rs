/// Layout grid: the two-state walkability map behind the scenery.
///
/// A layout is built once from a colour image by nearest-colour
/// classification against a small palette, then never mutated.
///
/// ## Walkability
///
/// Cells keep the label they were classified with, but only AIR cells
/// strictly inside the outermost ring are *walkable*. The ring acts as a
/// one-cell WALL border, so a position that is always walkable can read
/// its eight neighbours without leaving the grid.

use image::RgbImage;

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Label {
    Wall,
    Air,
}

impl Label {
    pub fn is_air(self) -> bool {
        matches!(self, Label::Air)
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::Wall
    }
}

/// Reference colours for classification, in priority order.
/// On equal distance the earlier entry wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(Label, [u8; 3])>,
}

impl Palette {
    pub fn new(wall: [u8; 3], air: [u8; 3]) -> Self {
        Palette { entries: vec![(Label::Wall, wall), (Label::Air, air)] }
    }

    /// Label of the reference colour closest to `rgb` (sum of absolute
    /// per-channel differences).
    pub fn nearest(&self, rgb: [u8; 3]) -> Label {
        let mut best = Label::Wall;
        let mut best_dist = u32::MAX;
        for &(label, reference) in &self.entries {
            let dist = channel_distance(rgb, reference);
            if dist < best_dist {
                best = label;
                best_dist = dist;
            }
        }
        best
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new([0, 0, 0], [255, 255, 255])
    }
}

#[inline]
fn channel_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter().zip(b.iter())
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs())
        .sum()
}

/// Converts colour pixels into a `LayoutGrid`.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    palette: Palette,
}

impl Classifier {
    pub fn new(palette: Palette) -> Self {
        Classifier { palette }
    }

    /// Classify packed 8-bit RGB pixels (row-major, 3 bytes per pixel).
    pub fn classify(&self, width: u32, height: u32, rgb: &[u8]) -> Result<LayoutGrid> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!("empty image {width}x{height}")));
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(Error::InvalidImage(format!(
                "expected {expected} bytes of RGB for {width}x{height}, got {}",
                rgb.len()
            )));
        }

        let cells = rgb.chunks_exact(3)
            .map(|px| self.palette.nearest([px[0], px[1], px[2]]))
            .collect();

        Ok(LayoutGrid { width, height, cells })
    }

    pub fn classify_image(&self, image: &RgbImage) -> Result<LayoutGrid> {
        self.classify(image.width(), image.height(), image.as_raw())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutGrid {
    width: u32,
    height: u32,
    cells: Vec<Label>,
}

impl LayoutGrid {
    /// Grid for a blank canvas: every cell AIR.
    pub fn all_air(width: u32, height: u32) -> Self {
        LayoutGrid {
            width,
            height,
            cells: vec![Label::Air; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Label at (x, y). Anything outside the grid reads as WALL.
    #[inline]
    pub fn label(&self, x: i64, y: i64) -> Label {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Label::Wall;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Can the avatar stand at (x, y)? AIR and not on the outer ring.
    #[inline]
    pub fn is_walkable(&self, x: i64, y: i64) -> bool {
        x > 0 && y > 0
            && x < self.width as i64 - 1
            && y < self.height as i64 - 1
            && self.label(x, y).is_air()
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_walkable(x as i64, y as i64))
    }

    /// Count of cells with the given label.
    pub fn count(&self, label: Label) -> usize {
        self.cells.iter().filter(|&&c| c == label).count()
    }
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str]) -> LayoutGrid {
    let height = rows.len() as u32;
    let width = rows[0].len() as u32;
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for row in rows {
        for ch in row.chars() {
            let v = if ch == '#' { 0 } else { 255 };
            rgb.extend_from_slice(&[v, v, v]);
        }
    }
    Classifier::default().classify(width, height, &rgb).unwrap()
}
