/// Viewport mapping between the scenery image and the display area.
///
/// The image is scaled uniformly by the smaller of the two axis ratios, so
/// it is always fully visible, and centred on the other axis with equal
/// padding on both sides (letterboxing).
///
///   display = padding + image * zoom
///   image   = (display - padding) / zoom

use super::movement::Position;

/// Axis-aligned rectangle in display coordinates.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewportTransform {
    pub zoom: f64,
    pub padding_x: u32,
    pub padding_y: u32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        ViewportTransform { zoom: 1.0, padding_x: 0, padding_y: 0 }
    }
}

impl ViewportTransform {
    /// Fit an `image_w` x `image_h` image into a `display_w` x `display_h`
    /// area. A zero-sized display is treated as 1x1 so the zoom stays
    /// positive.
    pub fn recompute(display_w: u32, display_h: u32, image_w: u32, image_h: u32) -> Self {
        let dw = display_w.max(1) as f64;
        let dh = display_h.max(1) as f64;
        let iw = image_w.max(1) as f64;
        let ih = image_h.max(1) as f64;

        let zoom_w = dw / iw;
        let zoom_h = dh / ih;

        if zoom_w > zoom_h {
            ViewportTransform {
                zoom: zoom_h,
                padding_x: ((dw - iw * zoom_h) / 2.0) as u32,
                padding_y: 0,
            }
        } else {
            ViewportTransform {
                zoom: zoom_w,
                padding_x: 0,
                padding_y: ((dh - ih * zoom_w) / 2.0) as u32,
            }
        }
    }

    /// Display coordinates of an image point.
    pub fn image_to_display(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.padding_x as f64 + x * self.zoom,
            self.padding_y as f64 + y * self.zoom,
        )
    }

    /// Image pixel under display pixel (dx, dy), or `None` in the letterbox.
    pub fn display_to_image(&self, dx: u32, dy: u32, image_w: u32, image_h: u32) -> Option<(u32, u32)> {
        let rx = dx as f64 - self.padding_x as f64;
        let ry = dy as f64 - self.padding_y as f64;
        if rx < 0.0 || ry < 0.0 {
            return None;
        }
        let ix = (rx / self.zoom) as u32;
        let iy = (ry / self.zoom) as u32;
        if ix < image_w && iy < image_h {
            Some((ix, iy))
        } else {
            None
        }
    }

    /// Square of side `diameter * zoom` centred on the avatar position.
    pub fn avatar_bounds(&self, position: Position, diameter: u32) -> Rect {
        let side = diameter as f64 * self.zoom;
        let (cx, cy) = self.image_to_display(position.x as f64, position.y as f64);
        Rect {
            x: cx - side / 2.0,
            y: cy - side / 2.0,
            width: side,
            height: side,
        }
    }
}
