/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each terminal cell shows two display pixels stacked vertically: the
/// upper half block `▀` is drawn in the top pixel's colour over a
/// background of the bottom pixel's colour. The display area is therefore
/// `cols` x `2 * map_rows` pixels, and those are the units the viewport
/// transform works in.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use image::{RgbImage, RgbaImage};

use crate::domain::viewport::{Rect, ViewportTransform};
use crate::sim::world::WorldState;

/// Rows reserved below the map for the status line.
const STATUS_ROWS: u16 = 1;

const HALF_BLOCK: char = '▀';

const OVERLAY_FG: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const OVERLAY_BG: Color = Color::Rgb { r: 191, g: 191, b: 191 };
const STATUS_FG: Color = Color::Rgb { r: 200, g: 200, b: 210 };

/// Display area in pixels for a terminal of `cols` x `rows` cells.
pub fn display_pixels(cols: u16, rows: u16) -> (u32, u32) {
    let map_rows = rows.saturating_sub(STATUS_ROWS);
    (cols as u32, map_rows as u32 * 2)
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for the letterbox and all "empty"
    /// terminal cells, so no cell falls back to the terminal default.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn pixels(top: Color, bottom: Color) -> Self {
        Cell { ch: HALF_BLOCK, fg: top, bg: bottom }
    }

    fn text(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Cell::text(ch, fg, bg));
        }
    }
}

// ── Scene: what gets composited ──

/// Images drawn every frame. The avatar is stretched to a square of
/// `diameter` image pixels.
pub struct Sprites {
    pub scenery: RgbImage,
    pub avatar: RgbaImage,
    pub diameter: u32,
}

/// Read-only view of the images and the avatar placement for one frame.
struct Scene<'a> {
    scenery: &'a RgbImage,
    avatar: &'a RgbaImage,
    transform: ViewportTransform,
    avatar_rect: Rect,
}

impl Scene<'_> {
    /// Colour of display pixel (dx, dy): avatar over background over letterbox.
    fn pixel(&self, dx: u32, dy: u32) -> Color {
        let (cx, cy) = (dx as f64 + 0.5, dy as f64 + 0.5);
        if self.avatar_rect.contains(cx, cy) {
            let r = &self.avatar_rect;
            let ax = ((cx - r.x) / r.width * self.avatar.width() as f64) as u32;
            let ay = ((cy - r.y) / r.height * self.avatar.height() as f64) as u32;
            let px = self.avatar.get_pixel(
                ax.min(self.avatar.width() - 1),
                ay.min(self.avatar.height() - 1),
            );
            if px[3] >= 128 {
                return Color::Rgb { r: px[0], g: px[1], b: px[2] };
            }
        }

        let (iw, ih) = self.scenery.dimensions();
        match self.transform.display_to_image(dx, dy, iw, ih) {
            Some((ix, iy)) => {
                let px = self.scenery.get_pixel(ix, iy);
                Color::Rgb { r: px[0], g: px[1], b: px[2] }
            }
            None => Cell::BASE_BG,
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns true when the
    /// terminal will report key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        log::debug!("keyboard release events: {}", self.enhanced_keys);

        let (tw, th) = self.size();
        self.resize_buffers(tw as usize, th as usize);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    fn resize_buffers(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState, sprites: &Sprites) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = self.size();
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize_buffers(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let scene = Scene {
            scenery: &sprites.scenery,
            avatar: &sprites.avatar,
            transform: world.transform,
            avatar_rect: world.transform.avatar_bounds(world.position, sprites.diameter),
        };

        self.front.clear();
        self.compose_scene(&scene);
        self.compose_overlay(world);
        self.compose_status(world);

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    fn compose_scene(&mut self, scene: &Scene) {
        let map_rows = self.term_h.saturating_sub(STATUS_ROWS as usize);
        for ty in 0..map_rows {
            for tx in 0..self.term_w {
                let top = scene.pixel(tx as u32, (ty * 2) as u32);
                let bottom = scene.pixel(tx as u32, (ty * 2 + 1) as u32);
                self.front.set(tx, ty, Cell::pixels(top, bottom));
            }
        }
    }

    /// Text box in the top-left corner, one space of padding each side.
    fn compose_overlay(&mut self, world: &WorldState) {
        if !world.overlay.is_visible() {
            return;
        }
        let width = world.overlay.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
        for (i, line) in world.overlay.lines.iter().enumerate() {
            let padded = format!(" {line:<w$} ", w = width - 2);
            self.front.put_str(1, i + 1, &padded, OVERLAY_FG, OVERLAY_BG);
        }
    }

    fn compose_status(&mut self, world: &WorldState) {
        if self.term_h == 0 {
            return;
        }
        let y = self.term_h - 1;
        let speed = if world.fast_held { "FAST" } else { "    " };
        let status = format!(
            " ({:>4},{:>4})  zoom {:.2}  {}  [H] help  [Space] fast  [Esc] quit",
            world.position.x, world.position.y, world.transform.zoom, speed,
        );
        self.front.put_str(0, y, &status, STATUS_FG, Cell::BASE_BG);
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
            need_move = true;
        }

        self.writer.flush()
    }
}
