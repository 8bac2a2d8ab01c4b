/// WorldState: everything a running labyrinth session knows.
///
/// ## Ownership of mutation
///
///   - `grid`      : fixed at construction, never mutated.
///   - `position`  : changed only by `step::handle` on `Move`, through the
///                   movement resolver, so it is always a walkable cell.
///   - `transform` : replaced wholesale on every `Resize`.
///
/// ## Overlay
///
/// One text box at a time. Info text hides itself at a deadline; showing
/// new info replaces the deadline (last scheduled wins). Help text stays
/// while the help key is held and suppresses info text meanwhile.

use std::time::{Duration, Instant};

use crate::config::{MovementConfig, OverlayConfig};
use crate::domain::layout::LayoutGrid;
use crate::domain::movement::Position;
use crate::domain::viewport::ViewportTransform;

pub const GREETING_TEXT: &str = "Starting labyrinth. For help, press H";
pub const GOODBYE_TEXT: &str = "Bye, I'm closing";
pub const HELP_TEXT: &[&str] = &[
    "Labyrinth help",
    "Arrow keys / WASD  move the avatar",
    "Hold Space         move faster",
    "Hold H             show this help",
    "Esc / Q            quit",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    pub lines: Vec<String>,
    /// When the current info text disappears. `None` while help is shown.
    pub hide_at: Option<Instant>,
}

impl Overlay {
    pub fn is_visible(&self) -> bool {
        !self.lines.is_empty()
    }
}

pub struct WorldState {
    pub grid: LayoutGrid,
    pub position: Position,
    pub transform: ViewportTransform,

    pub movement: MovementConfig,
    pub overlay_cfg: OverlayConfig,
    pub fast_held: bool,
    pub help_held: bool,

    pub overlay: Overlay,
    pub quitting: bool,
}

impl WorldState {
    pub fn new(grid: LayoutGrid, position: Position, movement: MovementConfig, overlay_cfg: OverlayConfig) -> Self {
        WorldState {
            grid,
            position,
            transform: ViewportTransform::default(),
            movement,
            overlay_cfg,
            fast_held: false,
            help_held: false,
            overlay: Overlay::default(),
            quitting: false,
        }
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.grid.width(), self.grid.height())
    }

    /// Steps per move request under the current modifier state.
    pub fn burst_count(&self) -> u32 {
        if self.fast_held {
            self.movement.fast_step_count
        } else {
            self.movement.step_count
        }
    }

    /// Show the start-up greeting for the configured duration.
    pub fn greet(&mut self, now: Instant) -> bool {
        let duration = Duration::from_millis(self.overlay_cfg.greeting_ms);
        self.show_info(GREETING_TEXT, duration, now)
    }

    /// Show transient text, hiding it at `now + duration`. Ignored while
    /// help is held. Returns whether the text was shown.
    pub fn show_info(&mut self, text: &str, duration: Duration, now: Instant) -> bool {
        if self.help_held {
            return false;
        }
        self.overlay.lines = vec![text.to_string()];
        self.overlay.hide_at = Some(now + duration);
        true
    }

    /// Show help with no deadline; any pending hide is cancelled.
    pub fn show_help(&mut self) {
        self.overlay.lines = HELP_TEXT.iter().map(|s| s.to_string()).collect();
        self.overlay.hide_at = None;
    }

    pub fn hide_overlay(&mut self) {
        self.overlay = Overlay::default();
    }

    /// Hide the overlay if its deadline has passed. Returns true if it did.
    pub fn expire_overlay(&mut self, now: Instant) -> bool {
        match self.overlay.hide_at {
            Some(deadline) if now >= deadline => {
                self.hide_overlay();
                true
            }
            _ => false,
        }
    }
}
