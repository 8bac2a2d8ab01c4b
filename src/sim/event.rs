/// Events into and out of the session.
///
/// `InputEvent` is everything the shell can tell the session; it is fed
/// one at a time to `step::handle`. `WorldEvent` is what came of it, for
/// logging and redraw decisions.

use std::time::Instant;

use crate::domain::movement::{Direction, Position};
use crate::domain::viewport::ViewportTransform;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    /// One burst of steps in a direction.
    Move(Direction),
    /// Fast modifier held (`true`) or released.
    Fast(bool),
    /// Help key held (`true`) or released.
    Help(bool),
    /// Display area resized, in display pixels.
    Resize { width: u32, height: u32 },
    /// Clock tick; expires the overlay.
    Tick(Instant),
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    Moved { from: Position, to: Position },
    Blocked { at: Position, dir: Direction },
    Resized(ViewportTransform),
    OverlayShown,
    OverlayHidden,
    Quit,
}
