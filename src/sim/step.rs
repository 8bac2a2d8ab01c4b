/// Event dispatch: the single state-update function of a session.
///
/// Every input goes through `handle`, one at a time, synchronously. It
/// returns the `WorldEvent`s that came of it; an empty list means nothing
/// visible changed.

use std::time::{Duration, Instant};

use crate::domain::movement::step_burst;
use crate::domain::viewport::ViewportTransform;
use crate::sim::event::{InputEvent, WorldEvent};
use crate::sim::world::{WorldState, GOODBYE_TEXT};

pub fn handle(world: &mut WorldState, event: InputEvent, now: Instant) -> Vec<WorldEvent> {
    let mut events = Vec::new();

    match event {
        InputEvent::Move(dir) => {
            let from = world.position;
            let to = step_burst(&world.grid, from, dir, world.burst_count());
            if to == from {
                events.push(WorldEvent::Blocked { at: from, dir });
            } else {
                world.position = to;
                events.push(WorldEvent::Moved { from, to });
            }
        }

        InputEvent::Fast(held) => {
            world.fast_held = held;
        }

        InputEvent::Help(true) => {
            if !world.help_held {
                world.help_held = true;
                world.show_help();
                events.push(WorldEvent::OverlayShown);
            }
        }

        InputEvent::Help(false) => {
            if world.help_held {
                world.help_held = false;
                world.hide_overlay();
                events.push(WorldEvent::OverlayHidden);
            }
        }

        InputEvent::Resize { width, height } => {
            let (image_w, image_h) = world.image_size();
            world.transform = ViewportTransform::recompute(width, height, image_w, image_h);
            events.push(WorldEvent::Resized(world.transform));
        }

        InputEvent::Tick(at) => {
            if world.expire_overlay(at) {
                events.push(WorldEvent::OverlayHidden);
            }
        }

        InputEvent::Quit => {
            let duration = Duration::from_millis(world.overlay_cfg.info_ms);
            if world.show_info(GOODBYE_TEXT, duration, now) {
                events.push(WorldEvent::OverlayShown);
            }
            world.quitting = true;
            events.push(WorldEvent::Quit);
        }
    }

    events
}
