/// Entry point and event loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use config::LabyrinthConfig;
use domain::layout::Classifier;
use domain::movement::start_position;
use sim::assets::{load_assets, Assets};
use sim::event::{InputEvent, WorldEvent};
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{display_pixels, Renderer, Sprites};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How long the goodbye text stays up before the terminal is restored.
const GOODBYE_LINGER: Duration = Duration::from_millis(400);

fn main() {
    env_logger::init();

    let mut config = LabyrinthConfig::load();
    if let Some(path) = std::env::args_os().nth(1) {
        config.override_scenery(PathBuf::from(path));
    }

    let (sprites, mut world) = match setup(&config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Labyrinth error: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    let enhanced = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = event_loop(&mut world, &sprites, &mut renderer, enhanced, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Labyrinth error: {e}");
    }
}

fn setup(config: &LabyrinthConfig) -> error::Result<(Sprites, WorldState)> {
    let classifier = Classifier::new(config.palette.clone());
    let Assets { scenery, layout, avatar } = load_assets(&config.assets, &classifier)?;
    let position = start_position(&layout, config.assets.start)?;
    log::info!("avatar starts at ({}, {})", position.x, position.y);

    let world = WorldState::new(layout, position, config.movement.clone(), config.overlay.clone());
    let sprites = Sprites { scenery, avatar, diameter: config.assets.avatar_diameter };
    Ok((sprites, world))
}

fn event_loop(
    world: &mut WorldState,
    sprites: &Sprites,
    renderer: &mut Renderer,
    enhanced_keys: bool,
    config: &LabyrinthConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let start = Instant::now();
    let (cols, rows) = renderer.size();
    let (dw, dh) = display_pixels(cols, rows);
    dispatch(world, InputEvent::Resize { width: dw, height: dh }, start);
    world.greet(start);

    let mut dirty = true;

    loop {
        let now = Instant::now();

        let mut inputs = kb.drain_events();
        if let Some((cols, rows)) = kb.resized {
            let (width, height) = display_pixels(cols, rows);
            inputs.push(InputEvent::Resize { width, height });
        }
        inputs.extend(gp.update(now));
        inputs.push(InputEvent::Tick(now));

        for input in inputs {
            let events = dispatch(world, input, now);
            // Modifier changes show in the status line even without events
            dirty |= !events.is_empty() || matches!(input, InputEvent::Fast(_));
        }

        if dirty {
            renderer.render(world, sprites)?;
            dirty = false;
        }

        if world.quitting {
            std::thread::sleep(GOODBYE_LINGER);
            break;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Feed one input to the session and log what came of it.
fn dispatch(world: &mut WorldState, input: InputEvent, now: Instant) -> Vec<WorldEvent> {
    let events = step::handle(world, input, now);
    for event in &events {
        match event {
            WorldEvent::Moved { from, to } => {
                log::trace!("moved ({},{}) -> ({},{})", from.x, from.y, to.x, to.y);
            }
            WorldEvent::Blocked { at, dir } => {
                log::trace!("blocked at ({},{}) going {:?}", at.x, at.y, dir);
            }
            WorldEvent::Resized(t) => {
                log::debug!("viewport zoom {:.3} padding ({}, {})", t.zoom, t.padding_x, t.padding_y);
            }
            WorldEvent::Quit => log::info!("quit requested"),
            WorldEvent::OverlayShown | WorldEvent::OverlayHidden => {}
        }
    }
    events
}
