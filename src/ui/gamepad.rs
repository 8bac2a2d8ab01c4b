/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move (auto-repeats while held)
///   A / R1                →  Fast (held)
///   Y                     →  Help (held)
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use std::time::{Duration, Instant};

use crate::config::GamepadConfig;
use crate::domain::movement::Direction;
use crate::sim::event::InputEvent;

const STICK_DEADZONE: f32 = 0.25;

/// Delay before a held direction starts repeating, then the repeat period.
/// Roughly what a terminal's keyboard auto-repeat does.
const REPEAT_DELAY: Duration = Duration::from_millis(250);
const REPEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    fast: Vec<Btn>,
    help: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            fast: vec![Btn::A, Btn::R1],
            help: vec![Btn::Y],
            quit: vec![Btn::Select],
        }
    }
}

/// Auto-repeat for a held direction.
#[derive(Clone, Copy, Debug, Default)]
struct DirRepeat {
    held: Option<Direction>,
    next_fire: Option<Instant>,
}

impl DirRepeat {
    /// Feed the currently held direction; returns a `Move` when one is due.
    fn update(&mut self, held: Option<Direction>, now: Instant) -> Option<InputEvent> {
        if held != self.held {
            self.held = held;
            self.next_fire = held.map(|_| now + REPEAT_DELAY);
            return held.map(InputEvent::Move);
        }
        match (self.held, self.next_fire) {
            (Some(dir), Some(at)) if now >= at => {
                self.next_fire = Some(now + REPEAT_INTERVAL);
                Some(InputEvent::Move(dir))
            }
            _ => None,
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [bool; 10],
    prev_buttons: [bool; 10],

    // D-pad: up, down, left, right
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    repeat: DirRepeat,
    action_map: ActionMap,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if g.gamepads().next().is_some() {
                    log::info!("gamepad connected");
                }
                Some(g)
            }
            Err(e) => {
                log::debug!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [false; 10],
            prev_buttons: [false; 10],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            repeat: DirRepeat::default(),
            action_map: ActionMap::default(),
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let fast = parse_list(&cfg.fast);
        if !fast.is_empty() { map.fast = fast; }
        let help = parse_list(&cfg.help);
        if !help.is_empty() { map.help = help; }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() { map.quit = quit; }
    }

    /// Poll the pad and translate state changes into input events.
    pub fn update(&mut self, now: Instant) -> Vec<InputEvent> {
        self.prev_buttons = self.buttons;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        self.events(now)
    }

    fn events(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut out = Vec::new();

        if let Some(ev) = self.repeat.update(self.held_direction(), now) {
            out.push(ev);
        }

        if let Some(held) = self.edge(&self.action_map.fast) {
            out.push(InputEvent::Fast(held));
        }
        if let Some(held) = self.edge(&self.action_map.help) {
            out.push(InputEvent::Help(held));
        }
        if self.edge(&self.action_map.quit) == Some(true) {
            out.push(InputEvent::Quit);
        }

        out
    }

    /// Held-state transition of an action since the last update.
    fn edge(&self, btns: &[Btn]) -> Option<bool> {
        let now = btns.iter().any(|&b| self.buttons[btn_index(b)]);
        let before = btns.iter().any(|&b| self.prev_buttons[btn_index(b)]);
        (now != before).then_some(now)
    }

    fn held_direction(&self) -> Option<Direction> {
        let [up, down, left, right] = self.dpad;
        if up || self.stick_y > STICK_DEADZONE {
            Some(Direction::Up)
        } else if down || self.stick_y < -STICK_DEADZONE {
            Some(Direction::Down)
        } else if left || self.stick_x < -STICK_DEADZONE {
            Some(Direction::Left)
        } else if right || self.stick_x > STICK_DEADZONE {
            Some(Direction::Right)
        } else {
            None
        }
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => { self.dpad[0] = held; return; }
            Button::DPadDown  => { self.dpad[1] = held; return; }
            Button::DPadLeft  => { self.dpad[2] = held; return; }
            Button::DPadRight => { self.dpad[3] = held; return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)] = held;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [false; 10];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
