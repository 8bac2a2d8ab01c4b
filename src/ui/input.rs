/// Keyboard input tracker.
///
/// Turns raw crossterm events into `InputEvent`s:
///   - Arrow keys / WASD: one `Move` per Press or Repeat (auto-repeat
///     keeps the avatar walking while the key is held)
///   - Space / H: hold keys, reported as `Fast(..)` / `Help(..)` on the
///     transitions between held and released
///   - Esc / Q / Ctrl+C: `Quit`
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::movement::Direction;
use crate::sim::event::InputEvent;

/// After this duration without a Press/Repeat event, consider a hold key
/// released. Only used when the terminal doesn't report Release events.
/// Longer than the usual auto-repeat delay so a held key stays held.
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

/// Keys whose held state matters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HoldKey {
    Fast,
    Help,
}

impl HoldKey {
    fn event(self, held: bool) -> InputEvent {
        match self {
            HoldKey::Fast => InputEvent::Fast(held),
            HoldKey::Help => InputEvent::Help(held),
        }
    }
}

/// What a single key means, independent of press/release.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyAction {
    Move(Direction),
    Hold(HoldKey),
    Quit,
}

pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(KeyAction::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(KeyAction::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(KeyAction::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(KeyAction::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(KeyAction::Move(Direction::Right)),
        KeyCode::Char(' ') => Some(KeyAction::Hold(HoldKey::Fast)),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(KeyAction::Hold(HoldKey::Help)),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each held key.
    last_active: HashMap<HoldKey, Instant>,

    /// Last terminal size reported by a resize event (columns, rows).
    pub resized: Option<(u16, u16)>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(4),
            resized: None,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        self.resized = None;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(&key, Instant::now(), &mut out),
                Ok(Event::Resize(cols, rows)) => self.resized = Some((cols, rows)),
                Ok(_) => {}
                Err(e) => log::warn!("terminal event read failed: {e}"),
            }
        }

        self.expire(Instant::now(), &mut out);
        out
    }

    /// Apply one key event at time `now`.
    pub fn on_key(&mut self, key: &KeyEvent, now: Instant, out: &mut Vec<InputEvent>) {
        let Some(action) = key_action(key) else { return };

        match (action, key.kind) {
            (KeyAction::Hold(hold), KeyEventKind::Release) => {
                // Without confirmed enhancement, rely on timeout-based expiry
                if self.honor_release && self.last_active.remove(&hold).is_some() {
                    out.push(hold.event(false));
                }
            }
            (KeyAction::Hold(hold), _) => {
                if self.last_active.insert(hold, now).is_none() {
                    out.push(hold.event(true));
                }
            }
            (_, KeyEventKind::Release) => {}
            (KeyAction::Move(dir), _) => out.push(InputEvent::Move(dir)),
            (KeyAction::Quit, _) => out.push(InputEvent::Quit),
        }
    }

    /// Release hold keys that have timed out (fallback for terminals without Release).
    pub fn expire(&mut self, now: Instant, out: &mut Vec<InputEvent>) {
        if self.honor_release {
            return;
        }
        let mut expired: Vec<HoldKey> = self.last_active.iter()
            .filter(|(_, t)| now.duration_since(**t) >= HOLD_TIMEOUT)
            .map(|(k, _)| *k)
            .collect();
        expired.sort_by_key(|k| *k as u8);
        for key in expired {
            self.last_active.remove(&key);
            out.push(key.event(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    fn press(code: KeyCode) -> KeyEvent {
        key(code, KeyEventKind::Press)
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(key_action(&press(KeyCode::Up)), Some(KeyAction::Move(Direction::Up)));
        assert_eq!(key_action(&press(KeyCode::Char('a'))), Some(KeyAction::Move(Direction::Left)));
        assert_eq!(key_action(&press(KeyCode::Char('S'))), Some(KeyAction::Move(Direction::Down)));
        assert_eq!(key_action(&press(KeyCode::Right)), Some(KeyAction::Move(Direction::Right)));
        assert_eq!(key_action(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut k = press(KeyCode::Char('c'));
        k.modifiers = KeyModifiers::CONTROL;
        assert_eq!(key_action(&k), Some(KeyAction::Quit));
        assert_eq!(key_action(&press(KeyCode::Esc)), Some(KeyAction::Quit));
    }

    #[test]
    fn every_press_and_repeat_moves() {
        let mut input = InputState::new();
        let now = Instant::now();
        let mut out = Vec::new();
        input.on_key(&press(KeyCode::Left), now, &mut out);
        input.on_key(&key(KeyCode::Left, KeyEventKind::Repeat), now, &mut out);
        input.on_key(&key(KeyCode::Left, KeyEventKind::Release), now, &mut out);
        assert_eq!(out, vec![InputEvent::Move(Direction::Left), InputEvent::Move(Direction::Left)]);
    }

    #[test]
    fn hold_key_reports_edges_only() {
        let mut input = InputState::new();
        input.honor_release = true;
        let now = Instant::now();
        let mut out = Vec::new();
        input.on_key(&press(KeyCode::Char(' ')), now, &mut out);
        input.on_key(&key(KeyCode::Char(' '), KeyEventKind::Repeat), now, &mut out);
        input.on_key(&key(KeyCode::Char(' '), KeyEventKind::Release), now, &mut out);
        assert_eq!(out, vec![InputEvent::Fast(true), InputEvent::Fast(false)]);
        assert!(!input.last_active.contains_key(&HoldKey::Fast));
    }

    #[test]
    fn hold_key_times_out_without_release_events() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        let mut out = Vec::new();
        input.on_key(&press(KeyCode::Char('h')), t0, &mut out);
        input.expire(t0 + Duration::from_millis(100), &mut out);
        assert_eq!(out, vec![InputEvent::Help(true)]);
        // a repeat refreshes the hold
        input.on_key(&key(KeyCode::Char('h'), KeyEventKind::Repeat), t0 + Duration::from_millis(500), &mut out);
        input.expire(t0 + Duration::from_millis(900), &mut out);
        assert!(input.last_active.contains_key(&HoldKey::Help));
        input.expire(t0 + Duration::from_millis(1100), &mut out);
        assert_eq!(out, vec![InputEvent::Help(true), InputEvent::Help(false)]);
    }

    #[test]
    fn release_ignored_until_enhancement_confirmed() {
        let mut input = InputState::new();
        let now = Instant::now();
        let mut out = Vec::new();
        input.on_key(&press(KeyCode::Char(' ')), now, &mut out);
        input.on_key(&key(KeyCode::Char(' '), KeyEventKind::Release), now, &mut out);
        assert_eq!(out, vec![InputEvent::Fast(true)]);
        assert!(input.last_active.contains_key(&HoldKey::Fast));
    }
}
