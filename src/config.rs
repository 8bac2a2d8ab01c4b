/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::layout::Palette;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct LabyrinthConfig {
    pub assets: AssetConfig,
    pub movement: MovementConfig,
    pub palette: Palette,
    pub overlay: OverlayConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetConfig {
    pub scenery: Option<PathBuf>,
    pub layout: Option<PathBuf>,
    pub avatar: Option<PathBuf>,
    pub start: Option<(u32, u32)>,
    pub avatar_diameter: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementConfig {
    pub step_count: u32,      // steps per key press
    pub fast_step_count: u32, // steps per key press while fast is held
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayConfig {
    pub greeting_ms: u64,
    pub info_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub fast: Vec<String>,
    pub help: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    assets: TomlAssets,
    #[serde(default)]
    movement: TomlMovement,
    #[serde(default)]
    palette: TomlPalette,
    #[serde(default)]
    overlay: TomlOverlay,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlAssets {
    #[serde(default)]
    scenery: Option<String>,
    #[serde(default)]
    layout: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    start: Option<[u32; 2]>,
    #[serde(default = "default_avatar_diameter")]
    avatar_diameter: u32,
}

#[derive(Deserialize, Debug)]
struct TomlMovement {
    #[serde(default = "default_step_count")]
    step_count: u32,
    #[serde(default = "default_fast_step_count")]
    fast_step_count: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPalette {
    #[serde(default = "default_wall")]
    wall: [u8; 3],
    #[serde(default = "default_air")]
    air: [u8; 3],
}

#[derive(Deserialize, Debug)]
struct TomlOverlay {
    #[serde(default = "default_greeting_ms")]
    greeting_ms: u64,
    #[serde(default = "default_info_ms")]
    info_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_fast")]
    fast: Vec<String>,
    #[serde(default = "default_pad_help")]
    help: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_avatar_diameter() -> u32 { 30 }
fn default_step_count() -> u32 { 5 }
fn default_fast_step_count() -> u32 { 10 }
fn default_wall() -> [u8; 3] { [0, 0, 0] }
fn default_air() -> [u8; 3] { [255, 255, 255] }
fn default_greeting_ms() -> u64 { 5000 }
fn default_info_ms() -> u64 { 1000 }

fn default_pad_fast() -> Vec<String> { vec!["A".into(), "R1".into()] }
fn default_pad_help() -> Vec<String> { vec!["Y".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlAssets {
    fn default() -> Self {
        TomlAssets {
            scenery: None,
            layout: None,
            avatar: None,
            start: None,
            avatar_diameter: default_avatar_diameter(),
        }
    }
}

impl Default for TomlMovement {
    fn default() -> Self {
        TomlMovement {
            step_count: default_step_count(),
            fast_step_count: default_fast_step_count(),
        }
    }
}

impl Default for TomlPalette {
    fn default() -> Self {
        TomlPalette { wall: default_wall(), air: default_air() }
    }
}

impl Default for TomlOverlay {
    fn default() -> Self {
        TomlOverlay {
            greeting_ms: default_greeting_ms(),
            info_ms: default_info_ms(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            fast: default_pad_fast(),
            help: default_pad_help(),
            quit: default_pad_quit(),
        }
    }
}

// ── Loading ──

impl LabyrinthConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    /// Relative asset paths resolve against the directory the file was found in.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        if let Some((dir, text)) = find_toml(&search_dirs) {
            match Self::parse(&text, &dir) {
                Ok(cfg) => {
                    log::info!("config loaded from {}", dir.join("config.toml").display());
                    return cfg;
                }
                Err(e) => log::warn!("config.toml parse error: {e}; using default settings"),
            }
        }
        Self::from_toml(TomlConfig::default(), Path::new("."))
    }

    /// Parse config text directly; paths resolve against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(cfg, base))
    }

    fn from_toml(cfg: TomlConfig, base: &Path) -> Self {
        let resolve = |p: Option<String>| p.map(|s| {
            let path = PathBuf::from(s);
            if path.is_absolute() { path } else { base.join(path) }
        });

        LabyrinthConfig {
            assets: AssetConfig {
                scenery: resolve(cfg.assets.scenery),
                layout: resolve(cfg.assets.layout),
                avatar: resolve(cfg.assets.avatar),
                start: cfg.assets.start.map(|[x, y]| (x, y)),
                avatar_diameter: cfg.assets.avatar_diameter.max(1),
            },
            movement: MovementConfig {
                step_count: cfg.movement.step_count,
                fast_step_count: cfg.movement.fast_step_count,
            },
            palette: Palette::new(cfg.palette.wall, cfg.palette.air),
            overlay: OverlayConfig {
                greeting_ms: cfg.overlay.greeting_ms,
                info_ms: cfg.overlay.info_ms,
            },
            gamepad: GamepadConfig {
                fast: cfg.gamepad.fast,
                help: cfg.gamepad.help,
                quit: cfg.gamepad.quit,
            },
        }
    }

    /// Command-line scenery path wins over the config file. A scenery given
    /// this way is classified on its own, so any configured layout and start
    /// coordinate (which belong to the configured scenery) are dropped.
    pub fn override_scenery(&mut self, path: PathBuf) {
        self.assets.scenery = Some(path);
        self.assets.layout = None;
        self.assets.start = None;
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Find and read the first config.toml in the candidate directories.
fn find_toml(search_dirs: &[PathBuf]) -> Option<(PathBuf, String)> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return Some((dir.clone(), text)),
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    None
}
