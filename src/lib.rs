//! Shaded ASCII cube for the terminal
//!
//! This library keeps the orientation of a single unit cube, rotates it from mouse
//! drags, and renders it orthographically into a grid of glyphs picked from a
//! brightness ramp.

pub mod config;
pub mod cube;
pub mod input;
pub mod renderer;
pub mod terminal;

pub use cube::{Face, Orientation};
pub use renderer::{Frame, Renderer};
pub use terminal::TerminalDisplay;

/// Glyph gradient from dark to light
pub const BRIGHTNESS_RAMP: &str =
    "```````.''''::_,,,^^^===;>>><!rc/zzzLv)|i{3lnZya2wwwwww6dVObXXXXH8R#BgMMNQQQ%%&&@@@@@@@@@@@@@@@@@@@";

/// Drag length (in weighted cells) that turns the cube by half a revolution
pub const DRAG_SENSITIVITY: f32 = 50.0;

/// Per-face lightness multipliers, indexed by [`Face`]
pub const BASE_LIGHTNESS: [f32; 3] = [0.8, 0.9, 1.0];

/// Light added to every face so faces turned away from the light stay visible
pub const AMBIENT: f32 = 0.1;

/// Light vectors at or below this magnitude are ignored
pub const MIN_LIGHT_MAGNITUDE: f32 = 1e-3;
