//! Folding a frame's worth of terminal events into cube controls

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// What the main loop should do with one frame's mouse input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Drag since the previous frame, rows already weighted for cell aspect
    pub drag: (f32, f32),
    /// Last cell the light was dragged to, as `(row, col)`
    pub light_target: Option<(u16, u16)>,
}

/// Collects mouse events between frames
///
/// Only the last left-drag position of a frame counts. Any other mouse event in
/// the same frame drops the drag anchor, so the next drag starts from a zero delta
/// instead of jumping.
#[derive(Debug, Default)]
pub struct DragTracker {
    anchor: Option<(u16, u16)>,
    drag_position: Option<(u16, u16)>,
    released: bool,
    light_target: Option<(u16, u16)>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag_position = Some((event.row, event.column));
                self.released = false;
            }
            kind => {
                self.drag_position = None;
                self.released = true;
                if kind == MouseEventKind::Drag(MouseButton::Right) {
                    self.light_target = Some((event.row, event.column));
                }
            }
        }
    }

    /// Close the current frame and report its drag and light target
    pub fn finish_frame(&mut self) -> FrameInput {
        if self.released {
            self.anchor = None;
        }

        let drag = match (self.drag_position, self.anchor) {
            (Some((row, col)), Some((last_row, last_col))) => {
                self.anchor = Some((row, col));
                let dx = (row as f32 - last_row as f32) * 2.0;
                let dy = col as f32 - last_col as f32;
                (dx, dy)
            }
            (Some(position), None) => {
                self.anchor = Some(position);
                (0.0, 0.0)
            }
            (None, _) => (0.0, 0.0),
        };

        let input = FrameInput {
            drag,
            light_target: self.light_target.take(),
        };
        self.drag_position = None;
        self.released = false;
        input
    }
}

/// Light direction for a target cell, relative to the middle of the screen
///
/// `target` is 0-based as crossterm reports it; the offset is taken in the
/// terminal's own 1-based cell numbering.
pub fn light_from_target(target: (u16, u16), rows: u16, cols: u16) -> (f32, f32, f32) {
    let (row, col) = target;
    (
        row as f32 + 1.0 - rows as f32 / 2.0,
        col as f32 + 1.0 - cols as f32 / 2.0,
        0.0,
    )
}

/// Key actions for the cube viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    Reset,
}

/// Parse keyboard input into actions
pub fn parse_key_event(event: KeyEvent) -> Action {
    if event.kind == KeyEventKind::Release {
        return Action::None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Reset,
        _ => Action::None,
    }
}
