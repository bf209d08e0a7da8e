//! Input management system
//!
//! Per-frame keyboard and mouse snapshots. The platform feeds events in while
//! polling and rolls the previous-frame state forward at the start of each
//! poll, which is what makes the edge queries (`pressed` / `released`) work.

mod keys;

pub use keys::{Action, Key, MouseButton};

/// Keyboard and mouse state for the current and previous frame
#[derive(Debug, Clone)]
pub struct InputState {
    keys_down: [bool; Key::COUNT],
    keys_down_prev: [bool; Key::COUNT],
    buttons_down: [bool; MouseButton::COUNT],
    buttons_down_prev: [bool; MouseButton::COUNT],
    cursor: Option<(f64, f64)>,
    mouse_delta: (f64, f64),
    scroll_delta: (f64, f64),
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Create an input state with nothing held
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys_down: [false; Key::COUNT],
            keys_down_prev: [false; Key::COUNT],
            buttons_down: [false; MouseButton::COUNT],
            buttons_down_prev: [false; MouseButton::COUNT],
            cursor: None,
            mouse_delta: (0.0, 0.0),
            scroll_delta: (0.0, 0.0),
        }
    }

    /// Start a new frame: snapshot held state and clear per-frame deltas
    pub fn begin_frame(&mut self) {
        self.keys_down_prev = self.keys_down;
        self.buttons_down_prev = self.buttons_down;
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = (0.0, 0.0);
    }

    /// Forget everything, including the last cursor position
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Record a key event
    pub fn on_key(&mut self, key: Key, action: Action) {
        match action {
            Action::Press => self.keys_down[key.index()] = true,
            Action::Release => self.keys_down[key.index()] = false,
            Action::Repeat => {}
        }
    }

    /// Record a mouse button event
    pub fn on_mouse_button(&mut self, button: MouseButton, action: Action) {
        match action {
            Action::Press => self.buttons_down[button.index()] = true,
            Action::Release => self.buttons_down[button.index()] = false,
            Action::Repeat => {}
        }
    }

    /// Record a cursor position; the first sample establishes the origin
    pub fn on_cursor_pos(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.cursor {
            self.mouse_delta.0 += x - last_x;
            self.mouse_delta.1 += y - last_y;
        }
        self.cursor = Some((x, y));
    }

    /// Record a scroll event
    pub fn on_scroll(&mut self, dx: f64, dy: f64) {
        self.scroll_delta.0 += dx;
        self.scroll_delta.1 += dy;
    }

    /// Key is currently held
    #[must_use]
    pub const fn is_key_down(&self, key: Key) -> bool {
        self.keys_down[key.index()]
    }

    /// Key is currently not held
    #[must_use]
    pub const fn is_key_up(&self, key: Key) -> bool {
        !self.is_key_down(key)
    }

    /// Key went down this frame
    #[must_use]
    pub const fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_down[key.index()] && !self.keys_down_prev[key.index()]
    }

    /// Key went up this frame
    #[must_use]
    pub const fn is_key_released(&self, key: Key) -> bool {
        !self.keys_down[key.index()] && self.keys_down_prev[key.index()]
    }

    /// Button is currently held
    #[must_use]
    pub const fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down[button.index()]
    }

    /// Button is currently not held
    #[must_use]
    pub const fn is_mouse_button_up(&self, button: MouseButton) -> bool {
        !self.is_mouse_button_down(button)
    }

    /// Button went down this frame
    #[must_use]
    pub const fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_down[button.index()] && !self.buttons_down_prev[button.index()]
    }

    /// Button went up this frame
    #[must_use]
    pub const fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        !self.buttons_down[button.index()] && self.buttons_down_prev[button.index()]
    }

    /// Last known cursor position in window coordinates
    #[must_use]
    pub fn mouse_position(&self) -> (f64, f64) {
        self.cursor.unwrap_or((0.0, 0.0))
    }

    /// Cursor movement accumulated this frame
    #[must_use]
    pub const fn mouse_delta(&self) -> (f64, f64) {
        self.mouse_delta
    }

    /// Scroll accumulated this frame
    #[must_use]
    pub const fn scroll_delta(&self) -> (f64, f64) {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges_across_frames() {
        let mut input = InputState::new();

        input.begin_frame();
        input.on_key(Key::W, Action::Press);
        assert!(input.is_key_down(Key::W));
        assert!(input.is_key_pressed(Key::W));

        input.begin_frame();
        assert!(input.is_key_down(Key::W));
        assert!(!input.is_key_pressed(Key::W));

        input.on_key(Key::W, Action::Repeat);
        assert!(input.is_key_down(Key::W));

        input.begin_frame();
        input.on_key(Key::W, Action::Release);
        assert!(input.is_key_up(Key::W));
        assert!(input.is_key_released(Key::W));

        input.begin_frame();
        assert!(!input.is_key_released(Key::W));
    }

    #[test]
    fn test_first_cursor_sample_has_no_delta() {
        let mut input = InputState::new();
        input.on_cursor_pos(400.0, 300.0);
        assert_eq!(input.mouse_delta(), (0.0, 0.0));

        input.on_cursor_pos(410.0, 295.0);
        input.on_cursor_pos(415.0, 290.0);
        assert_eq!(input.mouse_delta(), (15.0, -10.0));
        assert_eq!(input.mouse_position(), (415.0, 290.0));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
        assert_eq!(input.mouse_position(), (415.0, 290.0));
    }

    #[test]
    fn test_mouse_buttons_and_scroll() {
        let mut input = InputState::new();
        input.on_mouse_button(MouseButton::Left, Action::Press);
        input.on_scroll(0.0, 1.0);
        input.on_scroll(0.0, 2.0);

        assert!(input.is_mouse_button_pressed(MouseButton::Left));
        assert!(input.is_mouse_button_up(MouseButton::Right));
        assert_eq!(input.scroll_delta(), (0.0, 3.0));

        input.begin_frame();
        input.on_mouse_button(MouseButton::Left, Action::Release);
        assert!(input.is_mouse_button_released(MouseButton::Left));
        assert_eq!(input.scroll_delta(), (0.0, 0.0));
    }
}
