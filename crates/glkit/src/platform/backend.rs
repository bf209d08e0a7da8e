//! Windowing backend trait
//!
//! A [`WindowingBackend`] owns the native windowing library: its global
//! initialization, its windows and their GL contexts, event delivery and the
//! monotonic clock. Windows are addressed by [`WindowId`] so the backend can
//! live behind a trait object inside the [`Platform`](super::Platform).
//!
//! Backends are single-threaded; every call must come from the thread that
//! initialized them.

use crate::input::{Action, Key, MouseButton};

/// Backend-assigned window identifier; never 0 for a live window
pub type WindowId = u64;

/// Parameters for native window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDescriptor<'a> {
    /// Client area width in screen coordinates
    pub width: u32,
    /// Client area height in screen coordinates
    pub height: u32,
    /// Title bar text
    pub title: &'a str,
    /// Requested core-profile context version (major, minor)
    pub context_version: (u32, u32),
    /// Fullscreen on the primary monitor
    pub fullscreen: bool,
}

/// Cursor presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Visible and free
    Normal,
    /// Hidden and captured for unbounded relative motion
    Disabled,
}

/// Events delivered per window by [`WindowingBackend::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// Drawable surface changed size, in pixels
    FramebufferResized {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Keyboard key transition
    Key {
        /// Key
        key: Key,
        /// Transition
        action: Action,
    },
    /// Mouse button transition
    MouseButton {
        /// Button
        button: MouseButton,
        /// Transition
        action: Action,
    },
    /// Cursor moved to a position in screen coordinates
    CursorMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// Scroll wheel or touchpad scroll
    Scrolled {
        /// Horizontal offset
        dx: f64,
        /// Vertical offset
        dy: f64,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// Native windowing library abstraction
pub trait WindowingBackend {
    /// Initialize the library; the error carries the library's description
    fn init(&mut self) -> Result<(), String>;

    /// Tear the library down; every window must already be destroyed
    fn terminate(&mut self);

    /// Create a window with its GL context; `None` when the library refuses
    fn create_window(&mut self, descriptor: &WindowDescriptor<'_>) -> Option<WindowId>;

    /// Destroy a window and its context
    fn destroy_window(&mut self, window: WindowId);

    /// Make the window's context current on this thread
    fn make_current(&mut self, window: WindowId);

    /// Window whose context is current, if any
    fn current_window(&self) -> Option<WindowId>;

    /// Load GL entry points through the current context; false on failure
    fn load_functions(&mut self) -> bool;

    /// Present the back buffer
    fn swap_buffers(&mut self, window: WindowId);

    /// Pump the native event queue
    fn poll_events(&mut self);

    /// Take the events queued for `window` since the last drain
    fn drain_events(&mut self, window: WindowId) -> Vec<WindowEvent>;

    /// Whether a close was requested
    fn should_close(&self, window: WindowId) -> bool;

    /// Request or cancel closing
    fn set_should_close(&mut self, window: WindowId, value: bool);

    /// Client area size in screen coordinates
    fn window_size(&self, window: WindowId) -> (u32, u32);

    /// Drawable size in pixels
    fn framebuffer_size(&self, window: WindowId) -> (u32, u32);

    /// Replace the title bar text
    fn set_title(&mut self, window: WindowId, title: &str);

    /// Swap interval for the current context; 0 disables vsync
    fn set_swap_interval(&mut self, interval: u32);

    /// Change cursor presentation
    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode);

    /// Seconds since initialization
    fn time(&self) -> f64;
}
