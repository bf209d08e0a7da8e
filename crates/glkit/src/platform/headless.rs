//! Windowing backend without a display
//!
//! [`HeadlessBackend`] keeps windows as plain records, runs a manual clock
//! and delivers only events injected through its [`HeadlessProbe`]. The probe
//! stays with the caller after the backend moves into a
//! [`Platform`](super::Platform), so tests can script failures and inspect
//! call counts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::backend::{CursorMode, WindowDescriptor, WindowEvent, WindowId, WindowingBackend};

/// Call counters of a headless backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// `init` calls
    pub init_calls: usize,
    /// `terminate` calls
    pub terminate_calls: usize,
    /// `load_functions` calls
    pub load_calls: usize,
    /// Windows created
    pub windows_created: usize,
    /// Windows destroyed
    pub windows_destroyed: usize,
    /// Buffer swaps
    pub swaps: usize,
    /// Event pumps
    pub polls: usize,
}

#[derive(Debug, Clone)]
struct HeadlessWindow {
    size: (u32, u32),
    framebuffer: (u32, u32),
    title: String,
    should_close: bool,
    cursor: CursorMode,
    queued: Vec<WindowEvent>,
    delivered: Vec<WindowEvent>,
}

#[derive(Debug)]
struct HeadlessState {
    stats: HeadlessStats,
    fail_init: bool,
    fail_window_create: bool,
    fail_function_load: bool,
    initialized: bool,
    clock: f64,
    swap_interval: Option<u32>,
    windows: HashMap<WindowId, HeadlessWindow>,
    current: Option<WindowId>,
    next_id: WindowId,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            stats: HeadlessStats::default(),
            fail_init: false,
            fail_window_create: false,
            fail_function_load: false,
            initialized: false,
            clock: 0.0,
            swap_interval: None,
            windows: HashMap::new(),
            current: None,
            next_id: 1,
        }
    }
}

/// Test-side view of a [`HeadlessBackend`]
#[derive(Debug, Clone)]
pub struct HeadlessProbe(Rc<RefCell<HeadlessState>>);

impl HeadlessProbe {
    /// Snapshot of the call counters
    #[must_use]
    pub fn stats(&self) -> HeadlessStats {
        self.0.borrow().stats.clone()
    }

    /// Make the next `init` calls fail
    pub fn fail_init(&self, fail: bool) {
        self.0.borrow_mut().fail_init = fail;
    }

    /// Make the next window creations fail
    pub fn fail_window_create(&self, fail: bool) {
        self.0.borrow_mut().fail_window_create = fail;
    }

    /// Make the next function loads fail
    pub fn fail_function_load(&self, fail: bool) {
        self.0.borrow_mut().fail_function_load = fail;
    }

    /// Whether the backend is initialized
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.0.borrow().initialized
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        self.0.borrow_mut().clock += seconds;
    }

    /// Number of live windows
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.0.borrow().windows.len()
    }

    /// Window whose context is current
    #[must_use]
    pub fn current(&self) -> Option<WindowId> {
        self.0.borrow().current
    }

    /// Last swap interval set
    #[must_use]
    pub fn swap_interval(&self) -> Option<u32> {
        self.0.borrow().swap_interval
    }

    /// Title of a live window
    #[must_use]
    pub fn title(&self, window: WindowId) -> Option<String> {
        self.0.borrow().windows.get(&window).map(|w| w.title.clone())
    }

    /// Cursor mode of a live window
    #[must_use]
    pub fn cursor_mode(&self, window: WindowId) -> Option<CursorMode> {
        self.0.borrow().windows.get(&window).map(|w| w.cursor)
    }

    /// Queue an event for delivery at the next poll
    pub fn inject(&self, window: WindowId, event: WindowEvent) {
        if let Some(record) = self.0.borrow_mut().windows.get_mut(&window) {
            record.queued.push(event);
        }
    }

    /// Change the drawable size and queue the matching resize event
    pub fn resize(&self, window: WindowId, width: u32, height: u32) {
        if let Some(record) = self.0.borrow_mut().windows.get_mut(&window) {
            record.size = (width, height);
            record.framebuffer = (width, height);
            record.queued.push(WindowEvent::FramebufferResized {
                width: i32::try_from(width).unwrap_or(i32::MAX),
                height: i32::try_from(height).unwrap_or(i32::MAX),
            });
        }
    }
}

/// Display-less [`WindowingBackend`]
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    /// Fresh, uninitialized backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for scripting and inspection
    #[must_use]
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe(Rc::clone(&self.state))
    }
}

impl WindowingBackend for HeadlessBackend {
    fn init(&mut self) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.stats.init_calls += 1;
        if state.fail_init {
            return Err("no display available".to_string());
        }
        state.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) {
        let mut state = self.state.borrow_mut();
        state.stats.terminate_calls += 1;
        state.initialized = false;
        state.current = None;
        state.windows.clear();
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor<'_>) -> Option<WindowId> {
        let mut state = self.state.borrow_mut();
        if !state.initialized || state.fail_window_create {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.stats.windows_created += 1;
        state.windows.insert(
            id,
            HeadlessWindow {
                size: (descriptor.width, descriptor.height),
                framebuffer: (descriptor.width, descriptor.height),
                title: descriptor.title.to_string(),
                should_close: false,
                cursor: CursorMode::Normal,
                queued: Vec::new(),
                delivered: Vec::new(),
            },
        );
        Some(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        if state.windows.remove(&window).is_some() {
            state.stats.windows_destroyed += 1;
        }
        if state.current == Some(window) {
            state.current = None;
        }
    }

    fn make_current(&mut self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        if state.windows.contains_key(&window) {
            state.current = Some(window);
        }
    }

    fn current_window(&self) -> Option<WindowId> {
        self.state.borrow().current
    }

    fn load_functions(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.stats.load_calls += 1;
        state.current.is_some() && !state.fail_function_load
    }

    fn swap_buffers(&mut self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        if state.windows.contains_key(&window) {
            state.stats.swaps += 1;
        }
    }

    fn poll_events(&mut self) {
        let mut state = self.state.borrow_mut();
        state.stats.polls += 1;
        for record in state.windows.values_mut() {
            let queued = std::mem::take(&mut record.queued);
            for event in &queued {
                if *event == WindowEvent::CloseRequested {
                    record.should_close = true;
                }
            }
            record.delivered.extend(queued);
        }
    }

    fn drain_events(&mut self, window: WindowId) -> Vec<WindowEvent> {
        self.state
            .borrow_mut()
            .windows
            .get_mut(&window)
            .map(|record| std::mem::take(&mut record.delivered))
            .unwrap_or_default()
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.state
            .borrow()
            .windows
            .get(&window)
            .is_some_and(|record| record.should_close)
    }

    fn set_should_close(&mut self, window: WindowId, value: bool) {
        if let Some(record) = self.state.borrow_mut().windows.get_mut(&window) {
            record.should_close = value;
        }
    }

    fn window_size(&self, window: WindowId) -> (u32, u32) {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or((0, 0), |record| record.size)
    }

    fn framebuffer_size(&self, window: WindowId) -> (u32, u32) {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or((0, 0), |record| record.framebuffer)
    }

    fn set_title(&mut self, window: WindowId, title: &str) {
        if let Some(record) = self.state.borrow_mut().windows.get_mut(&window) {
            record.title = title.to_string();
        }
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.state.borrow_mut().swap_interval = Some(interval);
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        if let Some(record) = self.state.borrow_mut().windows.get_mut(&window) {
            record.cursor = mode;
        }
    }

    fn time(&self) -> f64 {
        self.state.borrow().clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> WindowDescriptor<'static> {
        WindowDescriptor {
            width: 320,
            height: 240,
            title: "headless",
            context_version: (3, 3),
            fullscreen: false,
        }
    }

    #[test]
    fn test_window_requires_init() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.create_window(&descriptor()).is_none());

        backend.init().unwrap();
        let window = backend.create_window(&descriptor()).unwrap();
        assert_eq!(backend.window_size(window), (320, 240));
    }

    #[test]
    fn test_events_wait_for_poll() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        backend.init().unwrap();
        let window = backend.create_window(&descriptor()).unwrap();

        probe.inject(window, WindowEvent::CloseRequested);
        assert!(backend.drain_events(window).is_empty());
        assert!(!backend.should_close(window));

        backend.poll_events();
        assert_eq!(backend.drain_events(window), vec![WindowEvent::CloseRequested]);
        assert!(backend.should_close(window));
        assert!(backend.drain_events(window).is_empty());
    }

    #[test]
    fn test_function_load_needs_current_context() {
        let mut backend = HeadlessBackend::new();
        backend.init().unwrap();
        assert!(!backend.load_functions());

        let window = backend.create_window(&descriptor()).unwrap();
        backend.make_current(window);
        assert!(backend.load_functions());

        backend.destroy_window(window);
        assert_eq!(backend.current_window(), None);
    }
}
