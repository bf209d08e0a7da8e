//! Platform service
//!
//! A [`Platform`] owns the three collaborators every resource needs: the
//! windowing backend, the graphics device and the debug state verifier. It
//! also carries the bootstrap state, the open-window count, input state and
//! the frame timer. Cloning a `Platform` is cheap and shares all of it;
//! windows keep a clone so the last one to close can tear the backend down.
//!
//! A platform is bound to the thread that created it.

pub mod backend;
mod bootstrap;
mod glfw_backend;
pub mod headless;

pub use backend::{CursorMode, WindowDescriptor, WindowEvent, WindowId, WindowingBackend};
pub use bootstrap::{Bootstrap, BootstrapError};
pub use glfw_backend::GlfwBackend;
pub use headless::{HeadlessBackend, HeadlessProbe};

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::foundation::time::Timer;
use crate::input::{Action, InputState, Key};
use crate::render::device::{
    default_verifier, DeviceContext, DeviceInfo, GlDevice, GraphicsDevice, QueryVerifier,
    RecordingDevice, StateVerifier,
};

struct Shared {
    backend: RefCell<Box<dyn WindowingBackend>>,
    context: DeviceContext,
    bootstrap: RefCell<Bootstrap>,
    windows: RefCell<Vec<WindowId>>,
    input: RefCell<InputState>,
    timer: RefCell<Timer>,
}

/// Shared handle to the windowing and graphics collaborators
#[derive(Clone)]
pub struct Platform {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("bootstrap", &*self.shared.bootstrap.borrow())
            .field("open_windows", &self.open_window_count())
            .finish_non_exhaustive()
    }
}

impl Platform {
    /// Assemble a platform from explicit collaborators
    #[must_use]
    pub fn new(
        backend: Box<dyn WindowingBackend>,
        device: Rc<dyn GraphicsDevice>,
        verifier: Rc<dyn StateVerifier>,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                backend: RefCell::new(backend),
                context: DeviceContext::new(device, verifier),
                bootstrap: RefCell::new(Bootstrap::new()),
                windows: RefCell::new(Vec::new()),
                input: RefCell::new(InputState::new()),
                timer: RefCell::new(Timer::new()),
            }),
        }
    }

    /// GLFW windows with the OpenGL device; verification follows the build profile
    #[must_use]
    pub fn glfw() -> Self {
        Self::new(
            Box::new(GlfwBackend::new()),
            Rc::new(GlDevice::new()),
            default_verifier(),
        )
    }

    /// Display-less platform over a [`RecordingDevice`] with querying verification
    ///
    /// Returns the probe and device so callers can script and inspect them.
    #[must_use]
    pub fn headless() -> (Self, HeadlessProbe, Rc<RecordingDevice>) {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let device = Rc::new(RecordingDevice::new());
        let platform = Self::new(Box::new(backend), device.clone(), Rc::new(QueryVerifier));
        (platform, probe, device)
    }

    /// Initialize the windowing library unless already attempted this cycle
    pub fn ensure_windowing(&self) -> Result<(), BootstrapError> {
        let mut backend = self.shared.backend.borrow_mut();
        self.shared
            .bootstrap
            .borrow_mut()
            .ensure_windowing(&mut **backend)
    }

    /// Load graphics functions through the current context unless already attempted
    ///
    /// The first successful load logs the driver identification strings.
    pub fn ensure_functions(&self) -> Result<(), BootstrapError> {
        let loaded_now = {
            let mut backend = self.shared.backend.borrow_mut();
            self.shared
                .bootstrap
                .borrow_mut()
                .ensure_functions(&mut **backend)?
        };
        if loaded_now {
            DeviceInfo::query(self.shared.context.device()).log();
        }
        Ok(())
    }

    /// Forget bootstrap outcomes so the next request retries both stages
    ///
    /// Resources created before the reset are abandoned: they stop acting on
    /// the device and their drop deletes nothing.
    pub fn reset(&self) {
        self.shared.bootstrap.borrow_mut().reset();
        self.shared.context.invalidate();
    }

    /// Windowing library initialized this cycle
    #[must_use]
    pub fn is_windowing_ready(&self) -> bool {
        self.shared.bootstrap.borrow().is_windowing_ready()
    }

    /// Graphics functions loaded this cycle
    #[must_use]
    pub fn is_functions_loaded(&self) -> bool {
        self.shared.bootstrap.borrow().is_functions_loaded()
    }

    /// Number of live windows created through this platform
    #[must_use]
    pub fn open_window_count(&self) -> usize {
        self.shared.windows.borrow().len()
    }

    /// Device and verifier shared by resources
    #[must_use]
    pub fn device_context(&self) -> &DeviceContext {
        &self.shared.context
    }

    /// Both bootstrap stages ready, or why not
    pub(crate) fn require_device(&self) -> Result<DeviceContext, BootstrapError> {
        self.ensure_windowing()?;
        self.ensure_functions()?;
        Ok(self.shared.context.clone())
    }

    pub(crate) fn backend(&self) -> Ref<'_, Box<dyn WindowingBackend>> {
        self.shared.backend.borrow()
    }

    pub(crate) fn backend_mut(&self) -> RefMut<'_, Box<dyn WindowingBackend>> {
        self.shared.backend.borrow_mut()
    }

    pub(crate) fn register_window(&self, window: WindowId) {
        self.shared.windows.borrow_mut().push(window);
        log::debug!("Window {} opened ({} open)", window, self.open_window_count());
    }

    /// Destroy a window; closing the last one terminates the backend
    pub(crate) fn close_window(&self, window: WindowId) {
        let remaining = {
            let mut windows = self.shared.windows.borrow_mut();
            let before = windows.len();
            windows.retain(|open| *open != window);
            if windows.len() == before {
                return;
            }
            windows.len()
        };

        let mut backend = self.shared.backend.borrow_mut();
        backend.destroy_window(window);
        log::debug!("Window {} closed ({} open)", window, remaining);
        if remaining == 0 {
            backend.terminate();
            self.reset();
            self.shared.input.borrow_mut().clear();
            log::info!("Last window closed, windowing backend terminated");
        }
    }

    /// Pump events and route them to input state and window handlers
    ///
    /// Framebuffer resizes update the viewport when the resized window's
    /// context is current. Escape requests the window to close. The frame
    /// timer advances once per call.
    pub fn poll_events(&self) {
        self.shared.input.borrow_mut().begin_frame();

        let mut backend = self.shared.backend.borrow_mut();
        backend.poll_events();

        let windows = self.shared.windows.borrow().clone();
        let functions_loaded = self.is_functions_loaded();
        let mut input = self.shared.input.borrow_mut();
        for window in windows {
            for event in backend.drain_events(window) {
                match event {
                    WindowEvent::FramebufferResized { width, height } => {
                        if functions_loaded && backend.current_window() == Some(window) {
                            self.shared.context.device().viewport(0, 0, width, height);
                        }
                    }
                    WindowEvent::Key { key, action } => {
                        if key == Key::Escape && action == Action::Press {
                            backend.set_should_close(window, true);
                        }
                        input.on_key(key, action);
                    }
                    WindowEvent::MouseButton { button, action } => {
                        input.on_mouse_button(button, action);
                    }
                    WindowEvent::CursorMoved { x, y } => input.on_cursor_pos(x, y),
                    WindowEvent::Scrolled { dx, dy } => input.on_scroll(dx, dy),
                    WindowEvent::CloseRequested => backend.set_should_close(window, true),
                }
            }
        }

        let now = backend.time();
        self.shared.timer.borrow_mut().tick(now);
    }

    /// Copy of the input state for the current frame
    ///
    /// The copy is detached from the platform, so holding it across
    /// [`poll_events`](Self::poll_events) is fine; it just stops updating.
    #[must_use]
    pub fn input(&self) -> InputState {
        self.shared.input.borrow().clone()
    }

    /// Seconds on the backend clock
    #[must_use]
    pub fn time(&self) -> f64 {
        self.shared.backend.borrow().time()
    }

    /// Seconds between the last two [`poll_events`](Self::poll_events) calls
    #[must_use]
    pub fn frame_delta(&self) -> f32 {
        self.shared.timer.borrow().delta_time()
    }

    /// Copy of the frame timer advanced by [`poll_events`](Self::poll_events)
    #[must_use]
    pub fn timer(&self) -> Timer {
        self.shared.timer.borrow().clone()
    }
}
