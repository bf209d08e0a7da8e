//! Window resource
//!
//! A [`Window`] owns one native window and its GL context. Creating the
//! first window bootstraps the platform; dropping the last one tears the
//! windowing backend down again.

use std::time::Duration;

use thiserror::Error;

use super::result::ResourceError;
use crate::config::WindowOptions;
use crate::foundation::time::FpsCounter;
use crate::platform::{BootstrapError, CursorMode, Platform, WindowDescriptor, WindowId};

/// Window construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Zero size or empty title
    #[error("invalid window parameters")]
    InvalidParams,

    /// The windowing library could not be initialized
    #[error("windowing backend initialization failed")]
    BackendInitFailed,

    /// The windowing library refused to create the window
    #[error("native window creation failed")]
    NativeCreateFailed,

    /// Graphics functions could not be loaded through the new context
    #[error("graphics function loading failed")]
    FunctionLoadFailed,
}

impl ResourceError for WindowError {
    const RESOURCE: &'static str = "window";
}

/// Owning handle to a native window with a GL context
///
/// The default value owns nothing.
#[derive(Debug, Default)]
pub struct Window {
    id: WindowId,
    platform: Option<Platform>,
    title: String,
    fps: Option<FpsCounter>,
    target_fps: u32,
    vsync: bool,
    last_present: Option<f64>,
}

impl Window {
    /// Create a window and make its context current
    ///
    /// # Arguments
    /// * `platform` - Platform providing the backend and device
    /// * `width`, `height` - Client area size, both non-zero
    /// * `title` - Non-empty title bar text
    /// * `options` - Context version, frame pacing and presentation options
    ///
    /// The viewport is initialized to the framebuffer size, and the swap
    /// interval and cursor mode follow `options`.
    pub fn try_new(
        platform: &Platform,
        width: u32,
        height: u32,
        title: &str,
        options: WindowOptions,
    ) -> Result<Self, WindowError> {
        if width == 0 || height == 0 || title.is_empty() {
            log::error!("Invalid window parameters: {}x{} {:?}", width, height, title);
            return Err(WindowError::InvalidParams);
        }

        platform
            .ensure_windowing()
            .map_err(|_| WindowError::BackendInitFailed)?;

        let descriptor = WindowDescriptor {
            width,
            height,
            title,
            context_version: options.context_version,
            fullscreen: options.fullscreen,
        };
        let id = {
            let mut backend = platform.backend_mut();
            let id = backend
                .create_window(&descriptor)
                .ok_or(WindowError::NativeCreateFailed)?;
            backend.make_current(id);
            id
        };
        platform.register_window(id);

        let mut window = Self {
            id,
            platform: Some(platform.clone()),
            title: title.to_string(),
            fps: None,
            target_fps: options.target_fps,
            vsync: options.vsync,
            last_present: None,
        };

        if let Err(error) = platform.ensure_functions() {
            log::error!("Window {} created without usable graphics functions: {}", id, error);
            return Err(match error {
                BootstrapError::WindowingInitFailed => WindowError::BackendInitFailed,
                BootstrapError::NoCurrentContext | BootstrapError::FunctionLoadFailed => {
                    WindowError::FunctionLoadFailed
                }
            });
        }

        window.set_vsync(options.vsync);
        window.set_cursor_visible(options.cursor_visible);
        window.set_show_fps(options.show_fps);

        let (fb_width, fb_height) = window.framebuffer_size();
        platform.device_context().device().viewport(
            0,
            0,
            i32::try_from(fb_width).unwrap_or(i32::MAX),
            i32::try_from(fb_height).unwrap_or(i32::MAX),
        );

        log::info!("Window \"{}\" opened at {}x{}", title, width, height);
        Ok(window)
    }

    /// Backend window id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Whether this handle owns a window
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Whether a close was requested; non-owning handles report true
    #[must_use]
    pub fn should_close(&self) -> bool {
        self.platform
            .as_ref()
            .map_or(true, |platform| platform.backend().should_close(self.id))
    }

    /// Request or cancel closing
    pub fn set_should_close(&self, value: bool) {
        if let Some(platform) = &self.platform {
            platform.backend_mut().set_should_close(self.id, value);
        }
    }

    /// Make this window's context current
    pub fn make_current(&self) {
        if let Some(platform) = &self.platform {
            platform.backend_mut().make_current(self.id);
        }
    }

    /// Client area size in screen coordinates
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.platform
            .as_ref()
            .map_or((0, 0), |platform| platform.backend().window_size(self.id))
    }

    /// Drawable size in pixels
    #[must_use]
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.platform
            .as_ref()
            .map_or((0, 0), |platform| platform.backend().framebuffer_size(self.id))
    }

    /// Framebuffer width over height, or 1.0 for an empty framebuffer
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.framebuffer_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Replace the base title; the FPS overlay appends to it
    pub fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
        self.write_title(self.fps.as_ref().and_then(FpsCounter::last_fps));
    }

    /// Toggle the frame-rate overlay in the title bar
    pub fn set_show_fps(&mut self, show: bool) {
        match (show, self.fps.is_some()) {
            (true, false) => self.fps = Some(FpsCounter::new(FpsCounter::DEFAULT_INTERVAL)),
            (false, true) => {
                self.fps = None;
                self.write_title(None);
            }
            _ => {}
        }
    }

    /// Toggle vsync for this window's context
    pub fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
        if let Some(platform) = &self.platform {
            platform.backend_mut().set_swap_interval(u32::from(enabled));
        }
    }

    /// Show and free the cursor, or hide and capture it
    pub fn set_cursor_visible(&self, visible: bool) {
        if let Some(platform) = &self.platform {
            let mode = if visible {
                CursorMode::Normal
            } else {
                CursorMode::Disabled
            };
            platform.backend_mut().set_cursor_mode(self.id, mode);
        }
    }

    /// Swap buffers, update the FPS overlay and apply the frame cap
    pub fn present(&mut self) {
        let Some(platform) = self.platform.clone() else {
            return;
        };
        platform.backend_mut().swap_buffers(self.id);

        let now = platform.time();
        if let Some(fps) = self.fps.as_mut().and_then(|counter| counter.frame(now)) {
            self.write_title(Some(fps));
        }

        if self.target_fps > 0 && !self.vsync {
            let budget = 1.0 / f64::from(self.target_fps);
            if let Some(last) = self.last_present {
                let elapsed = now - last;
                if elapsed < budget {
                    std::thread::sleep(Duration::from_secs_f64(budget - elapsed));
                }
            }
            self.last_present = Some(platform.time());
        }
    }

    fn write_title(&self, fps: Option<f64>) {
        let Some(platform) = &self.platform else {
            return;
        };
        let title = match fps {
            Some(fps) if self.fps.is_some() => format!("{} | FPS: {:.0}", self.title, fps),
            _ => self.title.clone(),
        };
        platform.backend_mut().set_title(self.id, &title);
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let id = std::mem::take(&mut self.id);
        if let Some(platform) = self.platform.take() {
            if id != 0 {
                platform.close_window(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::WindowEvent;

    #[test]
    fn test_invalid_params_touch_nothing() {
        let (platform, probe, _device) = Platform::headless();
        let options = WindowOptions::default();

        assert_eq!(
            Window::try_new(&platform, 0, 600, "t", options.clone()).unwrap_err(),
            WindowError::InvalidParams
        );
        assert_eq!(
            Window::try_new(&platform, 800, 600, "", options).unwrap_err(),
            WindowError::InvalidParams
        );
        assert_eq!(probe.stats().init_calls, 0);
    }

    #[test]
    fn test_creation_applies_options() {
        let (platform, probe, device) = Platform::headless();
        let options = WindowOptions {
            vsync: false,
            cursor_visible: false,
            ..WindowOptions::default()
        };
        let window = Window::try_new(&platform, 800, 600, "t", options).unwrap();

        assert!(platform.is_functions_loaded());
        assert_eq!(probe.current(), Some(window.id()));
        assert_eq!(probe.swap_interval(), Some(0));
        assert_eq!(probe.cursor_mode(window.id()), Some(CursorMode::Disabled));
        assert_eq!(device.viewport_rect(), Some((0, 0, 800, 600)));
        assert!((window.aspect_ratio() - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_backend_failures_map_to_window_errors() {
        let (platform, probe, _device) = Platform::headless();
        probe.fail_window_create(true);
        assert_eq!(
            Window::try_new(&platform, 8, 8, "t", WindowOptions::default()).unwrap_err(),
            WindowError::NativeCreateFailed
        );

        probe.fail_window_create(false);
        probe.fail_function_load(true);
        assert_eq!(
            Window::try_new(&platform, 8, 8, "t", WindowOptions::default()).unwrap_err(),
            WindowError::FunctionLoadFailed
        );
        assert_eq!(platform.open_window_count(), 0);
        assert_eq!(probe.window_count(), 0);
    }

    #[test]
    fn test_fps_overlay_rewrites_title_once_per_second() {
        let (platform, probe, _device) = Platform::headless();
        let options = WindowOptions {
            show_fps: true,
            ..WindowOptions::default()
        };
        let mut window = Window::try_new(&platform, 64, 64, "demo", options).unwrap();

        for _ in 0..4 {
            probe.advance(0.25);
            window.present();
        }
        assert_eq!(probe.title(window.id()).as_deref(), Some("demo"));

        probe.advance(0.25);
        window.present();
        assert_eq!(probe.title(window.id()).as_deref(), Some("demo | FPS: 4"));

        window.set_show_fps(false);
        assert_eq!(probe.title(window.id()).as_deref(), Some("demo"));
    }

    #[test]
    fn test_close_request_is_observable() {
        let (platform, probe, _device) = Platform::headless();
        let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

        assert!(!window.should_close());
        probe.inject(window.id(), WindowEvent::CloseRequested);
        platform.poll_events();
        assert!(window.should_close());

        window.set_should_close(false);
        assert!(!window.should_close());
        assert!(Window::default().should_close());
    }
}
