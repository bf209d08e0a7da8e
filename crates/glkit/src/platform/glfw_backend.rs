//! GLFW windowing backend
//!
//! Wraps `glfw::Glfw` and its windows. Each window gets a core-profile GL
//! context of the requested version, and polling is enabled for the events
//! the [`Platform`](super::Platform) consumes.

use std::collections::HashMap;

use glfw::Context;

use super::backend::{CursorMode, WindowDescriptor, WindowEvent, WindowId, WindowingBackend};
use crate::input::{Action, Key, MouseButton};

struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

/// [`WindowingBackend`] backed by GLFW
#[derive(Default)]
pub struct GlfwBackend {
    glfw: Option<glfw::Glfw>,
    windows: HashMap<WindowId, GlfwWindow>,
    current: Option<WindowId>,
    next_id: WindowId,
}

impl GlfwBackend {
    /// Backend that initializes GLFW lazily on [`WindowingBackend::init`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for GlfwBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlfwBackend")
            .field("initialized", &self.glfw.is_some())
            .field("windows", &self.windows.len())
            .field("current", &self.current)
            .finish()
    }
}

#[allow(clippy::needless_pass_by_value)]
fn log_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {:?}: {}", error, description);
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn translate_action(action: glfw::Action) -> Action {
    match action {
        glfw::Action::Press => Action::Press,
        glfw::Action::Release => Action::Release,
        glfw::Action::Repeat => Action::Repeat,
    }
}

fn translate_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        _ => None,
    }
}

fn translate_key(key: glfw::Key) -> Option<Key> {
    let key = match key {
        glfw::Key::Space => Key::Space,
        glfw::Key::Apostrophe => Key::Apostrophe,
        glfw::Key::Comma => Key::Comma,
        glfw::Key::Minus => Key::Minus,
        glfw::Key::Period => Key::Period,
        glfw::Key::Slash => Key::Slash,
        glfw::Key::Num0 => Key::Num0,
        glfw::Key::Num1 => Key::Num1,
        glfw::Key::Num2 => Key::Num2,
        glfw::Key::Num3 => Key::Num3,
        glfw::Key::Num4 => Key::Num4,
        glfw::Key::Num5 => Key::Num5,
        glfw::Key::Num6 => Key::Num6,
        glfw::Key::Num7 => Key::Num7,
        glfw::Key::Num8 => Key::Num8,
        glfw::Key::Num9 => Key::Num9,
        glfw::Key::A => Key::A,
        glfw::Key::B => Key::B,
        glfw::Key::C => Key::C,
        glfw::Key::D => Key::D,
        glfw::Key::E => Key::E,
        glfw::Key::F => Key::F,
        glfw::Key::G => Key::G,
        glfw::Key::H => Key::H,
        glfw::Key::I => Key::I,
        glfw::Key::J => Key::J,
        glfw::Key::K => Key::K,
        glfw::Key::L => Key::L,
        glfw::Key::M => Key::M,
        glfw::Key::N => Key::N,
        glfw::Key::O => Key::O,
        glfw::Key::P => Key::P,
        glfw::Key::Q => Key::Q,
        glfw::Key::R => Key::R,
        glfw::Key::S => Key::S,
        glfw::Key::T => Key::T,
        glfw::Key::U => Key::U,
        glfw::Key::V => Key::V,
        glfw::Key::W => Key::W,
        glfw::Key::X => Key::X,
        glfw::Key::Y => Key::Y,
        glfw::Key::Z => Key::Z,
        glfw::Key::Escape => Key::Escape,
        glfw::Key::Enter => Key::Enter,
        glfw::Key::Tab => Key::Tab,
        glfw::Key::Backspace => Key::Backspace,
        glfw::Key::Insert => Key::Insert,
        glfw::Key::Delete => Key::Delete,
        glfw::Key::Right => Key::Right,
        glfw::Key::Left => Key::Left,
        glfw::Key::Down => Key::Down,
        glfw::Key::Up => Key::Up,
        glfw::Key::LeftShift => Key::LeftShift,
        glfw::Key::LeftControl => Key::LeftControl,
        glfw::Key::LeftAlt => Key::LeftAlt,
        glfw::Key::RightShift => Key::RightShift,
        glfw::Key::RightControl => Key::RightControl,
        glfw::Key::RightAlt => Key::RightAlt,
        glfw::Key::F1 => Key::F1,
        glfw::Key::F2 => Key::F2,
        glfw::Key::F3 => Key::F3,
        glfw::Key::F4 => Key::F4,
        glfw::Key::F5 => Key::F5,
        glfw::Key::F6 => Key::F6,
        glfw::Key::F7 => Key::F7,
        glfw::Key::F8 => Key::F8,
        glfw::Key::F9 => Key::F9,
        glfw::Key::F10 => Key::F10,
        glfw::Key::F11 => Key::F11,
        glfw::Key::F12 => Key::F12,
        _ => return None,
    };
    Some(key)
}

fn translate_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
    match event {
        glfw::WindowEvent::FramebufferSize(width, height) => {
            Some(WindowEvent::FramebufferResized { width, height })
        }
        glfw::WindowEvent::Key(key, _, action, _) => translate_key(key).map(|key| WindowEvent::Key {
            key,
            action: translate_action(action),
        }),
        glfw::WindowEvent::MouseButton(button, action, _) => {
            translate_button(button).map(|button| WindowEvent::MouseButton {
                button,
                action: translate_action(action),
            })
        }
        glfw::WindowEvent::CursorPos(x, y) => Some(WindowEvent::CursorMoved { x, y }),
        glfw::WindowEvent::Scroll(dx, dy) => Some(WindowEvent::Scrolled { dx, dy }),
        glfw::WindowEvent::Close => Some(WindowEvent::CloseRequested),
        _ => None,
    }
}

impl WindowingBackend for GlfwBackend {
    fn init(&mut self) -> Result<(), String> {
        if self.glfw.is_some() {
            return Ok(());
        }
        let glfw = glfw::init(log_glfw_error).map_err(|error| format!("{error:?}"))?;
        log::info!("GLFW {} initialized", glfw::get_version_string());
        self.glfw = Some(glfw);
        Ok(())
    }

    fn terminate(&mut self) {
        self.windows.clear();
        self.current = None;
        if self.glfw.take().is_some() {
            log::info!("GLFW terminated");
        }
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor<'_>) -> Option<WindowId> {
        let glfw = self.glfw.as_mut()?;
        let (major, minor) = descriptor.context_version;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (width, height, title) = (descriptor.width, descriptor.height, descriptor.title);
        let created = if descriptor.fullscreen {
            glfw.with_primary_monitor(|glfw, monitor| {
                let mode = monitor.map_or(glfw::WindowMode::Windowed, |m| {
                    glfw::WindowMode::FullScreen(m)
                });
                glfw.create_window(width, height, title, mode)
            })
        } else {
            glfw.create_window(width, height, title, glfw::WindowMode::Windowed)
        };
        let (mut window, events) = created?;

        window.set_framebuffer_size_polling(true);
        window.set_key_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_close_polling(true);

        self.next_id += 1;
        let id = self.next_id;
        self.windows.insert(id, GlfwWindow { window, events });
        Some(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
        if self.current == Some(window) {
            self.current = None;
        }
    }

    fn make_current(&mut self, window: WindowId) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.window.make_current();
            self.current = Some(window);
        }
    }

    fn current_window(&self) -> Option<WindowId> {
        self.current
    }

    fn load_functions(&mut self) -> bool {
        let Some(entry) = self.current.and_then(|id| self.windows.get_mut(&id)) else {
            return false;
        };
        gl::load_with(|symbol| entry.window.get_proc_address(symbol) as *const _);
        gl::Viewport::is_loaded() && gl::CreateShader::is_loaded()
    }

    fn swap_buffers(&mut self, window: WindowId) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.window.swap_buffers();
        }
    }

    fn poll_events(&mut self) {
        if let Some(glfw) = self.glfw.as_mut() {
            glfw.poll_events();
        }
    }

    fn drain_events(&mut self, window: WindowId) -> Vec<WindowEvent> {
        self.windows.get(&window).map_or_else(Vec::new, |entry| {
            glfw::flush_messages(&entry.events)
                .filter_map(|(_, event)| translate_event(event))
                .collect()
        })
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.windows
            .get(&window)
            .map_or(true, |entry| entry.window.should_close())
    }

    fn set_should_close(&mut self, window: WindowId, value: bool) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.window.set_should_close(value);
        }
    }

    fn window_size(&self, window: WindowId) -> (u32, u32) {
        self.windows.get(&window).map_or((0, 0), |entry| {
            let (width, height) = entry.window.get_size();
            (to_u32(width), to_u32(height))
        })
    }

    fn framebuffer_size(&self, window: WindowId) -> (u32, u32) {
        self.windows.get(&window).map_or((0, 0), |entry| {
            let (width, height) = entry.window.get_framebuffer_size();
            (to_u32(width), to_u32(height))
        })
    }

    fn set_title(&mut self, window: WindowId, title: &str) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.window.set_title(title);
        }
    }

    fn set_swap_interval(&mut self, interval: u32) {
        if let Some(glfw) = self.glfw.as_mut() {
            let interval = if interval == 0 {
                glfw::SwapInterval::None
            } else {
                glfw::SwapInterval::Sync(interval)
            };
            glfw.set_swap_interval(interval);
        }
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.window.set_cursor_mode(match mode {
                CursorMode::Normal => glfw::CursorMode::Normal,
                CursorMode::Disabled => glfw::CursorMode::Disabled,
            });
        }
    }

    fn time(&self) -> f64 {
        self.glfw.as_ref().map_or(0.0, glfw::Glfw::get_time)
    }
}
