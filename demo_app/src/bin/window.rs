//! Window demo
//!
//! Opens a window with the FPS overlay enabled and fades the clear color.
//! Escape closes it.

use glkit::prelude::*;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting window demo");
    let platform = Platform::glfw();
    let options = WindowOptions {
        show_fps: true,
        ..WindowOptions::load_or_default("demo_app/config/window.toml")
    };
    let mut window = Window::try_new(&platform, 800, 600, "glkit - Window", options)
        .unwrap_or_abort("create");

    while !window.should_close() {
        let t = platform.time() as f32;
        let pulse = |phase: f32| ((t + phase).sin() * 0.5 + 0.5) * 255.0;
        draw::set_clear_color(
            &platform,
            Color::rgb(pulse(0.0) as u8, pulse(2.1) as u8, pulse(4.2) as u8),
        );
        draw::clear(&platform, ClearFlags::COLOR);

        window.present();
        platform.poll_events();
    }

    log::info!("Window demo completed");
}
