//! Triangle demo
//!
//! The classic per-vertex colored triangle: one vertex array, one interleaved
//! vertex buffer and a program loaded from `shaders/`.

use bytemuck::{Pod, Zeroable};
use glkit::prelude::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

const VERTICES: [Vertex; 3] = [
    Vertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] },
    Vertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    Vertex { position: [0.0, 0.5, 0.0], color: [0.0, 0.0, 1.0] },
];

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let platform = Platform::glfw();
    let mut window = Window::try_new(&platform, 800, 600, "glkit - Triangle", WindowOptions::default())
        .unwrap_or_abort("create");

    let program = ShaderProgram::try_from_files(
        &platform,
        "demo_app/shaders/triangle.vert",
        "demo_app/shaders/triangle.frag",
    )
    .unwrap_or_abort("create");

    let vao = VertexArray::try_new(&platform).unwrap_or_abort("create");
    vao.bind();
    let vbo = VertexBuffer::try_from_slice(&platform, &VERTICES, BufferUsage::StaticDraw)
        .unwrap_or_abort("create");
    vbo.bind();
    vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, position, 0));
    vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, color, 1));
    vao.unbind();
    log::info!("Uploaded {} bytes of vertex data", vbo.size());

    draw::set_clear_color(&platform, Color::rgb(25, 25, 38));
    while !window.should_close() {
        draw::clear(&platform, ClearFlags::COLOR);
        program.use_program();
        vao.bind();
        draw::draw_arrays(&platform, DrawMode::Triangles, 0, 3);

        window.present();
        platform.poll_events();
    }
}
