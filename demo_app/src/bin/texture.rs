//! Texture demo
//!
//! Draws a textured quad. Pass an image path as the first argument, otherwise
//! a generated checkerboard is used.

use bytemuck::{Pod, Zeroable};
use glkit::prelude::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    Vertex { position: [-0.75, -0.75], uv: [0.0, 0.0] },
    Vertex { position: [0.75, -0.75], uv: [1.0, 0.0] },
    Vertex { position: [0.75, 0.75], uv: [1.0, 1.0] },
    Vertex { position: [-0.75, 0.75], uv: [0.0, 1.0] },
];

const INDICES: [u8; 6] = [0, 1, 2, 2, 3, 0];

fn checkerboard(size: u32, cells: u32) -> ImageData {
    let cell = (size / cells).max(1);
    let data = (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / cell + y / cell) % 2 == 0 {
                [235, 235, 235, 255]
            } else {
                [40, 90, 160, 255]
            }
        })
        .collect();
    ImageData {
        data,
        width: size,
        height: size,
        channels: 4,
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let platform = Platform::glfw();
    let mut window = Window::try_new(&platform, 800, 800, "glkit - Texture", WindowOptions::default())
        .unwrap_or_abort("create");

    let options = TextureOptions::load_or_default("demo_app/config/texture.ron");
    let texture = match std::env::args().nth(1) {
        Some(path) => Texture2d::try_from_file(&platform, &path, &options),
        None => Texture2d::try_from_image(&platform, &checkerboard(256, 8), &options),
    }
    .unwrap_or_abort("load");
    log::info!("Texture {}x{} ready", texture.width(), texture.height());

    let program = ShaderProgram::try_from_files(
        &platform,
        "demo_app/shaders/texture.vert",
        "demo_app/shaders/texture.frag",
    )
    .unwrap_or_abort("create");

    let vao = VertexArray::try_new(&platform).unwrap_or_abort("create");
    vao.bind();
    let vbo = VertexBuffer::try_from_slice(&platform, &QUAD, BufferUsage::StaticDraw)
        .unwrap_or_abort("create");
    vbo.bind();
    vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, position, 0));
    vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, uv, 1));
    let ebo = ElementBuffer::try_new(&platform, &INDICES, BufferUsage::StaticDraw)
        .unwrap_or_abort("create");
    ebo.bind();
    vao.unbind();

    program.use_program();
    program.set_i32_by_name("u_texture", 0);

    draw::set_clear_color(&platform, Color::BLACK);
    while !window.should_close() {
        draw::clear(&platform, ClearFlags::COLOR);
        texture.bind(0);
        program.use_program();
        vao.bind();
        draw::draw_elements(&platform, DrawMode::Triangles, &ebo);

        window.present();
        platform.poll_events();
    }
}
