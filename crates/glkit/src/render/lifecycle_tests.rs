//! End-to-end handle lifecycle against the headless platform

use std::mem;

use bytemuck::{Pod, Zeroable};

use crate::assets::ImageData;
use crate::config::{TextureOptions, WindowOptions};
use crate::foundation::math::Mat4;
use crate::platform::Platform;
use crate::render::device::recording::DrawCall;
use crate::render::device::{Binding, GraphicsDevice};
use crate::render::draw::{self, ClearFlags, Color, DrawMode};
use crate::render::{
    BufferUsage, ElementBuffer, ElementBufferError, IndexType, ShaderError, ShaderProgram,
    Texture2d, TextureError, VertexArray, VertexBuffer, VertexBufferError, Window,
};

const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 a_position;
layout (location = 1) in vec3 a_color;
uniform mat4 u_mvp;
out vec3 v_color;
void main() { v_color = a_color; gl_Position = u_mvp * vec4(a_position, 1.0); }
";

const FRAGMENT: &str = "#version 330 core
in vec3 v_color;
out vec4 frag_color;
void main() { frag_color = vec4(v_color, 1.0); }
";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ColoredVertex {
    position: [f32; 3],
    color: [f32; 3],
}

const TRIANGLE: [ColoredVertex; 3] = [
    ColoredVertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] },
    ColoredVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    ColoredVertex { position: [0.0, 0.5, 0.0], color: [0.0, 0.0, 1.0] },
];

#[test]
fn test_triangle_frame_then_shutdown() {
    let (platform, probe, device) = Platform::headless();
    let mut window = Window::try_new(&platform, 800, 600, "triangle", WindowOptions::default()).unwrap();
    assert_eq!(device.viewport_rect(), Some((0, 0, 800, 600)));

    let program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();
    let vao = VertexArray::try_new(&platform).unwrap();
    vao.bind();
    let vbo = VertexBuffer::try_from_slice(&platform, &TRIANGLE, BufferUsage::StaticDraw).unwrap();
    assert_eq!(vbo.size(), 72);
    vbo.bind();
    assert!(vao.attrib_pointer_and_enable(&crate::vertex_attribute!(ColoredVertex, position, 0)));
    assert!(vao.attrib_pointer_and_enable(&crate::vertex_attribute!(ColoredVertex, color, 1)));
    vao.unbind();

    draw::set_clear_color(&platform, Color::rgb(25, 25, 38));
    draw::clear(&platform, ClearFlags::COLOR | ClearFlags::DEPTH);
    program.use_program();
    assert!(program.set_mat4_by_name("u_mvp", &Mat4::identity(), false));
    vao.bind();
    draw::draw_arrays(&platform, DrawMode::Triangles, 0, 3);
    window.present();
    platform.poll_events();

    assert_eq!(device.draws(), vec![DrawCall::Arrays { mode: DrawMode::Triangles, first: 0, count: 3 }]);
    assert_eq!(probe.stats().swaps, 1);

    drop((vao, vbo, program));
    assert_eq!(device.live_objects(), 0);

    drop(window);
    assert_eq!(platform.open_window_count(), 0);
    assert!(!platform.is_windowing_ready());
    assert!(!platform.is_functions_loaded());
    assert_eq!(probe.stats().terminate_calls, 1);

    assert_eq!(
        VertexBuffer::try_new(&platform, &[0; 4], BufferUsage::StaticDraw).unwrap_err(),
        VertexBufferError::BackendNotReady
    );
}

#[test]
fn test_buffer_outliving_its_window_is_abandoned() {
    let (platform, _probe, device) = Platform::headless();
    let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
    let vbo = VertexBuffer::try_new(&platform, &[0; 16], BufferUsage::StaticDraw).unwrap();
    let stale = vbo.id();

    drop(window);
    vbo.bind();
    assert_eq!(device.get_integer(Binding::ArrayBuffer), 0);
    drop(vbo);
    let counts = device.counts();
    assert_eq!(counts.buffers_deleted, 0);
    assert_eq!(counts.invalid_deletes, 0);
    assert!(device.is_live(stale));

    let _again = Window::try_new(&platform, 64, 64, "again", WindowOptions::default()).unwrap();
    let fresh = VertexBuffer::try_new(&platform, &[0; 16], BufferUsage::StaticDraw).unwrap();
    drop(fresh);
    assert_eq!(device.counts().buffers_deleted, 1);
}

#[test]
fn test_windowing_initialized_once_for_many_windows() {
    let (platform, probe, _device) = Platform::headless();
    let windows: Vec<Window> = (0..3)
        .map(|i| Window::try_new(&platform, 320, 240, &format!("w{i}"), WindowOptions::default()).unwrap())
        .collect();

    let stats = probe.stats();
    assert_eq!(stats.init_calls, 1);
    assert_eq!(stats.load_calls, 1);
    assert_eq!(platform.open_window_count(), 3);

    drop(windows);
    let stats = probe.stats();
    assert_eq!(stats.windows_destroyed, 3);
    assert_eq!(stats.terminate_calls, 1);

    let _again = Window::try_new(&platform, 320, 240, "again", WindowOptions::default()).unwrap();
    let stats = probe.stats();
    assert_eq!(stats.init_calls, 2);
    assert_eq!(stats.load_calls, 2);
}

#[test]
fn test_moved_handles_release_exactly_once() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

    let mut program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();
    let mut vao = VertexArray::try_new(&platform).unwrap();
    let mut vbo = VertexBuffer::try_from_slice(&platform, &TRIANGLE, BufferUsage::DynamicDraw).unwrap();
    let mut ebo = ElementBuffer::try_new(&platform, &[0u16, 1, 2], BufferUsage::StaticDraw).unwrap();
    let image = ImageData::solid_color(2, 2, [255, 0, 0, 255]);
    let mut texture = Texture2d::try_from_image(&platform, &image, &TextureOptions::default()).unwrap();
    let ids = [program.id(), vao.id(), vbo.id(), ebo.id(), texture.id()];

    let moved = (
        mem::take(&mut program),
        mem::take(&mut vao),
        mem::take(&mut vbo),
        mem::take(&mut ebo),
        mem::take(&mut texture),
    );
    assert!(!program.is_valid() && !vao.is_valid() && !vbo.is_valid());
    assert!(!ebo.is_valid() && !texture.is_valid());
    assert_eq!(ids, [moved.0.id(), moved.1.id(), moved.2.id(), moved.3.id(), moved.4.id()]);

    drop((program, vao, vbo, ebo, texture));
    let counts = device.counts();
    assert_eq!(counts.programs_deleted + counts.vertex_arrays_deleted, 0);
    assert_eq!(counts.buffers_deleted + counts.textures_deleted, 0);
    assert!(ids.iter().all(|&id| device.is_live(id)));

    drop(moved);
    let counts = device.counts();
    assert_eq!(counts.programs_deleted, 1);
    assert_eq!(counts.vertex_arrays_deleted, 1);
    assert_eq!(counts.buffers_deleted, 2);
    assert_eq!(counts.textures_deleted, 1);
    assert_eq!(counts.invalid_deletes, 0);
}

#[test]
fn test_move_assignment_releases_previous_target() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

    let mut target = VertexBuffer::try_new(&platform, &[1; 16], BufferUsage::StaticDraw).unwrap();
    let old = target.id();
    let mut source = VertexBuffer::try_new(&platform, &[2; 32], BufferUsage::StaticDraw).unwrap();
    let new = source.id();

    target = mem::take(&mut source);
    assert!(!device.is_live(old));
    assert_eq!(target.id(), new);
    assert_eq!(target.size(), 32);
    assert!(!source.is_valid());
    assert_eq!(device.counts().buffers_deleted, 1);
}

#[test]
fn test_invalid_glsl_reports_compile_failure() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

    let err = ShaderProgram::try_from_source(&platform, VERTEX, "#version 330 core\nnot glsl").unwrap_err();
    assert_eq!(err, ShaderError::FragmentCompileFailed);
    assert_eq!(device.live_objects(), 0);
}

#[test]
fn test_uniform_lookup_is_cached() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
    let program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();

    let first = program.uniform_location("u_mvp");
    assert!(first >= 0);
    assert_eq!(program.uniform_location("u_mvp"), first);
    assert_eq!(device.counts().uniform_lookups, 1);

    assert_eq!(program.uniform_location("u_absent"), -1);
    assert_eq!(program.uniform_location("u_absent"), -1);
    assert_eq!(device.counts().uniform_lookups, 2);
}

#[test]
fn test_element_count_follows_index_width() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

    let quad = ElementBuffer::try_new(&platform, &[0u32, 1, 2, 2, 3, 0], BufferUsage::StaticDraw).unwrap();
    assert_eq!(quad.count(), 6);
    assert_eq!(quad.index_type(), IndexType::U32);

    let bytes = ElementBuffer::try_from_bytes(&platform, &[0; 12], IndexType::U16, BufferUsage::StaticDraw).unwrap();
    assert_eq!(bytes.count(), 6);

    assert_eq!(
        ElementBuffer::try_from_bytes(&platform, &[0; 5], IndexType::U16, BufferUsage::StaticDraw).unwrap_err(),
        ElementBufferError::InvalidParams
    );
    assert_eq!(device.counts().buffers_created, 2);
}

#[test]
fn test_indexed_draw_uses_vertex_array_elements() {
    let (platform, _probe, device) = Platform::headless();
    let _window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();

    let vao = VertexArray::try_new(&platform).unwrap();
    vao.bind();
    let ebo = ElementBuffer::try_new(&platform, &[0u8, 1, 2], BufferUsage::StaticDraw).unwrap();
    ebo.bind();
    assert_eq!(device.element_buffer_of(vao.id()), ebo.id());

    draw::draw_elements(&platform, DrawMode::Triangles, &ebo);
    match device.draws().as_slice() {
        [DrawCall::Elements { count, index_type, element_buffer, .. }] => {
            assert_eq!(*count, 3);
            assert_eq!(*index_type, IndexType::U8);
            assert_eq!(*element_buffer, ebo.id());
        }
        other => panic!("unexpected draws: {other:?}"),
    }
}

#[test]
fn test_resources_need_a_window_first() {
    let (platform, _probe, device) = Platform::headless();

    assert_eq!(VertexArray::try_new(&platform).unwrap_err(), crate::render::VertexArrayError::BackendNotReady);
    let image = ImageData::solid_color(1, 1, [0, 0, 0, 255]);
    assert_eq!(
        Texture2d::try_from_image(&platform, &image, &TextureOptions::default()).unwrap_err(),
        TextureError::BackendNotReady
    );
    assert_eq!(device.live_objects(), 0);
}
