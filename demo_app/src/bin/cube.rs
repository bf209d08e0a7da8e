//! Cube demo
//!
//! An indexed, lit cube viewed through the fly camera.
//!
//! Controls: WASD to move, Space/LeftShift for up/down, hold the right mouse
//! button to look around, Escape to quit.

use bytemuck::{Pod, Zeroable};
use glkit::prelude::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Four vertices per face so each face keeps its own normal
fn cube_geometry() -> (Vec<Vertex>, Vec<u16>) {
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [0, 1, 2].map(|i| 0.5 * (normal[i] + su * u[i] + sv * v[i]));
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

// Fields drop in declaration order; GPU resources must go before the window.
struct CubeApp {
    platform: Platform,
    camera: Camera,
    program: ShaderProgram,
    vao: VertexArray,
    _vbo: VertexBuffer,
    ebo: ElementBuffer,
    angle: f32,
    window: Window,
}

impl CubeApp {
    fn new() -> Self {
        let platform = Platform::glfw();
        let window = Window::try_new(&platform, 1024, 768, "glkit - Cube", WindowOptions::default())
            .unwrap_or_abort("create");

        let settings = CameraSettings::load_or_default("demo_app/config/camera.toml");
        let mut camera = Camera::from_settings(&settings, window.aspect_ratio());
        camera.set_position(Vec3::new(0.0, 0.5, 3.0));

        let program = ShaderProgram::try_from_files(
            &platform,
            "demo_app/shaders/cube.vert",
            "demo_app/shaders/cube.frag",
        )
        .unwrap_or_abort("create");

        let (vertices, indices) = cube_geometry();
        let vao = VertexArray::try_new(&platform).unwrap_or_abort("create");
        vao.bind();
        let vbo = VertexBuffer::try_from_slice(&platform, &vertices, BufferUsage::StaticDraw)
            .unwrap_or_abort("create");
        vbo.bind();
        vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, position, 0));
        vao.attrib_pointer_and_enable(&vertex_attribute!(Vertex, normal, 1));
        let ebo = ElementBuffer::try_new(&platform, &indices, BufferUsage::StaticDraw)
            .unwrap_or_abort("create");
        ebo.bind();
        vao.unbind();
        log::info!("Cube ready: {} vertices, {} indices", vertices.len(), ebo.count());

        draw::set_depth_test(&platform, true);
        draw::set_clear_color(&platform, Color::rgb(20, 22, 30));

        Self {
            platform,
            camera,
            program,
            vao,
            _vbo: vbo,
            ebo,
            angle: 0.0,
            window,
        }
    }

    fn update(&mut self, dt: f32) {
        let input = self.platform.input();
        let moves: [(Key, fn(&mut Camera, f32)); 6] = [
            (Key::W, Camera::move_forward),
            (Key::S, Camera::move_backward),
            (Key::A, Camera::move_left),
            (Key::D, Camera::move_right),
            (Key::Space, Camera::move_up_world),
            (Key::LeftShift, Camera::move_down),
        ];
        for (key, step) in moves {
            if input.is_key_down(key) {
                step(&mut self.camera, dt);
            }
        }

        if input.is_mouse_button_pressed(MouseButton::Right) {
            self.window.set_cursor_visible(false);
        } else if input.is_mouse_button_released(MouseButton::Right) {
            self.window.set_cursor_visible(true);
        }
        if input.is_mouse_button_down(MouseButton::Right) {
            let (dx, dy) = input.mouse_delta();
            self.camera.rotate(dx as f32, -dy as f32);
        }

        self.camera.set_aspect_ratio(self.window.aspect_ratio());
        self.angle += dt * std::f32::consts::FRAC_PI_4;
    }

    fn render(&mut self) {
        draw::clear(&self.platform, ClearFlags::COLOR | ClearFlags::DEPTH);

        let model = Mat4::new_rotation(Vec3::new(0.3, 1.0, 0.0).normalize() * self.angle);
        self.program.use_program();
        self.program.set_mat4_by_name("u_model", &model, false);
        self.program
            .set_mat4_by_name("u_view_projection", &self.camera.view_projection_matrix(), false);
        self.program
            .set_vec3_by_name("u_light_dir", &Vec3::new(-0.4, -1.0, -0.6));
        self.program
            .set_vec4_by_name("u_color", &Vec4::new(0.9, 0.55, 0.2, 1.0));

        self.vao.bind();
        draw::draw_elements(&self.platform, DrawMode::Triangles, &self.ebo);
        self.window.present();
    }

    fn run(&mut self) {
        while !self.window.should_close() {
            self.platform.poll_events();
            let dt = self.platform.frame_delta();
            self.update(dt);
            self.render();
        }
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting cube demo");
    let mut app = CubeApp::new();
    app.run();
    log::info!("Cube demo completed");
}
