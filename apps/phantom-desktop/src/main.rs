use anyhow::Result;
use clap::Parser;
use phantom_overlay::Statistics;
use phantom_render_wgpu::{Camera, Gpu, WgpuRenderer};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "phantom-desktop", about = "Phantom rendering demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value = "960")]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "640")]
    height: u32,
}

/// Application state: camera, overlay, and input tracking.
struct AppState {
    camera: Camera,
    stats: Statistics,
    keys_held: HashSet<KeyCode>,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width as f32 / height.max(1) as f32),
            stats: Statistics::new(width, height),
            keys_held: HashSet::new(),
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f32) {
        let speed_mult = if self.keys_held.contains(&KeyCode::ShiftLeft) {
            3.0
        } else {
            1.0
        };
        let dt_scaled = dt * speed_mult;

        if self.keys_held.contains(&KeyCode::KeyW) {
            self.camera.move_forward(dt_scaled);
        }
        if self.keys_held.contains(&KeyCode::KeyS) {
            self.camera.move_backward(dt_scaled);
        }
        if self.keys_held.contains(&KeyCode::KeyA) {
            self.camera.move_left(dt_scaled);
        }
        if self.keys_held.contains(&KeyCode::KeyD) {
            self.camera.move_right(dt_scaled);
        }
        if self.keys_held.contains(&KeyCode::Space) {
            self.camera.move_up(dt_scaled);
        }
        if self.keys_held.contains(&KeyCode::ControlLeft)
            || self.keys_held.contains(&KeyCode::KeyC)
        {
            self.camera.move_down(dt_scaled);
        }

        let p = self.camera.position;
        self.stats
            .set("camera", format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
        self.stats.update(Duration::from_secs_f32(dt));
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    renderer: Option<WgpuRenderer>,
    initial_size: PhysicalSize<u32>,
}

impl GpuApp {
    fn new(width: u32, height: u32) -> Self {
        Self {
            state: AppState::new(width, height),
            window: None,
            gpu: None,
            renderer: None,
            initial_size: PhysicalSize::new(width, height),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Phantom")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let gpu = match Gpu::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.state.camera.set_aspect(size.width as f32 / size.height.max(1) as f32);
        self.state.stats.resize(size.width.max(1), size.height.max(1));

        let renderer = WgpuRenderer::new(&gpu.device, gpu.config.format, size.width, size.height);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state.camera.set_aspect(
                        gpu.config.width as f32 / gpu.config.height.max(1) as f32,
                    );
                    self.state
                        .stats
                        .resize(gpu.config.width, gpu.config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(
                            &gpu.device,
                            &gpu.queue,
                            gpu.config.width,
                            gpu.config.height,
                        );
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(window) = &self.window {
                    window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt);

                let (Some(gpu), Some(renderer)) = (&self.gpu, &self.renderer) else {
                    return;
                };

                if self.state.stats.take_dirty() {
                    renderer.upload_overlay(&gpu.queue, self.state.stats.buffer());
                }

                let output = match gpu.surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.surface.configure(&gpu.device, &gpu.config);
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                renderer.render(&gpu.device, &gpu.queue, &view, &self.state.camera);
                self.state.stats.count_frame();

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("phantom-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(cli.width.max(1), cli.height.max(1));
    event_loop.run_app(&mut app)?;

    Ok(())
}
