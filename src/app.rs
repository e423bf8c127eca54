use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::debug::DebugOverlay;
use crate::render::instance::FrameInstances;
use crate::render::pipeline::CameraSlot;
use crate::render::GpuState;
use crate::robot::Pose;
use crate::scene::camera::{self, ActiveCamera};
use crate::scene::Scene;

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Initial window size.
const WINDOW_WIDTH: u32 = 960;
const WINDOW_HEIGHT: u32 = 640;

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<DebugOverlay>,

    scene: Scene,

    // Staged draw data, reused each frame.
    frame: FrameInstances,

    // Previous and current tick poses — lerped for smooth rendering.
    prev_pose: Pose,
    curr_pose: Pose,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,

    // Mouse drag state
    cursor_pos: Option<(f32, f32)>,
    left_down: bool,
    right_down: bool,
}

impl App {
    fn new() -> Self {
        let mut rng = fastrand::Rng::new();
        let scene = Scene::new(&mut rng);
        let pose = scene.robot.pose();
        Self {
            window: None,
            gpu: None,
            overlay: None,
            scene,
            frame: FrameInstances::default(),
            prev_pose: pose,
            curr_pose: pose,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            cursor_pos: None,
            left_down: false,
            right_down: false,
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE {
            self.prev_pose = self.curr_pose;
            self.scene.tick();
            self.curr_pose = self.scene.robot.pose();

            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
        }
    }

    /// Interpolation alpha for rendering between ticks.
    fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / TICK_RATE) as f32
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Escape => {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
            }
            KeyCode::Digit1 => self.scene.wireframe = !self.scene.wireframe,
            KeyCode::Digit2 => self.scene.show_axes = !self.scene.show_axes,
            KeyCode::KeyA => self.scene.animate = !self.scene.animate,
            KeyCode::KeyI => self.scene.active_camera = ActiveCamera::Inner,
            KeyCode::KeyO => self.scene.active_camera = ActiveCamera::Outer,
            KeyCode::ArrowUp => self.scene.inner_camera.advance(1.0),
            KeyCode::ArrowDown => self.scene.inner_camera.advance(-1.0),
            KeyCode::ArrowLeft => self.scene.inner_camera.strafe(-1.0),
            KeyCode::ArrowRight => self.scene.inner_camera.strafe(1.0),
            KeyCode::F12 => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.visible = !overlay.visible;
                }
            }
            _ => {}
        }
    }

    /// Route a mouse drag to whichever camera has control.
    fn handle_cursor_moved(&mut self, x: f32, y: f32) {
        if let Some((last_x, last_y)) = self.cursor_pos {
            let dx = x - last_x;
            let dy = y - last_y;

            if self.left_down {
                match self.scene.active_camera {
                    ActiveCamera::Outer => self.scene.outer_camera.drag(dx, dy),
                    ActiveCamera::Inner => self.scene.inner_camera.drag(dx, dy),
                }
            } else if self.right_down && self.scene.active_camera == ActiveCamera::Outer {
                self.scene.outer_camera.zoom(dx + dy);
            }
        }
        self.cursor_pos = Some((x, y));
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let dt = now.duration_since(last).as_secs_f64();
            if let Some(overlay) = &mut self.overlay {
                overlay.record_frame(dt);
            }
            self.run_fixed_update(dt);
        }
        self.last_frame_time = Some(now);

        // Stage the scene at the interpolated pose.
        let pose = self.prev_pose.lerp(&self.curr_pose, self.interpolation_alpha());
        self.frame.stage(&self.scene, &pose);

        let (Some(window), Some(gpu), Some(overlay)) =
            (&self.window, &mut self.gpu, &mut self.overlay)
        else {
            return;
        };

        gpu.update_instances(&self.frame);

        let projection = camera::perspective(gpu.aspect_ratio());
        gpu.update_camera(CameraSlot::Outer, projection * self.scene.outer_camera.view());
        gpu.update_camera(CameraSlot::Inner, projection * self.scene.inner_camera.view());

        let Some(mut frame_ctx) = gpu.begin_frame() else {
            return;
        };

        gpu.draw_main_view(&mut frame_ctx.encoder, &frame_ctx.view, self.scene.wireframe);
        gpu.draw_inset_view(
            &mut frame_ctx.encoder,
            &frame_ctx.view,
            self.scene.wireframe,
            self.frame.shared_line_count,
        );

        // Overlay on top of both viewports.
        let (primitives, textures_delta, screen_descriptor) = overlay.run_frame(
            window,
            gpu.surface_config.width,
            gpu.surface_config.height,
            &mut self.scene,
            self.tick_count,
        );
        let egui_cmd_bufs = overlay.prepare_egui(
            &gpu.device,
            &gpu.queue,
            &mut frame_ctx.encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );
        {
            let mut egui_pass = GpuState::begin_egui_pass(&mut frame_ctx.encoder, &frame_ctx.view);
            overlay.render_egui(&mut egui_pass, &primitives, &screen_descriptor);
        }

        gpu.finish_frame(frame_ctx.encoder, frame_ctx.output, egui_cmd_bufs);
        overlay.free_textures(&textures_delta);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("walkbot")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone());
        let overlay = DebugOverlay::new(&window, &gpu);
        log::info!("wgpu + scene pipelines initialized");

        log::info!(
            "Walk queued: {} keyframes, looping",
            self.scene.animator.frame_count()
        );

        // Continuous render loop.
        event_loop.set_control_flow(ControlFlow::Poll);

        self.gpu = Some(gpu);
        self.overlay = Some(overlay);
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let the overlay see events first; skip camera/key handling for
        // anything egui claimed (typing or dragging inside the panel).
        let consumed = match (&self.window, &mut self.overlay) {
            (Some(window), Some(overlay)) => overlay.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(code, event_loop);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } if !consumed => {
                let down = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_down = down,
                    MouseButton::Right => self.right_down = down,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } if !consumed => {
                self.handle_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

/// Entry point — create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
