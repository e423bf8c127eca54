use std::collections::VecDeque;

use winit::window::Window;

use crate::anim::PlayState;
use crate::render::GpuState;
use crate::robot::Joint;
use crate::scene::camera::ActiveCamera;
use crate::scene::Scene;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// How often to emit the FPS log line (seconds).
const LOG_INTERVAL: f64 = 5.0;

/// Diagnostic overlay powered by egui: frame timing, animator state, a live
/// pose readout, and runtime controls. Toggled with F12.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Rolling window of frame times (seconds).
    frame_times: VecDeque<f64>,

    /// Computed stats.
    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    // Periodic log accumulator.
    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            frame_times: VecDeque::with_capacity(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        if self.frame_times.len() == FRAME_HISTORY_LEN {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);

        let len = self.frame_times.len();
        if len > 0 {
            let mut sum = 0.0;
            let mut min = f64::MAX;
            let mut max = 0.0f64;
            for &t in &self.frame_times {
                sum += t;
                min = min.min(t);
                max = max.max(t);
            }
            self.frame_time_avg = sum / len as f64;
            self.frame_time_min = min;
            self.frame_time_max = max;
            self.fps = 1.0 / self.frame_time_avg;
        }

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_timer += dt;
        if self.log_timer >= LOG_INTERVAL {
            let avg_ms = (self.log_frame_sum / self.log_frame_count as f64) * 1000.0;
            let fps = self.log_frame_count as f64 / self.log_timer;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
        }
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// Run the egui frame and produce paint output. UI controls write
    /// straight into the scene.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        scene: &mut Scene,
        tick_count: u64,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let stats = FrameStatsSnapshot {
            visible: self.visible,
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_time_min: self.frame_time_min,
            frame_time_max: self.frame_time_max,
            frame_times: self.frame_times.iter().copied().collect(),
            tick_count,
        };

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &stats, scene);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI drawing
// ---------------------------------------------------------------------------

struct FrameStatsSnapshot {
    visible: bool,
    fps: f64,
    frame_time_avg: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frame_times: Vec<f64>,
    tick_count: u64,
}

fn play_state_label(state: PlayState) -> &'static str {
    match state {
        PlayState::Unstarted => "unstarted",
        PlayState::Running => "running",
        PlayState::Finished => "finished",
    }
}

fn draw_ui(ctx: &egui::Context, stats: &FrameStatsSnapshot, scene: &mut Scene) {
    if !stats.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(300.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                stats.frame_time_avg * 1000.0,
                stats.frame_time_min * 1000.0,
                stats.frame_time_max * 1000.0,
            ));
            ui.label(format!("Ticks: {}", stats.tick_count));
            ui.add_space(4.0);

            // --- Frame time histogram ---
            if !stats.frame_times.is_empty() {
                let max_time = stats
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(0.020);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(280.0, 48.0), egui::Sense::hover());
                let rect = response.rect;
                let bar_width = rect.width() / stats.frame_times.len() as f32;

                for (i, &t) in stats.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    let color = if t > 0.01667 {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width - 1.0, rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }
            }
            ui.add_space(4.0);

            // --- Animator ---
            ui.heading("Animator");
            ui.label(format!(
                "State: {} | Frames: {}",
                play_state_label(scene.animator.state()),
                scene.animator.frame_count(),
            ));
            if let Some(current) = scene.animator.current_frame() {
                ui.label(format!(
                    "Frame {}/{} | {} ticks left",
                    current + 1,
                    scene.animator.frame_count(),
                    scene.animator.ticks_left(),
                ));
            }

            let mut looping = scene.animator.is_looping();
            if ui.checkbox(&mut looping, "Loop").changed() {
                scene.animator.set_looping(looping);
            }
            ui.checkbox(&mut scene.animate, "Animate");

            ui.horizontal(|ui| {
                let Scene { animator, robot, .. } = scene;
                if ui.button("Reset").clicked() {
                    animator.reset(robot);
                }
                if ui.button("Cancel").clicked() {
                    animator.cancel();
                }
                if ui.button("Walk").clicked() {
                    // Rebuild the walk from wherever the robot stands now.
                    animator.cancel();
                    for _ in 0..4 {
                        animator.extend(crate::robot::walk::cycle());
                    }
                    animator.mark_baseline(robot);
                }
            });
            ui.add_space(4.0);

            // --- Pose ---
            ui.heading("Pose");
            let pose = scene.robot.pose();
            for joint in Joint::ALL {
                ui.label(
                    egui::RichText::new(format!(
                        "{:<11} {:>8.2}°",
                        joint.label(),
                        pose.joints[joint as usize],
                    ))
                    .monospace(),
                );
            }
            ui.label(
                egui::RichText::new(format!(
                    "pos ({:.2}, {:.2}, {:.2})",
                    pose.position.x, pose.position.y, pose.position.z,
                ))
                .monospace(),
            );
            ui.label(
                egui::RichText::new(format!(
                    "rot ({:.1}, {:.1}, {:.1})",
                    pose.rotation.x, pose.rotation.y, pose.rotation.z,
                ))
                .monospace(),
            );
            ui.add_space(4.0);

            // --- View ---
            ui.heading("View");
            ui.checkbox(&mut scene.wireframe, "Wireframe");
            ui.checkbox(&mut scene.show_axes, "Axes");
            ui.horizontal(|ui| {
                ui.label("Control:");
                ui.selectable_value(&mut scene.active_camera, ActiveCamera::Outer, "Outer");
                ui.selectable_value(&mut scene.active_camera, ActiveCamera::Inner, "Inner");
            });
            ui.add_space(4.0);

            ui.label("1: Wireframe | 2: Axes | a: Animate");
            ui.label("i/o: Camera | F12: Overlay | ESC: Quit");
        });
}
