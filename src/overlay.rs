//! Immediate-mode debug overlay drawn on top of the scene.
//!
//! Shows a read-only block of density field samples plus frame diagnostics.
//! The overlay consumes window events before the input queue sees them, so
//! interacting with the panel does not drag the camera.

use egui_wgpu::{Renderer, ScreenDescriptor};
use egui_winit::State;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::density::DensityGrid;
use crate::input::RenderMode;

/// Per-frame diagnostics shown in the panel
pub struct OverlayStats {
    pub frame_ms: f32,
    pub render_mode: RenderMode,
    pub alpha_to_coverage: bool,
    pub camera_spherical: (f32, f32, f32),
}

pub struct DebugOverlay {
    ctx: egui::Context,
    state: State,
    renderer: Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl DebugOverlay {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = Renderer::new(device, format, None, 1, false);

        Self {
            ctx,
            state,
            renderer,
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            pixels_per_point: window.scale_factor() as f32,
        }
    }

    /// Feed a window event to the GUI; returns true when the GUI consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run the GUI for this frame and tessellate its output for painting.
    pub fn run(&mut self, window: &Window, stats: &OverlayStats, density: &DensityGrid) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Diagnostics")
                .default_open(true)
                .show(ctx, |ui| {
                    ui.label(format!("frame: {:.2} ms", stats.frame_ms));
                    ui.label(format!("mode: {:?}", stats.render_mode));
                    ui.label(format!("alpha-to-coverage: {}", stats.alpha_to_coverage));
                    let (theta, phi, radius) = stats.camera_spherical;
                    ui.label(format!(
                        "camera: theta {:.2} phi {:.2} radius {:.0}",
                        theta, phi, radius
                    ));
                    ui.separator();
                    ui.label("density samples");
                    for z in 0..3 {
                        for y in 0..2 {
                            for x in 0..2 {
                                ui.monospace(format!(
                                    "d[{},{},{}] = {:.4}",
                                    x,
                                    y,
                                    z,
                                    density.get(x, y, z)
                                ));
                            }
                        }
                        ui.separator();
                    }
                });
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);
        self.pixels_per_point = full_output.pixels_per_point;
        self.paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.textures_delta.append(full_output.textures_delta);
    }

    /// Draw the tessellated GUI into its own pass on top of the frame.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let textures_delta = std::mem::take(&mut self.textures_delta);
        for (id, image_delta) in &textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &self.paint_jobs, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &self.paint_jobs, &screen);
        }

        for id in &textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
