//! Terramarch - procedural voxel terrain demo
//!
//! A density field sampled from fractal simplex noise drives an instanced
//! terrain draw, a finite-difference wave field feeds a dynamic vertex
//! buffer, and an orbital camera plus debug overlay sit on top.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use terramarch::camera::OrbitCamera;
use terramarch::cli::Args;
use terramarch::density::DensityGrid;
use terramarch::input::{ControlAction, ControlState, InputEvent, InputQueue, PointerButton};
use terramarch::mesh;
use terramarch::overlay::{DebugOverlay, OverlayStats};
use terramarch::params::{RenderConfig, TerrainDims, WaveConfig};
use terramarch::rendering::{ObjectUniforms, RenderSystem};
use terramarch::scene::SceneState;
use terramarch::waves::Waves;

/// World-space footprint of the terrain and land grids
const TERRAIN_EXTENT: f32 = 160.0;

/// Land grid subdivision (cells per side)
const LAND_CELLS: usize = 50;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    overlay: Option<DebugOverlay>,

    // Simulation state
    density: DensityGrid,
    waves: Waves,
    scene: SceneState,
    camera: OrbitCamera,
    controls: ControlState,
    input: InputQueue,
    rng: StdRng,

    // Configuration
    render_config: RenderConfig,
    dims: TerrainDims,

    // Time tracking
    last_frame: Instant,
    frame_ms: f32,
}

impl App {
    fn new(args: &Args) -> Self {
        let dims = TerrainDims::default();
        let noise_config = args.noise_config();
        let wave_config = WaveConfig::default();
        let render_config = args.render_config();

        let density = DensityGrid::generate(dims, &noise_config);
        let waves = Waves::from_config(&wave_config);
        let scene = SceneState::new(wave_config);

        Self {
            window: None,
            render_system: None,
            overlay: None,
            density,
            waves,
            scene,
            camera: OrbitCamera::default(),
            controls: ControlState::default(),
            input: InputQueue::default(),
            rng: StdRng::from_entropy(),
            render_config,
            dims,
            last_frame: Instant::now(),
            frame_ms: 0.0,
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Terramarch - Procedural Voxel Terrain")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("fatal: failed to create window: {}", e);
                std::process::exit(1);
            }
        };

        let terrain_mesh = mesh::grid(
            TERRAIN_EXTENT,
            TERRAIN_EXTENT,
            self.dims.voxel_width(),
            self.dims.voxel_depth(),
        );
        let land_mesh = mesh::grid(TERRAIN_EXTENT, TERRAIN_EXTENT, LAND_CELLS, LAND_CELLS);
        let box_mesh = mesh::cuboid(1.0, 1.0, 1.0);
        let wave_indices = mesh::grid_indices(self.waves.row_count(), self.waves.col_count());

        // Resource creation is all-or-nothing: any failure aborts the demo.
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &terrain_mesh,
            &land_mesh,
            &box_mesh,
            self.waves.vertex_count(),
            &wave_indices,
            &self.density,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("fatal: {}", e);
                std::process::exit(1);
            }
        };

        let overlay = DebugOverlay::new(
            &window,
            &render_system.device,
            render_system.surface_format(),
        );

        log::info!("terramarch is running, press ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.overlay = Some(overlay);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                self.render_config.window_width = size.width;
                self.render_config.window_height = size.height;
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
                return;
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
                return;
            }
            _ => {}
        }

        // Overlay gets first refusal so panel interaction never leaks into
        // the camera drag.
        if let (Some(overlay), Some(window)) = (&mut self.overlay, &self.window) {
            if overlay.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Digit1 => self.input.push(InputEvent::Action(ControlAction::LightingMode)),
                KeyCode::Digit2 => self.input.push(InputEvent::Action(ControlAction::TexturedMode)),
                KeyCode::Digit3 => self
                    .input
                    .push(InputEvent::Action(ControlAction::TexturedFogMode)),
                KeyCode::KeyR => self.input.push(InputEvent::Action(ControlAction::CoverageOn)),
                KeyCode::KeyT => self.input.push(InputEvent::Action(ControlAction::CoverageOff)),
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.input.push(InputEvent::PointerMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => Some(PointerButton::Left),
                    MouseButton::Right => Some(PointerButton::Right),
                    _ => None,
                };
                if let Some(button) = button {
                    self.input.push(InputEvent::Button {
                        button,
                        pressed: state == ElementState::Pressed,
                    });
                }
            }
            _ => {}
        }
    }
}

impl App {
    /// Advance the simulation and render a single frame
    fn render_frame(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let (Some(render_system), Some(overlay), Some(window)) = (
            self.render_system.as_mut(),
            self.overlay.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_ms = 0.9 * self.frame_ms + 0.1 * dt * 1000.0;

        // Drain one frame of input into control and camera state.
        self.controls.apply(self.input.take(), &mut self.camera);

        // Advance simulation and overwrite the dynamic wave buffer.
        self.scene.update(dt, &mut self.waves, &mut self.rng);
        render_system.update_wave_vertices(self.scene.wave_vertices());

        let (view_proj, eye) = self.camera.view_proj(&self.render_config);
        let mode = self.controls.render_mode;

        // Terrain sits at the world origin with an identity transform.
        render_system.update_terrain_uniforms(&ObjectUniforms::new(
            Mat4::IDENTITY,
            view_proj,
            Mat4::IDENTITY,
            eye,
            mode,
        ));

        if self.render_config.draw_scenery {
            let mut land = ObjectUniforms::new(
                Mat4::IDENTITY,
                view_proj,
                Mat4::from_scale(Vec3::new(5.0, 5.0, 1.0)),
                eye,
                mode,
            );
            land.tint = [0.3, 0.6, 0.25, 1.0];
            render_system.update_land_uniforms(&land);

            let box_world =
                Mat4::from_translation(Vec3::new(8.0, 5.0, -15.0)) * Mat4::from_scale(Vec3::splat(15.0));
            let mut box_u = ObjectUniforms::new(box_world, view_proj, Mat4::IDENTITY, eye, mode);
            box_u.tint = [0.6, 0.45, 0.3, 1.0];
            render_system.update_box_uniforms(&box_u);
        }

        if self.render_config.draw_water {
            let mut water = ObjectUniforms::new(
                Mat4::IDENTITY,
                view_proj,
                self.scene.water_tex_transform(),
                eye,
                mode,
            );
            water.tint = [0.2, 0.4, 0.8, 0.5];
            render_system.update_water_uniforms(&water);
        }

        overlay.run(
            window,
            &OverlayStats {
                frame_ms: self.frame_ms,
                render_mode: mode,
                alpha_to_coverage: self.controls.alpha_to_coverage,
                camera_spherical: (self.camera.theta, self.camera.phi, self.camera.radius),
            },
            &self.density,
        );

        match render_system.render(&self.render_config, overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                render_system.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("fatal: surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    log::info!(
        "density field: seed {}, frequency {}, kind {}",
        args.seed,
        args.frequency,
        args.noise_kind
    );

    let mut app = App::new(&args);
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("fatal: failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {}", e);
        std::process::exit(1);
    }
}
