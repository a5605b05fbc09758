//! Parameter definitions with physical units and documented semantics.

/// Corner-lattice dimensions of the density field.
///
/// The terrain grid has `width x depth` corners per layer and `height`
/// layers stacked vertically; the instanced terrain draw extrudes
/// `height - 1` voxel layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainDims {
    /// Corners along X
    pub width: usize,

    /// Corners along Z
    pub depth: usize,

    /// Corner layers along Y
    pub height: usize,
}

impl Default for TerrainDims {
    fn default() -> Self {
        Self {
            width: 33,
            depth: 33,
            height: 4,
        }
    }
}

impl TerrainDims {
    /// Total number of corner samples in the field
    pub fn sample_count(&self) -> usize {
        self.width * self.depth * self.height
    }

    /// Voxel cells along X
    pub fn voxel_width(&self) -> usize {
        self.width - 1
    }

    /// Voxel cells along Z
    pub fn voxel_depth(&self) -> usize {
        self.depth - 1
    }

    /// Vertical voxel layers (instance count for the terrain draw)
    pub fn layer_count(&self) -> usize {
        self.height - 1
    }
}

/// Coherent-noise variant used for the density field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    /// 3-octave fractal Brownian motion over simplex noise
    #[default]
    FractalSimplex,

    /// Single-octave Perlin noise
    Perlin,
}

/// Density field noise configuration
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Noise seed
    pub seed: u32,

    /// Spatial frequency (cycles per lattice unit)
    pub frequency: f64,

    /// Noise variant
    pub kind: NoiseKind,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 24,
            frequency: 0.2,
            kind: NoiseKind::FractalSimplex,
        }
    }
}

/// Wave simulation parameters (finite-difference height field)
#[derive(Debug, Clone)]
pub struct WaveConfig {
    /// Grid rows
    pub rows: usize,

    /// Grid columns
    pub cols: usize,

    /// Spatial step between grid points (world units)
    pub spatial_step: f32,

    /// Fixed simulation timestep (seconds)
    pub time_step: f32,

    /// Wave propagation speed (world units per second)
    pub speed: f32,

    /// Damping coefficient (per second)
    pub damping: f32,

    /// Simulated-time interval between random disturbances (seconds)
    pub disturb_interval_s: f32,

    /// Border margin excluded from random disturbance targets (cells)
    pub disturb_margin: usize,

    /// Random disturbance amplitude range (world units)
    pub disturb_amplitude: (f32, f32),
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rows: 160,
            cols: 160,
            spatial_step: 1.0,
            time_step: 0.03,
            speed: 5.0,
            damping: 0.3,
            disturb_interval_s: 0.1,
            disturb_margin: 5,
            disturb_amplitude: (0.5, 1.0),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Draw the land and box passes (off by default, kept wired)
    pub draw_scenery: bool,

    /// Draw the animated water pass (off by default, kept wired)
    pub draw_water: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 45.0,
            near_plane: 1.0,
            far_plane: 1000.0,
            draw_scenery: false,
            draw_water: false,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}
