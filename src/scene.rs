//! Per-frame simulation update: disturbance scheduling, wave vertex
//! re-derivation, and water texture animation.

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use crate::mesh::MeshVertex;
use crate::params::WaveConfig;
use crate::waves::Waves;

/// Water texture tiling factor
const WATER_TEX_SCALE: f32 = 5.0;

/// Texture scroll rates (uv units per second)
const WATER_SCROLL_U: f32 = 0.1;
const WATER_SCROLL_V: f32 = 0.05;

/// Fires once per fixed interval of simulated time, independent of how the
/// elapsed time is partitioned into frames.
pub struct IntervalTimer {
    interval: f64,
    elapsed: f64,
    fired: u64,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval as f64,
            elapsed: 0.0,
            fired: 0,
        }
    }

    /// Advance by `dt` seconds; returns how many intervals elapsed.
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.elapsed += dt as f64;
        // Count intervals against total elapsed time rather than a running
        // remainder, so repeated small ticks cannot drift past a boundary.
        let due = (self.elapsed / self.interval + 1e-6) as u64;
        let fires = due - self.fired;
        self.fired = due;
        fires as u32
    }
}

/// Derive texture coordinates from a wave vertex position.
///
/// The mapping is a fixed linear remap of the XZ footprint into `[0, 1]^2`,
/// so re-deriving from an unchanged position always yields the same UV.
pub fn wave_uv(position: Vec3, width: f32, depth: f32) -> [f32; 2] {
    [0.5 + position.x / width, 0.5 - position.z / depth]
}

/// CPU-side per-frame state feeding the dynamic wave buffer and the water
/// texture transform.
pub struct SceneState {
    config: WaveConfig,
    disturb_timer: IntervalTimer,
    water_tex_offset: Vec2,
    wave_vertices: Vec<MeshVertex>,
}

impl SceneState {
    pub fn new(config: WaveConfig) -> Self {
        let vertex_count = config.rows * config.cols;
        Self {
            disturb_timer: IntervalTimer::new(config.disturb_interval_s),
            water_tex_offset: Vec2::ZERO,
            wave_vertices: vec![
                MeshVertex {
                    position: [0.0; 3],
                    uv: [0.0; 2],
                };
                vertex_count
            ],
            config,
        }
    }

    /// Advance one frame of simulation:
    /// inject any due random disturbances, step the wave solver, rebuild the
    /// full wave vertex array, and scroll the water texture offset.
    pub fn update(&mut self, dt: f32, waves: &mut Waves, rng: &mut impl Rng) {
        let margin = self.config.disturb_margin;
        let (amp_lo, amp_hi) = self.config.disturb_amplitude;
        for _ in 0..self.disturb_timer.tick(dt) {
            let i = rng.gen_range(margin..waves.row_count() - margin);
            let j = rng.gen_range(margin..waves.col_count() - margin);
            let r = rng.gen_range(amp_lo..=amp_hi);
            waves.disturb(i, j, r);
        }

        waves.update(dt);

        let width = waves.width();
        let depth = waves.depth();
        for (i, vertex) in self.wave_vertices.iter_mut().enumerate() {
            let p = waves.position(i);
            vertex.position = p.to_array();
            vertex.uv = wave_uv(p, width, depth);
        }

        self.water_tex_offset.x += WATER_SCROLL_U * dt;
        self.water_tex_offset.y += WATER_SCROLL_V * dt;
    }

    /// Full wave vertex array for the dynamic buffer overwrite
    pub fn wave_vertices(&self) -> &[MeshVertex] {
        &self.wave_vertices
    }

    /// Tile-and-scroll transform for the water texture
    pub fn water_tex_transform(&self) -> Mat4 {
        Mat4::from_translation(self.water_tex_offset.extend(0.0))
            * Mat4::from_scale(Vec3::new(WATER_TEX_SCALE, WATER_TEX_SCALE, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_interval_timer_fires_per_simulated_second() {
        // 10 fires over 1.0 s regardless of how dt is partitioned.
        for dts in [vec![1.0], vec![0.5, 0.5], vec![0.1; 10], vec![0.03; 33]] {
            let total: f32 = dts.iter().sum();
            let mut timer = IntervalTimer::new(0.1);
            let fires: u32 = dts.iter().map(|&dt| timer.tick(dt)).sum();
            assert_eq!(fires, (total / 0.1) as u32, "partition {:?}", dts);
        }
    }

    #[test]
    fn test_interval_timer_carries_remainder() {
        let mut timer = IntervalTimer::new(0.1);
        assert_eq!(timer.tick(0.09), 0);
        assert_eq!(timer.tick(0.02), 1);
    }

    #[test]
    fn test_wave_uv_rederivation_is_idempotent() {
        let p = Vec3::new(12.5, 3.0, -40.0);
        let first = wave_uv(p, 160.0, 160.0);
        let second = wave_uv(p, 160.0, 160.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_wave_uv_maps_footprint_to_unit_square() {
        let w = 160.0;
        let d = 160.0;
        assert_eq!(wave_uv(Vec3::new(-w / 2.0, 0.0, d / 2.0), w, d), [0.0, 0.0]);
        assert_eq!(wave_uv(Vec3::new(w / 2.0, 0.0, -d / 2.0), w, d), [1.0, 1.0]);
        assert_eq!(wave_uv(Vec3::ZERO, w, d), [0.5, 0.5]);
    }

    #[test]
    fn test_update_rebuilds_full_vertex_array() {
        let config = WaveConfig {
            rows: 32,
            cols: 32,
            ..WaveConfig::default()
        };
        let mut waves = Waves::from_config(&config);
        let mut scene = SceneState::new(config);
        let mut rng = StdRng::seed_from_u64(7);

        scene.update(0.5, &mut waves, &mut rng);
        assert_eq!(scene.wave_vertices().len(), 32 * 32);

        // Disturbances fired, so some vertex heights are non-zero and UVs
        // stay consistent with positions.
        let any_height = scene
            .wave_vertices()
            .iter()
            .any(|v| v.position[1].abs() > 1e-6);
        assert!(any_height);
        for v in scene.wave_vertices() {
            let p = Vec3::from_array(v.position);
            assert_eq!(v.uv, wave_uv(p, waves.width(), waves.depth()));
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_disturb_amplitude_range_is_inclusive() {
        // A degenerate amplitude range must still draw (its single value),
        // and every disturbance center is then exactly that amplitude.
        let config = WaveConfig {
            rows: 32,
            cols: 32,
            disturb_amplitude: (0.75, 0.75),
            time_step: 10.0, // no solver steps, only disturbances
            ..WaveConfig::default()
        };
        let mut waves = Waves::from_config(&config);
        let mut scene = SceneState::new(config);
        let mut rng = StdRng::seed_from_u64(3);

        scene.update(0.1, &mut waves, &mut rng);
        let peak = (0..waves.vertex_count())
            .map(|i| waves.position(i).y)
            .fold(0.0f32, f32::max);
        assert_eq!(peak, 0.75);
    }

    #[test]
    fn test_water_texture_scroll_rates() {
        let config = WaveConfig {
            rows: 16,
            cols: 16,
            ..WaveConfig::default()
        };
        let mut waves = Waves::from_config(&config);
        let mut scene = SceneState::new(config);
        let mut rng = StdRng::seed_from_u64(1);

        scene.update(1.0, &mut waves, &mut rng);
        assert!((scene.water_tex_offset.x - 0.1).abs() < 1e-6);
        assert!((scene.water_tex_offset.y - 0.05).abs() < 1e-6);

        // Offset rides in the translation column; scale stays 5x.
        let m = scene.water_tex_transform();
        let uv = m * glam::Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((uv.x - (5.0 + 0.1)).abs() < 1e-5);
        assert!((uv.y - (5.0 + 0.05)).abs() < 1e-5);
    }
}
