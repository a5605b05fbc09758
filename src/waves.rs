//! Finite-difference wave simulation over a fixed grid of vertex positions.

use glam::Vec3;

use crate::params::WaveConfig;

/// Height-field wave simulator.
///
/// Two position grids (previous and current solution) are advanced with a
/// precomputed three-coefficient stencil at a fixed timestep; render code
/// reads `position(i)` each frame and re-derives UVs from XZ. Only interior
/// cells are updated, so the boundary stays pinned at rest height.
pub struct Waves {
    rows: usize,
    cols: usize,
    spatial_step: f32,
    time_step: f32,
    k1: f32,
    k2: f32,
    k3: f32,
    accum: f32,
    prev: Vec<Vec3>,
    curr: Vec<Vec3>,
}

impl Waves {
    pub fn new(rows: usize, cols: usize, dx: f32, dt: f32, speed: f32, damping: f32) -> Self {
        let d = damping * dt + 2.0;
        let e = (speed * dt / dx) * (speed * dt / dx);
        let k1 = (damping * dt - 2.0) / d;
        let k2 = (4.0 - 8.0 * e) / d;
        let k3 = 2.0 * e / d;

        let half_w = (cols - 1) as f32 * dx * 0.5;
        let half_d = (rows - 1) as f32 * dx * 0.5;

        let mut curr = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            let z = half_d - i as f32 * dx;
            for j in 0..cols {
                let x = -half_w + j as f32 * dx;
                curr.push(Vec3::new(x, 0.0, z));
            }
        }

        Self {
            rows,
            cols,
            spatial_step: dx,
            time_step: dt,
            k1,
            k2,
            k3,
            accum: 0.0,
            prev: curr.clone(),
            curr,
        }
    }

    pub fn from_config(config: &WaveConfig) -> Self {
        Self::new(
            config.rows,
            config.cols,
            config.spatial_step,
            config.time_step,
            config.speed,
            config.damping,
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn vertex_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn triangle_count(&self) -> usize {
        (self.rows - 1) * (self.cols - 1) * 2
    }

    /// Footprint extent along X (world units)
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.spatial_step
    }

    /// Footprint extent along Z (world units)
    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.spatial_step
    }

    /// Position of vertex `i` in row-major order
    pub fn position(&self, i: usize) -> Vec3 {
        self.curr[i]
    }

    /// Advance the simulation, stepping as many fixed timesteps as `dt`
    /// covers. Leftover time carries into the next call.
    pub fn update(&mut self, dt: f32) {
        self.accum += dt;
        while self.accum >= self.time_step {
            self.step();
            self.accum -= self.time_step;
        }
    }

    /// Inject a disturbance at interior cell `(i, j)`: full magnitude at the
    /// cell, half magnitude at its four neighbours.
    pub fn disturb(&mut self, i: usize, j: usize, magnitude: f32) {
        debug_assert!(i >= 1 && i < self.rows - 1);
        debug_assert!(j >= 1 && j < self.cols - 1);

        let half = 0.5 * magnitude;
        let c = self.cols;
        self.curr[i * c + j].y += magnitude;
        self.curr[i * c + j - 1].y += half;
        self.curr[i * c + j + 1].y += half;
        self.curr[(i - 1) * c + j].y += half;
        self.curr[(i + 1) * c + j].y += half;
    }

    fn step(&mut self) {
        let c = self.cols;
        for i in 1..self.rows - 1 {
            for j in 1..c - 1 {
                // The previous solution grid is overwritten in place and
                // becomes the next solution after the swap below.
                self.prev[i * c + j].y = self.k1 * self.prev[i * c + j].y
                    + self.k2 * self.curr[i * c + j].y
                    + self.k3
                        * (self.curr[(i + 1) * c + j].y
                            + self.curr[(i - 1) * c + j].y
                            + self.curr[i * c + j + 1].y
                            + self.curr[i * c + j - 1].y);
            }
        }
        std::mem::swap(&mut self.prev, &mut self.curr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Waves {
        Waves::new(16, 16, 1.0, 0.03, 5.0, 0.3)
    }

    #[test]
    fn test_counts_and_extent() {
        let waves = Waves::from_config(&WaveConfig::default());
        assert_eq!(waves.row_count(), 160);
        assert_eq!(waves.col_count(), 160);
        assert_eq!(waves.vertex_count(), 160 * 160);
        assert_eq!(waves.triangle_count(), 159 * 159 * 2);
        assert_eq!(waves.width(), 160.0);
        assert_eq!(waves.depth(), 160.0);
    }

    #[test]
    fn test_rest_state_stays_flat() {
        let mut waves = small();
        waves.update(1.0);
        for i in 0..waves.vertex_count() {
            assert_eq!(waves.position(i).y, 0.0);
        }
    }

    #[test]
    fn test_disturbance_propagates() {
        let mut waves = small();
        waves.disturb(8, 8, 1.0);
        assert_eq!(waves.position(8 * 16 + 8).y, 1.0);
        assert_eq!(waves.position(8 * 16 + 7).y, 0.5);

        waves.update(0.5);
        // Energy must have spread beyond the immediate neighbourhood while
        // staying finite.
        let moved = (0..waves.vertex_count())
            .filter(|&i| waves.position(i).y.abs() > 1e-6)
            .count();
        assert!(moved > 9);
        for i in 0..waves.vertex_count() {
            assert!(waves.position(i).y.is_finite());
        }
    }

    #[test]
    fn test_boundary_stays_pinned() {
        let mut waves = small();
        waves.disturb(8, 8, 2.0);
        waves.update(2.0);
        for j in 0..16 {
            assert_eq!(waves.position(j).y, 0.0);
            assert_eq!(waves.position(15 * 16 + j).y, 0.0);
        }
    }

    #[test]
    fn test_update_accumulates_partial_steps() {
        let mut a = small();
        let mut b = small();
        a.disturb(8, 8, 1.0);
        b.disturb(8, 8, 1.0);

        a.update(0.3);
        for _ in 0..10 {
            b.update(0.03);
        }
        for i in 0..a.vertex_count() {
            assert!((a.position(i).y - b.position(i).y).abs() < 1e-5);
        }
    }
}
