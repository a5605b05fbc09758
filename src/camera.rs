//! Orbital camera driven by pointer-drag deltas in spherical coordinates.

use glam::{Mat4, Vec3};
use std::f32::consts::PI;

use crate::params::RenderConfig;

/// Degrees of orbit rotation per pixel of left-button drag
const ORBIT_DEGREES_PER_PIXEL: f32 = 0.25;

/// World units of zoom per pixel of right-button drag
const ZOOM_UNITS_PER_PIXEL: f32 = 0.1;

const PHI_RANGE: (f32, f32) = (0.1, PI - 0.1);
const RADIUS_RANGE: (f32, f32) = (20.0, 500.0);

/// Camera state in spherical coordinates orbiting the origin.
///
/// `phi` is clamped away from the poles and `radius` to a fixed band, so any
/// sequence of drag deltas leaves the camera in a valid orientation.
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            theta: 1.3 * PI,
            phi: 0.4 * PI,
            radius: 80.0,
        }
    }
}

impl OrbitCamera {
    /// Apply a left-button drag: a quarter degree of orbit per pixel.
    pub fn orbit(&mut self, dx_px: f32, dy_px: f32) {
        self.theta += (ORBIT_DEGREES_PER_PIXEL * dx_px).to_radians();
        self.phi += (ORBIT_DEGREES_PER_PIXEL * dy_px).to_radians();
        self.phi = self.phi.clamp(PHI_RANGE.0, PHI_RANGE.1);
    }

    /// Apply a right-button drag: dolly in/out along the view ray.
    pub fn zoom(&mut self, dx_px: f32, dy_px: f32) {
        self.radius += ZOOM_UNITS_PER_PIXEL * (dx_px - dy_px);
        self.radius = self.radius.clamp(RADIUS_RANGE.0, RADIUS_RANGE.1);
    }

    /// Cartesian eye position derived from the spherical coordinates
    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.phi.sin() * self.theta.cos(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.sin(),
        )
    }

    /// Build the combined view-projection matrix looking at the origin.
    ///
    /// Returns the matrix together with the eye position used to build it.
    pub fn view_proj(&self, render_config: &RenderConfig) -> (Mat4, Vec3) {
        let eye = self.eye_position();
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );
        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_drag_conversion() {
        let mut camera = OrbitCamera::default();
        let theta0 = camera.theta;

        // 40 px at a quarter degree per pixel is 10 degrees.
        camera.orbit(40.0, 0.0);
        assert!((camera.theta - theta0 - 0.1745).abs() < 1e-3);
    }

    #[test]
    fn test_phi_stays_clamped() {
        let mut camera = OrbitCamera::default();
        for _ in 0..10_000 {
            camera.orbit(0.0, 17.0);
            assert!(camera.phi >= 0.1 && camera.phi <= PI - 0.1);
        }
        assert!((camera.phi - (PI - 0.1)).abs() < 1e-6);

        for _ in 0..10_000 {
            camera.orbit(0.0, -23.0);
        }
        assert!((camera.phi - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_radius_stays_clamped() {
        let mut camera = OrbitCamera::default();
        for _ in 0..1_000 {
            camera.zoom(100.0, 0.0);
            assert!(camera.radius >= 20.0 && camera.radius <= 500.0);
        }
        assert_eq!(camera.radius, 500.0);

        for _ in 0..1_000 {
            camera.zoom(0.0, 100.0);
        }
        assert_eq!(camera.radius, 20.0);
    }

    #[test]
    fn test_eye_position_formula() {
        let camera = OrbitCamera {
            theta: 0.7,
            phi: 1.1,
            radius: 42.0,
        };
        let eye = camera.eye_position();
        assert!((eye.x - 42.0 * 1.1f32.sin() * 0.7f32.cos()).abs() < 1e-5);
        assert!((eye.y - 42.0 * 1.1f32.cos()).abs() < 1e-5);
        assert!((eye.z - 42.0 * 1.1f32.sin() * 0.7f32.sin()).abs() < 1e-5);
        assert!((eye.length() - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_view_proj_is_valid() {
        let camera = OrbitCamera::default();
        let (view_proj, eye) = camera.view_proj(&RenderConfig::default());

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(eye.x.is_finite() && eye.y.is_finite() && eye.z.is_finite());

        // The origin must project inside the clip volume.
        let clip = view_proj * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    }
}
