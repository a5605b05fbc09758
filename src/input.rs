//! Input event queue decoupling the windowing layer from per-frame state.
//!
//! The window loop pushes events as they arrive; the frame update drains the
//! queue exactly once, so simulation code never touches the polling
//! mechanism directly.

use crate::camera::OrbitCamera;

/// Shading technique selection for the basic (land/waves/box) passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    Lighting,
    Textures,
    #[default]
    TexturesAndFog,
}

impl RenderMode {
    /// Technique index pushed to the shader
    pub fn as_index(self) -> u32 {
        match self {
            RenderMode::Lighting => 0,
            RenderMode::Textures => 1,
            RenderMode::TexturesAndFog => 2,
        }
    }
}

/// Discrete control actions mapped from key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    LightingMode,
    TexturedMode,
    TexturedFogMode,
    CoverageOn,
    CoverageOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Action(ControlAction),
    PointerMoved { x: f32, y: f32 },
    Button { button: PointerButton, pressed: bool },
}

/// Event queue filled by the window loop, drained once per frame
#[derive(Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Per-frame control state plus pointer-drag tracking.
///
/// Mode and toggle events are last-writer-wins within a frame; pointer
/// motion while a button is held becomes orbit/zoom deltas on the camera.
pub struct ControlState {
    pub render_mode: RenderMode,
    pub alpha_to_coverage: bool,
    last_pointer: Option<(f32, f32)>,
    left_down: bool,
    right_down: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            alpha_to_coverage: true,
            last_pointer: None,
            left_down: false,
            right_down: false,
        }
    }
}

impl ControlState {
    /// Drain one frame's worth of events into control and camera state.
    pub fn apply(&mut self, events: impl IntoIterator<Item = InputEvent>, camera: &mut OrbitCamera) {
        for event in events {
            match event {
                InputEvent::Action(action) => match action {
                    ControlAction::LightingMode => self.render_mode = RenderMode::Lighting,
                    ControlAction::TexturedMode => self.render_mode = RenderMode::Textures,
                    ControlAction::TexturedFogMode => self.render_mode = RenderMode::TexturesAndFog,
                    ControlAction::CoverageOn => self.alpha_to_coverage = true,
                    ControlAction::CoverageOff => self.alpha_to_coverage = false,
                },
                InputEvent::Button { button, pressed } => {
                    if pressed {
                        // The pointer may have travelled while the queue saw
                        // nothing (overlay-consumed motion), so a press must
                        // re-anchor the drag baseline at the next position.
                        self.last_pointer = None;
                    }
                    match button {
                        PointerButton::Left => self.left_down = pressed,
                        PointerButton::Right => self.right_down = pressed,
                    }
                }
                InputEvent::PointerMoved { x, y } => {
                    if let Some((lx, ly)) = self.last_pointer {
                        let dx = x - lx;
                        let dy = y - ly;
                        if self.left_down {
                            camera.orbit(dx, dy);
                        } else if self.right_down {
                            camera.zoom(dx, dy);
                        }
                    }
                    self.last_pointer = Some((x, y));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_keys_last_writer_wins() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();

        state.apply(
            [
                InputEvent::Action(ControlAction::LightingMode),
                InputEvent::Action(ControlAction::TexturedMode),
                InputEvent::Action(ControlAction::TexturedFogMode),
                InputEvent::Action(ControlAction::TexturedMode),
            ],
            &mut camera,
        );
        assert_eq!(state.render_mode, RenderMode::Textures);
        assert_eq!(state.render_mode.as_index(), 1);
    }

    #[test]
    fn test_coverage_toggle() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();
        assert!(state.alpha_to_coverage);

        state.apply([InputEvent::Action(ControlAction::CoverageOff)], &mut camera);
        assert!(!state.alpha_to_coverage);
        state.apply([InputEvent::Action(ControlAction::CoverageOn)], &mut camera);
        assert!(state.alpha_to_coverage);
    }

    #[test]
    fn test_left_drag_orbits() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();
        let theta0 = camera.theta;

        state.apply(
            [
                InputEvent::Button {
                    button: PointerButton::Left,
                    pressed: true,
                },
                InputEvent::PointerMoved { x: 100.0, y: 100.0 },
                InputEvent::PointerMoved { x: 140.0, y: 100.0 },
            ],
            &mut camera,
        );
        assert!((camera.theta - theta0 - 0.1745).abs() < 1e-3);
    }

    #[test]
    fn test_press_reanchors_drag_baseline() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();
        let theta0 = camera.theta;

        // Pointer last seen at the origin; it then travels far while the
        // queue sees nothing (the overlay consumed the motion).
        state.apply([InputEvent::PointerMoved { x: 0.0, y: 0.0 }], &mut camera);
        state.apply(
            [
                InputEvent::Button {
                    button: PointerButton::Left,
                    pressed: true,
                },
                InputEvent::PointerMoved { x: 500.0, y: 300.0 },
            ],
            &mut camera,
        );
        // The first motion after the press only anchors the baseline.
        assert_eq!(camera.theta, theta0);

        // Subsequent motion measures from the new anchor, not from (0, 0).
        state.apply(
            [InputEvent::PointerMoved { x: 501.0, y: 300.0 }],
            &mut camera,
        );
        let one_px = (0.25f32).to_radians();
        assert!((camera.theta - theta0 - one_px).abs() < 1e-5);
    }

    #[test]
    fn test_motion_without_button_leaves_camera_alone() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();
        let (theta0, phi0, r0) = (camera.theta, camera.phi, camera.radius);

        state.apply(
            [
                InputEvent::PointerMoved { x: 0.0, y: 0.0 },
                InputEvent::PointerMoved { x: 300.0, y: 300.0 },
            ],
            &mut camera,
        );
        assert_eq!((camera.theta, camera.phi, camera.radius), (theta0, phi0, r0));
    }

    #[test]
    fn test_right_drag_zooms() {
        let mut state = ControlState::default();
        let mut camera = OrbitCamera::default();
        let r0 = camera.radius;

        state.apply(
            [
                InputEvent::Button {
                    button: PointerButton::Right,
                    pressed: true,
                },
                InputEvent::PointerMoved { x: 0.0, y: 0.0 },
                InputEvent::PointerMoved { x: 50.0, y: 0.0 },
            ],
            &mut camera,
        );
        assert!((camera.radius - (r0 + 5.0)).abs() < 1e-5);
    }

    #[test]
    fn test_queue_drains_once() {
        let mut queue = InputQueue::default();
        queue.push(InputEvent::Action(ControlAction::LightingMode));
        assert_eq!(queue.take().len(), 1);
        assert!(queue.take().is_empty());
    }
}
