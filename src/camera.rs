//! Path-following camera.
//!
//! The camera has exactly one persistent degree of freedom: how far along
//! the path it is (`path_position` in `[0, 1]`). Scrolling moves it forward
//! or back. Dragging with the left mouse button nudges the camera and its
//! look target sideways/up without changing progress; that nudge is
//! discarded when the next gesture starts or the camera scrolls, so the pose
//! is always `f(path_position) + one drag offset`.

use cgmath::{InnerSpace, Point3, Vector3, Zero};

use crate::{context::TourConfig, path::PathModel};

/// Where the camera is and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraPose {
    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }

    pub fn forward(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.magnitude2() > f32::EPSILON {
            dir.normalize()
        } else {
            Vector3::unit_x()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub active: bool,
    pub last: (f64, f64),
    /// Offset accumulated during the current (or last) gesture.
    pub offset: Vector3<f32>,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            active: false,
            last: (0.0, 0.0),
            offset: Vector3::zero(),
        }
    }
}

/// Scalar progress along the path plus the transient drag gesture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationState {
    pub path_position: f32,
    pub drag: DragState,
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    nav: NavigationState,
    scroll_sensitivity: f32,
    rotation_sensitivity: f32,
    height: f32,
    look_ahead: f32,
    pose: CameraPose,
}

impl CameraRig {
    pub fn new(config: &TourConfig, path: &PathModel) -> Self {
        let mut rig = Self {
            nav: NavigationState::default(),
            scroll_sensitivity: config.scroll_sensitivity,
            rotation_sensitivity: config.rotation_sensitivity,
            height: config.camera_height,
            look_ahead: config.camera_look_ahead,
            pose: CameraPose {
                position: Point3::new(0.0, 0.0, 0.0),
                target: Point3::new(1.0, 0.0, 0.0),
            },
        };
        rig.recompute(path);
        rig
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn path_position(&self) -> f32 {
        self.nav.path_position
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Moves one step along the path in the direction of `delta_y`.
    pub fn on_scroll(&mut self, delta_y: f64, path: &PathModel) {
        let step = if delta_y > 0.0 {
            self.scroll_sensitivity
        } else if delta_y < 0.0 {
            -self.scroll_sensitivity
        } else {
            return;
        };
        self.set_path_position(self.nav.path_position + step, path);
    }

    /// Jumps to `position` (clamped) and drops any drag offset.
    pub fn set_path_position(&mut self, position: f32, path: &PathModel) {
        self.nav.path_position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        self.nav.drag.offset = Vector3::zero();
        self.recompute(path);
    }

    pub fn on_drag_start(&mut self, x: f64, y: f64, path: &PathModel) {
        self.nav.drag = DragState {
            active: true,
            last: (x, y),
            offset: Vector3::zero(),
        };
        self.recompute(path);
    }

    pub fn on_drag_move(&mut self, x: f64, y: f64, path: &PathModel) {
        if !self.nav.drag.active {
            return;
        }
        let (last_x, last_y) = self.nav.drag.last;
        let dx = (x - last_x) as f32 * self.rotation_sensitivity;
        let dy = (y - last_y) as f32 * self.rotation_sensitivity;
        self.nav.drag.last = (x, y);

        let look_ahead_t =
            path.t_at_index(path.look_ahead_index(self.nav.path_position, self.look_ahead));
        let frame = path.frame_at(look_ahead_t);
        // screen y grows downwards
        self.nav.drag.offset += frame.right * dx - frame.up * dy;
        self.recompute(path);
    }

    pub fn on_drag_end(&mut self) {
        self.nav.drag.active = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.nav.drag.active
    }

    fn recompute(&mut self, path: &PathModel) {
        let lift = Vector3::new(0.0, self.height, 0.0) + self.nav.drag.offset;
        let index = path.index_for(self.nav.path_position);
        let ahead = path.look_ahead_index(self.nav.path_position, self.look_ahead);
        let position = path.point_at_index(index) + lift;
        let target = if ahead > index {
            path.point_at_index(ahead) + lift
        } else {
            // end of the path: keep looking along the last direction of travel
            position + path.tangent_at(1.0)
        };
        self.pose = CameraPose { position, target };
    }
}
