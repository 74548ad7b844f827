//! Tour configuration and the small pieces of view state shared by every frame.
//!
//! [`TourConfig`] gathers every tunable of the tour. All fields are public;
//! adjust them before handing the config to [`crate::flow::Tour::new`] or
//! [`crate::flow::run`].

use instant::Duration;

use cgmath::Point3;
use winit::dpi::PhysicalPosition;

#[derive(Clone, Debug)]
pub struct TourConfig {
    /// Ordered, open (non-looping) control points of the camera path.
    pub control_points: Vec<Point3<f32>>,
    pub tension: f32,
    /// Size of the dense sample table.
    pub sample_count: usize,

    pub scroll_sensitivity: f32,
    pub rotation_sensitivity: f32,
    /// Height of the camera (and its look target) above the path.
    pub camera_height: f32,
    /// World distance between the camera and the point it looks at.
    pub camera_look_ahead: f32,

    /// World distance of the proximity probe ahead of the camera.
    pub swap_look_ahead: f32,
    pub swap_threshold: f32,

    pub side_offset: f32,
    /// World distance along the path that stays free of models.
    pub start_skip_distance: f32,
    pub model_scale: f32,

    pub transition_duration: Duration,
    /// Pause between the end of a disintegration and removing the old model.
    pub removal_delay: Duration,
    /// Pause between adding the new model and reconstructing it.
    pub reconstruction_delay: Duration,
    /// Fraction of the remaining distance a particle covers per tick.
    pub damping: f32,
    /// Per-axis half extent of the particle scatter cloud.
    pub scatter_radius: f32,
    /// Fixed seed for particle scatter. `None` draws a fresh seed per session.
    pub particle_seed: Option<u64>,

    pub fovy: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,

    pub ribbon_segments: usize,
    pub ribbon_width: f32,
    pub ribbon_height_offset: f32,
    pub light_spacing: usize,
    pub light_height: f32,

    /// Directory (or URL path segment on the web) holding `model_original/` and `model_renew/`.
    pub asset_root: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        let control_points = vec![
            Point3::new(-30.0, 0.0, 0.0),
            Point3::new(-20.0, 0.0, -10.0),
            Point3::new(-10.0, 2.0, -5.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(10.0, 2.0, 5.0),
            Point3::new(20.0, 0.0, 0.0),
            Point3::new(30.0, -1.0, -5.0),
            Point3::new(40.0, 0.0, 0.0),
            Point3::new(50.0, 1.0, 5.0),
            Point3::new(60.0, 0.0, 0.0),
            Point3::new(70.0, -1.0, -3.0),
            Point3::new(80.0, 0.0, 0.0),
        ];

        Self {
            control_points,
            tension: 0.5,
            sample_count: 1001,
            scroll_sensitivity: 0.001,
            rotation_sensitivity: 0.002,
            camera_height: 2.0,
            camera_look_ahead: 10.0,
            swap_look_ahead: 5.0,
            swap_threshold: 7.0,
            side_offset: 3.0,
            start_skip_distance: 18.0,
            model_scale: 2.0,
            transition_duration: Duration::from_millis(800),
            removal_delay: Duration::from_millis(1200),
            reconstruction_delay: Duration::from_millis(100),
            damping: 0.05,
            scatter_radius: 1.5,
            particle_seed: None,
            fovy: cgmath::Deg(75.0),
            znear: 0.1,
            zfar: 100.0,
            ribbon_segments: 100,
            ribbon_width: 1.2,
            ribbon_height_offset: -1.0,
            light_spacing: 100,
            light_height: 10.0,
            asset_root: "assets".to_string(),
        }
    }
}

/// Perspective projection, kept in sync with the window size.
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: cgmath::Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<cgmath::Rad<f32>>>(
        width: u32,
        height: u32,
        fovy: F,
        znear: f32,
        zfar: f32,
    ) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(config: &TourConfig, width: u32, height: u32) -> Self {
        Self::new(width, height, config.fovy, config.znear, config.zfar)
    }

    /// Zero-sized windows (minimized) keep the previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButtonState {
    Left,
    None,
}

/// Last known cursor position and which button is held.
#[derive(Clone, Debug)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            coords: (0.0, 0.0).into(),
            pressed: MouseButtonState::None,
        }
    }
}
