//! Spreading the loaded buildings along the path.
//!
//! Models are spaced evenly over the sample table after a fixed run-up
//! at the start of the path, alternate between the two sides of the path
//! and are turned to face the centerline.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::{
    context::TourConfig,
    data_structures::instance::Instance,
    path::{PathModel, horizontal_perpendicular},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn for_index(i: usize) -> Self {
        if i % 2 == 0 { Side::Right } else { Side::Left }
    }

    /// `+1` for even asset indices, `-1` for odd ones.
    pub fn sign(self) -> f32 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }
}

/// Fixed anchor of one building. `Right` is the `+perpendicular` side when
/// looking along the direction of travel.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub name: String,
    pub sample_index: usize,
    pub side: Side,
    pub anchor: Point3<f32>,
    pub transform: Instance,
}

/// First table index that lies `skip_distance` world units into the path.
pub fn start_index(path: &PathModel, skip_distance: f32) -> usize {
    let step = path
        .points()
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).magnitude())
        .find(|d| *d > 0.0);
    match step {
        Some(step) => ((skip_distance / step).ceil().max(0.0) as usize).min(path.last_index()),
        None => 0,
    }
}

/// Places one model per name; names that would land past the end of the table are dropped.
pub fn place_models<S: AsRef<str>>(
    path: &PathModel,
    names: &[S],
    config: &TourConfig,
) -> Vec<Placement> {
    if names.is_empty() {
        return Vec::new();
    }
    let sample_count = path.sample_count();
    let spacing = sample_count as f32 / names.len() as f32;
    let start = start_index(path, config.start_skip_distance);

    let mut placements = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let idx = (start as f32 + i as f32 * spacing).floor() as usize;
        if idx >= sample_count {
            log::debug!(
                "{} does not fit on the path (index {} of {})",
                name.as_ref(),
                idx,
                sample_count
            );
            continue;
        }

        let point = path.point_at_index(idx);
        let direction = direction_at(path, idx);
        let side = Side::for_index(i);
        let offset = horizontal_perpendicular(direction) * (side.sign() * config.side_offset);
        let anchor = point + offset;

        // face the centerline at the model's own height
        let to_path = Vector3::new(point.x - anchor.x, 0.0, point.z - anchor.z);
        let yaw = cgmath::Rad(to_path.x.atan2(to_path.z));
        let transform = Instance::placed(
            Vector3::new(anchor.x, anchor.y, anchor.z),
            yaw,
            config.model_scale,
        );

        placements.push(Placement {
            name: name.as_ref().to_string(),
            sample_index: idx,
            side,
            anchor,
            transform,
        });
    }
    placements
}

fn direction_at(path: &PathModel, idx: usize) -> Vector3<f32> {
    let last = path.last_index();
    let dir = if idx < last {
        path.point_at_index(idx + 1) - path.point_at_index(idx)
    } else if idx > 0 {
        path.point_at_index(idx) - path.point_at_index(idx - 1)
    } else {
        Vector3::unit_x()
    };
    if dir.magnitude2() > f32::EPSILON {
        dir.normalize()
    } else {
        Vector3::unit_x()
    }
}
