//! The camera path.
//!
//! A [`PathModel`] is an open Catmull-Rom spline through a fixed list of
//! control points, sampled once into a dense table. Everything that moves
//! along the path (camera, proximity probe, model placement) works on table
//! indices; `t = i / (N - 1)` converts between the two.
//!
//! The first and last segments use mirrored phantom points so the curve
//! starts and ends exactly on the first and last control point without
//! overshooting.
//!
//! The table also keeps the running arc length, so distances along the path
//! can be turned back into points without re-evaluating the spline.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, Zero};

use crate::data_structures::scene_graph::Mesh;

/// Local orthonormal frame on the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathFrame {
    pub tangent: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
}

#[derive(Clone, Debug)]
pub struct PathModel {
    control_points: Vec<Point3<f32>>,
    tension: f32,
    points: Vec<Point3<f32>>,
    /// Arc length from the start up to each table entry.
    cumulative: Vec<f32>,
    length: f32,
    /// Lengths at or below this count as a zero-length path.
    tolerance: f32,
}

impl PathModel {
    pub fn new(control_points: &[Point3<f32>], tension: f32, sample_count: usize) -> Self {
        let mut control_points = control_points.to_vec();
        match control_points.len() {
            0 => control_points = vec![Point3::origin(); 2],
            1 => control_points.push(control_points[0]),
            _ => (),
        }
        let sample_count = sample_count.max(2);

        let mut path = Self {
            control_points,
            tension,
            points: Vec::with_capacity(sample_count),
            cumulative: Vec::with_capacity(sample_count),
            length: 0.0,
            tolerance: 0.0,
        };
        let last = (sample_count - 1) as f32;
        path.points = (0..sample_count)
            .map(|i| path.sample(i as f32 / last))
            .collect();

        let mut running = 0.0;
        path.cumulative.push(0.0);
        for pair in path.points.windows(2) {
            running += (pair[1] - pair[0]).magnitude();
            path.cumulative.push(running);
        }
        path.length = running;

        let origin = path.control_points[0];
        let extent = path
            .control_points
            .iter()
            .map(|&p| (p - origin).magnitude())
            .fold(0.0, f32::max);
        path.tolerance = extent * 1e-5;
        path
    }

    /// Point on the curve at parameter `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Point3<f32> {
        let (p0, p1, p2, p3, u) = self.segment(t);
        // the basis weights only sum to 1 up to rounding
        if p0 == p1 && p1 == p2 && p2 == p3 {
            return p1;
        }
        let v0 = (p2 - p0) * self.tension;
        let v1 = (p3 - p1) * self.tension;

        let u2 = u * u;
        let u3 = u2 * u;

        let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
        let h10 = u3 - 2.0 * u2 + u;
        let h01 = -2.0 * u3 + 3.0 * u2;
        let h11 = u3 - u2;

        Point3::from_vec(p1.to_vec() * h00 + v0 * h10 + p2.to_vec() * h01 + v1 * h11)
    }

    /// Unit direction of travel at parameter `t`.
    pub fn tangent_at(&self, t: f32) -> Vector3<f32> {
        let (p0, p1, p2, p3, u) = self.segment(t);
        let v0 = (p2 - p0) * self.tension;
        let v1 = (p3 - p1) * self.tension;

        let u2 = u * u;
        let d00 = 6.0 * u2 - 6.0 * u;
        let d10 = 3.0 * u2 - 4.0 * u + 1.0;
        let d01 = -6.0 * u2 + 6.0 * u;
        let d11 = 3.0 * u2 - 2.0 * u;

        let derivative = p1.to_vec() * d00 + v0 * d10 + p2.to_vec() * d01 + v1 * d11;
        if derivative.magnitude2() > f32::EPSILON {
            return derivative.normalize();
        }
        // degenerate (coincident control points)
        let chord = p2 - p1;
        if chord.magnitude2() > f32::EPSILON {
            chord.normalize()
        } else {
            Vector3::unit_x()
        }
    }

    pub fn frame_at(&self, t: f32) -> PathFrame {
        let tangent = self.tangent_at(t);
        let mut right = tangent.cross(Vector3::unit_y());
        if right.magnitude2() <= f32::EPSILON {
            // travelling straight up or down
            right = Vector3::unit_x();
        }
        let right = right.normalize();
        let up = right.cross(tangent).normalize();
        PathFrame { tangent, right, up }
    }

    /// Length of the sampled polyline.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn control_points(&self) -> &[Point3<f32>] {
        &self.control_points
    }

    /// Table entry `i`, clamped to the last sample.
    pub fn point_at_index(&self, i: usize) -> Point3<f32> {
        self.points[i.min(self.last_index())]
    }

    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    pub fn t_at_index(&self, i: usize) -> f32 {
        i.min(self.last_index()) as f32 / self.last_index() as f32
    }

    pub fn index_for(&self, t: f32) -> usize {
        (clamp_unit(t) * self.last_index() as f32).floor() as usize
    }

    /// Number of table steps that cover roughly `distance` world units,
    /// at most the whole table.
    pub fn steps_for_distance(&self, distance: f32) -> usize {
        if self.length <= self.tolerance || distance.is_nan() || distance <= 0.0 {
            return 0;
        }
        let steps = (distance * self.points.len() as f32 / self.length).floor();
        steps.min(self.last_index() as f32) as usize
    }

    /// Index of the point `distance` world units ahead of `t`, never past the end.
    pub fn look_ahead_index(&self, t: f32, distance: f32) -> usize {
        self.index_for(t)
            .saturating_add(self.steps_for_distance(distance))
            .min(self.last_index())
    }

    pub fn look_ahead_point(&self, t: f32, distance: f32) -> Point3<f32> {
        self.points[self.look_ahead_index(t, distance)]
    }

    /// Point `distance` world units along the path and the parameter it sits at.
    ///
    /// Interpolates linearly between table entries; clamps to the ends.
    pub fn point_at_distance(&self, distance: f32) -> (Point3<f32>, f32) {
        if self.length <= self.tolerance || distance.is_nan() || distance <= 0.0 {
            return (self.points[0], 0.0);
        }
        if distance >= self.length {
            return (self.points[self.last_index()], 1.0);
        }
        let upper = self
            .cumulative
            .partition_point(|&c| c < distance)
            .clamp(1, self.last_index());
        let lower = upper - 1;
        let span = self.cumulative[upper] - self.cumulative[lower];
        let frac = if span > 0.0 {
            (distance - self.cumulative[lower]) / span
        } else {
            0.0
        };
        let point = self.points[lower] + (self.points[upper] - self.points[lower]) * frac;
        let t = (lower as f32 + frac) / self.last_index() as f32;
        (point, t)
    }

    /// Flat strip following the path, `width` to each side, shifted vertically by `height_offset`.
    ///
    /// Cross sections are spaced evenly by arc length.
    pub fn ribbon(&self, segments: usize, width: f32, height_offset: f32) -> Mesh {
        let segments = segments.max(1);
        let lift = Vector3::new(0.0, height_offset, 0.0);
        let mut positions = Vec::with_capacity((segments + 1) * 2);
        for i in 0..=segments {
            let (point, t) = self.point_at_distance(self.length * i as f32 / segments as f32);
            let perp = horizontal_perpendicular(self.tangent_at(t)) * width;
            positions.push((point + perp + lift).into());
            positions.push((point - perp + lift).into());
        }

        let mut indices = Vec::with_capacity(segments * 6);
        for i in 0..segments as u32 {
            let a = i * 2;
            let b = a + 1;
            let c = a + 2;
            let d = a + 3;
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
        Mesh::new("ribbon", positions, indices)
    }

    /// Spotlight `(position, target)` pairs every `spacing` samples.
    pub fn light_anchors(&self, spacing: usize, height: f32) -> Vec<(Point3<f32>, Point3<f32>)> {
        self.points
            .iter()
            .step_by(spacing.max(1))
            .map(|&p| (p + Vector3::new(0.0, height, 0.0), p))
            .collect()
    }

    /// Control points surrounding the segment `t` falls into, plus the local parameter.
    fn segment(&self, t: f32) -> (Point3<f32>, Point3<f32>, Point3<f32>, Point3<f32>, f32) {
        let cps = &self.control_points;
        let n = cps.len();
        let p = (n - 1) as f32 * clamp_unit(t);
        let mut seg = p.floor() as usize;
        let mut u = p - seg as f32;
        if seg >= n - 1 {
            seg = n - 2;
            u = 1.0;
        }

        let p1 = cps[seg];
        let p2 = cps[seg + 1];
        let p0 = if seg > 0 {
            cps[seg - 1]
        } else {
            p1 + (p1 - p2)
        };
        let p3 = if seg + 2 < n {
            cps[seg + 2]
        } else {
            p2 + (p2 - p1)
        };
        (p0, p1, p2, p3, u)
    }
}

/// Unit vector perpendicular to `direction` in the horizontal plane.
///
/// Equals `normalize(direction x up)`; falls back to +Z for vertical directions.
pub fn horizontal_perpendicular(direction: Vector3<f32>) -> Vector3<f32> {
    let perp = Vector3::new(-direction.z, 0.0, direction.x);
    if perp.is_zero() || perp.magnitude2() <= f32::EPSILON {
        Vector3::unit_z()
    } else {
        perp.normalize()
    }
}

fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}
