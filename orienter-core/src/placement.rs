//! Placement recipes: where and how a copy lands on its target
//!
//! Each recipe computes the copy's new [`Pose`] from the source pose and a
//! target edge or point. Applying the result to the copy is the caller's job.
use nalgebra::Point3;

use crate::align::orient_to_edge;
use crate::geometry::{Edge, Pose};
use crate::transform::Transform;

/// How a copy is resized to match its edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    /// Only the local Z extent changes.
    AlongZ,
    /// All three local extents change by the same factor.
    Uniform,
}

/// The edge-driven placement recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// Orient, then put the transform origin on the edge start.
    Origin,
    /// Orient, then put the bounding-box center on the edge midpoint.
    Center,
    /// Scale to the edge length, orient, then center on the midpoint.
    Scaled(Scaling),
}

impl Recipe {
    /// New pose for a copy of `pose` placed on `edge`, `None` for a degenerate edge
    pub fn apply(&self, pose: &Pose, edge: &Edge) -> Option<Pose> {
        match self {
            Recipe::Origin => place_at_origin(pose, edge),
            Recipe::Center => place_at_center(pose, edge),
            Recipe::Scaled(scaling) => place_scaled(pose, edge, *scaling),
        }
    }
}

/// Orient along `edge` and move the transform origin onto `edge.start`
pub fn place_at_origin(pose: &Pose, edge: &Edge) -> Option<Pose> {
    if edge.is_degenerate() {
        return None;
    }
    let oriented = orient_to_edge(pose, edge);
    Some(oriented.translated(&(edge.start - oriented.transform.origin())))
}

/// Orient along `edge` and move the bounding-box center onto the edge midpoint
pub fn place_at_center(pose: &Pose, edge: &Edge) -> Option<Pose> {
    if edge.is_degenerate() {
        return None;
    }
    Some(center_on(&orient_to_edge(pose, edge), &edge.midpoint()))
}

/// Scale to the edge length, orient along it and center on its midpoint
pub fn place_scaled(pose: &Pose, edge: &Edge, scaling: Scaling) -> Option<Pose> {
    if edge.is_degenerate() {
        return None;
    }
    let scaled = scale_to_edge(pose, edge, scaling);
    Some(center_on(&orient_to_edge(&scaled, edge), &edge.midpoint()))
}

/// Move a copy so its bounding-box center sits on `vertex`, without reorienting it
pub fn place_at_vertex(pose: &Pose, vertex: &Point3<f64>) -> Pose {
    center_on(pose, vertex)
}

/// Factor that brings the local Z extent to the edge length.
///
/// `None` when the instance has no depth to scale.
pub fn scale_factor(pose: &Pose, edge: &Edge) -> Option<f64> {
    let depth = pose.local_depth();
    if depth == 0.0 {
        return None;
    }
    Some(edge.length() / depth)
}

/// Rescale `pose` along its own axes so its local Z extent equals the edge length.
///
/// The pivot is the definition's bounding-box center, so the scaling never
/// depends on the instance's world orientation. Flat instances are returned
/// unscaled.
pub fn scale_to_edge(pose: &Pose, edge: &Edge, scaling: Scaling) -> Pose {
    let Some(factor) = scale_factor(pose, edge) else {
        log::debug!("instance has zero local depth, skipping scale");
        return *pose;
    };

    let (sx, sy) = match scaling {
        Scaling::AlongZ => (1.0, 1.0),
        Scaling::Uniform => (factor, factor),
    };
    let local = Transform::scaling(&pose.bounds.center(), sx, sy, factor);
    Pose::new(pose.transform.scaled_locally(&local), pose.bounds)
}

fn center_on(pose: &Pose, target: &Point3<f64>) -> Pose {
    pose.translated(&(target - pose.center()))
}
