//! Axis alignment: orienting an instance along an edge, and resetting its rotation
//!
//! Every function here is pure: it takes a [`Pose`] and returns a new one.
//! Rotations that cannot be resolved (zero-length or opposed axes) are
//! skipped rather than treated as errors.
use nalgebra::{Point3, Unit, Vector3};

use crate::geometry::{Edge, Pose};
use crate::transform::{angle_between, Transform, ANGLE_TOLERANCE};

/// The rotation needed to carry one direction onto another
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisRotation {
    /// Directions already agree within [`ANGLE_TOLERANCE`].
    Aligned,
    /// The cross product vanished, so there is no unique rotation axis.
    Ambiguous,
    /// World-space rotation carrying `from` onto `to`.
    Rotate(Transform),
}

impl AxisRotation {
    /// Apply the rotation to `pose`, or return it unchanged when skipped
    pub fn apply(&self, pose: &Pose) -> Pose {
        match self {
            AxisRotation::Rotate(rotation) => pose.transformed_by(rotation),
            AxisRotation::Aligned | AxisRotation::Ambiguous => *pose,
        }
    }
}

/// Rotation about `pivot` that turns direction `from` onto `to`
pub fn axis_rotation(pivot: &Point3<f64>, from: &Vector3<f64>, to: &Vector3<f64>) -> AxisRotation {
    let angle = angle_between(from, to);
    if angle.abs() < ANGLE_TOLERANCE {
        return AxisRotation::Aligned;
    }

    match Unit::try_new(from.cross(to), 0.0) {
        Some(axis) => AxisRotation::Rotate(Transform::rotation(pivot, &axis, angle)),
        None => {
            log::debug!("rotation axis is degenerate for {from:?} -> {to:?}, skipping");
            AxisRotation::Ambiguous
        }
    }
}

/// Turn the local Z axis onto the edge direction, pivoting about the
/// instance's origin. Degenerate edges leave the pose unchanged.
pub fn align_z_to_edge(pose: &Pose, edge: &Edge) -> Pose {
    let Some(direction) = edge.direction() else {
        return *pose;
    };
    let transform = &pose.transform;
    axis_rotation(&transform.origin(), &transform.z_axis(), &direction).apply(pose)
}

/// Rotation about the local Z axis that brings the local Y axis into a
/// horizontal plane (zero world-Z component), pivoting about the
/// bounding-box center.
///
/// With `a = y.z` and `b = (z × y).z`, the rotated Y has Z component
/// `a·cos θ + b·sin θ`, which vanishes at `θ = atan2(-a, b)`.
pub fn level_rotation(pose: &Pose) -> Option<Transform> {
    let z_axis = Unit::try_new(pose.transform.z_axis(), ANGLE_TOLERANCE)?;
    let y_axis = pose.transform.y_axis();
    if y_axis.norm() < ANGLE_TOLERANCE {
        return None;
    }

    let a = y_axis.z;
    let b = z_axis.cross(&y_axis).z;
    if a.abs() < ANGLE_TOLERANCE && b.abs() < ANGLE_TOLERANCE {
        return None;
    }

    let angle = (-a).atan2(b);
    if angle.abs() < ANGLE_TOLERANCE {
        return None;
    }

    Some(Transform::rotation(&pose.center(), &z_axis, angle))
}

/// Level the local Y axis, see [`level_rotation`]
pub fn level_y(pose: &Pose) -> Pose {
    match level_rotation(pose) {
        Some(rotation) => pose.transformed_by(&rotation),
        None => *pose,
    }
}

/// Orient an instance along an edge: Z onto the edge direction about the
/// origin, then Y levelled about the bounding-box center.
///
/// The order matters; the two rotations use different pivots. Degenerate
/// edges leave the pose unchanged.
pub fn orient_to_edge(pose: &Pose, edge: &Edge) -> Pose {
    if edge.is_degenerate() {
        return *pose;
    }
    level_y(&align_z_to_edge(pose, edge))
}

/// Rotate an instance in place so its local Z matches world Z, then its
/// local X matches world X, both about its bounding-box center.
pub fn reset_rotations(pose: &Pose) -> Pose {
    let center = pose.center();
    let upright = axis_rotation(&center, &pose.transform.z_axis(), &Vector3::z()).apply(pose);
    axis_rotation(&center, &upright.transform.x_axis(), &Vector3::x()).apply(&upright)
}
