//! Affine transforms for placing instances in world space
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

/// Angular tolerance (radians) below which two directions count as aligned
pub const ANGLE_TOLERANCE: f64 = 1e-6;

/// Angle between two vectors in radians, in `[0, π]`.
///
/// Uses `acos` of the normalized dot product, clamped to `[-1, 1]` so that
/// floating-point overshoot never leaves the domain. A zero-length input is
/// treated as already aligned and yields `0.0`.
pub fn angle_between(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let denom = u.norm() * v.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (u.dot(v) / denom).clamp(-1.0, 1.0).acos()
}

/// An instance transform: rotation, translation and per-axis scale.
///
/// Stored as a homogeneous 4x4 matrix. The basis columns may carry scale;
/// [`Transform::x_axis`] and friends always return the unit directions and
/// [`Transform::scale`] returns the per-axis factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build a transform from an origin and three basis columns.
    ///
    /// The axes are taken as given, so their lengths become the scale.
    pub fn from_axes(
        origin: Point3<f64>,
        x_axis: Vector3<f64>,
        y_axis: Vector3<f64>,
        z_axis: Vector3<f64>,
    ) -> Self {
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            x_axis.x, y_axis.x, z_axis.x, origin.x,
            x_axis.y, y_axis.y, z_axis.y, origin.y,
            x_axis.z, y_axis.z, z_axis.z, origin.z,
            0.0,      0.0,      0.0,      1.0,
        );
        Self { matrix }
    }

    /// Build a transform from an origin, a rotation and local scale factors
    pub fn from_parts(origin: Point3<f64>, rotation: &Rotation3<f64>, scale: Vector3<f64>) -> Self {
        let basis = rotation.matrix();
        Self::from_axes(
            origin,
            basis.column(0) * scale.x,
            basis.column(1) * scale.y,
            basis.column(2) * scale.z,
        )
    }

    /// A pure translation by `delta`
    pub fn translation(delta: &Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(delta),
        }
    }

    /// A right-handed rotation by `angle` radians about `axis` through `pivot`.
    ///
    /// Equivalent to translate(-pivot), rotate, translate(+pivot).
    pub fn rotation(pivot: &Point3<f64>, axis: &Unit<Vector3<f64>>, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(axis, angle).to_homogeneous();
        Self {
            matrix: Matrix4::new_translation(&pivot.coords)
                * rotation
                * Matrix4::new_translation(&-pivot.coords),
        }
    }

    /// An anisotropic scaling about `pivot` along the axes of the frame it is
    /// applied in. Compose it on the right of an instance transform (see
    /// [`Transform::scaled_locally`]) to scale along the instance's own axes.
    pub fn scaling(pivot: &Point3<f64>, sx: f64, sy: f64, sz: f64) -> Self {
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz));
        Self {
            matrix: Matrix4::new_translation(&pivot.coords)
                * scale
                * Matrix4::new_translation(&-pivot.coords),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// `self ∘ inner`: apply `inner` first, then `self`
    pub fn compose(&self, inner: &Transform) -> Transform {
        Transform {
            matrix: self.matrix * inner.matrix,
        }
    }

    /// Apply a world-space transform to an instance with this transform
    pub fn transformed_by(&self, world: &Transform) -> Transform {
        world.compose(self)
    }

    /// Apply a transform expressed in this instance's local frame
    pub fn scaled_locally(&self, local: &Transform) -> Transform {
        self.compose(local)
    }

    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    pub fn x_axis(&self) -> Vector3<f64> {
        unit_or_zero(self.column(0))
    }

    pub fn y_axis(&self) -> Vector3<f64> {
        unit_or_zero(self.column(1))
    }

    pub fn z_axis(&self) -> Vector3<f64> {
        unit_or_zero(self.column(2))
    }

    /// Scale factors along the local X, Y and Z axes
    pub fn scale(&self) -> Vector3<f64> {
        Vector3::new(
            self.column(0).norm(),
            self.column(1).norm(),
            self.column(2).norm(),
        )
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(vector)
    }

    /// Whether the unit axes form a right-handed orthonormal basis within `tolerance`
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let (x, y, z) = (self.x_axis(), self.y_axis(), self.z_axis());
        [x, y, z].iter().all(|axis| (axis.norm() - 1.0).abs() < tolerance)
            && x.dot(&y).abs() < tolerance
            && y.dot(&z).abs() < tolerance
            && z.dot(&x).abs() < tolerance
            && (x.cross(&y) - z).norm() < tolerance
    }

    fn column(&self, index: usize) -> Vector3<f64> {
        Vector3::new(
            self.matrix[(0, index)],
            self.matrix[(1, index)],
            self.matrix[(2, index)],
        )
    }
}

fn unit_or_zero(vector: Vector3<f64>) -> Vector3<f64> {
    vector.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_between() {
        let x = Vector3::x();
        assert_relative_eq!(angle_between(&x, &Vector3::y()), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&x, &-x), PI, epsilon = 1e-12);
        assert_eq!(angle_between(&x, &(x * 3.0)), 0.0);
    }

    #[test]
    fn test_angle_between_zero_length() {
        assert_eq!(angle_between(&Vector3::zeros(), &Vector3::z()), 0.0);
        assert_eq!(angle_between(&Vector3::z(), &Vector3::zeros()), 0.0);
    }

    #[test]
    fn test_angle_between_clamps_overshoot() {
        let u = Vector3::new(0.1, 0.2, 0.3);
        let angle = angle_between(&u, &(u * 7.0));
        assert!(angle.is_finite());
        assert!(angle < 1e-7);
    }

    #[test]
    fn test_identity_axes() {
        let t = Transform::identity();
        assert_eq!(t.origin(), Point3::origin());
        assert_eq!(t.x_axis(), Vector3::x());
        assert_eq!(t.y_axis(), Vector3::y());
        assert_eq!(t.z_axis(), Vector3::z());
        assert_eq!(t.scale(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(&Vector3::new(1.0, 2.0, 3.0));
        let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.0, 3.0, 4.0), epsilon = 1e-12);
        // vectors ignore translation
        assert_relative_eq!(t.transform_vector(&Vector3::x()), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_pivot() {
        let pivot = Point3::new(1.0, 0.0, 0.0);
        let r = Transform::rotation(&pivot, &Vector3::z_axis(), FRAC_PI_2);
        // the pivot stays put
        assert_relative_eq!(r.transform_point(&pivot), pivot, epsilon = 1e-12);
        // right-handed: (2,0,0) swings to (1,1,0)
        let p = r.transform_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        assert!(r.is_orthonormal(1e-12));
    }

    #[test]
    fn test_scaling_about_pivot() {
        let pivot = Point3::new(0.0, 0.0, 1.0);
        let s = Transform::scaling(&pivot, 1.0, 1.0, 2.5);
        assert_relative_eq!(s.transform_point(&pivot), pivot, epsilon = 1e-12);
        let p = s.transform_point(&Point3::new(1.0, 1.0, 2.0));
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 3.5), epsilon = 1e-12);
    }

    #[test]
    fn test_compose_applies_inner_first() {
        let move_x = Transform::translation(&Vector3::x());
        let turn = Transform::rotation(&Point3::origin(), &Vector3::z_axis(), FRAC_PI_2);
        let composed = turn.compose(&move_x);
        let p = composed.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_eq!(move_x.transformed_by(&turn), composed);
    }

    #[test]
    fn test_local_scaling_keeps_axes_unit() {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.4);
        let t = Transform::from_parts(Point3::new(3.0, 0.0, 0.0), &rotation, Vector3::repeat(1.0));
        let scaled = t.scaled_locally(&Transform::scaling(&Point3::origin(), 1.0, 1.0, 4.0));
        assert_relative_eq!(scaled.scale(), Vector3::new(1.0, 1.0, 4.0), epsilon = 1e-12);
        assert_relative_eq!(scaled.z_axis(), t.z_axis(), epsilon = 1e-12);
        assert!(scaled.is_orthonormal(1e-9));
        assert_relative_eq!(scaled.origin(), t.origin(), epsilon = 1e-12);
    }

    #[test]
    fn test_from_parts_round_trip() {
        let rotation = Rotation3::from_euler_angles(0.1, 0.2, 0.3);
        let scale = Vector3::new(2.0, 3.0, 4.0);
        let t = Transform::from_parts(Point3::new(1.0, 2.0, 3.0), &rotation, scale);
        assert_relative_eq!(t.scale(), Vector3::new(2.0, 3.0, 4.0), epsilon = 1e-12);
        assert_relative_eq!(t.z_axis(), rotation * Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(t.origin(), Point3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_left_handed_basis_is_not_orthonormal() {
        let t = Transform::from_axes(Point3::origin(), Vector3::x(), Vector3::y(), -Vector3::z());
        assert!(!t.is_orthonormal(1e-9));
    }
}
