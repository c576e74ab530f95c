//! Geometry primitives: edges, bounding boxes, poses and definition meshes
use std::collections::HashSet;

use nalgebra::{Point3, Unit, Vector3};

use crate::transform::Transform;

/// An oriented line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Edge {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn vector(&self) -> Vector3<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// An edge whose endpoints coincide
    pub fn is_degenerate(&self) -> bool {
        self.length() == 0.0
    }

    /// Unit direction from start to end, `None` for a degenerate edge
    pub fn direction(&self) -> Option<Unit<Vector3<f64>>> {
        Unit::try_new(self.vector(), 0.0)
    }

    pub fn midpoint(&self) -> Point3<f64> {
        Point3::from((self.start.coords + self.end.coords) * 0.5)
    }
}

/// Distinct endpoints of `edges`, in order of first appearance.
///
/// Coordinates are compared exactly; points that differ only by
/// floating-point noise stay separate.
pub fn distinct_endpoints(edges: &[Edge]) -> Vec<Point3<f64>> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .flat_map(|edge| [edge.start, edge.end])
        .filter(|point| seen.insert(coordinate_key(point)))
        .collect()
}

fn coordinate_key(point: &Point3<f64>) -> [u64; 3] {
    // -0.0 and 0.0 compare equal, so they must share a key
    let bits = |value: f64| if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() };
    [bits(point.x), bits(point.y), bits(point.z)]
}

/// An axis-aligned box in some frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create a box spanning two opposite corners, in any order
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Smallest box enclosing `points`, `None` when there are none
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, point| Self {
            min: bounds.min.inf(point),
            max: bounds.max.sup(point),
        }))
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Extents along X, Y and Z
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z
    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// World-aligned box enclosing this box after `transform`
    pub fn transformed(&self, transform: &Transform) -> BoundingBox {
        let corners = self.corners().map(|corner| transform.transform_point(&corner));
        let first = corners[0];
        corners[1..].iter().fold(Self::new(first, first), |bounds, point| Self {
            min: bounds.min.inf(point),
            max: bounds.max.sup(point),
        })
    }
}

/// An instance's transform together with its definition's bounding box.
///
/// This is the value every placement recipe consumes and produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub transform: Transform,
    /// Bounding box in the definition's local frame
    pub bounds: BoundingBox,
}

impl Pose {
    pub fn new(transform: Transform, bounds: BoundingBox) -> Self {
        Self { transform, bounds }
    }

    /// World-space bounding-box center.
    ///
    /// The affine image of a box is point-symmetric about the image of its
    /// center, so this is also the center of the world-aligned box.
    pub fn center(&self) -> Point3<f64> {
        self.transform.transform_point(&self.bounds.center())
    }

    /// Extents along the instance's own X, Y and Z axes, including its scale
    pub fn local_extents(&self) -> Vector3<f64> {
        self.bounds.extents().component_mul(&self.transform.scale())
    }

    /// Extent along the instance's own Z axis, independent of its world orientation
    pub fn local_depth(&self) -> f64 {
        self.local_extents().z
    }

    /// World-aligned bounding box
    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds.transformed(&self.transform)
    }

    /// Same definition, transform moved by `world`
    pub fn transformed_by(&self, world: &Transform) -> Pose {
        Pose {
            transform: self.transform.transformed_by(world),
            bounds: self.bounds,
        }
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> Pose {
        self.transformed_by(&Transform::translation(delta))
    }
}

/// A triangle face of a definition mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, `None` for a sliver
    pub fn normal(&self) -> Option<Unit<Vector3<f64>>> {
        let [v0, v1, v2] = self.vertices;
        Unit::try_new((v1 - v0).cross(&(v2 - v0)), 0.0)
    }
}

/// Triangulated geometry of a component definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Closed box mesh spanning `bounds`, faces wound outward
    pub fn cuboid(bounds: &BoundingBox) -> Self {
        // Corner indices per face, counter-clockwise seen from outside
        const FACES: [[usize; 4]; 6] = [
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [2, 3, 7, 6], // back
            [1, 2, 6, 5], // right
            [3, 0, 4, 7], // left
        ];

        let corners = bounds.corners();
        let mut mesh = Self::with_capacity(12);
        for [a, b, c, d] in FACES {
            mesh.add_triangle(Triangle::new(corners[a], corners[b], corners[c]));
            mesh.add_triangle(Triangle::new(corners[a], corners[c], corners[d]));
        }
        mesh
    }

    /// Bounding box of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.triangles.iter().flat_map(|t| t.vertices.iter()))
    }
}
