//! Rays and intersection records.

use crate::material::Material;
use crate::math::{Color, Normal, Point, Vector};
use crate::shapes::Shape;

/// Minimum t a ray is allowed to report a hit at. Spawned rays start a
/// little past their origin so they don't immediately re-intersect the
/// surface they left.
pub const RAY_EPSILON: f32 = 1e-4;
/// Effectively-infinite default max distance for a ray.
pub const RAY_T_MAX: f32 = 1.0e30;

/// A directed segment: `origin + t * direction` for `t` in `[0, t_max]`.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector,
    pub t_max: f32,
    pub time: f32,
}

impl Ray {
    pub fn new(origin: Point, direction: Vector, t_max: f32, time: f32) -> Self {
        Self {
            origin,
            direction,
            t_max,
            time,
        }
    }

    /// A ray from `origin` towards `direction`, starting just past
    /// `RAY_EPSILON` to avoid self-intersection, running to `t_max`.
    pub fn spawn(origin: Point, direction: Vector, t_max: f32, time: f32) -> Self {
        Self::new(origin + direction * RAY_EPSILON, direction, t_max - RAY_EPSILON, time)
    }

    /// A shadow ray from `origin` towards a point at distance `dist` along
    /// `direction`, clipped just short of the target so it doesn't
    /// self-intersect the target surface either.
    pub fn shadow(origin: Point, direction: Vector, dist: f32, time: f32) -> Self {
        Self::spawn(origin, direction, dist - RAY_EPSILON, time)
    }

    pub fn at(&self, t: f32) -> Point {
        self.origin + self.direction * t
    }
}

/// The result of casting a ray into the scene. Created per traversal,
/// mutated in place as shapes test themselves against it, and consumed by
/// the integrator once tracing finishes. Borrows are scoped to a single
/// render call: the scene graph that owns the shapes/materials outlives
/// every intersection taken against it.
pub struct Intersection<'a> {
    pub ray: Ray,
    pub t: f32,
    pub shape: Option<&'a dyn Shape>,
    pub material: Option<&'a (dyn Material + Send + Sync)>,
    pub color_modifier: Color,
    pub normal: Normal,
}

impl<'a> Intersection<'a> {
    pub fn new(ray: Ray) -> Self {
        let t = ray.t_max;
        Self {
            ray,
            t,
            shape: None,
            material: None,
            color_modifier: Color::WHITE,
            normal: Normal::new(0.0, 0.0, 0.0),
        }
    }

    pub fn intersected(&self) -> bool {
        self.shape.is_some()
    }

    pub fn position(&self) -> Point {
        self.ray.at(self.t)
    }
}
