//! Keyframed rigid transforms with linear/slerp interpolation between
//! keys. Built on the `bspline` crate's degree-1 (piecewise-linear) curve
//! evaluator over a small `Keyframe` control-point type, mirroring the
//! teacher's `Keyframe`/`AnimatedTransform` split but merged into one type:
//! this renderer never needs a general 4x4 matrix or an SVD-based
//! decomposition of one, since keyframes are always authored directly as
//! translation/rotation/scale triples.

use bspline::{BSpline, Interpolate};

use crate::math::{Normal, Point, Quaternion, Vector};

/// One keyframe's pose: translation, rotation and (component-wise) scale.
#[derive(Debug, Copy, Clone)]
pub struct Keyframe {
    pub translation: Vector,
    pub rotation: Quaternion,
    pub scale: Vector,
}

impl Keyframe {
    pub fn new(translation: Vector, rotation: Quaternion, scale: Vector) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub const IDENTITY: Self = Self {
        translation: Vector::ZERO,
        rotation: Quaternion::IDENTITY,
        scale: Vector::broadcast(1.0),
    };
}

impl Interpolate<f32> for Keyframe {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Keyframe::new(
            (1.0 - t) * self.translation + t * other.translation,
            Quaternion::slerp(t, &self.rotation, &other.rotation),
            (1.0 - t) * self.scale + t * other.scale,
        )
    }
}

/// A keyframed rigid transform. Identity when built from no keys or a
/// single key. Queries outside `[first_key_time, last_key_time]` clamp to
/// the nearest key rather than extrapolating.
#[derive(Clone)]
pub struct Transform {
    spline: Option<BSpline<Keyframe, f32>>,
}

impl Transform {
    pub const IDENTITY: Self = Self { spline: None };

    /// Build a transform from a monotonically increasing list of
    /// `(time, translation, rotation, scale)` keys.
    pub fn from_keys(keys: &[(f32, Vector, Quaternion, Vector)]) -> Self {
        match keys.len() {
            0 => Self::IDENTITY,
            1 => {
                let (t, translation, rotation, scale) = keys[0];
                Self {
                    spline: Some(BSpline::new(0, vec![Keyframe::new(translation, rotation, scale)], vec![t, t])),
                }
            }
            n => {
                let control_points: Vec<Keyframe> = keys
                    .iter()
                    .map(|&(_, translation, rotation, scale)| Keyframe::new(translation, rotation, scale))
                    .collect();
                let mut knots = Vec::with_capacity(n + 2);
                knots.push(keys[0].0);
                for &(t, ..) in keys {
                    knots.push(t);
                }
                knots.push(keys[n - 1].0);
                Self {
                    spline: Some(BSpline::new(1, control_points, knots)),
                }
            }
        }
    }

    /// A static (unanimated) transform: a single keyframe valid at every
    /// time.
    pub fn rigid(translation: Vector, rotation: Quaternion, scale: Vector) -> Self {
        Self::from_keys(&[(0.0, translation, rotation, scale)])
    }

    pub fn translation(translation: Vector) -> Self {
        Self::rigid(translation, Quaternion::IDENTITY, Vector::broadcast(1.0))
    }

    fn pose_at(&self, time: f32) -> Keyframe {
        match &self.spline {
            None => Keyframe::IDENTITY,
            Some(spline) => {
                if spline.control_points().count() == 1 {
                    *spline.control_points().next().unwrap()
                } else {
                    let (lo, hi) = spline.knot_domain();
                    spline.point(time.clamp(lo, hi))
                }
            }
        }
    }

    pub fn to_local_point(&self, p: Point, time: f32) -> Point {
        let pose = self.pose_at(time);
        let local = p - pose.translation;
        let unrotated = pose.rotation.conjugate().rotate(Vector::new(local.x, local.y, local.z));
        Point::new(unrotated.x / pose.scale.x, unrotated.y / pose.scale.y, unrotated.z / pose.scale.z)
    }

    pub fn from_local_point(&self, p: Point, time: f32) -> Point {
        let pose = self.pose_at(time);
        let scaled = Vector::new(p.x * pose.scale.x, p.y * pose.scale.y, p.z * pose.scale.z);
        let rotated = pose.rotation.rotate(scaled);
        Point::new(rotated.x, rotated.y, rotated.z) + pose.translation
    }

    pub fn to_local_vector(&self, v: Vector, time: f32) -> Vector {
        let pose = self.pose_at(time);
        let unrotated = pose.rotation.conjugate().rotate(v);
        Vector::new(unrotated.x / pose.scale.x, unrotated.y / pose.scale.y, unrotated.z / pose.scale.z)
    }

    pub fn from_local_vector(&self, v: Vector, time: f32) -> Vector {
        let pose = self.pose_at(time);
        let scaled = Vector::new(v.x * pose.scale.x, v.y * pose.scale.y, v.z * pose.scale.z);
        pose.rotation.rotate(scaled)
    }

    /// Transform a normal using the inverse-transpose law: for a
    /// rotation+scale linear part `M = R*S`, `(M^-1)^T = R*S^-1`, so taking
    /// a normal from local to world space scales by the inverse scale and
    /// then rotates (the opposite order from vectors).
    pub fn from_local_normal(&self, n: Normal, time: f32) -> Normal {
        let pose = self.pose_at(time);
        let v = Vector::from(n);
        let scaled = Vector::new(v.x / pose.scale.x, v.y / pose.scale.y, v.z / pose.scale.z);
        Normal::from(pose.rotation.rotate(scaled)).normalized()
    }

    pub fn to_local_normal(&self, n: Normal, time: f32) -> Normal {
        let pose = self.pose_at(time);
        let v = Vector::from(n);
        let unrotated = pose.rotation.conjugate().rotate(v);
        Normal::new(unrotated.x * pose.scale.x, unrotated.y * pose.scale.y, unrotated.z * pose.scale.z).normalized()
    }

    pub fn is_identity(&self) -> bool {
        self.spline.is_none()
    }

    /// The `[first_key_time, last_key_time]` range outside which `pose_at`
    /// clamps rather than extrapolates. `None` for the identity transform,
    /// which has no keys to bound.
    pub fn time_domain(&self) -> Option<(f32, f32)> {
        self.spline.as_ref().map(|s| s.knot_domain())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips() {
        let xf = Transform::IDENTITY;
        let p = Point::new(1.0, 2.0, 3.0);
        let back = xf.from_local_point(xf.to_local_point(p, 0.0), 0.0);
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn translate_round_trips() {
        let xf = Transform::translation(Vector::new(5.0, -2.0, 1.0));
        let p = Point::new(1.0, 2.0, 3.0);
        let local = xf.to_local_point(p, 0.0);
        assert!((local - Point::new(-4.0, 4.0, 2.0)).length() < 1e-5);
        let back = xf.from_local_point(local, 0.0);
        assert!((back - p).length() < 1e-5);
    }

    #[test]
    fn rotated_scaled_round_trip() {
        let rotation = Quaternion::from_axis_angle(Vector::new(0.0, 1.0, 0.0), 0.7);
        let xf = Transform::rigid(Vector::new(1.0, 2.0, -1.0), rotation, Vector::new(2.0, 1.0, 0.5));
        let p = Point::new(3.0, -1.0, 4.0);
        let local = xf.to_local_point(p, 0.0);
        let back = xf.from_local_point(local, 0.0);
        assert!((back - p).length() < 1e-4);

        let v = Vector::new(0.3, -0.8, 0.5);
        let local_v = xf.to_local_vector(v, 0.0);
        let back_v = xf.from_local_vector(local_v, 0.0);
        assert!((back_v - v).length() < 1e-4);
    }

    #[test]
    fn out_of_range_time_clamps() {
        let keys = [
            (0.0, Vector::ZERO, Quaternion::IDENTITY, Vector::broadcast(1.0)),
            (1.0, Vector::new(10.0, 0.0, 0.0), Quaternion::IDENTITY, Vector::broadcast(1.0)),
        ];
        let xf = Transform::from_keys(&keys);
        let p_before = xf.from_local_point(Point::ORIGIN, -5.0);
        let p_at_zero = xf.from_local_point(Point::ORIGIN, 0.0);
        assert!((p_before - p_at_zero).length() < 1e-5);

        let p_after = xf.from_local_point(Point::ORIGIN, 5.0);
        let p_at_one = xf.from_local_point(Point::ORIGIN, 1.0);
        assert!((p_after - p_at_one).length() < 1e-5);
    }

    #[test]
    fn time_domain_is_none_for_identity_and_bounds_for_keys() {
        assert_eq!(Transform::IDENTITY.time_domain(), None);
        let keys = [
            (2.0, Vector::ZERO, Quaternion::IDENTITY, Vector::broadcast(1.0)),
            (5.0, Vector::new(1.0, 0.0, 0.0), Quaternion::IDENTITY, Vector::broadcast(1.0)),
        ];
        let xf = Transform::from_keys(&keys);
        assert_eq!(xf.time_domain(), Some((2.0, 5.0)));
    }

    #[test]
    fn interpolates_translation_at_midpoint() {
        let keys = [
            (0.0, Vector::ZERO, Quaternion::IDENTITY, Vector::broadcast(1.0)),
            (1.0, Vector::new(10.0, 0.0, 0.0), Quaternion::IDENTITY, Vector::broadcast(1.0)),
        ];
        let xf = Transform::from_keys(&keys);
        let mid = xf.from_local_point(Point::ORIGIN, 0.5);
        assert!((mid - Point::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }
}
