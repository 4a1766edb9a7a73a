use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Vector;

/// A unit quaternion describing a rotation.
#[derive(Debug, Copy, Clone)]
pub struct Quaternion {
    pub v: Vector,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        v: Vector::broadcast(0.0),
        w: 1.0,
    };

    pub fn new(v: Vector, w: f32) -> Self {
        Self { v, w }
    }

    /// Build a rotation of `angle_radians` about `axis` (assumed normalized).
    pub fn from_axis_angle(axis: Vector, angle_radians: f32) -> Self {
        let half = angle_radians * 0.5;
        Self {
            v: axis * half.sin(),
            w: half.cos(),
        }
    }

    pub fn dot(&self, o: &Quaternion) -> f32 {
        self.v.dot(&o.v) + self.w * o.w
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(&self) -> Quaternion {
        let len = self.length();
        if len == 0.0 {
            *self
        } else {
            *self / len
        }
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(-self.v, self.w)
    }

    /// Rotate `p` by this quaternion. Assumes the quaternion is normalized.
    pub fn rotate(&self, p: Vector) -> Vector {
        let qv = self.v;
        let uv = qv.cross(&p);
        let uuv = qv.cross(&uv);
        p + (uv * self.w + uuv) * 2.0
    }

    /// Spherical linear interpolation between `a` and `b` at parameter `t`
    /// in [0,1], taking the shorter arc. Falls back to a normalized lerp
    /// when the quaternions are nearly parallel to avoid the 0/0 instability
    /// in the general slerp formula.
    pub fn slerp(t: f32, a: &Quaternion, b: &Quaternion) -> Quaternion {
        let mut cos_theta = a.dot(b);
        // A quaternion and its negation represent the same rotation; take
        // whichever of `b`/`-b` is closer to `a` so interpolation always
        // travels the shorter arc.
        let b = if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            -*b
        } else {
            *b
        };
        if cos_theta > 0.9995 {
            ((1.0 - t) * *a + t * b).normalized()
        } else {
            let theta = cos_theta.clamp(-1.0, 1.0).acos();
            let theta_t = theta * t;
            let q_perp = (b - *a * cos_theta).normalized();
            *a * theta_t.cos() + q_perp * theta_t.sin()
        }
    }
}

impl Add for Quaternion {
    type Output = Quaternion;
    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(self.v + rhs.v, self.w + rhs.w)
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;
    fn sub(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(self.v - rhs.v, self.w - rhs.w)
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;
    fn neg(self) -> Quaternion {
        Quaternion::new(-self.v, -self.w)
    }
}

impl Mul<f32> for Quaternion {
    type Output = Quaternion;
    fn mul(self, rhs: f32) -> Quaternion {
        Quaternion::new(self.v * rhs, self.w * rhs)
    }
}

impl Mul<Quaternion> for f32 {
    type Output = Quaternion;
    fn mul(self, rhs: Quaternion) -> Quaternion {
        rhs * self
    }
}

impl Div<f32> for Quaternion {
    type Output = Quaternion;
    fn div(self, rhs: f32) -> Quaternion {
        Quaternion::new(self.v / rhs, self.w / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slerp_boundaries() {
        let q0 = Quaternion::from_axis_angle(Vector::new(0.0, 0.0, 1.0), 0.0);
        let q1 = Quaternion::from_axis_angle(Vector::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
        let s0 = Quaternion::slerp(0.0, &q0, &q1);
        let s1 = Quaternion::slerp(1.0, &q0, &q1);
        assert!((s0.dot(&q0) - 1.0).abs() < 1e-4);
        assert!((s1.dot(&q1) - 1.0).abs() < 1e-4);
        let mid = Quaternion::slerp(0.5, &q0, &q1);
        assert!((mid.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn slerp_takes_the_shorter_arc() {
        let a = Quaternion::IDENTITY;
        // 3.5 rad (~200 degrees) puts the half-angle past pi/2, so
        // a.dot(&b) is negative: `b` and `-b` represent the same rotation,
        // and slerp must reach it by whichever arc is shorter.
        let b = Quaternion::from_axis_angle(Vector::new(0.0, 0.0, 1.0), 3.5);
        assert!(a.dot(&b) < 0.0);
        let neg_b = -b;
        for &t in &[0.0, 0.25, 0.5, 0.75, 1.0] {
            let s_b = Quaternion::slerp(t, &a, &b);
            let s_neg_b = Quaternion::slerp(t, &a, &neg_b);
            assert!(
                (s_b.dot(&s_neg_b) - 1.0).abs() < 1e-4,
                "slerp toward a quaternion and toward its negation (the same rotation) must agree once the shorter arc is taken"
            );
        }
    }

    #[test]
    fn identity_rotate_is_noop() {
        let p = Vector::new(1.0, 2.0, 3.0);
        let r = Quaternion::IDENTITY.rotate(p);
        assert!((r - p).length() < 1e-6);
    }
}
