use std::sync::Arc;

use super::{Shape, SurfaceSample};
use crate::material::{Material, MaterialHandle};
use crate::math::{BBox, Color, Normal, Point, Vector, PI};
use crate::ray::{Intersection, Ray, RAY_EPSILON};
use crate::transform::Transform;

pub struct Sphere {
    pub center: Point,
    pub radius: f32,
    pub material: MaterialHandle,
    /// Object-to-world transform evaluated at the ray's time, identity by
    /// default. `center`/`radius` stay in object space; this is what lets a
    /// sphere move (translate/rotate/scale) over the camera's shutter
    /// interval instead of sitting still for the whole exposure.
    pub transform: Transform,
}

impl Sphere {
    pub fn new(center: Point, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            material,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(center: Point, radius: f32, material: Arc<dyn Material>, transform: Transform) -> Self {
        Self { center, radius, material, transform }
    }

    /// Solve `a*t^2 + b*t + c = 0` for `ray` in object space (origin
    /// translated so the sphere sits at the origin), returning the ordered
    /// roots if any. Uses the numerically stable quadratic form
    /// (`q = -0.5*(b +- sqrt(disc))`, branch chosen by the sign of `b`) to
    /// avoid catastrophic cancellation when `b` and the discriminant are
    /// close in magnitude.
    fn solve_roots(&self, origin: Point, direction: Vector) -> Option<(f32, f32)> {
        let oc = origin - self.center;
        let a = direction.length_sqr();
        let b = 2.0 * oc.dot(&direction);
        let c = oc.length_sqr() - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let q = if b < 0.0 { -0.5 * (b - sqrt_disc) } else { -0.5 * (b + sqrt_disc) };
        let (t0, t1) = (q / a, c / q);
        if t0 <= t1 {
            Some((t0, t1))
        } else {
            Some((t1, t0))
        }
    }

    fn pick_t(&self, origin: Point, direction: Vector, t_max: f32) -> Option<f32> {
        let (t0, t1) = self.solve_roots(origin, direction)?;
        if t0 >= RAY_EPSILON && t0 <= t_max {
            Some(t0)
        } else if t1 >= RAY_EPSILON && t1 <= t_max {
            Some(t1)
        } else {
            None
        }
    }

    /// `ray` transformed into object space at its own time. Translation,
    /// rotation and scale all come from `self.transform`'s pose at
    /// `ray.time`; under the identity transform this is just `ray.origin`/
    /// `ray.direction` unchanged. Affine transforms distribute over the ray
    /// equation, so the `t` found against this local ray is the same `t`
    /// the world-space ray hits at -- only the origin/direction need
    /// remapping, not the hit parameter itself.
    fn local_ray(&self, ray: &Ray) -> (Point, Vector) {
        if self.transform.is_identity() {
            (ray.origin, ray.direction)
        } else {
            (
                self.transform.to_local_point(ray.origin, ray.time),
                self.transform.to_local_vector(ray.direction, ray.time),
            )
        }
    }
}

impl Shape for Sphere {
    fn intersect<'a>(&'a self, isect: &mut Intersection<'a>) -> bool {
        let (origin, direction) = self.local_ray(&isect.ray);
        match self.pick_t(origin, direction, isect.t) {
            Some(t) if t < isect.t => {
                isect.t = t;
                isect.shape = Some(self);
                isect.material = Some(self.material.as_ref());
                isect.color_modifier = Color::WHITE;
                let local_hit = origin + direction * t;
                let local_normal = Normal::from((local_hit - self.center) / self.radius);
                let n = if self.transform.is_identity() {
                    local_normal
                } else {
                    self.transform.from_local_normal(local_normal, isect.ray.time)
                };
                isect.normal = n.face_forward(&isect.ray.direction);
                true
            }
            _ => false,
        }
    }

    fn does_intersect(&self, ray: &Ray) -> bool {
        let (origin, direction) = self.local_ray(ray);
        self.pick_t(origin, direction, ray.t_max).is_some()
    }

    fn bbox(&self) -> BBox {
        let r = Vector::broadcast(self.radius);
        let local = BBox::new(self.center - r, self.center + r);
        let Some((lo, hi)) = self.transform.time_domain() else {
            return local;
        };
        // The BVH is built once before rendering and has no notion of time,
        // so its bbox must cover every pose the shutter interval can land
        // on, not just one. Sample the keyframe range at a handful of
        // points and union the transformed corners at each: exact for
        // translation (piecewise-linear between keys, so its extrema are
        // at the keys themselves) and a close approximation for rotation.
        let corners = [
            Point::new(local.min.x, local.min.y, local.min.z),
            Point::new(local.max.x, local.min.y, local.min.z),
            Point::new(local.min.x, local.max.y, local.min.z),
            Point::new(local.max.x, local.max.y, local.min.z),
            Point::new(local.min.x, local.min.y, local.max.z),
            Point::new(local.max.x, local.min.y, local.max.z),
            Point::new(local.min.x, local.max.y, local.max.z),
            Point::new(local.max.x, local.max.y, local.max.z),
        ];
        const TIME_SAMPLES: usize = 8;
        let mut bounds = BBox::empty();
        for i in 0..TIME_SAMPLES {
            let t = if TIME_SAMPLES == 1 {
                lo
            } else {
                lo + (hi - lo) * (i as f32 / (TIME_SAMPLES - 1) as f32)
            };
            for &c in &corners {
                bounds = bounds.union_point(self.transform.from_local_point(c, t));
            }
        }
        bounds
    }

    fn sample_surface(&self, ref_pos: Point, _ref_normal: Normal, ref_time: f32, u1: f32, u2: f32, _u3: f32) -> Option<SurfaceSample> {
        // Uniform point on the unit sphere, scaled and translated onto this
        // sphere, then carried from object to world space at the
        // reference ray's time so a moving sphere is sampled at the pose
        // the shadow ray will actually test against.
        let z = 1.0 - 2.0 * u1;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * u2;
        let local = Vector::new(r * phi.cos(), r * phi.sin(), z);
        let local_point = self.center + local * self.radius;
        let local_normal = Normal::from(local);
        let (point, normal) = if self.transform.is_identity() {
            (local_point, local_normal)
        } else {
            (
                self.transform.from_local_point(local_point, ref_time),
                self.transform.from_local_normal(local_normal, ref_time),
            )
        };

        let to_ref = ref_pos - point;
        let dist_sqr = to_ref.length_sqr();
        if dist_sqr <= 0.0 {
            return None;
        }
        let dist = dist_sqr.sqrt();
        let cos_theta = (to_ref / dist).dot(&Vector::from(normal)).abs();
        let area = 4.0 * PI * self.radius * self.radius;
        let pdf = super::sanitize_pdf(dist_sqr / (area * cos_theta));
        Some(SurfaceSample { point, normal, pdf })
    }

    fn pdf_sa(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, surf_pos: Point, surf_normal: Normal) -> f32 {
        let to_ref = ref_pos - surf_pos;
        let dist_sqr = to_ref.length_sqr();
        if dist_sqr <= 0.0 {
            return 0.0;
        }
        let dist = dist_sqr.sqrt();
        let cos_theta = (to_ref / dist).dot(&Vector::from(surf_normal)).abs();
        if cos_theta <= 0.0 {
            return 0.0;
        }
        let area = 4.0 * PI * self.radius * self.radius;
        super::sanitize_pdf(dist_sqr / (area * cos_theta))
    }

    fn is_light(&self) -> bool {
        !self.material.emittance().is_black()
    }

    fn emitted(&self) -> Color {
        self.material.emittance()
    }

    fn find_lights<'a>(&'a self, out: &mut Vec<&'a dyn Shape>) {
        if self.is_light() {
            out.push(self);
        }
    }
}
