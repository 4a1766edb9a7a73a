use std::sync::Arc;

use super::{Shape, SurfaceSample};
use crate::material::{Material, MaterialHandle};
use crate::math::{BBox, Color, Normal, Point, Vector};
use crate::ray::{Intersection, Ray, RAY_EPSILON};

/// A planar rectangle spanned by two (assumed orthogonal) side vectors from
/// `corner`: `p = corner + u*side1 + v*side2` for `u,v` in `[0,1]`.
/// Double-sided -- its normal flips to face whichever direction the ray (or
/// a reference point, for sampling) arrives from.
pub struct Rectangle {
    pub corner: Point,
    pub side1: Vector,
    pub side2: Vector,
    pub material: MaterialHandle,
    normal: Normal,
    area: f32,
}

impl Rectangle {
    pub fn new(corner: Point, side1: Vector, side2: Vector, material: Arc<dyn Material>) -> Self {
        let normal = Normal::from(side1.cross(&side2).normalized());
        let area = side1.length() * side2.length();
        Self {
            corner,
            side1,
            side2,
            material,
            normal,
            area,
        }
    }

    fn uv_at(&self, p: Point) -> (f32, f32) {
        let d = p - self.corner;
        (d.dot(&self.side1) / self.side1.length_sqr(), d.dot(&self.side2) / self.side2.length_sqr())
    }

    fn solve_t(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction.dot_nrm(&self.normal);
        if denom == 0.0 || !denom.is_finite() {
            return None;
        }
        let t = (self.corner - ray.origin).dot_nrm(&self.normal) / denom;
        if !t.is_finite() || t < RAY_EPSILON || t > ray.t_max {
            return None;
        }
        let (u, v) = self.uv_at(ray.at(t));
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        Some(t)
    }

    /// Solid-angle PDF of having picked `point`/`normal` as a sample viewed
    /// from `ref_pos`, per the area-to-solid-angle Jacobian
    /// `d^2 / (area * |cos theta|)`.
    fn solid_angle_pdf(&self, ref_pos: Point, point: Point, normal: Normal) -> f32 {
        let to_ref = ref_pos - point;
        let dist_sqr = to_ref.length_sqr();
        if dist_sqr <= 0.0 {
            return 0.0;
        }
        let dist = dist_sqr.sqrt();
        let cos_theta = (to_ref / dist).dot(&Vector::from(normal)).abs();
        if cos_theta <= 0.0 {
            return 0.0;
        }
        super::sanitize_pdf(dist_sqr / (self.area * cos_theta))
    }
}

impl Shape for Rectangle {
    fn intersect<'a>(&'a self, isect: &mut Intersection<'a>) -> bool {
        match self.solve_t(&isect.ray) {
            Some(t) if t < isect.t => {
                isect.t = t;
                isect.shape = Some(self);
                isect.material = Some(self.material.as_ref());
                isect.color_modifier = Color::WHITE;
                isect.normal = self.normal.face_forward(&isect.ray.direction);
                true
            }
            _ => false,
        }
    }

    fn does_intersect(&self, ray: &Ray) -> bool {
        self.solve_t(ray).is_some()
    }

    fn bbox(&self) -> BBox {
        BBox::singular(self.corner)
            .union_point(self.corner + self.side1)
            .union_point(self.corner + self.side2)
            .union_point(self.corner + self.side1 + self.side2)
    }

    fn sample_surface(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, u1: f32, u2: f32, _u3: f32) -> Option<SurfaceSample> {
        let point = self.corner + self.side1 * u1 + self.side2 * u2;
        let normal = self.normal.face_forward(&(point - ref_pos));
        let pdf = self.solid_angle_pdf(ref_pos, point, normal);
        if pdf <= 0.0 {
            return None;
        }
        Some(SurfaceSample { point, normal, pdf })
    }

    fn pdf_sa(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, surf_pos: Point, surf_normal: Normal) -> f32 {
        self.solid_angle_pdf(ref_pos, surf_pos, surf_normal)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Emitter;

    #[test]
    fn hit_inside_bounds() {
        let rect = Rectangle::new(
            Point::new(-1.0, 4.0, -1.0),
            Vector::new(2.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, 2.0),
            Arc::new(Emitter::new(Color::WHITE)),
        );
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vector::new(0.0, 1.0, 0.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(rect.intersect(&mut isect));
        assert!((isect.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn miss_outside_bounds() {
        let rect = Rectangle::new(
            Point::new(-1.0, 4.0, -1.0),
            Vector::new(2.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, 2.0),
            Arc::new(Emitter::new(Color::WHITE)),
        );
        let ray = Ray::new(Point::new(5.0, 0.0, 5.0), Vector::new(0.0, 1.0, 0.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(!rect.intersect(&mut isect));
    }

    #[test]
    fn head_on_pdf_matches_closed_form() {
        // 1x1 rectangle viewed head-on from distance 2: pdf should be
        // d^2 / (A * cos theta) = 4 / (1 * 1) = 4.
        let rect = Rectangle::new(
            Point::new(-0.5, 0.0, -0.5),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, 1.0),
            Arc::new(Emitter::new(Color::WHITE)),
        );
        let ref_pos = Point::new(0.0, -2.0, 0.0);
        let mut harmonic_sum = 0.0;
        let n = 2000;
        let mut rng = crate::rng::Rng::seeded(11);
        let mut count = 0;
        for _ in 0..n {
            if let Some(s) = rect.sample_surface(ref_pos, Normal::new(0.0, 1.0, 0.0), 0.0, rng.next_f32(), rng.next_f32(), rng.next_f32()) {
                harmonic_sum += 1.0 / s.pdf;
                count += 1;
            }
        }
        let harmonic_mean = count as f32 / harmonic_sum;
        assert!((harmonic_mean - 4.0).abs() / 4.0 < 0.02);
    }
}
