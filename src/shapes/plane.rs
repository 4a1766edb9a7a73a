use std::sync::Arc;

use super::{Shape, SurfaceSample};
use crate::material::{Material, MaterialHandle};
use crate::math::{BBox, Color, Normal, Point};
use crate::ray::{Intersection, Ray, RAY_EPSILON};

/// Procedural "bullseye" color modulation: alternating rings of `color_a`
/// and `color_b` every `bandwidth` units of distance from `center`. Two
/// files in the originating codebase presented this as a separate shape
/// (`Plane` with bullseye baked in) and a plain `InfinitePlane`; here it's
/// just an optional field on the one shape.
#[derive(Debug, Clone, Copy)]
pub struct BullseyeParams {
    pub center: Point,
    pub bandwidth: f32,
    pub color_a: Color,
    pub color_b: Color,
}

/// An infinite plane through `position` with unit normal `normal`.
pub struct Plane {
    pub position: Point,
    pub normal: Normal,
    pub material: MaterialHandle,
    pub bullseye: Option<BullseyeParams>,
    /// When true, only the side the normal points towards can be hit.
    pub one_sided: bool,
}

impl Plane {
    pub fn new(position: Point, normal: Normal, material: Arc<dyn Material>) -> Self {
        Self {
            position,
            normal: normal.normalized(),
            material,
            bullseye: None,
            one_sided: false,
        }
    }

    pub fn with_bullseye(mut self, bullseye: BullseyeParams) -> Self {
        self.bullseye = Some(bullseye);
        self
    }

    pub fn one_sided(mut self) -> Self {
        self.one_sided = true;
        self
    }

    fn solve_t(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction.dot_nrm(&self.normal);
        if denom == 0.0 || !denom.is_finite() {
            return None;
        }
        if self.one_sided && denom > 0.0 {
            return None;
        }
        let t = (self.position - ray.origin).dot_nrm(&self.normal) / denom;
        if !t.is_finite() || t < RAY_EPSILON || t > ray.t_max {
            return None;
        }
        Some(t)
    }

    fn color_modifier(&self, hit: Point) -> Color {
        match self.bullseye {
            None => Color::WHITE,
            Some(b) => {
                let dist = (hit - b.center).length();
                let band = (dist / b.bandwidth) as i64;
                if band % 2 == 0 {
                    b.color_a
                } else {
                    b.color_b
                }
            }
        }
    }
}

impl Shape for Plane {
    fn intersect<'a>(&'a self, isect: &mut Intersection<'a>) -> bool {
        match self.solve_t(&isect.ray) {
            Some(t) if t < isect.t => {
                isect.t = t;
                isect.shape = Some(self);
                isect.material = Some(self.material.as_ref());
                let hit = isect.ray.at(t);
                isect.color_modifier = self.color_modifier(hit);
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
        BBox::new(Point::broadcast(f32::NEG_INFINITY), Point::broadcast(f32::INFINITY))
    }

    fn sample_surface(
        &self,
        _ref_pos: Point,
        _ref_normal: Normal,
        _ref_time: f32,
        _u1: f32,
        _u2: f32,
        _u3: f32,
    ) -> Option<SurfaceSample> {
        None
    }

    fn pdf_sa(&self, _ref_pos: Point, _ref_normal: Normal, _ref_time: f32, _surf_pos: Point, _surf_normal: Normal) -> f32 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Diffuse;
    use crate::math::Vector;

    fn plane() -> Plane {
        Plane::new(Point::new(0.0, -2.0, 0.0), Normal::new(0.0, 1.0, 0.0), Arc::new(Diffuse::new(Color::WHITE)))
    }

    #[test]
    fn straight_down_ray_hits_at_expected_t() {
        let p = plane();
        let ray = Ray::new(Point::new(0.0, 5.0, 0.0), Vector::new(0.0, -1.0, 0.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(p.intersect(&mut isect));
        assert!((isect.t - 7.0).abs() < 1e-4);
    }

    #[test]
    fn parallel_ray_misses() {
        let p = plane();
        let ray = Ray::new(Point::new(0.0, 5.0, 0.0), Vector::new(1.0, 0.0, 0.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(!p.intersect(&mut isect));
    }

    #[test]
    fn normal_faces_incoming_ray() {
        let p = plane();
        let ray = Ray::new(Point::new(0.0, 5.0, 0.0), Vector::new(0.0, -1.0, 0.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        p.intersect(&mut isect);
        assert!(isect.normal.dot(&ray.direction) <= 0.0);
    }
}
