use crate::math::{BBox, Color, Normal, Point, Vector};
use crate::ray::{Intersection, Ray};
use crate::shapes::{Shape, SurfaceSample};

/// A zero-area light at a fixed position. Never intersectable -- a random
/// ray has zero probability of passing through a single point -- so it can
/// only contribute via next-event estimation, never via BRDF extension.
/// `sample_surface` always returns the same position with `pdf = 1`: since
/// there is nothing to integrate over (the "surface" is a single point),
/// the sampling distribution is a certainty rather than a density.
pub struct PointLight {
    pub position: Point,
    pub radiance: Color,
}

impl PointLight {
    pub fn new(position: Point, radiance: Color) -> Self {
        Self { position, radiance }
    }
}

impl Shape for PointLight {
    fn intersect<'a>(&'a self, _isect: &mut Intersection<'a>) -> bool {
        false
    }

    fn does_intersect(&self, _ray: &Ray) -> bool {
        false
    }

    fn bbox(&self) -> BBox {
        BBox::singular(self.position)
    }

    fn sample_surface(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, _u1: f32, _u2: f32, _u3: f32) -> Option<SurfaceSample> {
        let to_ref = ref_pos - self.position;
        if to_ref.length_sqr() <= 0.0 {
            return None;
        }
        let normal = Normal::from(to_ref.normalized());
        Some(SurfaceSample {
            point: self.position,
            normal,
            pdf: 1.0,
        })
    }

    fn pdf_sa(&self, _ref_pos: Point, _ref_normal: Normal, _ref_time: f32, surf_pos: Point, _surf_normal: Normal) -> f32 {
        if surf_pos == self.position {
            1.0
        } else {
            0.0
        }
    }

    fn is_light(&self) -> bool {
        true
    }

    fn emitted(&self) -> Color {
        self.radiance
    }

    fn find_lights<'a>(&'a self, out: &mut Vec<&'a dyn Shape>) {
        out.push(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_always_land_on_the_fixed_point() {
        let light = PointLight::new(Point::new(1.0, 2.0, 3.0), Color::WHITE);
        let sample = light.sample_surface(Point::ORIGIN, Normal::new(0.0, 1.0, 0.0), 0.0, 0.3, 0.7, 0.1).unwrap();
        assert_eq!(sample.point, light.position);
        assert_eq!(sample.pdf, 1.0);
    }

    #[test]
    fn never_reports_a_geometric_hit() {
        let light = PointLight::new(Point::new(1.0, 2.0, 3.0), Color::WHITE);
        let ray = Ray::new(Point::ORIGIN, Vector::new(1.0, 2.0, 3.0).normalized(), f32::INFINITY, 0.0);
        assert!(!light.does_intersect(&ray));
        let mut isect = Intersection::new(ray);
        assert!(!light.intersect(&mut isect));
    }
}
