use crate::math::{coordinate_system, BBox, Color, Normal, Point, Vector, PI};
use crate::ray::{Intersection, Ray};
use crate::shapes::{sanitize_pdf, Shape, SurfaceSample};

/// Distance at which a distant light's samples are placed, standing in for
/// infinity without introducing non-finite coordinates into the ray.
const LIGHT_DISTANCE: f32 = 1.0e6;

/// A directional light (the sun, at scale): rather than a single ray
/// direction with a delta PDF, it is treated as a very distant, very small
/// emissive disk -- samples are drawn from a narrow cone around the
/// light's principal direction and placed far away along the sampled
/// direction, with a uniform-cone solid-angle PDF. This avoids the
/// inconsistent position-scaling formula an earlier version of this idea
/// used, replacing it with ordinary cone sampling.
pub struct DistantLight {
    /// Unit direction the light travels, i.e. from the light towards the
    /// scene (the sun's rays point this way).
    pub direction: Vector,
    pub radiance: Color,
    cos_theta_max: f32,
    solid_angle: f32,
}

impl DistantLight {
    /// `half_angle_radians` is the angular radius of the emitting disk as
    /// seen from the scene; the sun's is about 0.0087 rad.
    pub fn new(direction: Vector, radiance: Color, half_angle_radians: f32) -> Self {
        let cos_theta_max = half_angle_radians.cos();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        Self {
            direction: direction.normalized(),
            radiance,
            cos_theta_max,
            solid_angle,
        }
    }

    fn direction_to_light(&self) -> Vector {
        -self.direction
    }
}

impl Shape for DistantLight {
    fn intersect<'a>(&'a self, _isect: &mut Intersection<'a>) -> bool {
        false
    }

    fn does_intersect(&self, _ray: &Ray) -> bool {
        false
    }

    fn bbox(&self) -> BBox {
        BBox::empty()
    }

    fn sample_surface(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, u1: f32, u2: f32, _u3: f32) -> Option<SurfaceSample> {
        let w = self.direction_to_light();
        let (t, bt) = coordinate_system(w);
        let cos_theta = 1.0 - u1 * (1.0 - self.cos_theta_max);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u2;
        let dir = (t * (sin_theta * phi.cos()) + bt * (sin_theta * phi.sin()) + w * cos_theta).normalized();

        let point = ref_pos + dir * LIGHT_DISTANCE;
        let normal = Normal::from(-dir);
        let pdf = sanitize_pdf(1.0 / self.solid_angle);
        if pdf <= 0.0 {
            return None;
        }
        Some(SurfaceSample { point, normal, pdf })
    }

    fn pdf_sa(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, surf_pos: Point, _surf_normal: Normal) -> f32 {
        let dir = (surf_pos - ref_pos).normalized();
        if dir.dot(&self.direction_to_light()) >= self.cos_theta_max {
            sanitize_pdf(1.0 / self.solid_angle)
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
    fn samples_land_within_the_cone_of_the_principal_direction() {
        let light = DistantLight::new(Vector::new(0.0, -1.0, 0.0), Color::WHITE, 0.05);
        let mut rng = crate::rng::Rng::seeded(3);
        let ref_pos = Point::ORIGIN;
        for _ in 0..200 {
            let sample = light.sample_surface(ref_pos, Normal::new(0.0, 1.0, 0.0), 0.0, rng.next_f32(), rng.next_f32(), rng.next_f32()).unwrap();
            let dir = (sample.point - ref_pos).normalized();
            assert!(dir.dot(&light.direction_to_light()) >= light.cos_theta_max - 1e-5);
        }
    }

    #[test]
    fn pdf_is_zero_outside_the_cone() {
        let light = DistantLight::new(Vector::new(0.0, -1.0, 0.0), Color::WHITE, 0.05);
        let ref_pos = Point::ORIGIN;
        let far_off = ref_pos + Vector::new(1.0, 0.0, 0.0) * LIGHT_DISTANCE;
        assert_eq!(light.pdf_sa(ref_pos, Normal::new(0.0, 1.0, 0.0), 0.0, far_off, Normal::new(-1.0, 0.0, 0.0)), 0.0);
    }
}
