use super::{Brdf, Material};
use crate::math::Color;
use crate::ray::Intersection;

/// Lambertian diffuse material: scatters light equally in every direction
/// of the hemisphere, weighted by `color`.
#[derive(Debug, Clone, Copy)]
pub struct Diffuse {
    pub color: Color,
}

impl Diffuse {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Material for Diffuse {
    fn evaluate(&self, _isect: &Intersection) -> (Color, Option<Brdf>, f32) {
        (self.color, Some(Brdf::Lambertian), 1.0)
    }
}
