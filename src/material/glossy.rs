use super::{Brdf, Material};
use crate::math::Color;
use crate::ray::Intersection;

/// A Phong-like glossy material: a cosine-power lobe centered on the
/// mirror-reflection direction, weighted by `color`. Higher `exponent`
/// values produce a tighter, shinier highlight.
#[derive(Debug, Clone, Copy)]
pub struct Glossy {
    pub color: Color,
    pub exponent: f32,
}

impl Glossy {
    pub fn new(color: Color, exponent: f32) -> Self {
        Self { color, exponent }
    }
}

impl Material for Glossy {
    fn evaluate(&self, _isect: &Intersection) -> (Color, Option<Brdf>, f32) {
        (self.color, Some(Brdf::Phong { exponent: self.exponent }), 1.0)
    }
}
