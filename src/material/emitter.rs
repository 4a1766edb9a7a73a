use super::{Brdf, Material};
use crate::math::Color;
use crate::ray::Intersection;

/// A pure light-emitting material. It has no scattering behavior of its
/// own -- `evaluate` hands back `None` for the BRDF, which tells the
/// integrator to terminate the path after gathering this hit's emission
/// rather than trying to bounce further.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    pub radiance: Color,
}

impl Emitter {
    pub fn new(radiance: Color) -> Self {
        Self { radiance }
    }
}

impl Material for Emitter {
    fn evaluate(&self, _isect: &Intersection) -> (Color, Option<Brdf>, f32) {
        (Color::WHITE, None, 1.0)
    }

    fn emittance(&self) -> Color {
        self.radiance
    }
}
