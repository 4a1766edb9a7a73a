//! Materials and BRDFs. A material looks at an intersection and hands back
//! a color modifier plus a BRDF (or `None` for a pure emitter, which
//! terminates the path after its emission is gathered); the BRDF itself is
//! a closed, fixed set of scattering models represented as a value enum
//! rather than a boxed trait object, since there is no per-hit allocation
//! to amortize and the set of kinds never grows at runtime.

mod diffuse;
mod emitter;
mod glossy;
mod mirror;

pub use diffuse::Diffuse;
pub use emitter::Emitter;
pub use glossy::Glossy;
pub use mirror::Mirror;

use std::sync::Arc;

use crate::math::{Color, Normal, Vector};
use crate::ray::Intersection;

/// Shared ownership handle to a material, the way shapes and lights refer
/// to the material they were built with.
pub type MaterialHandle = Arc<dyn Material>;

/// The reflectance model returned by a material's `evaluate`. Carries no
/// color of its own -- the material multiplies its own color (and the
/// intersection's color modifier) on top of the scalar reflectance this
/// produces.
#[derive(Debug, Copy, Clone)]
pub enum Brdf {
    Lambertian,
    Phong { exponent: f32 },
    Mirror,
}

impl Brdf {
    /// Perfectly specular distributions have a Dirac-delta PDF: they can't
    /// be hit by sampling an arbitrary direction, so next-event estimation
    /// must skip them entirely and rely on path extension instead.
    pub fn is_dirac(&self) -> bool {
        matches!(self, Brdf::Mirror)
    }

    /// Draw an incoming direction `wi` given the outgoing direction `wo`
    /// and the shading normal. Returns `(wi, pdf, reflectance)`; `pdf == 0`
    /// signals a degenerate sample (reflectance is meaningless in that
    /// case).
    pub fn sample_sa(&self, u1: f32, u2: f32, wo: Vector, normal: Normal) -> (Vector, f32, f32) {
        match *self {
            Brdf::Lambertian => {
                let n = Vector::from(normal);
                let (t, bt) = crate::math::coordinate_system(n);
                let (dx, dy) = crate::math::concentric_sample_disk(u1, u2);
                let dz = (1.0 - dx * dx - dy * dy).max(0.0).sqrt();
                let wi = (t * dx + bt * dy + n * dz).normalized();
                let cos_theta = dz;
                if cos_theta <= 0.0 {
                    (wi, 0.0, 0.0)
                } else {
                    (wi, cos_theta / crate::math::PI, 1.0 / crate::math::PI)
                }
            }
            Brdf::Phong { exponent } => {
                let mirror_dir = wo.reflect(&normal).normalized();
                let (t, bt) = crate::math::coordinate_system(mirror_dir);
                let cos_theta = u1.powf(1.0 / (exponent + 1.0));
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                let phi = 2.0 * crate::math::PI * u2;
                let wi = (t * (sin_theta * phi.cos()) + bt * (sin_theta * phi.sin()) + mirror_dir * cos_theta)
                    .normalized();
                let n = Vector::from(normal);
                if wi.dot(&n) <= 0.0 {
                    (wi, 0.0, 0.0)
                } else {
                    let pdf = (exponent + 1.0) / (2.0 * crate::math::PI) * cos_theta.powf(exponent);
                    let refl = (exponent + 2.0) / (exponent + 1.0) * pdf;
                    (wi, pdf, refl)
                }
            }
            Brdf::Mirror => {
                let wi = wo.reflect(&normal).normalized();
                (wi, 1.0, 1.0)
            }
        }
    }

    /// Evaluate `(pdf, reflectance)` for an already-known pair of
    /// directions, used by the light -> BRDF side of MIS. Always
    /// `(0.0, 0.0)` for Dirac distributions: the probability of hitting any
    /// specific direction is zero.
    pub fn evaluate_sa(&self, wi: Vector, wo: Vector, normal: Normal) -> (f32, f32) {
        match *self {
            Brdf::Lambertian => {
                let cos_theta = wi.dot(&Vector::from(normal));
                if cos_theta > 0.0 {
                    (cos_theta / crate::math::PI, 1.0 / crate::math::PI)
                } else {
                    (0.0, 0.0)
                }
            }
            Brdf::Phong { exponent } => {
                let n = Vector::from(normal);
                if wi.dot(&n) <= 0.0 {
                    return (0.0, 0.0);
                }
                let mirror_dir = wo.reflect(&normal).normalized();
                let cos_alpha = wi.dot(&mirror_dir).max(0.0);
                let pdf = (exponent + 1.0) / (2.0 * crate::math::PI) * cos_alpha.powf(exponent);
                let refl = (exponent + 2.0) / (2.0 * crate::math::PI) * cos_alpha.powf(exponent);
                (pdf, refl)
            }
            Brdf::Mirror => (0.0, 0.0),
        }
    }
}

/// A material looks at an intersection and produces a color modifier plus
/// the BRDF (and its mixture weight) to use for subsequent sampling. The
/// weight divides out of the path throughput the same way a Russian
/// roulette survival probability would, so a material that internally
/// mixes several BRDFs stays energy-consistent without the integrator
/// knowing about the mixture.
pub trait Material: Send + Sync {
    fn evaluate(&self, isect: &Intersection) -> (Color, Option<Brdf>, f32);

    /// Constant outgoing radiance; non-zero only for emitters.
    fn emittance(&self) -> Color {
        Color::BLACK
    }
}
