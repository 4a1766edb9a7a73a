//! Light constructors and the two light kinds that have no backing
//! geometry of their own (point, distant). A rectangle or mesh light is
//! just that shape built with an `Emitter` material -- `Rectangle` and
//! `Polymesh` already report `is_light`/`emitted` from their material, so
//! no separate wrapper type is needed; these two constructors exist purely
//! so a scene can name "a rectangle light" the same way it names "a point
//! light" or "a distant light".

mod distant;
mod point;

pub use distant::DistantLight;
pub use point::PointLight;

use std::sync::Arc;

use crate::material::Emitter;
use crate::math::{Color, Point as P, Vector};
use crate::shapes::{Polymesh, Rectangle};

/// An emissive rectangle: `Rectangle::new` with an `Emitter` material.
pub fn rectangle_light(corner: P, side1: Vector, side2: Vector, radiance: Color) -> Rectangle {
    Rectangle::new(corner, side1, side2, Arc::new(Emitter::new(radiance)))
}

/// Turn an already-built `Polymesh` into a mesh light by swapping in an
/// `Emitter` material. Takes the mesh by value since a mesh light owns its
/// geometry outright (no separate "light version" of a shared mesh).
pub fn mesh_light(mut mesh: Polymesh, radiance: Color) -> Polymesh {
    mesh.material = Arc::new(Emitter::new(radiance));
    mesh
}
