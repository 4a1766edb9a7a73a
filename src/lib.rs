#![allow(clippy::enum_variant_names)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod camera;
pub mod cli;
pub mod error;
pub mod image;
pub mod integrator;
pub mod lights;
pub mod logging;
pub mod material;
pub mod math;
pub mod obj;
pub mod ray;
pub mod render;
pub mod rng;
pub mod sampler;
pub mod shapes;
pub mod transform;