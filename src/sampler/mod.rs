//! Stratified sample production. A `Sampler` hands out 1-D/2-D samples
//! indexed by a caller-supplied integer rather than pulling from an
//! internal cursor, so the same index always maps to the same sample --
//! this is what lets the integrator draw the same 2-D sample for a given
//! bounce across every pixel sample, preserving stratification across
//! bounces (see `SamplerContainer`).

mod cmj;
mod container;

pub use cmj::Cmj;
pub use container::SamplerContainer;

pub trait Sampler {
    /// Total count of 2-D samples this sampler can produce while
    /// maintaining its stratification guarantee (nx * ny for a grid
    /// sampler).
    fn total_2d_samples_available(&self) -> usize;

    fn sample_1d(&self, index: usize) -> f32;

    fn sample_2d(&self, index: usize) -> (f32, f32);

    /// Reseed the decorrelating permutation for the next pixel, keeping
    /// the same strata layout.
    fn refill(&mut self, seed: u32);
}
