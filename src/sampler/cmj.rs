use super::Sampler;

/// Kensler's correlated multi-jittered permutation: maps `i` in `[0, l)` to
/// another value in `[0, l)`, bijectively, varying with `p` so a new seed
/// produces an unrelated permutation of the same stratification.
fn permute(i: u32, l: u32, p: u32) -> u32 {
    if l <= 1 {
        return 0;
    }
    let mut w = l - 1;
    w |= w >> 1;
    w |= w >> 2;
    w |= w >> 4;
    w |= w >> 8;
    w |= w >> 16;

    let mut i = i;
    loop {
        i ^= p;
        i = i.wrapping_mul(0xe170893d);
        i ^= p >> 16;
        i ^= (i & w) >> 4;
        i ^= p >> 8;
        i = i.wrapping_mul(0x0929_eb3f);
        i ^= p >> 23;
        i ^= (i & w) >> 1;
        i = i.wrapping_mul(1 | p >> 27);
        i = i.wrapping_mul(0x6935_fa69);
        i ^= (i & w) >> 11;
        i = i.wrapping_mul(0x74dc_b303);
        i ^= (i & w) >> 2;
        i = i.wrapping_mul(0x9e50_1cc3);
        i ^= (i & w) >> 2;
        i = i.wrapping_mul(0xc860_a3df);
        i &= w;
        i ^= i >> 5;
        if i < l {
            break;
        }
    }
    (i + p) % l
}

/// Hash `i` (salted by `p`) to a pseudo-uniform float in `[0,1)`, used as
/// the per-cell jitter.
fn randfloat(i: u32, p: u32) -> f32 {
    let mut i = i;
    i ^= p;
    i ^= i >> 17;
    i ^= i >> 10;
    i = i.wrapping_mul(0xb363_4e5);
    i ^= i >> 12;
    i ^= i >> 21;
    i = i.wrapping_mul(0x93fc_4795);
    i ^= 0xdf6e_307f;
    i ^= i >> 17;
    i = i.wrapping_mul(1 | p >> 18);
    (i as f32) * (1.0 / 4_294_967_808.0)
}

/// A single 2-D correlated multi-jittered sample for global index `s` in an
/// `nx`-by-`ny` grid, seeded by `p`. See Kensler, "Correlated
/// Multi-Jittered Sampling" (2013).
fn cmj_2d(s: u32, nx: u32, ny: u32, p: u32) -> (f32, f32) {
    let sx = permute(s % nx, nx, p.wrapping_mul(0x68bc_21eb));
    let sy = permute(s / nx, ny, p.wrapping_mul(0x02e5_be93));
    let jx = randfloat(s, p.wrapping_mul(0x967a_889b));
    let jy = randfloat(s, p.wrapping_mul(0x368c_c8b7));
    (
        (s % nx) as f32 / nx as f32 + (sy as f32 + jx) / (nx as f32 * ny as f32),
        (s / nx) as f32 / ny as f32 + (sx as f32 + jy) / (nx as f32 * ny as f32),
    )
}

fn cmj_1d(s: u32, n: u32, p: u32) -> f32 {
    let ss = permute(s, n, p.wrapping_mul(0x5163_3e2d));
    let j = randfloat(s, p.wrapping_mul(0x68bc_21eb));
    (ss as f32 + j) / n as f32
}

/// Correlated multi-jittered sampler over an `nx`-by-`ny` grid of strata.
/// `sample_2d(i)` for `i` in `0..nx*ny` returns one jittered sample per
/// cell of the grid with no two samples sharing a cell; `sample_1d` draws
/// from a separate 1-D stratification of the same length.
pub struct Cmj {
    nx: u32,
    ny: u32,
    seed: u32,
}

impl Cmj {
    pub fn new(nx: u32, ny: u32, seed: u32) -> Self {
        Self { nx: nx.max(1), ny: ny.max(1), seed }
    }
}

impl Sampler for Cmj {
    fn total_2d_samples_available(&self) -> usize {
        (self.nx * self.ny) as usize
    }

    fn sample_1d(&self, index: usize) -> f32 {
        let n = self.total_2d_samples_available() as u32;
        cmj_1d(index as u32 % n, n, self.seed)
    }

    fn sample_2d(&self, index: usize) -> (f32, f32) {
        let n = self.total_2d_samples_available() as u32;
        cmj_2d(index as u32 % n, self.nx, self.ny, self.seed)
    }

    fn refill(&mut self, seed: u32) {
        self.seed = seed;
    }
}
