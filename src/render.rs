//! The render driver: walks pixels, draws stratified samples through the
//! camera, hands each resulting ray to the integrator, and writes the
//! averaged result into the output image. Parallelized by tiling the image
//! into 8x8 blocks dispatched across a `scoped_threadpool::Pool`.

use std::sync::mpsc;

use scoped_threadpool::Pool;

use crate::camera::Camera;
use crate::cli::RenderConfig;
use crate::image::Image;
use crate::integrator;
use crate::math::Color;
use crate::sampler::{Sampler, SamplerContainer};
use crate::shapes::Shape;

const TILE_SIZE: usize = 8;

struct Tile {
    x0: usize,
    y0: usize,
    w: usize,
    h: usize,
}

fn tiles_for(width: usize, height: usize) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y0 = 0;
    while y0 < height {
        let h = TILE_SIZE.min(height - y0);
        let mut x0 = 0;
        while x0 < width {
            let w = TILE_SIZE.min(width - x0);
            tiles.push(Tile { x0, y0, w, h });
            x0 += TILE_SIZE;
        }
        y0 += TILE_SIZE;
    }
    tiles
}

/// Deterministic per-pixel seed derived from its coordinates, so a render
/// with a given config always reproduces the same image regardless of
/// worker scheduling order.
fn pixel_seed(x: usize, y: usize) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x9e37_79b9) ^ (y as u32).wrapping_mul(0x85eb_ca6b);
    h ^= h >> 15;
    h
}

fn render_tile(
    tile: &Tile,
    scene: &dyn Shape,
    lights: &[&dyn Shape],
    camera: &Camera,
    config: &RenderConfig,
    width: usize,
    height: usize,
) -> Vec<Color> {
    let mut container = SamplerContainer::new(config.pixel_samples, config.light_samples as u32, config.max_depth, 1);
    let aspect = width as f32 / height as f32;
    let mut out = Vec::with_capacity(tile.w * tile.h);

    for dy in 0..tile.h {
        for dx in 0..tile.w {
            let x = tile.x0 + dx;
            let y = tile.y0 + dy;
            container.refill(pixel_seed(x, y));

            let total_samples = container.total_pixel_samples();
            let mut accum = Color::BLACK;
            for i in 0..total_samples {
                let (pu, pv) = container.subpixel.sample_2d(i);
                let (lu, lv) = container.lens.sample_2d(i);
                let tau = container.time.sample_1d(i);

                let mut xu = (x as f32 + pu) / width as f32;
                xu = (xu - 0.5) * aspect + 0.5;
                let yu = 1.0 - (y as f32 + pv) / height as f32;

                let ray = camera.generate_ray(xu, yu, lu, lv, tau);
                accum += integrator::trace(scene, lights, ray, &container, i, config.max_depth, config.light_samples);
            }
            out.push(if total_samples > 0 { accum / total_samples as f32 } else { Color::BLACK });
        }
    }
    out
}

/// Render `scene` (already `prepare()`d) through `camera` into a fresh
/// `width`x`height` image, per `config`.
pub fn render(scene: &dyn Shape, camera: &Camera, config: &RenderConfig) -> Image {
    let width = config.width;
    let height = config.height;
    let mut image = Image::new(width, height);

    let mut lights = Vec::new();
    scene.find_lights(&mut lights);
    let lights: &[&dyn Shape] = &lights;

    let tiles = tiles_for(width, height);
    let (sender, receiver) = mpsc::channel::<(usize, usize, usize, Vec<Color>)>();
    let mut pool = Pool::new(config.workers.max(1));

    pool.scoped(|scope| {
        for tile in &tiles {
            let sender = sender.clone();
            let tile_x0 = tile.x0;
            let tile_y0 = tile.y0;
            let tile_w = tile.w;
            scope.execute(move || {
                let colors = render_tile(tile, scene, lights, camera, config, width, height);
                let _ = sender.send((tile_x0, tile_y0, tile_w, colors));
            });
        }
    });
    drop(sender);

    for (x0, y0, w, colors) in receiver {
        for (i, color) in colors.into_iter().enumerate() {
            let x = x0 + i % w;
            let y = y0 + i / w;
            image.set_pixel(x, y, color);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiling_covers_every_pixel_exactly_once() {
        let width = 20;
        let height = 13;
        let tiles = tiles_for(width, height);
        let mut seen = vec![false; width * height];
        for tile in &tiles {
            for dy in 0..tile.h {
                for dx in 0..tile.w {
                    let idx = (tile.y0 + dy) * width + (tile.x0 + dx);
                    assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn pixel_seed_is_deterministic_and_varies_by_position() {
        assert_eq!(pixel_seed(3, 4), pixel_seed(3, 4));
        assert_ne!(pixel_seed(3, 4), pixel_seed(4, 3));
    }
}
