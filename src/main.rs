//! Entry point: parse CLI flags, assemble the demo scene, render it, write
//! the PPM. `-s` optionally loads an additional mesh from a Wavefront OBJ
//! file into the scene; without it the scene is the built-in demo.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use aperture::camera::Camera;
use aperture::cli::{self, ParseOutcome, RenderConfig};
use aperture::error::RenderError;
use aperture::image::Image;
use aperture::lights::rectangle_light;
use aperture::logging;
use aperture::material::{Diffuse, Mirror};
use aperture::math::{Color, Point, Vector};
use aperture::obj;
use aperture::render;
use aperture::shapes::{Plane, Shape, ShapeSet, Sphere};
use aperture::transform::Transform;

/// Assembles the fixed demo scene used by the end-to-end scenarios: a
/// white diffuse floor, a mirror sphere, a red diffuse back wall, and a
/// rectangle light overhead. `extra_mesh_path`, if given, loads an
/// additional OBJ mesh (diffuse white) into the scene.
fn build_demo_scene(extra_mesh_path: Option<&Path>) -> Result<ShapeSet, RenderError> {
    let mut shapes: Vec<Box<dyn Shape>> = Vec::new();

    shapes.push(Box::new(Plane::new(
        Point::new(0.0, -2.0, 0.0),
        aperture::math::Normal::new(0.0, 1.0, 0.0),
        Arc::new(Diffuse::new(Color::new(0.8, 0.8, 0.8))),
    )));

    shapes.push(Box::new(Sphere::new(Point::new(0.0, -1.0, 0.0), 1.0, Arc::new(Mirror::new(Color::new(0.95, 0.95, 0.95))))));

    // Keyframed across the shutter interval so it motion-blurs against the
    // camera's non-zero shutter duration instead of sitting still.
    let wobble = Transform::from_keys(&[
        (0.0, Vector::new(2.5, -1.4, -1.0), aperture::math::Quaternion::IDENTITY, Vector::broadcast(1.0)),
        (1.0, Vector::new(2.5, -1.4, -0.4), aperture::math::Quaternion::IDENTITY, Vector::broadcast(1.0)),
    ]);
    shapes.push(Box::new(Sphere::with_transform(
        Point::ORIGIN,
        0.6,
        Arc::new(Diffuse::new(Color::new(0.9, 0.2, 0.2))),
        wobble,
    )));

    shapes.push(Box::new(rectangle_light(
        Point::new(-1.5, 4.0, -1.5),
        Vector::new(3.0, 0.0, 0.0),
        Vector::new(0.0, 0.0, 3.0),
        Color::broadcast(5.0),
    )));

    if let Some(path) = extra_mesh_path {
        let meshes = obj::load_meshes(path, Arc::new(Diffuse::new(Color::WHITE)))?;
        for mesh in meshes {
            shapes.push(Box::new(mesh));
        }
    }

    for shape in &mut shapes {
        shape.prepare();
    }

    Ok(ShapeSet::new(shapes))
}

fn build_demo_camera() -> Camera {
    Camera::look_at(
        Point::new(-4.0, 5.0, 15.0),
        Point::ORIGIN,
        Vector::new(0.0, 1.0, 0.0),
        40.0,
        0.0,
        1.0,
        0.0,
        1.0,
    )
}

fn write_image(image: &Image, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(RenderError::ImageIo)?;
        }
    }
    let file = File::create(path).map_err(RenderError::ImageIo)?;
    let mut writer = BufWriter::new(file);
    image.write_ppm(&mut writer).map_err(RenderError::ImageIo)
}

fn run(config: &RenderConfig) -> anyhow::Result<()> {
    info!("rendering {}x{} at {} pixel samples/side, depth {}", config.width, config.height, config.pixel_samples, config.max_depth);

    let scene = build_demo_scene(config.scene_path.as_deref().map(Path::new))
        .with_context(|| "assembling scene".to_string())?;
    let camera = build_demo_camera();

    let image = render::render(&scene, &camera, config);

    let output_path = Path::new(&config.output);
    write_image(&image, output_path).with_context(|| format!("writing output image {}", output_path.display()))?;

    info!("wrote {}", output_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args: Vec<String> = std::env::args().collect();

    match cli::parse(&args)? {
        ParseOutcome::Help(usage) => {
            println!("{usage}");
            Ok(())
        }
        ParseOutcome::Run(config) => run(&config),
    }
}
