//! Perspective camera with thin-lens depth of field and shutter-interval
//! time sampling for motion blur.

use crate::math::{concentric_sample_disk, radians, Point, Vector};
use crate::ray::{Ray, RAY_T_MAX};

pub struct Camera {
    origin: Point,
    forward: Vector,
    right: Vector,
    up: Vector,
    lens_radius: f32,
    focal_distance: f32,
    shutter_open: f32,
    shutter_close: f32,
    tan_half_fov: f32,
}

impl Camera {
    /// Build a camera at `eye` looking towards `target`, with `up_hint`
    /// resolving the roll ambiguity (need not be orthogonal to the view
    /// direction). `fov_degrees` is the full vertical field of view.
    pub fn look_at(
        eye: Point,
        target: Point,
        up_hint: Vector,
        fov_degrees: f32,
        lens_radius: f32,
        focal_distance: f32,
        shutter_open: f32,
        shutter_close: f32,
    ) -> Self {
        let forward = (target - eye).normalized();
        let right = forward.cross(&up_hint).normalized();
        let up = right.cross(&forward).normalized();
        Self {
            origin: eye,
            forward,
            right,
            up,
            lens_radius,
            focal_distance,
            shutter_open,
            shutter_close,
            tan_half_fov: radians(fov_degrees * 0.5).tan(),
        }
    }

    /// `xu, yu` are screen coordinates in `[0,1]` (already aspect
    /// corrected by the caller); `lens_u, lens_v` and `time_u` are in
    /// `[0,1]`.
    pub fn generate_ray(&self, xu: f32, yu: f32, lens_u: f32, lens_v: f32, time_u: f32) -> Ray {
        let time = self.shutter_open + time_u * (self.shutter_close - self.shutter_open);

        let px = (2.0 * xu - 1.0) * self.tan_half_fov;
        let py = (2.0 * yu - 1.0) * self.tan_half_fov;
        let dir = (self.forward + self.right * px + self.up * py).normalized();

        if self.lens_radius > 0.0 {
            let (lx, ly) = concentric_sample_disk(lens_u, lens_v);
            let lens_offset = self.right * (lx * self.lens_radius) + self.up * (ly * self.lens_radius);
            let origin = self.origin + lens_offset;
            let focal_point = self.origin + dir * self.focal_distance;
            let direction = (focal_point - origin).normalized();
            Ray::new(origin, direction, RAY_T_MAX, time)
        } else {
            Ray::new(self.origin, dir, RAY_T_MAX, time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_screen_points_straight_at_the_target() {
        let cam = Camera::look_at(Point::new(0.0, 0.0, -5.0), Point::ORIGIN, Vector::new(0.0, 1.0, 0.0), 60.0, 0.0, 1.0, 0.0, 1.0);
        let ray = cam.generate_ray(0.5, 0.5, 0.0, 0.0, 0.0);
        assert!((ray.direction - Vector::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn wider_fov_spreads_corner_rays_further() {
        let narrow = Camera::look_at(Point::ORIGIN, Point::new(0.0, 0.0, 1.0), Vector::new(0.0, 1.0, 0.0), 30.0, 0.0, 1.0, 0.0, 1.0);
        let wide = Camera::look_at(Point::ORIGIN, Point::new(0.0, 0.0, 1.0), Vector::new(0.0, 1.0, 0.0), 90.0, 0.0, 1.0, 0.0, 1.0);
        let narrow_edge = narrow.generate_ray(1.0, 0.5, 0.0, 0.0, 0.0);
        let wide_edge = wide.generate_ray(1.0, 0.5, 0.0, 0.0, 0.0);
        assert!(wide_edge.direction.x > narrow_edge.direction.x);
    }

    #[test]
    fn lens_offset_stays_within_the_lens_radius() {
        let cam = Camera::look_at(Point::new(0.0, 0.0, -5.0), Point::ORIGIN, Vector::new(0.0, 1.0, 0.0), 60.0, 0.2, 5.0, 0.0, 1.0);
        let ray = cam.generate_ray(0.5, 0.5, 0.9, 0.1, 0.0);
        assert!((ray.origin - cam.origin).length() <= 0.2 + 1e-5);
    }

    #[test]
    fn shutter_interval_maps_time_sample_linearly() {
        let cam = Camera::look_at(Point::ORIGIN, Point::new(0.0, 0.0, 1.0), Vector::new(0.0, 1.0, 0.0), 60.0, 0.0, 1.0, 2.0, 4.0);
        assert!((cam.generate_ray(0.5, 0.5, 0.0, 0.0, 0.0).time - 2.0).abs() < 1e-6);
        assert!((cam.generate_ray(0.5, 0.5, 0.0, 0.0, 1.0).time - 4.0).abs() < 1e-6);
        assert!((cam.generate_ray(0.5, 0.5, 0.0, 0.0, 0.5).time - 3.0).abs() < 1e-6);
    }
}
