use super::{Point, Vector};
use crate::ray::Ray;

/// An axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn empty() -> Self {
        Self {
            min: Point::broadcast(f32::INFINITY),
            max: Point::broadcast(f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn singular(p: Point) -> Self {
        Self { min: p, max: p }
    }

    pub fn union_point(&self, p: Point) -> BBox {
        BBox::new(
            Point::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            Point::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        )
    }

    pub fn union(&self, o: &BBox) -> BBox {
        self.union_point(o.min).union_point(o.max)
    }

    pub fn centroid(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn diagonal(&self) -> Vector {
        self.max - self.min
    }

    /// Axis (0=x,1=y,2=z) along which the box has greatest extent.
    pub fn max_extent_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Ray-slab intersection. Returns the entry/exit parametric distances
    /// (clamped to the ray's own [0, tMax] range) if the ray hits the box.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_min = 0.0f32;
        let mut t_max = ray.t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_grows_to_contain_points() {
        let b = BBox::singular(Point::ORIGIN)
            .union_point(Point::new(1.0, 2.0, -1.0))
            .union_point(Point::new(-3.0, 0.0, 4.0));
        assert_eq!(b.min, Point::new(-3.0, 0.0, -1.0));
        assert_eq!(b.max, Point::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn ray_through_box_hits() {
        let b = BBox::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        let hit = b.intersect(&ray);
        assert!(hit.is_some());
        let (t0, t1) = hit.unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);
    }

    #[test]
    fn ray_missing_box() {
        let b = BBox::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point::new(5.0, 5.0, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        assert!(b.intersect(&ray).is_none());
    }
}
