//! The composite shape used as a scene's root: a flat list of children
//! accelerated by its own top-level BVH, so the render loop has one
//! `Shape` to intersect rather than walking a list by hand.

use super::bvh::{Bvh, DEFAULT_LEAF_MAX};
use super::{Shape, SurfaceSample};
use crate::math::{BBox, Normal, Point};
use crate::ray::{Intersection, Ray};

pub struct ShapeSet {
    children: Vec<Box<dyn Shape>>,
    bvh: Bvh,
}

impl ShapeSet {
    pub fn new(children: Vec<Box<dyn Shape>>) -> Self {
        let bboxes: Vec<BBox> = children.iter().map(|c| c.bbox()).collect();
        let bvh = Bvh::build(&bboxes, DEFAULT_LEAF_MAX);
        Self { children, bvh }
    }

    pub fn children(&self) -> &[Box<dyn Shape>] {
        &self.children
    }
}

impl Shape for ShapeSet {
    fn intersect<'a>(&'a self, isect: &mut Intersection<'a>) -> bool {
        let ray = isect.ray;
        self.bvh.intersect(&ray, isect.t, |prim, current_best| {
            let child = self.children[prim as usize].as_ref();
            let mut candidate = Intersection::new(ray);
            candidate.t = current_best;
            if child.intersect(&mut candidate) {
                *isect = candidate;
                Some(isect.t)
            } else {
                None
            }
        })
    }

    fn does_intersect(&self, ray: &Ray) -> bool {
        self.bvh.does_intersect(ray, |prim| self.children[prim as usize].does_intersect(ray))
    }

    fn bbox(&self) -> BBox {
        self.bvh.bbox()
    }

    fn prepare(&mut self) {
        for child in &mut self.children {
            child.prepare();
        }
        let bboxes: Vec<BBox> = self.children.iter().map(|c| c.bbox()).collect();
        self.bvh = Bvh::build(&bboxes, DEFAULT_LEAF_MAX);
    }

    fn sample_surface(
        &self,
        _ref_pos: Point,
        _ref_normal: Normal,
        _ref_time: f32,
        _u1: f32,
        _u2: f32,
        _u3: f32,
    ) -> Option<SurfaceSample> {
        None
    }

    fn pdf_sa(&self, _ref_pos: Point, _ref_normal: Normal, _ref_time: f32, _surf_pos: Point, _surf_normal: Normal) -> f32 {
        0.0
    }

    fn find_lights<'a>(&'a self, out: &mut Vec<&'a dyn Shape>) {
        for child in &self.children {
            child.find_lights(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::material::Diffuse;
    use crate::math::{Color, Vector};
    use crate::shapes::Sphere;

    #[test]
    fn finds_closest_of_several_children() {
        let near = Sphere::new(Point::new(0.0, 0.0, 0.0), 1.0, Arc::new(Diffuse::new(Color::WHITE)));
        let far = Sphere::new(Point::new(0.0, 0.0, 10.0), 1.0, Arc::new(Diffuse::new(Color::WHITE)));
        let set = ShapeSet::new(vec![Box::new(far), Box::new(near)]);

        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(set.intersect(&mut isect));
        assert!((isect.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn misses_when_nothing_is_hit() {
        let s = Sphere::new(Point::new(0.0, 0.0, 0.0), 1.0, Arc::new(Diffuse::new(Color::WHITE)));
        let set = ShapeSet::new(vec![Box::new(s)]);
        let ray = Ray::new(Point::new(5.0, 5.0, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(!set.intersect(&mut isect));
    }
}
