use std::sync::Arc;

use super::bvh::{Bvh, DEFAULT_LEAF_MAX};
use super::{Shape, SurfaceSample};
use crate::material::{Material, MaterialHandle};
use crate::math::{BBox, Color, Normal, Point, Vector};
use crate::ray::{Intersection, Ray, RAY_EPSILON};

/// A convex polygon face: indices into the mesh's vertex array, and
/// (optionally) matching indices into its per-vertex normal array.
pub struct Face {
    pub vertex_indices: Vec<u32>,
    pub normal_indices: Option<Vec<u32>>,
}

impl Face {
    pub fn new(vertex_indices: Vec<u32>) -> Self {
        Self { vertex_indices, normal_indices: None }
    }

    pub fn with_normals(vertex_indices: Vec<u32>, normal_indices: Vec<u32>) -> Self {
        Self { vertex_indices, normal_indices: Some(normal_indices) }
    }
}

/// A fan-triangulated triangle: three vertex indices and, if the mesh has
/// normals, three matching normal indices.
#[derive(Clone, Copy)]
struct Triangle {
    v: [u32; 3],
    n: Option<[u32; 3]>,
}

/// A triangulated polygon mesh, accelerated by a BVH over its (fan
/// triangulated) faces. `prepare()` must run before the mesh is
/// intersected or sampled: it builds the triangle list, the BVH, and the
/// cumulative area distribution used for uniform area sampling.
pub struct Polymesh {
    pub vertices: Vec<Point>,
    pub normals: Option<Vec<Normal>>,
    pub faces: Vec<Face>,
    pub material: MaterialHandle,
    triangles: Vec<Triangle>,
    bvh: Bvh,
    /// Cumulative (normalized) triangle areas, for inverse-CDF face
    /// selection during `sample_surface`.
    area_cdf: Vec<f32>,
    total_area: f32,
}

impl Polymesh {
    pub fn new(vertices: Vec<Point>, normals: Option<Vec<Normal>>, faces: Vec<Face>, material: Arc<dyn Material>) -> Self {
        let mut mesh = Self {
            vertices,
            normals,
            faces,
            material,
            triangles: Vec::new(),
            bvh: Bvh::build(&[], DEFAULT_LEAF_MAX),
            area_cdf: Vec::new(),
            total_area: 0.0,
        };
        mesh.prepare();
        mesh
    }

    fn triangle_positions(&self, tri: &Triangle) -> (Point, Point, Point) {
        (self.vertices[tri.v[0] as usize], self.vertices[tri.v[1] as usize], self.vertices[tri.v[2] as usize])
    }

    fn triangle_area(&self, tri: &Triangle) -> f32 {
        let (v0, v1, v2) = self.triangle_positions(tri);
        0.5 * (v1 - v0).cross(&(v2 - v0)).length()
    }

    fn shading_normal(&self, tri: &Triangle, b0: f32, b1: f32, b2: f32, geometric: Normal) -> Normal {
        match (&self.normals, tri.n) {
            (Some(normals), Some(n)) => {
                let n0 = Vector::from(normals[n[0] as usize]);
                let n1 = Vector::from(normals[n[1] as usize]);
                let n2 = Vector::from(normals[n[2] as usize]);
                Normal::from(n0 * b0 + n1 * b1 + n2 * b2).normalized()
            }
            _ => geometric,
        }
    }

    fn intersect_triangle(&self, tri: &Triangle, ray: &Ray, t_max: f32) -> Option<(f32, f32, f32)> {
        let (v0, v1, v2) = self.triangle_positions(tri);
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let pvec = ray.direction.cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < 1e-8 {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.origin - v0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(&e1);
        let v = ray.direction.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&qvec) * inv_det;
        if t < RAY_EPSILON || t > t_max {
            return None;
        }
        Some((t, u, v))
    }

    /// Triangulate every face as a fan from its first vertex, rebuild the
    /// BVH over the resulting triangles, and recompute the area CDF. Safe
    /// to call again after mutating `vertices`/`faces`.
    pub fn prepare(&mut self) {
        self.triangles.clear();
        for face in &self.faces {
            let verts = &face.vertex_indices;
            if verts.len() < 3 {
                continue;
            }
            for i in 1..verts.len() - 1 {
                let v = [verts[0], verts[i], verts[i + 1]];
                let n = face.normal_indices.as_ref().map(|ns| [ns[0], ns[i], ns[i + 1]]);
                self.triangles.push(Triangle { v, n });
            }
        }

        let bboxes: Vec<BBox> = self
            .triangles
            .iter()
            .map(|tri| {
                let (v0, v1, v2) = self.triangle_positions(tri);
                BBox::singular(v0).union_point(v1).union_point(v2)
            })
            .collect();
        self.bvh = Bvh::build(&bboxes, DEFAULT_LEAF_MAX);

        self.total_area = 0.0;
        self.area_cdf = Vec::with_capacity(self.triangles.len());
        for tri in &self.triangles {
            self.total_area += self.triangle_area(tri);
            self.area_cdf.push(self.total_area);
        }
        if self.total_area > 0.0 {
            for c in &mut self.area_cdf {
                *c /= self.total_area;
            }
        }
    }

    fn sample_triangle_index(&self, u: f32) -> usize {
        match self.area_cdf.binary_search_by(|c| c.partial_cmp(&u).unwrap()) {
            Ok(i) => i,
            Err(i) => i.min(self.area_cdf.len() - 1),
        }
    }
}

impl Shape for Polymesh {
    fn intersect<'a>(&'a self, isect: &mut Intersection<'a>) -> bool {
        let ray = isect.ray;
        let mut best_t = isect.t;
        let mut best: Option<(u32, f32, f32)> = None;
        self.bvh.intersect(&ray, best_t, |prim, current_best| {
            let tri = &self.triangles[prim as usize];
            match self.intersect_triangle(tri, &ray, current_best) {
                Some((t, u, v)) => {
                    best_t = t;
                    best = Some((prim, u, v));
                    Some(t)
                }
                None => None,
            }
        });
        match best {
            Some((prim, u, v)) => {
                isect.t = best_t;
                isect.shape = Some(self);
                isect.material = Some(self.material.as_ref());
                isect.color_modifier = Color::WHITE;
                let tri = &self.triangles[prim as usize];
                let (v0, v1, v2) = self.triangle_positions(tri);
                let geometric = Normal::from((v1 - v0).cross(&(v2 - v0)).normalized());
                let shading = self.shading_normal(tri, 1.0 - u - v, u, v, geometric);
                isect.normal = shading.face_forward(&ray.direction);
                true
            }
            None => false,
        }
    }

    fn does_intersect(&self, ray: &Ray) -> bool {
        self.bvh.does_intersect(ray, |prim| {
            let tri = &self.triangles[prim as usize];
            self.intersect_triangle(tri, ray, ray.t_max).is_some()
        })
    }

    fn bbox(&self) -> BBox {
        self.bvh.bbox()
    }

    fn prepare(&mut self) {
        Polymesh::prepare(self)
    }

    fn sample_surface(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, u1: f32, u2: f32, u3: f32) -> Option<SurfaceSample> {
        if self.triangles.is_empty() || self.total_area <= 0.0 {
            return None;
        }
        let tri = &self.triangles[self.sample_triangle_index(u1)];
        let (v0, v1, v2) = self.triangle_positions(tri);
        let sqrt_u2 = u2.sqrt();
        let b0 = 1.0 - sqrt_u2;
        let b1 = sqrt_u2 * (1.0 - u3);
        let b2 = sqrt_u2 * u3;
        let point = v0 + (v1 - v0) * b1 + (v2 - v0) * b2;
        let geometric = Normal::from((v1 - v0).cross(&(v2 - v0)).normalized());
        let normal = self.shading_normal(tri, b0, b1, b2, geometric).face_forward(&(point - ref_pos));

        let to_ref = ref_pos - point;
        let dist_sqr = to_ref.length_sqr();
        if dist_sqr <= 0.0 {
            return None;
        }
        let dist = dist_sqr.sqrt();
        let cos_theta = (to_ref / dist).dot(&Vector::from(normal)).abs();
        let pdf = super::sanitize_pdf(dist_sqr / (self.total_area * cos_theta));
        if pdf <= 0.0 {
            return None;
        }
        Some(SurfaceSample { point, normal, pdf })
    }

    fn pdf_sa(&self, ref_pos: Point, _ref_normal: Normal, _ref_time: f32, surf_pos: Point, surf_normal: Normal) -> f32 {
        if self.total_area <= 0.0 {
            return 0.0;
        }
        let to_ref = ref_pos - surf_pos;
        let dist_sqr = to_ref.length_sqr();
        if dist_sqr <= 0.0 {
            return 0.0;
        }
        let dist = dist_sqr.sqrt();
        let cos_theta = (to_ref / dist).dot(&Vector::from(surf_normal)).abs();
        if cos_theta <= 0.0 {
            return 0.0;
        }
        super::sanitize_pdf(dist_sqr / (self.total_area * cos_theta))
    }

    fn is_light(&self) -> bool {
        !self.material.emittance().is_black()
    }

    fn emitted(&self) -> Color {
        self.material.emittance()
    }

    fn find_lights<'a>(&'a self, out: &mut Vec<&'a dyn Shape>) {
        if self.is_light() {
            out.push(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Diffuse;

    fn triangle_mesh() -> Polymesh {
        let vertices = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0)];
        let faces = vec![Face::new(vec![0, 1, 2])];
        Polymesh::new(vertices, None, faces, Arc::new(Diffuse::new(Color::WHITE)))
    }

    #[test]
    fn ray_through_triangle_hits() {
        let mesh = triangle_mesh();
        let ray = Ray::new(Point::new(0.2, 0.2, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(mesh.intersect(&mut isect));
        assert!((isect.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let mesh = triangle_mesh();
        let ray = Ray::new(Point::new(0.9, 0.9, -5.0), Vector::new(0.0, 0.0, 1.0), f32::INFINITY, 0.0);
        let mut isect = Intersection::new(ray);
        assert!(!mesh.intersect(&mut isect));
    }

    #[test]
    fn bvh_matches_naive_scan_on_many_triangles() {
        let mut rng = crate::rng::Rng::seeded(99);
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for _ in 0..300 {
            let base = Point::new(rng.next_f32() * 20.0 - 10.0, rng.next_f32() * 20.0 - 10.0, rng.next_f32() * 20.0 - 10.0);
            let idx = vertices.len() as u32;
            vertices.push(base);
            vertices.push(base + Vector::new(1.0, 0.0, 0.0));
            vertices.push(base + Vector::new(0.0, 1.0, 0.0));
            faces.push(Face::new(vec![idx, idx + 1, idx + 2]));
        }
        let mesh = Polymesh::new(vertices.clone(), None, faces, Arc::new(Diffuse::new(Color::WHITE)));

        for _ in 0..2000 {
            let origin = Point::new(rng.next_f32() * 40.0 - 20.0, rng.next_f32() * 40.0 - 20.0, -30.0);
            let dir = Vector::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, 1.0).normalized();
            let ray = Ray::new(origin, dir, f32::INFINITY, 0.0);

            let mut isect = Intersection::new(ray);
            mesh.intersect(&mut isect);
            let bvh_t = if isect.intersected() { Some(isect.t) } else { None };

            let mut naive_t: Option<f32> = None;
            for tri in &mesh.triangles {
                if let Some((t, _, _)) = mesh.intersect_triangle(tri, &ray, naive_t.unwrap_or(f32::INFINITY)) {
                    naive_t = Some(t);
                }
            }

            match (bvh_t, naive_t) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-3),
                (None, None) => {}
                other => panic!("BVH/naive disagreement: {:?}", other),
            }
        }
    }
}
