//! Wavefront OBJ geometry reader. Parsing itself is delegated to `tobj`,
//! which already speaks this exact subset (`v`, `vn`, `f a/_/c b/_/c …`
//! with 1-based indices, triangulating on load); this module only adapts
//! `tobj`'s flat triangle buffers into the renderer's own `Polymesh`.

use std::path::Path;
use std::sync::Arc;

use crate::error::RenderError;
use crate::material::MaterialHandle;
use crate::math::{Normal, Point};
use crate::shapes::{Face, Polymesh};

/// Load every model in the OBJ file at `path`, applying `material` to each
/// (the subset of OBJ this renderer cares about has no per-face material
/// assignment of its own).
pub fn load_meshes(path: &Path, material: MaterialHandle) -> Result<Vec<Polymesh>, RenderError> {
    // Open the file ourselves first so a missing/unreadable path reports as
    // the i/o error it is, rather than being swallowed into `tobj`'s parse
    // error string alongside genuine syntax problems.
    std::fs::File::open(path).map_err(RenderError::SceneIo)?;

    let (models, _materials) =
        tobj::load_obj(path).map_err(|e| RenderError::SceneParse(format!("{}: {e}", path.display())))?;

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        meshes.push(mesh_from_tobj(&model.mesh, Arc::clone(&material)));
    }
    Ok(meshes)
}

fn mesh_from_tobj(mesh: &tobj::Mesh, material: MaterialHandle) -> Polymesh {
    let vertices: Vec<Point> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Point::new(p[0], p[1], p[2]))
        .collect();

    let normals: Option<Vec<Normal>> = if mesh.normals.is_empty() {
        None
    } else {
        Some(mesh.normals.chunks_exact(3).map(|n| Normal::new(n[0], n[1], n[2])).collect())
    };

    let faces = mesh
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let idx = vec![tri[0], tri[1], tri[2]];
            if normals.is_some() {
                Face::with_normals(idx.clone(), idx)
            } else {
                Face::new(idx)
            }
        })
        .collect();

    Polymesh::new(vertices, normals, faces, material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Diffuse;
    use crate::math::Color;

    #[test]
    fn missing_file_reports_scene_io_not_scene_parse() {
        let material: MaterialHandle = Arc::new(Diffuse::new(Color::WHITE));
        let err = load_meshes(Path::new("/nonexistent/does-not-exist.obj"), material).unwrap_err();
        assert!(matches!(err, RenderError::SceneIo(_)), "missing file should surface as SceneIo, got {err:?}");
    }

    #[test]
    fn adapts_a_single_triangle_from_flat_tobj_buffers() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![],
            texcoords: vec![],
            indices: vec![0, 1, 2],
            material_id: None,
        };
        let polymesh = mesh_from_tobj(&mesh, Arc::new(Diffuse::new(Color::WHITE)));
        assert_eq!(polymesh.vertices.len(), 3);
        assert_eq!(polymesh.faces.len(), 1);
        assert!(polymesh.normals.is_none());
    }
}
