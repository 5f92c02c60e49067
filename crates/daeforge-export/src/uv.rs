//! Texture coordinate conversion

use daeforge_scene::{Material, Mesh};

use crate::geometry::GeometryAttributes;

/// Apply each polygon group's diffuse UV transform to the first UV set.
///
/// A vertex shared by several groups is only transformed by the first group
/// that touches it. Groups without a material use the mesh material; when
/// neither exists the group is skipped.
pub fn apply_group_transforms(attrs: &mut GeometryAttributes, mesh: &Mesh, materials: &[Material]) {
    let uv0 = &mut attrs.uvs[0];
    let mut touched = vec![false; uv0.len() / 2];

    for group in &mesh.polygon_groups {
        let Some(material) = group
            .material_index
            .or(mesh.material_index)
            .and_then(|i| materials.get(i))
        else {
            continue;
        };
        let transform = material.diffuse_uv_transform();

        for &index in &group.faces {
            let index = index as usize;
            match touched.get_mut(index) {
                Some(done) if !*done => *done = true,
                _ => continue,
            }
            let [u, v] = transform.apply([uv0[index * 2], uv0[index * 2 + 1]]);
            uv0[index * 2] = u;
            uv0[index * 2 + 1] = v;
        }
    }

    attrs.refresh_uv_presence(0);
}

/// Flip one coordinate into the document's texture space.
///
/// `U` is kept below 1 and otherwise mirrored as `1 - U`; `V` becomes `1 - V`.
/// This only corrects the common case and does not wrap arbitrary values.
pub fn fix_tex_coord(u: f32, v: f32) -> (f32, f32) {
    let u = if u < 1.0 { u } else { 1.0 - u };
    (u, 1.0 - v)
}

/// Flip every UV set in place
pub fn fix_tex_coords(attrs: &mut GeometryAttributes) {
    for set in attrs.uvs.iter_mut() {
        for pair in set.chunks_exact_mut(2) {
            let (u, v) = fix_tex_coord(pair[0], pair[1]);
            pair[0] = u;
            pair[1] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::collect_attributes;
    use daeforge_core::Vec2;
    use daeforge_scene::{PolygonGroup, TextureKind, TextureMap, UvTransform, Vertex};

    fn scaled_material(name: &str, scale: f32) -> Material {
        Material::new(name).with_map(
            TextureMap::new(format!("{name}_alb"), TextureKind::Diffuse)
                .with_transform(UvTransform::new(Vec2::new(scale, scale), Vec2::new(0.0, 0.5))),
        )
    }

    #[test]
    fn test_shared_vertex_transformed_once() {
        let mut mesh = Mesh::new("m");
        mesh.vertices = (0..4).map(|_| Vertex::new([0.0; 3]).with_uv([0.5, 0.5])).collect();
        mesh.polygon_groups = vec![
            PolygonGroup::triangles(Some(0), vec![0, 1, 2]),
            PolygonGroup::triangles(Some(1), vec![2, 1, 3]),
        ];
        let materials = vec![scaled_material("a", 2.0), scaled_material("b", 4.0)];

        let mut attrs = collect_attributes(&mesh, false);
        apply_group_transforms(&mut attrs, &mesh, &materials);

        // 0..=2 through material a, 3 through material b
        assert_eq!(&attrs.uvs[0][0..2], &[1.0, 1.5]);
        assert_eq!(&attrs.uvs[0][4..6], &[1.0, 1.5]);
        assert_eq!(&attrs.uvs[0][6..8], &[2.0, 2.5]);
    }

    #[test]
    fn test_translate_makes_zero_uvs_present() {
        let mut mesh = Mesh::new("m");
        mesh.vertices = vec![Vertex::new([0.0; 3]); 3];
        mesh.polygon_groups = vec![PolygonGroup::triangles(Some(0), vec![0, 1, 2])];
        let materials = vec![scaled_material("a", 1.0)];

        let mut attrs = collect_attributes(&mesh, false);
        assert!(!attrs.has_uvs[0]);
        apply_group_transforms(&mut attrs, &mesh, &materials);
        assert!(attrs.has_uvs[0]);
    }

    #[test]
    fn test_group_falls_back_to_mesh_material() {
        let mut mesh = Mesh::new("m");
        mesh.vertices = vec![Vertex::new([0.0; 3]).with_uv([0.5, 0.5]); 3];
        mesh.polygon_groups = vec![PolygonGroup::triangles(None, vec![0, 1, 2])];

        let mut attrs = collect_attributes(&mesh, false);
        apply_group_transforms(&mut attrs, &mesh, &[scaled_material("a", 2.0)]);
        assert_eq!(&attrs.uvs[0][0..2], &[0.5, 0.5]);

        mesh.material_index = Some(0);
        let mut attrs = collect_attributes(&mesh, false);
        apply_group_transforms(&mut attrs, &mesh, &[scaled_material("a", 2.0)]);
        assert_eq!(&attrs.uvs[0][0..2], &[1.0, 1.5]);
    }

    #[test]
    fn test_fix_tex_coord() {
        assert_eq!(fix_tex_coord(0.25, 0.25), (0.25, 0.75));
        assert_eq!(fix_tex_coord(1.0, 0.0), (0.0, 1.0));
        assert_eq!(fix_tex_coord(1.5, 1.0), (-0.5, 0.0));
    }
}
