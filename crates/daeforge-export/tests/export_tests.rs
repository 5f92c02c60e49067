//! End-to-end export tests
//!
//! Each test exports a small scene into a temporary directory and parses the
//! document back to check structure, references and determinism.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use daeforge_export::{
    collada::Semantic, DocumentWriter, ExportOptions, Exporter, TextureError, WriterState,
};
use daeforge_scene::{
    Bone, Material, Mesh, PolygonGroup, Scene, Skeleton, Texture, TextureFormat, TextureKind,
    TextureMap, Vertex,
};
use xmltree::{Element, XMLNode};

/// Options with a fixed timestamp so documents are reproducible
fn options() -> ExportOptions {
    ExportOptions {
        timestamp: Some("2024-05-01T12:00:00Z".to_string()),
        ..Default::default()
    }
}

fn quad_mesh(name: &str) -> Mesh {
    let mut mesh = Mesh::new(name);
    mesh.vertices = vec![
        Vertex::new([0.0, 0.0, 0.0]).with_uv([0.0, 0.0]),
        Vertex::new([1.0, 0.0, 0.0]).with_uv([1.0, 0.0]),
        Vertex::new([0.0, 1.0, 0.0]).with_uv([0.0, 1.0]),
        Vertex::new([1.0, 1.0, 0.0]).with_uv([0.5, 0.5]),
    ];
    mesh.polygon_groups
        .push(PolygonGroup::triangles(None, vec![0, 1, 2, 2, 1, 3]));
    mesh
}

fn rgba_texture(name: &str) -> Texture {
    Texture::new(name, TextureFormat::Rgba8, 2, 2, vec![200; 16])
}

/// A skinned character: three bones, one material with diffuse and bump
fn character_scene() -> Scene {
    let mut skeleton = Skeleton::new();
    skeleton.add_bone(Bone::new("root"));
    skeleton.add_bone(Bone::new("spine").with_parent(0).with_position([0.0, 1.0, 0.0]));
    skeleton.add_bone(Bone::new("hand").with_parent(1).with_position([0.5, 0.0, 0.0]));

    let mut mesh = quad_mesh("body");
    mesh.material_index = Some(0);
    for (i, vertex) in mesh.vertices.iter_mut().enumerate() {
        vertex.bone_ids = vec![0, 2];
        vertex.bone_weights = vec![0.25 * i as f32, 1.0 - 0.25 * i as f32];
    }

    let mut scene = Scene::new();
    scene.meshes.push(mesh);
    scene.materials.push(
        Material::new("Skin")
            .with_map(TextureMap::new("body_diff", TextureKind::Diffuse))
            .with_map(TextureMap::new("body_ddna", TextureKind::Normal)),
    );
    scene.textures.push(rgba_texture("body_diff"));
    scene.textures.push(rgba_texture("body_ddna"));
    scene.skeleton = Some(skeleton);
    scene
}

fn export(scene: &Scene, dir: &Path, options: ExportOptions) -> Element {
    let path = dir.join("scene.dae");
    Exporter::new(options).export(scene, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    Element::parse(text.as_bytes()).unwrap()
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) => Some(e),
        _ => None,
    })
}

fn descendants<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for child in child_elements(element) {
        if child.name == name {
            out.push(child);
        }
        descendants(child, name, out);
    }
}

fn find_all<'a>(root: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut out = Vec::new();
    descendants(root, name, &mut out);
    out
}

fn attr<'a>(element: &'a Element, key: &str) -> Option<&'a str> {
    element.attributes.get(key).map(String::as_str)
}

fn text(element: &Element) -> String {
    element.get_text().map(|t| t.into_owned()).unwrap_or_default()
}

#[test]
fn test_duplicate_material_names_resolve() {
    let mut mesh = quad_mesh("twins");
    mesh.polygon_groups = vec![
        PolygonGroup::triangles(Some(0), vec![0, 1, 2]),
        PolygonGroup::triangles(Some(1), vec![2, 1, 3]),
    ];

    let mut scene = Scene::new();
    scene.meshes.push(mesh);
    scene
        .materials
        .push(Material::new("Skin").with_map(TextureMap::new("a_diff", TextureKind::Diffuse)));
    scene
        .materials
        .push(Material::new("Skin").with_map(TextureMap::new("b_diff", TextureKind::Diffuse)));

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    let materials: Vec<_> = find_all(&root, "material")
        .into_iter()
        .filter_map(|m| attr(m, "name"))
        .collect();
    assert_eq!(materials, vec!["Skin", "Skin_1"]);

    let bound: Vec<_> = find_all(&root, "triangles")
        .into_iter()
        .filter_map(|t| attr(t, "material"))
        .collect();
    assert_eq!(bound, vec!["Skin", "Skin_1"]);

    let second = find_all(&root, "instance_material")
        .into_iter()
        .find(|m| attr(m, "symbol") == Some("Skin_1"))
        .unwrap();
    assert_eq!(attr(second, "target"), Some("#Skin_1-material"));

    // Each material keeps its own texture
    let effects = find_all(&root, "effect");
    let second_effect = effects
        .iter()
        .find(|e| attr(e, "name") == Some("Skin_1"))
        .unwrap();
    let sampler = find_all(second_effect, "texture")
        .into_iter()
        .find_map(|t| attr(t, "texture"))
        .unwrap();
    assert_eq!(sampler, "b_diff-sampler");
}

#[test]
fn test_strip_written_as_triangle_list() {
    let mut mesh = Mesh::new("strip");
    mesh.vertices = (0..5).map(|i| Vertex::new([i as f32, 0.0, 0.0])).collect();
    mesh.polygon_groups
        .push(PolygonGroup::strips(None, vec![0, 1, 2, 3, 4]));

    let mut scene = Scene::new();
    scene.meshes.push(mesh);

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    let triangles = find_all(&root, "triangles");
    assert_eq!(triangles.len(), 1);
    assert_eq!(attr(triangles[0], "count"), Some("3"));
    let p = triangles[0].get_child("p").unwrap();
    assert_eq!(text(p), "0 1 2 2 1 3 2 3 4");
}

#[test]
fn test_geometries_follow_mesh_order() {
    let mut scene = Scene::new();
    for name in ["hull", "wing", "cockpit"] {
        scene.meshes.push(quad_mesh(name));
    }

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    let names: Vec<_> = find_all(&root, "geometry")
        .into_iter()
        .filter_map(|g| attr(g, "name"))
        .collect();
    assert_eq!(names, vec!["hull", "wing", "cockpit"]);
}

#[test]
fn test_export_is_deterministic() {
    let scene = character_scene();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let exporter = Exporter::new(options());
    exporter.export(&scene, first.path().join("a.dae")).unwrap();
    exporter.export(&scene, second.path().join("a.dae")).unwrap();

    let a = std::fs::read(first.path().join("a.dae")).unwrap();
    let b = std::fs::read(second.path().join("a.dae")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_deny_listed_textures_skipped() {
    let mut scene = character_scene();
    scene.textures.push(rgba_texture("visor_dummy_col"));
    scene.textures.push(rgba_texture("cube_env"));

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    let images: Vec<_> = find_all(&root, "image")
        .into_iter()
        .filter_map(|i| attr(i, "name"))
        .collect();
    assert_eq!(images, vec!["body_diff", "body_ddna"]);

    assert!(dir.path().join("body_diff.png").exists());
    assert!(!dir.path().join("visor_dummy_col.png").exists());
    assert!(!dir.path().join("cube_env.png").exists());
}

/// Every `#id` reference in the document points at a declared id
fn assert_references_resolve(root: &Element) {
    let mut ids = HashSet::new();
    let mut refs = Vec::new();
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        if let Some(id) = attr(element, "id") {
            assert!(ids.insert(id.to_string()), "duplicate id {id}");
        }
        for key in ["url", "source", "target"] {
            if let Some(value) = attr(element, key).and_then(|v| v.strip_prefix('#')) {
                refs.push(value.to_string());
            }
        }
        if element.name == "skeleton" {
            refs.push(text(element).trim_start_matches('#').to_string());
        }
        stack.extend(child_elements(element));
    }

    assert!(!refs.is_empty());
    for reference in refs {
        assert!(ids.contains(&reference), "unresolved reference #{reference}");
    }
}

#[test]
fn test_all_references_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let root = export(&character_scene(), dir.path(), options());
    assert_references_resolve(&root);
}

#[test]
fn test_names_with_spaces_become_valid_ids() {
    let mut scene = character_scene();
    if let Some(skeleton) = &mut scene.skeleton {
        skeleton.bones[0].name = "Bip01 Pelvis".to_string();
        skeleton.bones[1].name = "Bip01 Spine".to_string();
        skeleton.bones[2].name = "Bip01 R Hand".to_string();
    }
    scene.meshes[0].name = "upper body".to_string();
    scene.materials[0].name = "Skin Tone".to_string();

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());
    assert_references_resolve(&root);

    let names = find_all(&root, "Name_array")[0];
    let tokens: Vec<_> = text(names).split_whitespace().map(str::to_string).collect();
    assert_eq!(attr(names, "count"), Some(tokens.len().to_string().as_str()));
    assert_eq!(tokens, vec!["Bip01_Pelvis", "Bip01_Spine", "Bip01_R_Hand"]);

    // Display names keep the original text
    let joint_names: Vec<_> = find_all(&root, "node")
        .into_iter()
        .filter(|n| attr(n, "type") == Some("JOINT"))
        .filter_map(|n| attr(n, "name"))
        .collect();
    assert_eq!(joint_names, vec!["Bip01 Pelvis", "Bip01 Spine", "Bip01 R Hand"]);
    let geometry = find_all(&root, "geometry")[0];
    assert_eq!(attr(geometry, "name"), Some("upper body"));
    assert_eq!(attr(geometry, "id"), Some("upper_body-mesh"));

    let skeleton = find_all(&root, "skeleton")[0];
    assert_eq!(text(skeleton), "#Bip01_Pelvis");

    let triangles = find_all(&root, "triangles")[0];
    let symbol = attr(triangles, "material").unwrap();
    assert!(!symbol.contains(' '));
    let binding = find_all(&root, "instance_material")[0];
    assert_eq!(attr(binding, "symbol"), Some(symbol));
}

#[test]
fn test_section_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = export(&character_scene(), dir.path(), options());

    let sections: Vec<_> = child_elements(&root).map(|e| e.name.as_str()).collect();
    assert_eq!(
        sections,
        vec![
            "asset",
            "library_images",
            "library_materials",
            "library_effects",
            "library_nodes",
            "library_geometries",
            "library_controllers",
            "library_visual_scenes",
            "scene",
        ]
    );

    let asset = root.get_child("asset").unwrap();
    assert_eq!(text(asset.get_child("created").unwrap()), "2024-05-01T12:00:00Z");
    assert_eq!(text(asset.get_child("up_axis").unwrap()), "Y_UP");
}

#[test]
fn test_empty_libraries_omitted() {
    let mut scene = Scene::new();
    scene.meshes.push(quad_mesh("plain"));

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    let sections: Vec<_> = child_elements(&root).map(|e| e.name.as_str()).collect();
    assert_eq!(
        sections,
        vec!["asset", "library_geometries", "library_visual_scenes", "scene"]
    );
    assert_eq!(find_all(&root, "instance_geometry").len(), 1);
}

#[test]
fn test_failed_texture_does_not_abort() {
    let mut scene = character_scene();
    // 2x2 RGBA needs 16 bytes
    scene.textures[1] = Texture::new("body_ddna", TextureFormat::Rgba8, 2, 2, vec![0; 3]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.dae");
    let report = Exporter::new(options()).export(&scene, &path).unwrap();

    assert!(path.exists());
    assert!(report.has_warnings());
    assert_eq!(report.written_textures, vec!["body_diff".to_string()]);
    assert_eq!(report.failed_textures.len(), 1);
    assert_eq!(report.failed_textures[0].0, "body_ddna");
    assert_eq!(report.geometry_count, 1);
}

#[test]
fn test_zero_size_texture_reported_as_failure() {
    let mut scene = character_scene();
    scene.textures[1] = Texture::new("body_ddna", TextureFormat::Rgba8, 0, 0, Vec::new());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.dae");
    let report = Exporter::new(options()).export(&scene, &path).unwrap();

    assert!(path.exists());
    assert_eq!(report.written_textures, vec!["body_diff".to_string()]);
    assert_eq!(report.failed_textures.len(), 1);
    assert_eq!(report.failed_textures[0].0, "body_ddna");
    assert!(matches!(
        report.failed_textures[0].1,
        TextureError::InvalidDimensions { width: 0, height: 0 }
    ));
}

#[test]
fn test_progress_covers_textures_and_meshes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let exporter = Exporter::new(options()).with_progress(Box::new(move |progress| {
        sink.lock().unwrap().push(progress);
    }));

    let dir = tempfile::tempdir().unwrap();
    exporter
        .export(&character_scene(), dir.path().join("scene.dae"))
        .unwrap();

    let seen = seen.lock().unwrap();
    let tasks: Vec<_> = seen.iter().map(|p| p.task.as_str()).collect();
    assert!(tasks.contains(&"Exporting Texture body_diff"));
    assert!(tasks.contains(&"Exporting Texture body_ddna"));
    assert!(tasks.contains(&"Exporting Mesh body"));

    let second = seen
        .iter()
        .find(|p| p.task == "Exporting Texture body_ddna")
        .unwrap();
    assert_eq!(second.percent, 50);
    assert_eq!(seen.last().map(|p| p.percent), Some(100));
}

#[test]
fn test_batched_textures_written_after_document() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions {
        batch_textures: true,
        image_folder: "textures".into(),
        ..options()
    };
    let root = export(&character_scene(), dir.path(), options);

    assert!(dir.path().join("textures/body_diff.png").exists());
    let init = find_all(&root, "image")
        .into_iter()
        .find_map(|i| i.get_child("init_from"))
        .map(text);
    assert_eq!(init.as_deref(), Some("textures/body_diff.png"));
}

#[test]
fn test_skin_controller() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions {
        optimize_zero_weights: true,
        ..options()
    };
    let root = export(&character_scene(), dir.path(), options);

    let skin = find_all(&root, "skin")[0];
    assert_eq!(attr(skin, "source"), Some("#body-mesh"));

    let names = find_all(skin, "Name_array")[0];
    assert_eq!(text(names), "root spine hand");

    let weights = skin.get_child("vertex_weights").unwrap();
    assert_eq!(attr(weights, "count"), Some("4"));
    // Vertex 0 has a zero weight on bone 0, which is dropped
    assert_eq!(text(weights.get_child("vcount").unwrap()), "1 2 2 2");

    let instance = find_all(&root, "instance_controller")[0];
    assert_eq!(attr(instance, "url"), Some("#body-skin"));
    assert_eq!(text(instance.get_child("skeleton").unwrap()), "#root");
}

#[test]
fn test_only_rigged_bones_exported() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions {
        only_export_rigged_bones: true,
        ..options()
    };
    let root = export(&character_scene(), dir.path(), options);

    let joints: Vec<_> = find_all(&root, "node")
        .into_iter()
        .filter(|n| attr(n, "type") == Some("JOINT"))
        .filter_map(|n| attr(n, "name"))
        .collect();
    assert_eq!(joints, vec!["root", "hand"]);

    let names = find_all(&root, "Name_array")[0];
    assert_eq!(text(names), "root hand");
}

#[test]
fn test_unskinned_scene_has_no_controller() {
    let mut scene = character_scene();
    scene.skeleton = None;
    for vertex in &mut scene.meshes[0].vertices {
        vertex.bone_ids.clear();
        vertex.bone_weights.clear();
    }

    let dir = tempfile::tempdir().unwrap();
    let root = export(&scene, dir.path(), options());

    assert!(root.get_child("library_controllers").is_none());
    assert!(root.get_child("library_nodes").is_none());
    assert_eq!(find_all(&root, "instance_geometry").len(), 1);
}

#[test]
fn test_invalid_scene_rejected() {
    let mut scene = Scene::new();
    let mut mesh = quad_mesh("broken");
    mesh.material_index = Some(3);
    scene.meshes.push(mesh);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.dae");
    assert!(Exporter::new(options()).export(&scene, &path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_writer_rejects_out_of_order_calls() {
    let mut writer = DocumentWriter::new("1.4.1");

    let err = writer.start_geometry_section().unwrap_err();
    assert!(err.is_contract_violation());

    let err = writer
        .write_source(Semantic::Position, 0, &[0.0, 0.0, 0.0])
        .unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(writer.state(), WriterState::Created);
}
