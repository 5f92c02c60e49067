//! Export orchestration
//!
//! Drives one export from a [`Scene`] to a finished document:
//!
//! 1. asset header
//! 2. images, materials and effects (when the scene has any)
//! 3. joints, optionally limited to bones referenced by skin data
//! 4. one geometry per mesh: attributes, UV conversion, triangle lists,
//!    sources and an optional skin controller
//!
//! Texture files are decoded and handed to a [`TextureSink`] on the way.
//! A texture that fails is recorded in the [`ExportReport`] and never aborts
//! the export.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use daeforge_core::logging::percent;
use daeforge_core::Mat4x4;
use daeforge_scene::{Mesh, PrimitiveType, Scene, Skeleton};
use tracing::{debug, info, warn};

use crate::collada::{AssetInfo, DocumentWriter, ImageEntry, JointEntry, Semantic, TriangleList};
use crate::error::ExportResult;
use crate::geometry::collect_attributes;
use crate::materials::{is_exportable_texture, resolve_materials, ResolvedMaterials};
use crate::options::ExportOptions;
use crate::progress::{ProgressCallback, ProgressReporter};
use crate::skin::{SkinRemapper, VertexInfluences};
use crate::textures::{
    sanitize_file_name, BatchQueue, ImmediateWriter, TextureConverter, TextureError, TextureSink,
};
use crate::topology::to_triangle_list;
use crate::uv::{apply_group_transforms, fix_tex_coords};

/// Outcome of a successful export
#[derive(Debug)]
pub struct ExportReport {
    /// Path of the written document
    pub document: PathBuf,
    pub geometry_count: usize,
    pub joint_count: usize,
    /// Textures whose image file was written
    pub written_textures: Vec<String>,
    /// Textures that could not be decoded or encoded
    pub failed_textures: Vec<(String, TextureError)>,
}

impl ExportReport {
    pub fn has_warnings(&self) -> bool {
        !self.failed_textures.is_empty()
    }
}

/// Scene to COLLADA exporter
#[derive(Debug, Default)]
pub struct Exporter {
    options: ExportOptions,
    progress: ProgressReporter,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            progress: ProgressReporter::default(),
        }
    }

    /// Receive progress updates during [`export`](Self::export)
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = ProgressReporter::new(Some(callback));
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export `scene` to `path`, writing textures next to it.
    ///
    /// Textures are encoded immediately, or after the document is written
    /// when `batch_textures` is set.
    pub fn export(&self, scene: &Scene, path: impl AsRef<Path>) -> ExportResult<ExportReport> {
        let converter = TextureConverter::new(
            self.options.image_format,
            self.options.use_texture_channel_components,
        );

        if self.options.batch_textures {
            let mut queue = BatchQueue::new(converter);
            self.export_with_sink(scene, path, &mut queue)
        } else {
            let mut writer = ImmediateWriter::new(converter);
            self.export_with_sink(scene, path, &mut writer)
        }
    }

    /// Export `scene` to `path`, handing texture bitmaps to `sink`
    pub fn export_with_sink(
        &self,
        scene: &Scene,
        path: impl AsRef<Path>,
        sink: &mut dyn TextureSink,
    ) -> ExportResult<ExportReport> {
        let path = path.as_ref();
        self.options.validate()?;
        scene.validate()?;

        info!(
            path = %path.display(),
            meshes = scene.meshes.len(),
            materials = scene.materials.len(),
            "Starting export"
        );

        let mut report = ExportReport {
            document: path.to_path_buf(),
            geometry_count: 0,
            joint_count: 0,
            written_textures: Vec::new(),
            failed_textures: Vec::new(),
        };

        let mut writer = DocumentWriter::new(&self.options.file_version);
        writer.write_asset(&AssetInfo::from_options(&self.options))?;

        // Materials, images and effects
        let resolved = resolve_materials(&scene.materials, &scene.textures);
        if !resolved.materials.is_empty() || !resolved.texture_names.is_empty() {
            self.progress.report("Writing materials", 0);

            let images: Vec<ImageEntry> = resolved
                .texture_names
                .iter()
                .map(|name| ImageEntry {
                    name: name.clone(),
                    file: self.image_file(name),
                })
                .collect();
            writer.write_images(&images)?;
            writer.write_materials(&resolved.materials)?;
            writer.write_effects(&resolved.materials)?;
        }

        if self.options.export_textures {
            self.export_textures(scene, path, sink, &mut report);
        }

        // Skin data decides which bones are rigged, so remap up front
        let skins: Vec<Vec<VertexInfluences>> = scene
            .meshes
            .iter()
            .map(|mesh| {
                SkinRemapper::new(scene.skeleton.as_ref(), mesh, self.options.optimize_zero_weights)
                    .remap_all(&mesh.vertices)
            })
            .collect();

        let mut joint_slots: Vec<Option<usize>> = Vec::new();
        if let Some(skeleton) = &scene.skeleton {
            let rigged = self
                .options
                .only_export_rigged_bones
                .then(|| rigged_bones(&skins));
            let (joints, slots) = build_joints(skeleton, rigged.as_ref());
            writer.write_joints(&joints)?;
            report.joint_count = joints.len();
            joint_slots = slots;
        }

        // Geometry
        writer.start_geometry_section()?;
        let total = scene.meshes.len();
        for (index, (mesh, skin)) in scene.meshes.iter().zip(&skins).enumerate() {
            self.progress
                .report(format!("Exporting Mesh {}", mesh.name), percent(index, total));
            self.write_mesh(&mut writer, scene, mesh, skin, &resolved, &joint_slots)?;
            report.geometry_count += 1;
        }
        writer.end_geometry_section()?;

        self.progress.report("Writing document", 100);
        writer.finalize(path)?;

        for (name, error) in sink.flush() {
            report.written_textures.retain(|written| written != &name);
            report.failed_textures.push((name, error));
        }

        if report.has_warnings() {
            warn!(
                failed = report.failed_textures.len(),
                "Export finished with texture failures"
            );
        }
        info!(
            path = %path.display(),
            geometries = report.geometry_count,
            joints = report.joint_count,
            textures = report.written_textures.len(),
            "Export complete"
        );

        Ok(report)
    }

    /// Image path as written into the document, relative to it
    fn image_file(&self, name: &str) -> String {
        let file = self.options.image_format.file_name(name);
        self.options
            .image_folder
            .join(file)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn export_textures(
        &self,
        scene: &Scene,
        document: &Path,
        sink: &mut dyn TextureSink,
        report: &mut ExportReport,
    ) {
        let converter = TextureConverter::new(
            self.options.image_format,
            self.options.use_texture_channel_components,
        );
        let folder = document
            .parent()
            .unwrap_or(Path::new(""))
            .join(&self.options.image_folder);

        let mut seen = HashSet::new();
        let total = scene.textures.len();
        for (index, texture) in scene.textures.iter().enumerate() {
            if !is_exportable_texture(&texture.name) {
                continue;
            }
            let name = sanitize_file_name(&texture.name);
            self.progress
                .report(format!("Exporting Texture {name}"), percent(index, total));
            if !seen.insert(name.clone()) {
                continue;
            }

            let path = folder.join(self.options.image_format.file_name(&texture.name));
            let result = converter
                .to_image(texture)
                .and_then(|image| sink.submit(&name, image, path));

            match result {
                Ok(()) => report.written_textures.push(name),
                Err(e) => {
                    warn!(texture = %name, error = %e, "Failed to export texture");
                    report.failed_textures.push((name, e));
                }
            }
        }
    }

    fn write_mesh(
        &self,
        writer: &mut DocumentWriter,
        scene: &Scene,
        mesh: &Mesh,
        skin: &[VertexInfluences],
        resolved: &ResolvedMaterials,
        joint_slots: &[Option<usize>],
    ) -> ExportResult<()> {
        let mut attrs = collect_attributes(mesh, self.options.use_vertex_colors);
        if self.options.apply_uv_transforms {
            apply_group_transforms(&mut attrs, mesh, &scene.materials);
        }
        if self.options.fix_tex_coords {
            fix_tex_coords(&mut attrs);
        }

        let id = writer.start_geometry(&mesh.name, triangle_lists(mesh, resolved))?;
        debug!(mesh = %mesh.name, geometry = %id, vertices = attrs.vertex_count(), "Writing geometry");

        writer.write_source(Semantic::Position, 0, &attrs.positions)?;
        if attrs.has_normals {
            writer.write_source(Semantic::Normal, 0, &attrs.normals)?;
        }
        for (set, colors) in attrs.colors.iter().enumerate() {
            if attrs.has_colors[set] {
                writer.write_source(Semantic::Color, set, colors)?;
            }
        }
        for (set, uvs) in attrs.uvs.iter().enumerate() {
            if attrs.has_uvs[set] {
                writer.write_source(Semantic::TexCoord, set, uvs)?;
            }
        }

        let skinned = attrs.has_bone_ids || skin.iter().any(|v| !v.is_empty());
        if scene.skeleton.is_some() && writer.joint_count() > 0 && skinned {
            let influences: Vec<VertexInfluences> =
                skin.iter().map(|v| to_joint_slots(v, joint_slots)).collect();
            writer.attach_controller(&influences)?;
        }

        writer.end_geometry_mesh()
    }
}

/// Export with default sinks; see [`Exporter::export`]
pub fn export_scene(
    scene: &Scene,
    path: impl AsRef<Path>,
    options: ExportOptions,
) -> ExportResult<ExportReport> {
    Exporter::new(options).export(scene, path)
}

/// Triangle lists of a mesh: the display LOD first, bound to the mesh
/// material, then one per polygon group.
fn triangle_lists(mesh: &Mesh, resolved: &ResolvedMaterials) -> Vec<TriangleList> {
    let mesh_material = mesh
        .material_index
        .and_then(|i| resolved.name_of(i))
        .map(str::to_string);

    let mut lists = Vec::new();
    if let Some(lod) = mesh.display_lod() {
        if let Some(indices) = normalize(&mesh.name, &lod.faces, lod.primitive_type) {
            lists.push(TriangleList::new(mesh_material.clone(), indices));
        }
    }

    for group in &mesh.polygon_groups {
        let material = group
            .material_index
            .and_then(|i| resolved.name_of(i))
            .map(str::to_string)
            .or_else(|| mesh_material.clone());
        if let Some(indices) = normalize(&mesh.name, &group.faces, group.primitive_type) {
            lists.push(TriangleList::new(material, indices));
        }
    }

    lists
}

fn normalize(mesh: &str, faces: &[u32], topology: PrimitiveType) -> Option<Vec<u32>> {
    let mut list = match to_triangle_list(faces, topology) {
        Ok(list) => list,
        Err(e) => {
            warn!(mesh, error = %e, "Skipping degenerate strip");
            return None;
        }
    };

    let extra = list.len() % 3;
    if extra != 0 {
        warn!(mesh, indices = list.len(), "Truncating incomplete triangle");
        list.truncate(list.len() - extra);
    }

    (!list.is_empty()).then_some(list)
}

/// Skeleton indices referenced by any remapped influence
fn rigged_bones(skins: &[Vec<VertexInfluences>]) -> HashSet<usize> {
    skins
        .iter()
        .flatten()
        .flat_map(|v| v.indices.iter().copied())
        .collect()
}

/// Joints to write plus the joint slot of every skeleton bone.
///
/// With a `rigged` filter, other bones are skipped and their children hang
/// off the nearest written ancestor, keeping their world transform.
fn build_joints(
    skeleton: &Skeleton,
    rigged: Option<&HashSet<usize>>,
) -> (Vec<JointEntry>, Vec<Option<usize>>) {
    let mut slots = vec![None; skeleton.bone_count()];
    let mut next = 0;
    for (index, bone) in skeleton.bones.iter().enumerate() {
        if rigged.is_some_and(|r| !r.contains(&index)) {
            debug!("Skipping {}", bone.name);
            continue;
        }
        slots[index] = Some(next);
        next += 1;
    }

    let mut joints = Vec::with_capacity(next);
    for (index, bone) in skeleton.bones.iter().enumerate() {
        if slots[index].is_none() {
            continue;
        }

        let ancestor = skeleton
            .bone_chain_to_root(index)
            .into_iter()
            .skip(1)
            .find(|&a| slots[a].is_some());

        let transform = match ancestor {
            Some(a) if Some(a) == bone.parent_index => bone.local_transform,
            Some(a) => {
                let parent_inverse = skeleton
                    .world_transform(a)
                    .inverse()
                    .unwrap_or(Mat4x4::IDENTITY);
                skeleton.world_transform(index).multiply(&parent_inverse)
            }
            None if bone.parent_index.is_none() => bone.local_transform,
            None => skeleton.world_transform(index),
        };

        joints.push(JointEntry {
            name: bone.name.clone(),
            parent: ancestor.and_then(|a| slots[a]),
            transform,
            inverse_bind: skeleton.inverse_bind_transform(index),
            position: bone.position,
            rotation: bone.rotation,
            scale: bone.scale,
        });
    }

    (joints, slots)
}

/// Re-index influences from skeleton bones to written joints, dropping
/// influences on skipped bones
fn to_joint_slots(influences: &VertexInfluences, slots: &[Option<usize>]) -> VertexInfluences {
    let mut out = VertexInfluences::default();
    for (bone, weight) in influences.iter() {
        if let Some(slot) = slots.get(bone).copied().flatten() {
            out.indices.push(slot);
            out.weights.push(weight);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use daeforge_scene::{Bone, PolygonGroup};

    fn chain_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("root").with_position([0.0, 1.0, 0.0]));
        skeleton.add_bone(Bone::new("spine").with_parent(0).with_position([0.0, 2.0, 0.0]));
        skeleton.add_bone(Bone::new("head").with_parent(1).with_position([0.0, 3.0, 0.0]));
        skeleton
    }

    #[test]
    fn test_build_joints_unfiltered() {
        let (joints, slots) = build_joints(&chain_skeleton(), None);
        assert_eq!(joints.len(), 3);
        assert_eq!(slots, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(joints[2].parent, Some(1));
    }

    #[test]
    fn test_build_joints_reparents_past_skipped_bone() {
        let skeleton = chain_skeleton();
        let rigged: HashSet<usize> = [0, 2].into_iter().collect();
        let (joints, slots) = build_joints(&skeleton, Some(&rigged));

        assert_eq!(slots, vec![Some(0), None, Some(1)]);
        assert_eq!(joints[1].name, "head");
        assert_eq!(joints[1].parent, Some(0));
        // head now sits 5 units above root instead of 3 above spine
        let [_, y, _] = joints[1].transform.translation();
        assert!((y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_to_joint_slots_drops_skipped() {
        let influences = VertexInfluences {
            indices: vec![0, 1, 2],
            weights: vec![0.2, 0.3, 0.5],
        };
        let mapped = to_joint_slots(&influences, &[Some(0), None, Some(1)]);
        assert_eq!(mapped.indices, vec![0, 1]);
        assert_eq!(mapped.weights, vec![0.2, 0.5]);
    }

    #[test]
    fn test_triangle_lists_lod_first() {
        let mut mesh = Mesh::new("m");
        mesh.material_index = Some(0);
        mesh.lod_meshes.push(daeforge_scene::LodMesh {
            primitive_type: PrimitiveType::TriangleStrips,
            faces: vec![0, 1, 2, 3],
        });
        mesh.polygon_groups.push(PolygonGroup::triangles(Some(1), vec![0, 1, 2]));
        mesh.polygon_groups.push(PolygonGroup::strips(None, vec![0, 1]));

        let resolved = ResolvedMaterials {
            materials: vec![
                crate::materials::ResolvedMaterial {
                    name: "Body".to_string(),
                    source_index: 0,
                    maps: Vec::new(),
                },
                crate::materials::ResolvedMaterial {
                    name: "Body_1".to_string(),
                    source_index: 1,
                    maps: Vec::new(),
                },
            ],
            texture_names: Vec::new(),
        };

        let lists = triangle_lists(&mesh, &resolved);
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].material.as_deref(), Some("Body"));
        assert_eq!(lists[0].indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(lists[1].material.as_deref(), Some("Body_1"));
    }

    #[test]
    fn test_normalize_truncates_partial_triangle() {
        assert_eq!(
            normalize("m", &[0, 1, 2, 3], PrimitiveType::Triangles),
            Some(vec![0, 1, 2])
        );
        assert_eq!(normalize("m", &[0, 1], PrimitiveType::TriangleStrips), None);
    }
}
