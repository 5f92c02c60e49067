//! Incremental COLLADA document builder

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

use daeforge_core::Mat4x4;
use daeforge_scene::WrapMode;
use tempfile::NamedTempFile;
use tracing::{debug, error};
use xmltree::{Element, EmitterConfig};

use super::xml::{join, text_element, url, ElementExt};
use super::{
    AssetInfo, ImageEntry, JointEntry, Semantic, TriangleList, WriterState, COLLADA_NAMESPACE,
};
use crate::error::{ExportError, ExportResult};
use crate::materials::{MapRole, ResolvedMaterial, ResolvedTextureMap};
use crate::names::{xml_id, UniqueNames};
use crate::skin::VertexInfluences;

/// Profile name for our own `<extra>` data
const EXTRA_PROFILE: &str = "daeforge";

struct WrittenJoint {
    id: String,
    inverse_bind: Mat4x4,
}

struct OpenGeometry {
    name: String,
    id: String,
    vertex_count: usize,
    sources: Vec<Element>,
    /// (semantic, set, source id) in write order
    inputs: Vec<(Semantic, usize, String)>,
    triangles: Vec<TriangleList>,
    controller: Option<(String, Element)>,
}

/// Builds a COLLADA document section by section.
///
/// Every operation checks the current [`WriterState`] first and fails with
/// [`ExportError::InvalidState`] when called out of order. IDs are handed out
/// by a per-writer [`UniqueNames`], so identical input gives identical output.
pub struct DocumentWriter {
    state: WriterState,
    version: String,
    ids: UniqueNames,

    asset: Option<Element>,
    images: Vec<Element>,
    materials: Vec<Element>,
    effects: Vec<Element>,
    joint_nodes: Vec<Element>,
    geometries: Vec<Element>,
    controllers: Vec<Element>,
    scene_nodes: Vec<Element>,

    image_ids: HashMap<String, String>,
    material_ids: HashMap<String, String>,
    effect_ids: HashMap<String, String>,
    joints: Vec<WrittenJoint>,
    skeleton_roots: Vec<String>,
    current: Option<OpenGeometry>,
}

impl DocumentWriter {
    /// Create a writer for a document with the given COLLADA `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            state: WriterState::Created,
            version: version.into(),
            ids: UniqueNames::new(),
            asset: None,
            images: Vec::new(),
            materials: Vec::new(),
            effects: Vec::new(),
            joint_nodes: Vec::new(),
            geometries: Vec::new(),
            controllers: Vec::new(),
            scene_nodes: Vec::new(),
            image_ids: HashMap::new(),
            material_ids: HashMap::new(),
            effect_ids: HashMap::new(),
            joints: Vec::new(),
            skeleton_roots: Vec::new(),
            current: None,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Number of joints written so far
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Document id of a declared material
    pub fn material_id(&self, name: &str) -> Option<&str> {
        self.material_ids.get(name).map(String::as_str)
    }

    fn invalid_state(&self, operation: &'static str) -> ExportError {
        error!(operation, state = ?self.state, "Document writer used out of order");
        ExportError::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn advance(&mut self, operation: &'static str, next: WriterState) -> ExportResult<()> {
        if !self.state.can_advance_to(next) {
            return Err(self.invalid_state(operation));
        }
        self.state = next;
        Ok(())
    }

    /// Write the `<asset>` header
    pub fn write_asset(&mut self, info: &AssetInfo) -> ExportResult<()> {
        self.advance("write_asset", WriterState::AssetWritten)?;

        self.asset = Some(
            Element::new("asset")
                .child(
                    Element::new("contributor")
                        .child(text_element("authoring_tool", &info.authoring_tool)),
                )
                .child(text_element("created", &info.timestamp))
                .child(text_element("modified", &info.timestamp))
                .child(Element::new("unit").attr("name", "meter").attr("meter", "1"))
                .child(text_element("up_axis", info.up_axis.as_str())),
        );
        Ok(())
    }

    /// Declare images. Repeated names are declared once.
    pub fn write_images(&mut self, images: &[ImageEntry]) -> ExportResult<()> {
        self.advance("write_images", WriterState::ImagesWritten)?;

        for image in images {
            if self.image_ids.contains_key(&image.name) {
                continue;
            }
            let id = self.ids.claim_id(&format!("{}-image", image.name));
            self.images.push(
                Element::new("image")
                    .attr("id", &id)
                    .attr("name", &image.name)
                    .child(text_element("init_from", &image.file)),
            );
            self.image_ids.insert(image.name.clone(), id);
        }
        Ok(())
    }

    /// Declare materials; each one instantiates the effect of the same name
    pub fn write_materials(&mut self, materials: &[ResolvedMaterial]) -> ExportResult<()> {
        self.advance("write_materials", WriterState::MaterialsWritten)?;

        for material in materials {
            let id = self.ids.claim_id(&format!("{}-material", material.name));
            let effect_id = self.ids.claim_id(&format!("{}-effect", material.name));

            self.materials.push(
                Element::new("material")
                    .attr("id", &id)
                    .attr("name", &material.name)
                    .child(Element::new("instance_effect").attr("url", url(&effect_id))),
            );
            self.material_ids.insert(material.name.clone(), id);
            self.effect_ids.insert(material.name.clone(), effect_id);
        }
        Ok(())
    }

    /// Write one phong effect per material.
    ///
    /// Maps whose image was never declared are listed in an `<extra>` block
    /// instead of being sampled.
    pub fn write_effects(&mut self, materials: &[ResolvedMaterial]) -> ExportResult<()> {
        self.advance("write_effects", WriterState::EffectsWritten)?;

        for material in materials {
            let id = match self.effect_ids.get(&material.name) {
                Some(id) => id.clone(),
                None => self.ids.claim_id(&format!("{}-effect", material.name)),
            };
            let effect = self.effect_element(&id, material);
            self.effects.push(effect);
        }
        Ok(())
    }

    fn effect_element(&self, id: &str, material: &ResolvedMaterial) -> Element {
        let mut profile = Element::new("profile_COMMON");
        let mut declared: Vec<&str> = Vec::new();
        let mut diffuse: Option<String> = None;
        let mut bump: Option<String> = None;
        let mut unresolved: Vec<&ResolvedTextureMap> = Vec::new();

        for map in &material.maps {
            let Some(image_id) = self.image_ids.get(&map.name) else {
                unresolved.push(map);
                continue;
            };

            let surface_sid = format!("{}-surface", xml_id(&map.name));
            let sampler_sid = format!("{}-sampler", xml_id(&map.name));

            if !declared.contains(&map.name.as_str()) {
                declared.push(&map.name);
                profile.push(
                    Element::new("newparam").attr("sid", &surface_sid).child(
                        Element::new("surface")
                            .attr("type", "2D")
                            .child(text_element("init_from", image_id)),
                    ),
                );
                profile.push(
                    Element::new("newparam").attr("sid", &sampler_sid).child(
                        Element::new("sampler2D")
                            .child(text_element("source", &surface_sid))
                            .child(text_element("wrap_s", wrap_name(map.wrap_s)))
                            .child(text_element("wrap_t", wrap_name(map.wrap_t))),
                    ),
                );
            }

            let slot = match map.role {
                MapRole::Diffuse => &mut diffuse,
                MapRole::Bump => &mut bump,
            };
            slot.get_or_insert(sampler_sid);
        }

        let diffuse = match diffuse {
            Some(sampler) => Element::new("diffuse").child(texture_ref(&sampler)),
            None => Element::new("diffuse").child(text_element("color", "1 1 1 1")),
        };
        let mut technique = Element::new("technique")
            .attr("sid", "common")
            .child(Element::new("phong").child(diffuse));

        if let Some(sampler) = bump {
            technique.push(
                Element::new("extra").child(
                    Element::new("technique")
                        .attr("profile", "FCOLLADA")
                        .child(Element::new("bump").child(texture_ref(&sampler))),
                ),
            );
        }
        profile.push(technique);

        let mut effect = Element::new("effect")
            .attr("id", id)
            .attr("name", &material.name)
            .child(profile);

        if !unresolved.is_empty() {
            let mut refs = Element::new("technique").attr("profile", EXTRA_PROFILE);
            for map in unresolved {
                refs.push(
                    Element::new("texture")
                        .attr("role", role_name(map.role))
                        .attr("name", &map.name),
                );
            }
            effect.push(Element::new("extra").child(refs));
        }

        effect
    }

    /// Write the joint hierarchy. Joints whose parent index is missing or
    /// invalid become roots.
    pub fn write_joints(&mut self, joints: &[JointEntry]) -> ExportResult<()> {
        self.advance("write_joints", WriterState::JointsWritten)?;

        let ids: Vec<String> = joints.iter().map(|j| self.ids.claim_id(&j.name)).collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); joints.len()];
        let mut roots = Vec::new();
        for (idx, joint) in joints.iter().enumerate() {
            match joint.parent {
                Some(parent) if parent < joints.len() && parent != idx => children[parent].push(idx),
                _ => roots.push(idx),
            }
        }

        let mut emitted = vec![false; joints.len()];
        for &root in &roots {
            self.joint_nodes
                .push(joint_node(root, joints, &ids, &children, &mut emitted));
            self.skeleton_roots.push(ids[root].clone());
        }
        // Parent cycles never reach a root; emit them from their first member.
        for idx in 0..joints.len() {
            if !emitted[idx] {
                self.joint_nodes
                    .push(joint_node(idx, joints, &ids, &children, &mut emitted));
                self.skeleton_roots.push(ids[idx].clone());
            }
        }

        self.joints = ids
            .into_iter()
            .zip(joints)
            .map(|(id, joint)| WrittenJoint {
                id,
                inverse_bind: joint.inverse_bind,
            })
            .collect();

        debug!(joints = self.joints.len(), roots = self.skeleton_roots.len(), "Joints written");
        Ok(())
    }

    /// Open `<library_geometries>`
    pub fn start_geometry_section(&mut self) -> ExportResult<()> {
        self.advance("start_geometry_section", WriterState::GeometrySectionOpen)
    }

    /// Open a geometry for mesh `name`, returning its document id
    pub fn start_geometry(&mut self, name: &str, triangles: Vec<TriangleList>) -> ExportResult<String> {
        self.advance("start_geometry", WriterState::GeometryOpen)?;

        let id = self.ids.claim_id(&format!("{name}-mesh"));
        self.current = Some(OpenGeometry {
            name: name.to_string(),
            id: id.clone(),
            vertex_count: 0,
            sources: Vec::new(),
            inputs: Vec::new(),
            triangles,
            controller: None,
        });
        Ok(id)
    }

    /// Write one attribute stream of the open geometry.
    ///
    /// `POSITION` must come first and fixes the vertex count every later
    /// stream has to match. `set` is ignored for positions and normals.
    pub fn write_source(&mut self, semantic: Semantic, set: usize, values: &[f32]) -> ExportResult<()> {
        let positions_next = self.state == WriterState::GeometryOpen;
        if positions_next != (semantic == Semantic::Position) {
            return Err(self.invalid_state("write_source"));
        }
        self.advance("write_source", WriterState::GeometrySourcesWritten)?;

        let Some(geometry) = self.current.as_mut() else {
            return Err(self.invalid_state("write_source"));
        };

        let stride = semantic.stride();
        if values.len() % stride != 0 {
            return Err(ExportError::invalid_mesh(
                &geometry.name,
                format!("{} stream length {} is not a multiple of {stride}", semantic.as_str(), values.len()),
            ));
        }
        let count = values.len() / stride;
        if semantic == Semantic::Position {
            geometry.vertex_count = count;
        } else if count != geometry.vertex_count {
            return Err(ExportError::invalid_mesh(
                &geometry.name,
                format!(
                    "{} has {count} entries for {} vertices",
                    semantic.as_str(),
                    geometry.vertex_count
                ),
            ));
        }

        let set = if semantic.has_set() { set } else { 0 };
        if geometry.inputs.iter().any(|(s, n, _)| *s == semantic && *n == set) {
            return Err(ExportError::invalid_mesh(
                &geometry.name,
                format!("{} set {set} written twice", semantic.as_str()),
            ));
        }

        let suffix = if semantic.has_set() {
            format!("{}{set}", semantic.as_str().to_lowercase())
        } else {
            semantic.as_str().to_lowercase()
        };
        let source_id = self.ids.claim_id(&format!("{}-{suffix}", geometry.id));
        let array_id = self.ids.claim_id(&format!("{source_id}-array"));

        let mut accessor = Element::new("accessor")
            .attr("source", url(&array_id))
            .attr("count", count.to_string())
            .attr("stride", stride.to_string());
        for param in semantic.params() {
            accessor.push(Element::new("param").attr("name", *param).attr("type", "float"));
        }

        geometry.sources.push(
            Element::new("source")
                .attr("id", &source_id)
                .child(
                    Element::new("float_array")
                        .attr("id", &array_id)
                        .attr("count", values.len().to_string())
                        .text(join(values)),
                )
                .child(Element::new("technique_common").child(accessor)),
        );
        geometry.inputs.push((semantic, set, source_id));
        Ok(())
    }

    /// Attach a skin controller to the open geometry.
    ///
    /// `influences` holds one entry per vertex; its indices are positions in
    /// the joint list given to [`write_joints`](Self::write_joints).
    pub fn attach_controller(&mut self, influences: &[VertexInfluences]) -> ExportResult<()> {
        let attachable = self.state == WriterState::GeometrySourcesWritten
            && !self.joints.is_empty()
            && self.current.as_ref().is_some_and(|g| g.controller.is_none());
        if !attachable {
            return Err(self.invalid_state("attach_controller"));
        }
        let Some(geometry) = self.current.as_mut() else {
            return Err(self.invalid_state("attach_controller"));
        };

        if influences.len() != geometry.vertex_count {
            return Err(ExportError::invalid_mesh(
                &geometry.name,
                format!(
                    "skin has {} vertices, geometry has {}",
                    influences.len(),
                    geometry.vertex_count
                ),
            ));
        }
        if let Some(bad) = influences
            .iter()
            .flat_map(|v| v.indices.iter())
            .find(|&&slot| slot >= self.joints.len())
        {
            return Err(ExportError::invalid_mesh(
                &geometry.name,
                format!("joint {bad} of {}", self.joints.len()),
            ));
        }

        let skin_id = self.ids.claim_id(&format!("{}-skin", geometry.name));
        let joints_id = self.ids.claim_id(&format!("{skin_id}-joints"));
        let poses_id = self.ids.claim_id(&format!("{skin_id}-bind_poses"));
        let weights_id = self.ids.claim_id(&format!("{skin_id}-weights"));

        let mut weights = Vec::new();
        let mut vcount = Vec::with_capacity(influences.len());
        let mut v = Vec::new();
        for vertex in influences {
            vcount.push(vertex.len());
            for (slot, weight) in vertex.iter() {
                v.push(slot);
                v.push(weights.len());
                weights.push(weight);
            }
        }

        let joint_count = self.joints.len();
        let names_source = {
            let array_id = self.ids.claim_id(&format!("{joints_id}-array"));
            Element::new("source")
                .attr("id", &joints_id)
                .child(
                    Element::new("Name_array")
                        .attr("id", &array_id)
                        .attr("count", joint_count.to_string())
                        .text(join(self.joints.iter().map(|j| j.id.as_str()))),
                )
                .child(accessor(&array_id, joint_count, 1, "JOINT", "name"))
        };
        let poses_source = {
            let array_id = self.ids.claim_id(&format!("{poses_id}-array"));
            let poses = self
                .joints
                .iter()
                .flat_map(|j| j.inverse_bind.to_column_major_flat());
            Element::new("source")
                .attr("id", &poses_id)
                .child(
                    Element::new("float_array")
                        .attr("id", &array_id)
                        .attr("count", (joint_count * 16).to_string())
                        .text(join(poses)),
                )
                .child(accessor(&array_id, joint_count, 16, "TRANSFORM", "float4x4"))
        };
        let weights_source = {
            let array_id = self.ids.claim_id(&format!("{weights_id}-array"));
            Element::new("source")
                .attr("id", &weights_id)
                .child(
                    Element::new("float_array")
                        .attr("id", &array_id)
                        .attr("count", weights.len().to_string())
                        .text(join(&weights)),
                )
                .child(accessor(&array_id, weights.len(), 1, "WEIGHT", "float"))
        };

        let skin = Element::new("skin")
            .attr("source", url(&geometry.id))
            .child(text_element(
                "bind_shape_matrix",
                join(Mat4x4::IDENTITY.to_column_major_flat()),
            ))
            .child(names_source)
            .child(poses_source)
            .child(weights_source)
            .child(
                Element::new("joints")
                    .child(input("JOINT", &joints_id, None))
                    .child(input("INV_BIND_MATRIX", &poses_id, None)),
            )
            .child(
                Element::new("vertex_weights")
                    .attr("count", influences.len().to_string())
                    .child(input("JOINT", &joints_id, Some(0)))
                    .child(input("WEIGHT", &weights_id, Some(1)))
                    .child(text_element("vcount", join(vcount)))
                    .child(text_element("v", join(v))),
            );

        let controller = Element::new("controller")
            .attr("id", &skin_id)
            .attr("name", &geometry.name)
            .child(skin);
        geometry.controller = Some((skin_id, controller));
        Ok(())
    }

    /// Close the open geometry and add its scene node
    pub fn end_geometry_mesh(&mut self) -> ExportResult<()> {
        self.advance("end_geometry_mesh", WriterState::GeometryClosed)?;
        let Some(geometry) = self.current.take() else {
            return Err(self.invalid_state("end_geometry_mesh"));
        };

        for list in &geometry.triangles {
            if list.indices.len() % 3 != 0 {
                return Err(ExportError::invalid_mesh(
                    &geometry.name,
                    format!("triangle list has {} indices", list.indices.len()),
                ));
            }
            if let Some(bad) = list.indices.iter().find(|&&i| i as usize >= geometry.vertex_count) {
                return Err(ExportError::invalid_mesh(
                    &geometry.name,
                    format!("index {bad} of {} vertices", geometry.vertex_count),
                ));
            }
        }

        let OpenGeometry {
            name,
            id,
            vertex_count,
            sources,
            inputs,
            triangles,
            controller,
        } = geometry;

        let vertices_id = self.ids.claim_id(&format!("{id}-vertices"));
        let mut mesh = Element::new("mesh");
        let mut position_source = None;
        for source in sources {
            mesh.push(source);
        }
        for (semantic, _, source_id) in &inputs {
            if *semantic == Semantic::Position {
                position_source = Some(source_id.as_str());
            }
        }
        let mut vertices = Element::new("vertices").attr("id", &vertices_id);
        if let Some(source_id) = position_source {
            vertices.push(input("POSITION", source_id, None));
        }
        mesh.push(vertices);

        let mut symbols: Vec<&str> = Vec::new();
        for list in &triangles {
            let mut element =
                Element::new("triangles").attr("count", list.triangle_count().to_string());
            if let Some(material) = &list.material {
                element = element.attr("material", xml_id(material));
                if !symbols.contains(&material.as_str()) {
                    symbols.push(material);
                }
            }

            element.push(input("VERTEX", &vertices_id, Some(0)));
            for (semantic, set, source_id) in &inputs {
                if *semantic == Semantic::Position {
                    continue;
                }
                let mut stream = input(semantic.as_str(), source_id, Some(0));
                if semantic.has_set() {
                    stream = stream.attr("set", set.to_string());
                }
                element.push(stream);
            }
            element.push(text_element("p", join(&list.indices)));
            mesh.push(element);
        }

        self.geometries.push(
            Element::new("geometry")
                .attr("id", &id)
                .attr("name", &name)
                .child(mesh),
        );

        let mut instance = match &controller {
            Some((skin_id, _)) => {
                let mut instance = Element::new("instance_controller").attr("url", url(skin_id));
                for root in &self.skeleton_roots {
                    instance.push(text_element("skeleton", url(root)));
                }
                instance
            }
            None => Element::new("instance_geometry").attr("url", url(&id)),
        };
        let bindings: Vec<Element> = symbols
            .iter()
            .filter_map(|symbol| {
                let target = self.material_ids.get(*symbol)?;
                Some(
                    Element::new("instance_material")
                        .attr("symbol", xml_id(symbol))
                        .attr("target", url(target))
                        .child(
                            Element::new("bind_vertex_input")
                                .attr("semantic", "CHANNEL0")
                                .attr("input_semantic", "TEXCOORD")
                                .attr("input_set", "0"),
                        ),
                )
            })
            .collect();
        if !bindings.is_empty() {
            let mut common = Element::new("technique_common");
            for binding in bindings {
                common.push(binding);
            }
            instance.push(Element::new("bind_material").child(common));
        }

        let node_id = self.ids.claim_id(&format!("{name}-node"));
        self.scene_nodes.push(
            Element::new("node")
                .attr("id", node_id)
                .attr("name", &name)
                .attr("type", "NODE")
                .child(instance),
        );

        let skinned = controller.is_some();
        if let Some((_, element)) = controller {
            self.controllers.push(element);
        }

        debug!(
            geometry = %id,
            vertices = vertex_count,
            triangle_lists = triangles.len(),
            skinned,
            "Geometry written"
        );
        Ok(())
    }

    /// Close `<library_geometries>`
    pub fn end_geometry_section(&mut self) -> ExportResult<()> {
        self.advance("end_geometry_section", WriterState::GeometrySectionClosed)
    }

    /// Assemble the document and write it to `path`.
    ///
    /// The file is written next to `path` under a temporary name and renamed
    /// into place, so a failed export never leaves a truncated document.
    pub fn finalize(mut self, path: &Path) -> ExportResult<()> {
        self.advance("finalize", WriterState::Finalized)?;
        let root = self.build_document();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut out = BufWriter::new(temp.as_file_mut());
            root.write_with_config(&mut out, EmitterConfig::new().perform_indent(true))?;
            out.flush()?;
        }
        temp.persist(path).map_err(|e| ExportError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        debug!(path = %path.display(), "Document finalized");
        Ok(())
    }

    fn build_document(&mut self) -> Element {
        let mut root = Element::new("COLLADA")
            .attr("xmlns", COLLADA_NAMESPACE)
            .attr("version", &self.version);

        if let Some(asset) = self.asset.take() {
            root.push(asset);
        }
        push_library(&mut root, "library_images", std::mem::take(&mut self.images));
        push_library(&mut root, "library_materials", std::mem::take(&mut self.materials));
        push_library(&mut root, "library_effects", std::mem::take(&mut self.effects));
        push_library(&mut root, "library_nodes", std::mem::take(&mut self.joint_nodes));
        push_library(&mut root, "library_geometries", std::mem::take(&mut self.geometries));
        push_library(&mut root, "library_controllers", std::mem::take(&mut self.controllers));

        let scene_id = self.ids.claim_id("Scene");
        let mut visual_scene = Element::new("visual_scene")
            .attr("id", &scene_id)
            .attr("name", "Scene");
        if !self.skeleton_roots.is_empty() {
            let armature_id = self.ids.claim_id("Armature");
            let mut armature = Element::new("node")
                .attr("id", armature_id)
                .attr("name", "Armature")
                .attr("type", "NODE");
            for joint in &self.skeleton_roots {
                armature.push(Element::new("instance_node").attr("url", url(joint)));
            }
            visual_scene.push(armature);
        }
        for node in std::mem::take(&mut self.scene_nodes) {
            visual_scene.push(node);
        }

        root.push(Element::new("library_visual_scenes").child(visual_scene));
        root.push(
            Element::new("scene")
                .child(Element::new("instance_visual_scene").attr("url", url(&scene_id))),
        );
        root
    }
}

fn joint_node(
    idx: usize,
    joints: &[JointEntry],
    ids: &[String],
    children: &[Vec<usize>],
    emitted: &mut [bool],
) -> Element {
    emitted[idx] = true;
    let joint = &joints[idx];

    let mut node = Element::new("node")
        .attr("id", &ids[idx])
        .attr("name", &joint.name)
        .attr("sid", &ids[idx])
        .attr("type", "JOINT")
        .child(
            text_element("matrix", join(joint.transform.to_column_major_flat()))
                .attr("sid", "transform"),
        );

    for &child in &children[idx] {
        if !emitted[child] {
            node.push(joint_node(child, joints, ids, children, emitted));
        }
    }

    node.push(
        Element::new("extra").child(
            Element::new("technique")
                .attr("profile", EXTRA_PROFILE)
                .child(text_element("position", join(joint.position)))
                .child(text_element("rotation", join(joint.rotation)))
                .child(text_element("scale", join(joint.scale))),
        ),
    );
    node
}

fn push_library(root: &mut Element, name: &str, children: Vec<Element>) {
    if children.is_empty() {
        return;
    }
    let mut library = Element::new(name);
    for child in children {
        library.push(child);
    }
    root.push(library);
}

fn input(semantic: &str, source: &str, offset: Option<usize>) -> Element {
    let element = Element::new("input")
        .attr("semantic", semantic)
        .attr("source", url(source));
    match offset {
        Some(offset) => element.attr("offset", offset.to_string()),
        None => element,
    }
}

fn accessor(array_id: &str, count: usize, stride: usize, param: &str, kind: &str) -> Element {
    Element::new("technique_common").child(
        Element::new("accessor")
            .attr("source", url(array_id))
            .attr("count", count.to_string())
            .attr("stride", stride.to_string())
            .child(Element::new("param").attr("name", param).attr("type", kind)),
    )
}

fn texture_ref(sampler: &str) -> Element {
    Element::new("texture")
        .attr("texture", sampler)
        .attr("texcoord", "CHANNEL0")
}

fn wrap_name(mode: WrapMode) -> &'static str {
    match mode {
        WrapMode::Repeat => "WRAP",
        WrapMode::Mirror => "MIRROR",
        WrapMode::Clamp => "CLAMP",
    }
}

fn role_name(role: MapRole) -> &'static str {
    match role {
        MapRole::Diffuse => "diffuse",
        MapRole::Bump => "bump",
    }
}
