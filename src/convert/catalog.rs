use serde::{Deserialize, Serialize};

use crate::asset::{BufferLayout, LayoutSemantic, Vertex};
use crate::log_debug;
use crate::texture::{RoleCounts, TextureRole, classify_role};

use super::types::CatalogNamespace;

// ─── Catalog document ─────────────────────────────────────────────────────────

/// Material catalog as supplied by the target game's data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub materials: Vec<MaterialDefinition>,
    #[serde(default)]
    pub shaders: Vec<ShaderDescriptor>,
}

/// A material definition: its shader and the channels it samples, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDefinition {
    pub name: String,
    pub shader: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderDescriptor {
    pub name: String,
    #[serde(default)]
    pub vertex_inputs: Vec<ShaderInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderInput {
    pub semantic: ShaderSemantic,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShaderSemantic {
    Position,
    Normal,
    Tangent,
    Binormal,
    BlendIndices,
    BlendWeight,
    Color,
    Texcoord,
}

// ─── Attribute requirements ───────────────────────────────────────────────────

/// Vertex attribute counts a shader consumes or a mesh provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRequirements {
    pub tangent_count: usize,
    pub color_count: usize,
    pub uv_count: usize,
    pub has_bitangent: bool,
    pub has_joints: bool,
}

impl AttributeRequirements {
    pub fn from_shader(shader: &ShaderDescriptor) -> Self {
        let mut requirements = Self::default();
        for input in &shader.vertex_inputs {
            match input.semantic {
                ShaderSemantic::Tangent => requirements.tangent_count += 1,
                ShaderSemantic::Binormal => requirements.has_bitangent = true,
                ShaderSemantic::Color => requirements.color_count += 1,
                ShaderSemantic::BlendIndices | ShaderSemantic::BlendWeight => {
                    requirements.has_joints = true
                }
                ShaderSemantic::Texcoord => requirements.uv_count += 1,
                ShaderSemantic::Position | ShaderSemantic::Normal => {}
            }
        }
        requirements
    }

    /// Usage declared by a mesh's buffer layouts.
    pub fn from_layouts<'a, I>(layouts: I) -> Self
    where
        I: IntoIterator<Item = &'a BufferLayout>,
    {
        let mut requirements = Self::default();
        for member in layouts.into_iter().flat_map(|layout| &layout.members) {
            match member.semantic {
                LayoutSemantic::Tangent => requirements.tangent_count += 1,
                LayoutSemantic::Bitangent => requirements.has_bitangent = true,
                LayoutSemantic::VertexColor => requirements.color_count += 1,
                LayoutSemantic::JointIndices | LayoutSemantic::JointWeights => {
                    requirements.has_joints = true
                }
                LayoutSemantic::Uv => requirements.uv_count += 1,
                LayoutSemantic::Position | LayoutSemantic::Normal => {}
            }
        }
        requirements
    }

    /// Usage observed directly on vertices, for meshes without layouts.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut requirements = Self::default();
        for vertex in vertices {
            requirements.tangent_count = requirements.tangent_count.max(vertex.tangents.len());
            requirements.color_count = requirements.color_count.max(vertex.colors.len());
            requirements.uv_count = requirements.uv_count.max(vertex.uvs.len());
            requirements.has_bitangent |= vertex.bitangent.iter().any(|c| c.abs() > f32::EPSILON);
            requirements.has_joints |= vertex.joint_weights.iter().any(|w| *w > f32::EPSILON);
        }
        requirements
    }

    /// True when these (shader) requirements can hold everything in `usage`.
    ///
    /// Bitangent presence is not compared.
    pub fn covers(&self, usage: &AttributeRequirements) -> bool {
        self.tangent_count >= usage.tangent_count
            && self.color_count >= usage.color_count
            && self.uv_count >= usage.uv_count
            && (self.has_joints || !usage.has_joints)
    }
}

// ─── Catalog index ────────────────────────────────────────────────────────────

/// One required texture slot of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSlot {
    pub identifier: String,
    pub role: Option<TextureRole>,
    /// Occurrence of `role` within the entry (0 for the first albedo, ...).
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub shader: String,
    pub slots: Vec<ChannelSlot>,
    pub role_counts: RoleCounts,
    /// `None` when the entry's shader descriptor is missing from the catalog.
    pub requirements: Option<AttributeRequirements>,
}

impl CatalogEntry {
    fn new(definition: &MaterialDefinition, shaders: &[ShaderDescriptor]) -> Self {
        let mut role_counts = RoleCounts::default();
        let slots = definition
            .channels
            .iter()
            .map(|identifier| {
                let role = classify_role(identifier);
                let index = role.map(|role| role_counts.get(role)).unwrap_or(0);
                if let Some(role) = role {
                    role_counts.add(role);
                }
                ChannelSlot {
                    identifier: identifier.clone(),
                    role,
                    index,
                }
            })
            .collect();

        let requirements = shaders
            .iter()
            .find(|shader| shader.name == definition.shader)
            .map(AttributeRequirements::from_shader);

        Self {
            name: definition.name.clone(),
            shader: definition.shader.clone(),
            slots,
            role_counts,
            requirements,
        }
    }

    /// True when the entry has a slot for every source texture.
    ///
    /// Entries that sample an emissive texture are rejected for sources with
    /// none, since the placeholder would light the whole surface.
    pub fn is_satisfiable(&self, source_roles: &RoleCounts) -> bool {
        let holds_all = source_roles
            .iter()
            .all(|(role, count)| self.role_counts.get(role) >= count);
        let emissive_mismatch = self.role_counts.get(TextureRole::Emissive) > 0
            && source_roles.get(TextureRole::Emissive) == 0;
        holds_all && !emissive_mismatch
    }

    pub fn is_shader_compatible(&self, usage: &AttributeRequirements) -> bool {
        self.requirements
            .as_ref()
            .is_some_and(|requirements| requirements.covers(usage))
    }
}

/// Predicates for [`MaterialCatalog::candidates`]; unset fields match all.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogQuery<'a> {
    pub namespace: Option<CatalogNamespace>,
    pub source_roles: Option<&'a RoleCounts>,
    pub vertex_usage: Option<&'a AttributeRequirements>,
}

impl<'a> CatalogQuery<'a> {
    pub fn in_namespace(mut self, namespace: CatalogNamespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn holding(mut self, source_roles: &'a RoleCounts) -> Self {
        self.source_roles = Some(source_roles);
        self
    }

    pub fn supporting(mut self, vertex_usage: &'a AttributeRequirements) -> Self {
        self.vertex_usage = Some(vertex_usage);
        self
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        self.namespace
            .is_none_or(|namespace| namespace.contains(&entry.name))
            && self
                .source_roles
                .is_none_or(|roles| entry.is_satisfiable(roles))
            && self
                .vertex_usage
                .is_none_or(|usage| entry.is_shader_compatible(usage))
    }
}

/// Catalog entries in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    entries: Vec<CatalogEntry>,
}

impl MaterialCatalog {
    pub fn new(document: &CatalogDocument) -> Self {
        let entries: Vec<CatalogEntry> = document
            .materials
            .iter()
            .map(|definition| CatalogEntry::new(definition, &document.shaders))
            .collect();

        for entry in entries.iter().filter(|entry| entry.requirements.is_none()) {
            log_debug!(
                "catalog entry '{}' references unknown shader '{}'",
                entry.name,
                entry.shader
            );
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look an entry up by definition name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// All entries matching the query, in catalog order.
    pub fn candidates(&self, query: &CatalogQuery<'_>) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| query.matches(entry))
            .collect()
    }

    /// First matching entry in catalog order. No ranking is applied.
    pub fn find_first(&self, query: &CatalogQuery<'_>) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| query.matches(entry))
    }
}
