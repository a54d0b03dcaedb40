//! In-memory mesh asset model exchanged with the packaging layer.
//!
//! The model mirrors the container's skeleton/mesh/material/layout tables so a
//! packaging collaborator can serialize it without further translation. All
//! types derive `serde` so assets round-trip through JSON documents.

use nalgebra::{Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::texture::TextureRole;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    /// Box collapsed onto the origin.
    pub fn zero() -> Self {
        Self {
            min: Vector3::zeros(),
            max: Vector3::zeros(),
        }
    }

    /// Inverted box that any expansion replaces entirely.
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `point`, independently per axis.
    pub fn expand(&mut self, point: &Vector3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Skeleton joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub children: Vec<usize>,
    #[serde(default = "zero3")]
    pub translation: Vector3<f32>,
    /// Euler rotation in radians.
    #[serde(default = "zero3")]
    pub rotation: Vector3<f32>,
    #[serde(default = "unit_scale")]
    pub scale: Vector3<f32>,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    /// Set when no geometry is skinned to this node.
    #[serde(default)]
    pub disabled: bool,
}

fn zero3() -> Vector3<f32> {
    Vector3::zeros()
}

fn zero4() -> Vector4<f32> {
    Vector4::zeros()
}

fn unit_scale() -> Vector3<f32> {
    Vector3::repeat(1.0)
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            translation: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: unit_scale(),
            bounding_box: BoundingBox::zero(),
            disabled: false,
        }
    }
}

/// RGBA vertex color with normalized float channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VertexColor {
    /// Fill color for vertices padded up to a layout's color count.
    pub const PLACEHOLDER: VertexColor = VertexColor {
        r: 1.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vector3<f32>,
    #[serde(default = "zero3")]
    pub normal: Vector3<f32>,
    #[serde(default)]
    pub tangents: Vec<Vector4<f32>>,
    #[serde(default = "zero4")]
    pub bitangent: Vector4<f32>,
    #[serde(default)]
    pub colors: Vec<VertexColor>,
    #[serde(default)]
    pub uvs: Vec<Vector2<f32>>,
    /// Node indices; negative or out-of-range entries are tolerated.
    #[serde(default)]
    pub joint_indices: [i32; 4],
    #[serde(default)]
    pub joint_weights: [f32; 4],
}

impl Vertex {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            tangents: Vec::new(),
            bitangent: Vector4::zeros(),
            colors: Vec::new(),
            uvs: Vec::new(),
            joint_indices: [0; 4],
            joint_weights: [0.0; 4],
        }
    }
}

/// One vertex stream of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexBuffer {
    /// Index into [`MeshAsset::buffer_layouts`].
    pub layout_index: usize,
    /// Stream slot this buffer is bound to.
    pub buffer_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub material_index: usize,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub vertex_buffers: Vec<VertexBuffer>,
}

/// Tiling parameters carried over from the source texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tiling {
    pub scale: Vector2<f32>,
    pub wrap_u: u8,
    pub wrap_v: u8,
}

impl Default for Tiling {
    fn default() -> Self {
        Self {
            scale: Vector2::repeat(1.0),
            wrap_u: 0,
            wrap_v: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureChannel {
    /// Free-form channel name as authored, e.g. `g_DiffuseTexture`.
    pub identifier: String,
    /// `None` when the identifier is not a known role token.
    #[serde(default)]
    pub role: Option<TextureRole>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub tiling: Tiling,
}

impl TextureChannel {
    pub fn new(identifier: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            role: None,
            path: path.into(),
            tiling: Tiling::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Material definition identifier; empty when unassigned.
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub channels: Vec<TextureChannel>,
}

impl Material {
    pub fn is_unassigned(&self) -> bool {
        self.definition.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutType {
    Float2,
    Float3,
    Float4,
    UByte4,
    UByte4Norm,
    Short2,
    Short4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutSemantic {
    Position,
    Normal,
    Tangent,
    Bitangent,
    JointIndices,
    JointWeights,
    VertexColor,
    Uv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutMember {
    pub member_type: LayoutType,
    pub semantic: LayoutSemantic,
    #[serde(default)]
    pub index: u32,
}

impl LayoutMember {
    pub const fn new(member_type: LayoutType, semantic: LayoutSemantic, index: u32) -> Self {
        Self {
            member_type,
            semantic,
            index,
        }
    }
}

/// Packed description of one vertex stream.
///
/// `PartialEq` compares full `(type, semantic, index)` triples; use
/// [`BufferLayout::same_shape`] to ignore member indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferLayout {
    pub members: Vec<LayoutMember>,
}

impl BufferLayout {
    pub fn new(members: Vec<LayoutMember>) -> Self {
        Self { members }
    }

    /// True when both layouts list the same `(type, semantic)` pairs in order.
    pub fn same_shape(&self, other: &BufferLayout) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.member_type == b.member_type && a.semantic == b.semantic)
    }

    pub fn count_semantic(&self, semantic: LayoutSemantic) -> usize {
        self.members
            .iter()
            .filter(|member| member.semantic == semantic)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub buffer_layouts: Vec<BufferLayout>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_box_when_expanding_then_box_matches_point() {
        let mut bounds = BoundingBox::empty();
        assert!(bounds.is_empty());

        bounds.expand(&Vector3::new(1.0, -2.0, 3.0));

        assert!(!bounds.is_empty());
        assert_eq!(bounds.min, Vector3::new(1.0, -2.0, 3.0));
        assert_eq!(bounds.max, Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn given_layouts_differing_only_in_index_when_comparing_then_shape_matches() {
        let a = BufferLayout::new(vec![LayoutMember::new(
            LayoutType::Float2,
            LayoutSemantic::Uv,
            0,
        )]);
        let b = BufferLayout::new(vec![LayoutMember::new(
            LayoutType::Float2,
            LayoutSemantic::Uv,
            1,
        )]);

        assert!(a.same_shape(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn given_minimal_vertex_json_when_deserializing_then_optional_attributes_default() {
        let vertex: Vertex = serde_json::from_value(serde_json::json!({
            "position": [1.0, 2.0, 3.0]
        }))
        .expect("deserialize vertex");

        assert_eq!(vertex.position, Vector3::new(1.0, 2.0, 3.0));
        assert!(vertex.tangents.is_empty());
        assert!(vertex.uvs.is_empty());
        assert_eq!(vertex.joint_indices, [0; 4]);
    }
}
