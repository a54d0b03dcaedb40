use nalgebra::{Vector2, Vector4};
use serde::{Deserialize, Serialize};

use crate::asset::{
    BufferLayout, LayoutMember, LayoutSemantic, LayoutType, Mesh, Vertex, VertexBuffer,
    VertexColor,
};

/// Populated attributes of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSignature {
    pub has_position: bool,
    pub has_normal: bool,
    pub has_bitangent: bool,
    pub tangent_count: usize,
    pub color_count: usize,
    pub uv_count: usize,
    /// Any joint weight is non-zero; emits both joint members.
    pub skinned: bool,
}

fn any_nonzero<'a>(components: impl IntoIterator<Item = &'a f32>) -> bool {
    components.into_iter().any(|c| c.abs() > f32::EPSILON)
}

impl AttributeSignature {
    pub fn of(vertex: &Vertex) -> Self {
        Self {
            has_position: any_nonzero(vertex.position.iter()),
            has_normal: any_nonzero(vertex.normal.iter()),
            has_bitangent: any_nonzero(vertex.bitangent.iter()),
            tangent_count: vertex.tangents.len(),
            color_count: vertex.colors.len(),
            uv_count: vertex.uvs.len(),
            skinned: vertex.joint_weights.iter().any(|w| *w > f32::EPSILON),
        }
    }

    /// Packed layout for this signature in the target's member order.
    pub fn to_layout(&self) -> BufferLayout {
        let mut members = Vec::new();
        if self.has_position {
            members.push(LayoutMember::new(LayoutType::Float3, LayoutSemantic::Position, 0));
        }
        if self.has_normal {
            members.push(LayoutMember::new(LayoutType::UByte4, LayoutSemantic::Normal, 0));
        }
        if self.has_bitangent {
            members.push(LayoutMember::new(LayoutType::UByte4, LayoutSemantic::Bitangent, 0));
        }
        for i in 0..self.tangent_count as u32 {
            members.push(LayoutMember::new(LayoutType::UByte4, LayoutSemantic::Tangent, i));
        }
        if self.skinned {
            members.push(LayoutMember::new(LayoutType::UByte4, LayoutSemantic::JointIndices, 0));
            members.push(LayoutMember::new(
                LayoutType::UByte4Norm,
                LayoutSemantic::JointWeights,
                0,
            ));
        }
        for i in 0..self.color_count as u32 {
            members.push(LayoutMember::new(
                LayoutType::UByte4Norm,
                LayoutSemantic::VertexColor,
                i + 1,
            ));
        }
        for i in 0..self.uv_count as u32 {
            members.push(LayoutMember::new(LayoutType::Float2, LayoutSemantic::Uv, i));
        }
        BufferLayout::new(members)
    }
}

/// Layouts chosen for one mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutAssignment {
    /// Arena index per buffer stream, in stream order.
    pub layout_indices: Vec<usize>,
    pub vertices_padded: usize,
}

/// Distinct vertex signatures in first-encountered order.
pub fn distinct_signatures(vertices: &[Vertex]) -> Vec<AttributeSignature> {
    let mut signatures: Vec<AttributeSignature> = Vec::new();
    for signature in vertices.iter().map(AttributeSignature::of) {
        if !signatures.contains(&signature) {
            signatures.push(signature);
        }
    }
    signatures
}

/// Index of a layout with the same shape in `arena`, appending it if absent.
pub fn intern_layout(arena: &mut Vec<BufferLayout>, layout: BufferLayout) -> usize {
    match arena.iter().position(|existing| existing.same_shape(&layout)) {
        Some(index) => index,
        None => {
            arena.push(layout);
            arena.len() - 1
        }
    }
}

/// Pad every vertex to the largest tangent, UV and color counts declared by
/// `layouts`. Returns how many vertices grew.
pub fn pad_vertices(vertices: &mut [Vertex], layouts: &[BufferLayout]) -> usize {
    let max_of = |semantic: LayoutSemantic| {
        layouts
            .iter()
            .map(|layout| layout.count_semantic(semantic))
            .max()
            .unwrap_or(0)
    };
    let tangents = max_of(LayoutSemantic::Tangent);
    let uvs = max_of(LayoutSemantic::Uv);
    let colors = max_of(LayoutSemantic::VertexColor);

    let mut padded = 0;
    for vertex in vertices.iter_mut() {
        let before = (vertex.tangents.len(), vertex.uvs.len(), vertex.colors.len());
        if vertex.tangents.len() < tangents {
            vertex.tangents.resize(tangents, Vector4::zeros());
        }
        if vertex.uvs.len() < uvs {
            vertex.uvs.resize(uvs, Vector2::zeros());
        }
        if vertex.colors.len() < colors {
            vertex.colors.resize(colors, VertexColor::PLACEHOLDER);
        }
        if before != (vertex.tangents.len(), vertex.uvs.len(), vertex.colors.len()) {
            padded += 1;
        }
    }
    padded
}

/// Synthesize the buffer layouts of `mesh` from its vertex data.
///
/// Emits one layout per distinct signature, deduplicated against `arena`,
/// rebinds the mesh's vertex buffers and pads the vertices.
pub fn synthesize_layouts(mesh: &mut Mesh, arena: &mut Vec<BufferLayout>) -> LayoutAssignment {
    let layouts: Vec<BufferLayout> = distinct_signatures(&mesh.vertices)
        .iter()
        .map(AttributeSignature::to_layout)
        .collect();

    let vertices_padded = pad_vertices(&mut mesh.vertices, &layouts);

    let layout_indices: Vec<usize> = layouts
        .into_iter()
        .map(|layout| intern_layout(arena, layout))
        .collect();

    mesh.vertex_buffers = layout_indices
        .iter()
        .enumerate()
        .map(|(buffer_index, layout_index)| VertexBuffer {
            layout_index: *layout_index,
            buffer_index,
        })
        .collect();

    LayoutAssignment {
        layout_indices,
        vertices_padded,
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    fn vertex_with_uvs(uvs: usize) -> Vertex {
        let mut vertex = Vertex::at(Vector3::new(1.0, 2.0, 3.0));
        vertex.normal = Vector3::new(0.0, 1.0, 0.0);
        vertex.uvs = vec![Vector2::new(0.5, 0.5); uvs];
        vertex
    }

    fn mesh(vertices: Vec<Vertex>) -> Mesh {
        Mesh {
            material_index: 0,
            bounding_box: None,
            vertices,
            vertex_buffers: Vec::new(),
        }
    }

    #[test]
    fn given_vertices_with_one_and_two_uvs_when_synthesizing_then_both_pad_to_two() {
        let mut mesh = mesh(vec![vertex_with_uvs(1), vertex_with_uvs(2)]);
        let mut arena = Vec::new();

        let assignment = synthesize_layouts(&mut mesh, &mut arena);

        assert_eq!(assignment.layout_indices, vec![0, 1]);
        assert_eq!(assignment.vertices_padded, 1);
        assert_eq!(arena.len(), 2);
        assert!(mesh.vertices.iter().all(|vertex| vertex.uvs.len() == 2));
        assert_eq!(mesh.vertices[0].uvs[1], Vector2::zeros());
        assert_eq!(
            mesh.vertex_buffers,
            vec![
                VertexBuffer {
                    layout_index: 0,
                    buffer_index: 0
                },
                VertexBuffer {
                    layout_index: 1,
                    buffer_index: 1
                },
            ]
        );
    }

    #[test]
    fn given_identical_meshes_when_synthesizing_then_arena_is_reused() {
        let mut first = mesh(vec![vertex_with_uvs(1)]);
        let mut second = mesh(vec![vertex_with_uvs(1), vertex_with_uvs(1)]);
        let mut arena = Vec::new();

        let a = synthesize_layouts(&mut first, &mut arena);
        let b = synthesize_layouts(&mut second, &mut arena);

        assert_eq!(arena.len(), 1);
        assert_eq!(a.layout_indices, b.layout_indices);
        assert_eq!(b.vertices_padded, 0);
    }

    #[test]
    fn given_full_vertex_when_building_layout_then_member_order_is_fixed() {
        let mut vertex = vertex_with_uvs(2);
        vertex.bitangent = Vector4::new(0.0, 0.0, 1.0, 1.0);
        vertex.tangents = vec![Vector4::new(1.0, 0.0, 0.0, 1.0)];
        vertex.colors = vec![VertexColor::new(1.0, 1.0, 1.0, 1.0)];
        vertex.joint_weights = [1.0, 0.0, 0.0, 0.0];

        let layout = AttributeSignature::of(&vertex).to_layout();
        let members: Vec<(LayoutType, LayoutSemantic, u32)> = layout
            .members
            .iter()
            .map(|m| (m.member_type, m.semantic, m.index))
            .collect();

        assert_eq!(
            members,
            vec![
                (LayoutType::Float3, LayoutSemantic::Position, 0),
                (LayoutType::UByte4, LayoutSemantic::Normal, 0),
                (LayoutType::UByte4, LayoutSemantic::Bitangent, 0),
                (LayoutType::UByte4, LayoutSemantic::Tangent, 0),
                (LayoutType::UByte4, LayoutSemantic::JointIndices, 0),
                (LayoutType::UByte4Norm, LayoutSemantic::JointWeights, 0),
                (LayoutType::UByte4Norm, LayoutSemantic::VertexColor, 1),
                (LayoutType::Float2, LayoutSemantic::Uv, 0),
                (LayoutType::Float2, LayoutSemantic::Uv, 1),
            ]
        );
    }

    #[test]
    fn given_missing_colors_when_padding_then_placeholder_color_is_used() {
        let mut colored = vertex_with_uvs(0);
        colored.colors = vec![VertexColor::new(0.0, 0.0, 0.0, 1.0)];
        let mut mesh = mesh(vec![vertex_with_uvs(0), colored]);

        synthesize_layouts(&mut mesh, &mut Vec::new());

        assert_eq!(mesh.vertices[0].colors, vec![VertexColor::PLACEHOLDER]);
        assert!(mesh.vertices[0].tangents.is_empty());
    }

    #[test]
    fn given_mesh_without_vertices_when_synthesizing_then_nothing_is_emitted() {
        let mut empty = mesh(Vec::new());
        let mut arena = Vec::new();

        let assignment = synthesize_layouts(&mut empty, &mut arena);

        assert_eq!(assignment, LayoutAssignment::default());
        assert!(arena.is_empty());
        assert!(empty.vertex_buffers.is_empty());
    }

    #[test]
    fn given_origin_vertex_when_signing_then_position_is_absent() {
        let signature = AttributeSignature::of(&Vertex::at(Vector3::zeros()));
        assert!(!signature.has_position);
        assert!(!signature.skinned);
    }
}
