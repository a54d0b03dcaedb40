use crate::asset::MeshAsset;
use crate::texture::classify;

use super::types::{Severity, ValidationIssue};

// ─── Mesh references ──────────────────────────────────────────────────────────

/// Check that meshes point at existing materials and buffer layouts.
pub(super) fn validate_mesh_references(asset: &MeshAsset) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (mesh_index, mesh) in asset.meshes.iter().enumerate() {
        if mesh.material_index >= asset.materials.len() {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                "MATERIAL_INDEX_OUT_OF_RANGE",
                format!(
                    "Mesh {} uses material {} but the asset has {} material(s); it is ported without one",
                    mesh_index,
                    mesh.material_index,
                    asset.materials.len()
                ),
            ));
        }

        for buffer in &mesh.vertex_buffers {
            if buffer.layout_index >= asset.buffer_layouts.len() {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    "LAYOUT_INDEX_OUT_OF_RANGE",
                    format!(
                        "Mesh {} buffer {} references missing layout {}; usage is measured from vertices",
                        mesh_index, buffer.buffer_index, buffer.layout_index
                    ),
                ));
            }
        }

        if mesh.vertices.is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Info,
                "EMPTY_MESH",
                format!("Mesh {} has no vertices", mesh_index),
            ));
        }
    }

    issues
}

/// Indices of meshes whose material index points past the material list.
pub(super) fn collect_meshes_without_material(asset: &MeshAsset) -> Vec<usize> {
    asset
        .meshes
        .iter()
        .enumerate()
        .filter(|(_, mesh)| mesh.material_index >= asset.materials.len())
        .map(|(mesh_index, _)| mesh_index)
        .collect()
}

// ─── Node hierarchy ───────────────────────────────────────────────────────────

/// Validate parent/child links of the skeleton.
pub(super) fn validate_node_hierarchy(asset: &MeshAsset) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let node_count = asset.nodes.len();

    for (index, node) in asset.nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            if parent >= node_count || parent == index {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    "INVALID_NODE_HIERARCHY",
                    format!("Node '{}' has invalid parent index {}", node.name, parent),
                ));
            }
        }

        for &child in &node.children {
            let linked_back = asset
                .nodes
                .get(child)
                .is_some_and(|child_node| child_node.parent == Some(index));
            if !linked_back {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    "INCONSISTENT_NODE_CHILD",
                    format!(
                        "Node '{}' lists child {} which does not name it as parent",
                        node.name, child
                    ),
                ));
            }
        }
    }

    issues
}

// ─── Skinning ─────────────────────────────────────────────────────────────────

/// Report weighted joint lanes that point outside the node list, per mesh.
pub(super) fn validate_joint_references(asset: &MeshAsset) -> Vec<ValidationIssue> {
    let node_count = asset.nodes.len();

    asset
        .meshes
        .iter()
        .enumerate()
        .filter_map(|(mesh_index, mesh)| {
            let invalid = mesh
                .vertices
                .iter()
                .flat_map(|vertex| vertex.joint_indices.iter().zip(vertex.joint_weights))
                .filter(|(joint, weight)| {
                    *weight > f32::EPSILON
                        && usize::try_from(**joint).map_or(true, |index| index >= node_count)
                })
                .count();

            (invalid > 0).then(|| {
                ValidationIssue::new(
                    Severity::Warning,
                    "INVALID_JOINT_REFERENCE",
                    format!(
                        "Mesh {} has {} weighted joint reference(s) outside {} node(s); they are ignored",
                        mesh_index, invalid, node_count
                    ),
                )
            })
        })
        .collect()
}

// ─── Materials ────────────────────────────────────────────────────────────────

/// Channels whose identifiers map to no known texture role, as
/// `material/identifier`.
pub(super) fn collect_unclassified_channels(asset: &MeshAsset) -> Vec<String> {
    asset
        .materials
        .iter()
        .flat_map(|material| {
            material
                .channels
                .iter()
                .filter(|channel| classify(&channel.identifier).is_none())
                .map(move |channel| format!("{}/{}", material.name, channel.identifier))
        })
        .collect()
}
