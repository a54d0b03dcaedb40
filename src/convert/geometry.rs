use serde::{Deserialize, Serialize};

use crate::asset::{BoundingBox, MeshAsset};
use crate::log_warn;

use super::types::{Severity, ValidationIssue};

/// Vertex count above which the target runtime cannot index a mesh.
const VERTEX_LIMIT: usize = 65_535;

// ─── Mesh statistics ──────────────────────────────────────────────────────────

/// Collect total vertex count and hard-limit validation issues.
pub(super) fn collect_mesh_statistics(asset: &MeshAsset) -> (usize, Vec<ValidationIssue>) {
    let mut total_vertices = 0usize;
    let mut issues = Vec::<ValidationIssue>::new();

    for (mesh_index, mesh) in asset.meshes.iter().enumerate() {
        let vertex_count = mesh.vertices.len();
        total_vertices += vertex_count;

        if vertex_count > VERTEX_LIMIT {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                "VERTEX_LIMIT_EXCEEDED",
                format!(
                    "Vertex limit exceeded (mesh: {}, current: {} / limit: {})",
                    mesh_index, vertex_count, VERTEX_LIMIT
                ),
            ));
        }
    }

    (total_vertices, issues)
}

// ─── Bounding volumes ─────────────────────────────────────────────────────────

/// Outcome of [`recalculate_bounding_boxes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsReport {
    /// Nodes whose `disabled` flag was cleared by this pass.
    pub nodes_enabled: usize,
    /// Weighted joint lanes pointing outside the node list.
    pub invalid_joint_refs: usize,
}

/// Recompute asset, mesh and node bounding boxes from vertex positions.
///
/// Asset and node boxes restart at the origin, so they always contain it.
/// Mesh boxes that exist restart empty. A node box grows only for vertices
/// weighted to it, and such a node is re-enabled.
pub fn recalculate_bounding_boxes(asset: &mut MeshAsset) -> BoundsReport {
    let MeshAsset {
        bounding_box,
        nodes,
        meshes,
        ..
    } = asset;

    *bounding_box = BoundingBox::zero();
    for node in nodes.iter_mut() {
        node.bounding_box = BoundingBox::zero();
    }

    let mut report = BoundsReport::default();
    for (mesh_index, mesh) in meshes.iter_mut().enumerate() {
        if let Some(mesh_box) = mesh.bounding_box.as_mut() {
            *mesh_box = BoundingBox::empty();
        }

        let mut invalid_in_mesh = 0usize;
        for vertex in &mesh.vertices {
            bounding_box.expand(&vertex.position);
            if let Some(mesh_box) = mesh.bounding_box.as_mut() {
                mesh_box.expand(&vertex.position);
            }

            for (joint, weight) in vertex.joint_indices.iter().zip(vertex.joint_weights) {
                if weight <= f32::EPSILON {
                    continue;
                }
                let node = match usize::try_from(*joint) {
                    Ok(index) => nodes.get_mut(index),
                    Err(_) => None,
                };
                let Some(node) = node else {
                    invalid_in_mesh += 1;
                    continue;
                };

                node.bounding_box.expand(&vertex.position);
                if node.disabled {
                    node.disabled = false;
                    report.nodes_enabled += 1;
                }
            }
        }

        // Vertex-less meshes end with a zero box, never an inverted one.
        if let Some(mesh_box) = mesh.bounding_box.as_mut().filter(|b| b.is_empty()) {
            *mesh_box = BoundingBox::zero();
        }

        if invalid_in_mesh > 0 {
            log_warn!(
                "Mesh {} references {} joint(s) outside the {} node(s); skipped",
                mesh_index,
                invalid_in_mesh,
                nodes.len()
            );
        }
        report.invalid_joint_refs += invalid_in_mesh;
    }

    report
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::asset::{Mesh, Node, Vertex};

    fn weighted(position: [f32; 3], joint: i32) -> Vertex {
        let mut vertex = Vertex::at(Vector3::from(position));
        vertex.joint_indices = [joint, 0, 0, 0];
        vertex.joint_weights = [1.0, 0.0, 0.0, 0.0];
        vertex
    }

    fn asset_with(vertices: Vec<Vertex>, node_count: usize) -> MeshAsset {
        MeshAsset {
            nodes: (0..node_count)
                .map(|i| Node {
                    disabled: true,
                    ..Node::new(format!("joint_{i}"))
                })
                .collect(),
            meshes: vec![Mesh {
                material_index: 0,
                bounding_box: Some(BoundingBox::zero()),
                vertices,
                vertex_buffers: Vec::new(),
            }],
            ..MeshAsset::default()
        }
    }

    #[test]
    fn given_negative_geometry_when_recalculating_then_min_corner_drops_below_zero() {
        let mut asset = asset_with(vec![weighted([-1.0, -2.0, -3.0], 0)], 1);

        recalculate_bounding_boxes(&mut asset);

        assert_eq!(asset.bounding_box.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(asset.bounding_box.max, Vector3::zeros());
        assert_eq!(asset.nodes[0].bounding_box, asset.bounding_box);
        let mesh_box = asset.meshes[0].bounding_box.expect("mesh box kept");
        assert_eq!(mesh_box.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh_box.max, Vector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn given_reordered_vertices_when_recalculating_then_boxes_are_identical() {
        let vertices = vec![
            weighted([1.0, 5.0, -2.0], 0),
            weighted([-4.0, 2.0, 3.0], 1),
            weighted([2.0, -1.0, 0.5], 0),
        ];
        let mut forward = asset_with(vertices.clone(), 2);
        let mut reversed = asset_with(vertices.into_iter().rev().collect(), 2);

        recalculate_bounding_boxes(&mut forward);
        recalculate_bounding_boxes(&mut reversed);

        assert_eq!(forward.bounding_box, reversed.bounding_box);
        assert_eq!(forward.meshes[0].bounding_box, reversed.meshes[0].bounding_box);
        assert_eq!(forward.nodes, reversed.nodes);
    }

    #[test]
    fn given_unreferenced_nodes_when_recalculating_then_flags_only_clear() {
        let mut asset = asset_with(vec![weighted([1.0, 1.0, 1.0], 0)], 3);
        asset.nodes[2].disabled = false;

        let report = recalculate_bounding_boxes(&mut asset);

        assert_eq!(report.nodes_enabled, 1);
        assert!(!asset.nodes[0].disabled);
        assert!(asset.nodes[1].disabled);
        assert!(!asset.nodes[2].disabled);

        let again = recalculate_bounding_boxes(&mut asset);
        assert_eq!(again.nodes_enabled, 0);
        assert!(!asset.nodes[0].disabled);
    }

    #[test]
    fn given_out_of_range_joints_when_recalculating_then_they_are_skipped_and_counted() {
        let mut unweighted = weighted([0.0, 0.0, 0.0], 42);
        unweighted.joint_weights = [0.0; 4];
        let mut asset = asset_with(
            vec![
                weighted([1.0, 0.0, 0.0], -1),
                weighted([2.0, 0.0, 0.0], 99),
                unweighted,
            ],
            1,
        );

        let report = recalculate_bounding_boxes(&mut asset);

        assert_eq!(report.invalid_joint_refs, 2);
        assert_eq!(report.nodes_enabled, 0);
        assert_eq!(asset.bounding_box.max, Vector3::new(2.0, 0.0, 0.0));
        assert!(asset.nodes[0].disabled);
    }

    #[test]
    fn given_mesh_without_box_when_recalculating_then_none_is_kept() {
        let mut asset = asset_with(vec![weighted([1.0, 1.0, 1.0], 0)], 1);
        asset.meshes[0].bounding_box = None;

        recalculate_bounding_boxes(&mut asset);

        assert!(asset.meshes[0].bounding_box.is_none());
    }

    #[test]
    fn given_oversized_mesh_when_collecting_statistics_then_warning_is_issued() {
        let vertices = vec![Vertex::at(Vector3::zeros()); VERTEX_LIMIT + 1];
        let asset = asset_with(vertices, 0);

        let (total, issues) = collect_mesh_statistics(&asset);

        assert_eq!(total, VERTEX_LIMIT + 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "VERTEX_LIMIT_EXCEEDED");
    }
}
