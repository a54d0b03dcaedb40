use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::asset::{BoundingBox, MeshAsset};
use crate::texture::TextureRole;

use super::material::is_placeholder;
use super::types::{AssetType, ConversionReport, ConvertOptions, MaterialMode};

// ─── Diagnostic structs ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub(super) struct ChannelDiagnostic {
    identifier: String,
    role: Option<TextureRole>,
    path: String,
    placeholder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct MaterialDiagnostic {
    index: usize,
    name: String,
    source_definition: String,
    definition: String,
    unassigned: bool,
    source_channel_count: usize,
    channels: Vec<ChannelDiagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct MeshDiagnostic {
    index: usize,
    material_index: usize,
    vertex_count: usize,
    layout_indices: Vec<usize>,
    vertices_padded: usize,
    bounding_box: Option<[[f32; 3]; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct ConversionDiagnosticLog {
    output_path: String,
    asset_type: AssetType,
    material_mode: MaterialMode,
    bounds_recalculated: bool,
    asset_bounding_box: [[f32; 3]; 2],
    layout_count: usize,
    materials: Vec<MaterialDiagnostic>,
    meshes: Vec<MeshDiagnostic>,
}

fn box_corners(bounds: &BoundingBox) -> [[f32; 3]; 2] {
    [bounds.min.into(), bounds.max.into()]
}

// ─── Path helper ──────────────────────────────────────────────────────────────

pub(super) fn diagnostic_log_path_for_output(output_path: &Path) -> PathBuf {
    output_path.with_extension("diagnostic.json")
}

// ─── Diagnostic builder / writer ──────────────────────────────────────────────

/// Record every material and mesh decision made for one conversion.
pub(super) fn build_conversion_diagnostic_log(
    output_path: &Path,
    source: &MeshAsset,
    output: &MeshAsset,
    report: &ConversionReport,
    options: &ConvertOptions,
) -> ConversionDiagnosticLog {
    let materials = output
        .materials
        .iter()
        .enumerate()
        .map(|(index, material)| {
            let source_material = source.materials.get(index);
            MaterialDiagnostic {
                index,
                name: material.name.clone(),
                source_definition: source_material
                    .map(|m| m.definition.clone())
                    .unwrap_or_default(),
                definition: material.definition.clone(),
                unassigned: material.is_unassigned(),
                source_channel_count: source_material.map_or(0, |m| m.channels.len()),
                channels: material
                    .channels
                    .iter()
                    .map(|channel| ChannelDiagnostic {
                        identifier: channel.identifier.clone(),
                        role: channel.role,
                        path: channel.path.clone(),
                        placeholder: is_placeholder(channel, options),
                    })
                    .collect(),
            }
        })
        .collect();

    let meshes = output
        .meshes
        .iter()
        .enumerate()
        .map(|(index, mesh)| {
            let assignment = report.mesh_layouts.get(index);
            MeshDiagnostic {
                index,
                material_index: mesh.material_index,
                vertex_count: mesh.vertices.len(),
                layout_indices: assignment
                    .map(|a| a.layout_indices.clone())
                    .unwrap_or_default(),
                vertices_padded: assignment.map_or(0, |a| a.vertices_padded),
                bounding_box: mesh
                    .bounding_box
                    .as_ref()
                    .filter(|bounds| !bounds.is_empty())
                    .map(box_corners),
            }
        })
        .collect();

    ConversionDiagnosticLog {
        output_path: output_path.display().to_string(),
        asset_type: report.asset_type,
        material_mode: report.material_mode,
        bounds_recalculated: report.bounds_recalculated,
        asset_bounding_box: box_corners(&output.bounding_box),
        layout_count: output.buffer_layouts.len(),
        materials,
        meshes,
    }
}

pub(super) fn write_conversion_diagnostic_log(
    diagnostic_path: &Path,
    log: &ConversionDiagnosticLog,
) -> Result<()> {
    let text = serde_json::to_string_pretty(log)
        .context("failed to serialize conversion diagnostic log")?;
    fs::write(diagnostic_path, text).with_context(|| {
        format!(
            "failed to write conversion diagnostic log: {}",
            diagnostic_path.display()
        )
    })?;
    Ok(())
}
