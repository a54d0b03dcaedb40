mod catalog;
mod diagnostic;
mod geometry;
mod layout;
mod material;
mod types;
mod validation;

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::asset::MeshAsset;
use crate::document::{load_catalog, load_mesh_asset, save_mesh_asset};
use crate::error::ConvertError;
use crate::logging::ResultExt;
use crate::{log_info, log_warn};

// Re-export public types for callers of this module.
pub use catalog::{
    AttributeRequirements, CatalogDocument, CatalogEntry, CatalogQuery, ChannelSlot,
    MaterialCatalog, MaterialDefinition, ShaderDescriptor, ShaderInput, ShaderSemantic,
};
pub use geometry::{BoundsReport, recalculate_bounding_boxes};
pub use layout::{AttributeSignature, LayoutAssignment, synthesize_layouts};
pub use material::{MaterialResolver, dummy_definition_name, measured_usage};
pub use types::{
    AnalysisReport, AssetType, CatalogNamespace, ConversionReport, ConvertOptions, MaterialMode,
    PlaceholderTable, Severity, ValidationIssue,
};

// Pull in sub-module helpers used in the orchestration functions below.
use diagnostic::{
    build_conversion_diagnostic_log, diagnostic_log_path_for_output,
    write_conversion_diagnostic_log,
};
use geometry::collect_mesh_statistics;
use validation::{
    collect_meshes_without_material, collect_unclassified_channels, validate_joint_references,
    validate_mesh_references, validate_node_hierarchy,
};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Generate a markdown checklist for manually reviewing a ported asset.
pub fn write_porting_checklist(
    checklist_path: &Path,
    input_path: &Path,
    output_path: &Path,
    report: &ConversionReport,
) -> Result<()> {
    let mut content = String::new();
    content.push_str("# meshport Porting Checklist\n\n");
    content.push_str("## Conversion Summary\n\n");
    content.push_str(&format!("- Input: `{}`\n", input_path.display()));
    content.push_str(&format!("- Output: `{}`\n", output_path.display()));
    content.push_str(&format!("- Model: `{}`\n", report.model_name));
    content.push_str(&format!(
        "- Asset type / material mode: `{:?}` / `{:?}`\n",
        report.asset_type, report.material_mode
    ));
    content.push_str(&format!(
        "- Meshes/Materials/Nodes: `{}` / `{}` / `{}`\n",
        report.mesh_count, report.material_count, report.node_count
    ));
    content.push_str(&format!(
        "- Vertices (padded): `{}` (`{}`)\n",
        report.total_vertices, report.padded_vertices
    ));
    content.push_str(&format!("- Buffer layouts: `{}`\n", report.layout_count));
    content.push_str(&format!(
        "- Bounds recalculated: `{}` (nodes enabled: `{}`)\n\n",
        report.bounds_recalculated, report.nodes_enabled
    ));

    content.push_str("## Review Flow (Manual)\n\n");
    content.push_str("- [ ] Repack the output into the target container and open it in a model viewer.\n");
    content.push_str("- [ ] Confirm every material renders with its assigned definition.\n");
    content.push_str("- [ ] Assign a definition by hand to each unassigned material below.\n");
    content.push_str("- [ ] Point each mesh without a material at a valid material.\n");
    content.push_str("- [ ] Convert metallic maps to reflectance (`_m` -> `_r`) textures.\n");
    content.push_str("- [ ] Verify culling bounds in-game (no popping at screen edges).\n\n");

    content.push_str("## Unassigned Materials\n\n");
    if report.unassigned_materials.is_empty() {
        content.push_str("- None\n");
    } else {
        for name in &report.unassigned_materials {
            content.push_str(&format!("- `{}`\n", name));
        }
    }

    content.push_str("\n## Meshes Without Material\n\n");
    if report.meshes_without_material.is_empty() {
        content.push_str("- None\n");
    } else {
        for mesh_index in &report.meshes_without_material {
            content.push_str(&format!("- Mesh `{}`\n", mesh_index));
        }
    }

    content.push_str("\n## Issues from Conversion\n\n");
    if report.issues.is_empty() {
        content.push_str("- None\n");
    } else {
        for issue in &report.issues {
            content.push_str(&format!("- [{:?}] {}\n", issue.severity, issue.message));
        }
    }

    fs::write(checklist_path, content).with_context(|| {
        format!(
            "failed to write porting checklist: {}",
            checklist_path.display()
        )
    })?;

    Ok(())
}

/// Analyze a source asset and return validation and summary information.
pub fn analyze_asset(
    source: &MeshAsset,
    options: &ConvertOptions,
) -> Result<AnalysisReport, ConvertError> {
    let asset_type = options
        .asset_type
        .ok_or(ConvertError::MissingNamespace)?;

    let model_name = if source.name.is_empty() {
        "unnamed_asset".to_string()
    } else {
        source.name.clone()
    };

    if source.meshes.is_empty() {
        return Err(ConvertError::NoSourceMesh(model_name));
    }

    let mut issues = Vec::<ValidationIssue>::new();
    issues.extend(validate_mesh_references(source));
    issues.extend(validate_node_hierarchy(source));
    issues.extend(validate_joint_references(source));

    let (total_vertices, mut geometry_issues) = collect_mesh_statistics(source);
    issues.append(&mut geometry_issues);

    let unclassified_channels = collect_unclassified_channels(source);
    if !unclassified_channels.is_empty() {
        issues.push(ValidationIssue::new(
            Severity::Info,
            "UNCLASSIFIED_TEXTURE_CHANNEL",
            format!(
                "{} texture channel(s) match no known role and are ignored: {}",
                unclassified_channels.len(),
                unclassified_channels.join(", ")
            ),
        ));
    }

    Ok(AnalysisReport {
        model_name,
        asset_type,
        node_count: source.nodes.len(),
        mesh_count: source.meshes.len(),
        material_count: source.materials.len(),
        total_vertices,
        unclassified_channels,
        issues,
    })
}

/// Port a source asset onto the target catalog and vertex layout rules.
///
/// The source is never modified. Per-mesh, per-material and per-vertex
/// problems are recovered and listed in the report; only a missing namespace
/// or a missing mesh aborts.
pub fn convert_asset(
    source: &MeshAsset,
    catalog: &MaterialCatalog,
    options: &ConvertOptions,
) -> Result<(MeshAsset, ConversionReport), ConvertError> {
    let analysis = analyze_asset(source, options).log_error(Some("Source analysis failed"))?;

    let asset_type = analysis.asset_type;
    log_info!(
        "Converting '{}' as {:?} ({} mesh(es), {} material(s), {:?} materials)",
        analysis.model_name,
        asset_type,
        analysis.mesh_count,
        analysis.material_count,
        options.material_mode
    );

    let mut output = MeshAsset {
        name: source.name.clone(),
        bounding_box: source.bounding_box,
        nodes: source.nodes.clone(),
        meshes: source.meshes.clone(),
        materials: Vec::with_capacity(source.materials.len()),
        buffer_layouts: Vec::new(),
    };

    // ─── Bounds ───
    let bounds_recalculated = asset_type != AssetType::Character || options.recalculate_bounds;
    let bounds = if bounds_recalculated {
        recalculate_bounding_boxes(&mut output)
    } else {
        BoundsReport::default()
    };

    // ─── Materials ───
    let mut issues = analysis.issues;
    let mut unassigned_materials = Vec::new();
    let resolver = MaterialResolver::new(catalog, options, asset_type);
    for (index, material) in source.materials.iter().enumerate() {
        let usage = measured_usage(source, index);
        let resolved = resolver.resolve(material, &usage);
        if resolved.is_unassigned() {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                "MATERIAL_UNASSIGNED",
                format!(
                    "No {:?} material definition fits '{}' ({}); it was left unassigned",
                    asset_type.namespace(),
                    material.name,
                    material.definition
                ),
            ));
            unassigned_materials.push(material.name.clone());
        }
        output.materials.push(resolved);
    }

    // ─── Layouts ───
    let MeshAsset {
        meshes,
        buffer_layouts,
        ..
    } = &mut output;
    let mesh_layouts: Vec<LayoutAssignment> = meshes
        .iter_mut()
        .map(|mesh| synthesize_layouts(mesh, buffer_layouts))
        .collect();
    let padded_vertices = mesh_layouts
        .iter()
        .map(|assignment| assignment.vertices_padded)
        .sum();

    let meshes_without_material = collect_meshes_without_material(source);
    if !meshes_without_material.is_empty() {
        log_warn!(
            "{} mesh(es) reference a missing material: {:?}",
            meshes_without_material.len(),
            meshes_without_material
        );
    }
    if !unassigned_materials.is_empty() {
        log_warn!(
            "{} material(s) left unassigned: {}",
            unassigned_materials.len(),
            unassigned_materials.join(", ")
        );
    }
    log_info!(
        "Converted '{}': {} layout(s), {} padded vertex(es), {} node(s) enabled",
        analysis.model_name,
        output.buffer_layouts.len(),
        padded_vertices,
        bounds.nodes_enabled
    );

    let report = ConversionReport {
        model_name: analysis.model_name,
        asset_type,
        material_mode: options.material_mode,
        node_count: analysis.node_count,
        mesh_count: analysis.mesh_count,
        material_count: analysis.material_count,
        total_vertices: analysis.total_vertices,
        layout_count: output.buffer_layouts.len(),
        mesh_layouts,
        unassigned_materials,
        meshes_without_material,
        bounds_recalculated,
        nodes_enabled: bounds.nodes_enabled,
        invalid_joint_references: bounds.invalid_joint_refs,
        padded_vertices,
        issues,
    };

    Ok((output, report))
}

/// Convert an asset document on disk and write the output and its
/// diagnostic log next to each other.
pub fn convert_asset_file(
    input_path: &Path,
    catalog_path: &Path,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let source = load_mesh_asset(input_path)?;
    let catalog = load_catalog(catalog_path)?;

    let (output, mut report) = convert_asset(&source, &catalog, options)
        .with_context(|| format!("failed to convert asset: {}", input_path.display()))?;

    save_mesh_asset(output_path, &output)?;

    let diagnostic_path = diagnostic_log_path_for_output(output_path);
    let diagnostic =
        build_conversion_diagnostic_log(output_path, &source, &output, &report, options);
    write_conversion_diagnostic_log(&diagnostic_path, &diagnostic)?;

    report.issues.push(ValidationIssue::new(
        Severity::Info,
        "DIAGNOSTIC_LOG_WRITTEN",
        format!(
            "Conversion diagnostic log written: {}",
            diagnostic_path.display()
        ),
    ));

    Ok(report)
}
