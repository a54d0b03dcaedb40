use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::asset::MeshAsset;
use crate::convert::{CatalogDocument, MaterialCatalog};

/// Load a mesh asset document written by the packaging layer.
pub fn load_mesh_asset(path: &Path) -> Result<MeshAsset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read asset document: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse asset document: {}", path.display()))
}

/// Save a converted mesh asset as pretty-printed JSON.
pub fn save_mesh_asset(path: &Path, asset: &MeshAsset) -> Result<()> {
    let content =
        serde_json::to_string_pretty(asset).context("failed to serialize asset as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to write asset document: {}", path.display()))?;
    Ok(())
}

pub fn load_catalog_document(path: &Path) -> Result<CatalogDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read material catalog: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse material catalog: {}", path.display()))
}

/// Load and index a material catalog.
pub fn load_catalog(path: &Path) -> Result<MaterialCatalog> {
    let document = load_catalog_document(path)?;
    Ok(MaterialCatalog::new(&document))
}
