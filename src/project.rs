use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::convert::{AssetType, ConvertOptions};
use crate::error::ConvertError;

/// Persisted project settings used by CLI workflows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Fallbacks for paths not given on the command line.
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub catalog_path: Option<String>,
    /// File name of the container the source asset was unpacked from.
    pub source_container_name: Option<String>,
    /// Port geometry binders as objects instead of map pieces.
    pub prefer_object: bool,
    pub options: ConvertOptions,
}

impl ProjectSettings {
    /// Asset type to convert as.
    ///
    /// An explicit `options.asset_type` wins; otherwise it is inferred from
    /// the container name. With neither, the conversion later fails with a
    /// missing namespace.
    pub fn resolve_asset_type(&self) -> Result<Option<AssetType>, ConvertError> {
        if let Some(asset_type) = self.options.asset_type {
            return Ok(Some(asset_type));
        }

        match self.source_container_name.as_deref() {
            Some(name) => AssetType::from_container_name(name, self.prefer_object)
                .map(Some)
                .ok_or_else(|| ConvertError::UnknownAssetContainer(name.to_string())),
            None => Ok(None),
        }
    }

    /// Conversion options with the asset type resolved.
    pub fn effective_options(&self) -> Result<ConvertOptions, ConvertError> {
        let mut options = self.options.clone();
        options.asset_type = self.resolve_asset_type()?;
        Ok(options)
    }
}

/// Input, catalog and output documents of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPaths {
    pub input: PathBuf,
    pub catalog: PathBuf,
    pub output: PathBuf,
}

impl ProjectSettings {
    /// Paths for a run. Explicit arguments win over the saved ones.
    pub fn conversion_paths(
        &self,
        input: Option<&str>,
        catalog: Option<&str>,
        output: Option<&str>,
    ) -> Result<ConversionPaths> {
        Ok(ConversionPaths {
            input: pick_path(input, self.input_path.as_deref(), "input")?,
            catalog: pick_path(catalog, self.catalog_path.as_deref(), "catalog")?,
            output: pick_path(output, self.output_path.as_deref(), "output")?,
        })
    }
}

fn pick_path(explicit: Option<&str>, saved: Option<&str>, label: &str) -> Result<PathBuf> {
    explicit
        .or(saved)
        .map(PathBuf::from)
        .with_context(|| format!("no {label} path given and none saved in project settings"))
}

/// Save project settings to a JSON file.
pub fn save_project_settings(path: &Path, settings: &ProjectSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)
        .context("failed to serialize project settings as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save project settings: {}", path.display()))?;
    Ok(())
}

/// Load project settings from a JSON file.
pub fn load_project_settings(path: &Path) -> Result<ProjectSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load project settings: {}", path.display()))?;
    let settings: ProjectSettings =
        serde_json::from_str(&content).context("failed to parse project settings JSON")?;
    Ok(settings)
}
