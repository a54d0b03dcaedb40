use serde::{Deserialize, Serialize};

use crate::texture::TextureRole;

use super::layout::LayoutAssignment;

// ─── Container name → asset type ──────────────────────────────────────────────

/// Container suffixes that identify the asset type of a source binder.
const CONTAINER_SUFFIXES: [(&str, AssetType); 4] = [
    ("chrbnd.dcx", AssetType::Character),
    ("anibnd.dcx", AssetType::Character),
    ("objbnd.dcx", AssetType::Object),
    ("mapbnd.dcx", AssetType::MapPiece),
];

/// Geometry binders can hold either objects or map pieces.
const GEOMETRY_CONTAINER_SUFFIX: &str = "geombnd.dcx";

// ─── Public types ─────────────────────────────────────────────────────────────

/// Kind of asset being ported; decides catalog namespace and texture paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Character,
    Object,
    MapPiece,
}

impl AssetType {
    /// Infer the asset type from a source container file name.
    ///
    /// Geometry binders port to map pieces unless `prefer_object` is set.
    pub fn from_container_name(name: &str, prefer_object: bool) -> Option<AssetType> {
        let lower = name.to_ascii_lowercase();
        if let Some((_, asset_type)) = CONTAINER_SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
        {
            return Some(*asset_type);
        }

        if lower.ends_with(GEOMETRY_CONTAINER_SUFFIX) {
            return Some(if prefer_object {
                AssetType::Object
            } else {
                AssetType::MapPiece
            });
        }

        None
    }

    pub fn namespace(self) -> CatalogNamespace {
        match self {
            AssetType::Character => CatalogNamespace::Character,
            AssetType::Object | AssetType::MapPiece => CatalogNamespace::Map,
        }
    }

    /// Placeholder id used when no ported id is configured.
    pub fn default_id(self) -> &'static str {
        match self {
            AssetType::Character => "1000",
            AssetType::Object => "100000",
            AssetType::MapPiece => "10000000000000",
        }
    }
}

/// Disjoint name spaces of the target material catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogNamespace {
    Character,
    Map,
}

impl CatalogNamespace {
    /// Leading character of every definition name in this namespace.
    pub fn prefix(self) -> char {
        match self {
            CatalogNamespace::Character => 'c',
            CatalogNamespace::Map => 'm',
        }
    }

    /// Folder under the material root holding this namespace's definitions.
    pub fn folder(self) -> &'static str {
        match self {
            CatalogNamespace::Character => "character",
            CatalogNamespace::Map => "map",
        }
    }

    pub fn contains(self, definition_name: &str) -> bool {
        definition_name
            .chars()
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case(&self.prefix()))
    }
}

/// How source materials are mapped onto the target catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialMode {
    /// Name-derived definition with placeholder textures only.
    #[default]
    Dummy,
    /// First catalog entry that can hold every source texture.
    BestFit,
}

/// Placeholder texture per role for slots with no source texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderTable {
    pub specular: String,
    pub shininess: String,
    /// Used for both normal and detail normal slots.
    pub normal: String,
    pub scattering_mask: String,
    pub emissive: String,
    /// Used for blood mask and displacement slots.
    pub mask: String,
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        Self {
            specular: r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummySpecular.tga".to_string(),
            shininess: r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummyShininess.tga".to_string(),
            normal: r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummyNormal.tga".to_string(),
            scattering_mask: r"N:\FDP\data\Other\SysTex\SYSTEX_DummyScatteringMask.tga"
                .to_string(),
            emissive: r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummyEmissive.tga".to_string(),
            mask: r"N:\LiveTokyo\data\model\common\tex\dummy128.tga".to_string(),
        }
    }
}

impl PlaceholderTable {
    /// Placeholder path for a role; empty for albedo and unlisted roles.
    pub fn path_for(&self, role: Option<TextureRole>) -> &str {
        match role {
            Some(TextureRole::Specular) => &self.specular,
            Some(TextureRole::Shininess) => &self.shininess,
            Some(TextureRole::Normal | TextureRole::DetailNormal) => &self.normal,
            Some(TextureRole::ScatteringMask) => &self.scattering_mask,
            Some(TextureRole::Emissive) => &self.emissive,
            Some(TextureRole::BloodMask | TextureRole::Displacement) => &self.mask,
            _ => "",
        }
    }
}

/// Conversion options shared by the CLI and persisted project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Asset type of the source; conversion fails without one.
    pub asset_type: Option<AssetType>,
    /// Id the ported asset is stored under; defaults per asset type.
    pub ported_id: Option<String>,
    pub material_mode: MaterialMode,
    /// Recompute bounds for characters too (geometry was altered).
    pub recalculate_bounds: bool,
    /// Root of the target's model tree, used for rewritten texture paths.
    pub texture_root: String,
    /// Root of the target's material definition tree.
    pub material_root: String,
    pub placeholders: PlaceholderTable,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            asset_type: None,
            ported_id: None,
            material_mode: MaterialMode::Dummy,
            recalculate_bounds: false,
            texture_root: r"N:\FDP\data\Model".to_string(),
            material_root: r"N:\FDP\data\Material\mtd".to_string(),
            placeholders: PlaceholderTable::default(),
        }
    }
}

impl ConvertOptions {
    /// Ported id, falling back to the asset type's default id.
    pub fn effective_id(&self, asset_type: AssetType) -> &str {
        self.ported_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| asset_type.default_id())
    }
}

/// Severity level used by validation issues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single validation issue produced during conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Source asset analysis produced before any conversion step runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub model_name: String,
    pub asset_type: AssetType,
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub total_vertices: usize,
    /// Channels no texture role matched, as `material/identifier`.
    pub unclassified_channels: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

/// Summary returned alongside the converted asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub model_name: String,
    pub asset_type: AssetType,
    pub material_mode: MaterialMode,
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub total_vertices: usize,
    pub layout_count: usize,
    /// Layout assignment per output mesh, in mesh order.
    pub mesh_layouts: Vec<LayoutAssignment>,
    pub unassigned_materials: Vec<String>,
    /// Meshes whose material index points past the source material list.
    pub meshes_without_material: Vec<usize>,
    pub bounds_recalculated: bool,
    pub nodes_enabled: usize,
    pub invalid_joint_references: usize,
    pub padded_vertices: usize,
    pub issues: Vec<ValidationIssue>,
}
