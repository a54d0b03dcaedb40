use crate::asset::{Material, MeshAsset, TextureChannel, Tiling};
use crate::texture::{Classification, classify, classify_material};
use crate::{log_debug, log_warn};

use super::catalog::{AttributeRequirements, CatalogEntry, CatalogQuery, MaterialCatalog};
use super::types::{AssetType, CatalogNamespace, ConvertOptions, MaterialMode};

// ─── Dummy definition names ───────────────────────────────────────────────────

/// Definition-name tokens mapped to character definition suffixes.
const CHARACTER_SUFFIXES: [(&str, &str); 7] = [
    ("add", "_Add"),
    ("sss", "_SSS"),
    ("em", "_em"),
    ("e", "_e"),
    ("glow", "_em_e_Glow"),
    ("decal", "_Decal"),
    ("cloth", "_Cloth"),
];

/// Definition-name tokens mapped to map definition suffixes.
const MAP_SUFFIXES: [(&str, &str); 7] = [
    ("sss", "_SSS"),
    ("em", "_em"),
    ("e", "_e"),
    ("glow", "_em_Glow"),
    ("m", "_m"),
    ("cloth", "_e_Cloth_Decal"),
    ("decal", "_Decal"),
];

const CHARACTER_BASE: &str = "C[ARSN]";
const MAP_BASE: &str = "M[ARSN]";

fn remove_first(suffixes: &mut Vec<&'static str>, suffix: &str) {
    if let Some(position) = suffixes.iter().position(|s| *s == suffix) {
        suffixes.remove(position);
    }
}

/// Derive the closest generic definition file name for a source definition.
///
/// `c[amsn]_cloth_em.matxml` becomes `C[ARSN]_em_e_Glow_Cloth.mtd` in the
/// character namespace.
pub fn dummy_definition_name(source_definition: &str, namespace: CatalogNamespace) -> String {
    let table: &[(&str, &'static str)] = match namespace {
        CatalogNamespace::Character => &CHARACTER_SUFFIXES,
        CatalogNamespace::Map => &MAP_SUFFIXES,
    };

    let lower = source_definition.to_ascii_lowercase();
    let mut suffixes: Vec<&'static str> = lower
        .split(['_', '.'])
        .filter_map(|token| {
            table
                .iter()
                .find(|(key, _)| *key == token)
                .map(|(_, suffix)| *suffix)
        })
        .collect();

    let has = |suffixes: &[&str], suffix: &str| suffixes.contains(&suffix);
    let base = match namespace {
        CatalogNamespace::Character => {
            if (has(&suffixes, "_e") || has(&suffixes, "_em")) && has(&suffixes, "_em_e_Glow") {
                remove_first(&mut suffixes, "_e");
                remove_first(&mut suffixes, "_em");
            }
            if has(&suffixes, "_em") && has(&suffixes, "_Cloth") {
                remove_first(&mut suffixes, "_em");
                remove_first(&mut suffixes, "_Cloth");
                suffixes.push("_em_e_Glow");
                suffixes.push("_Cloth");
            }
            CHARACTER_BASE
        }
        CatalogNamespace::Map => {
            if (has(&suffixes, "_e") || has(&suffixes, "_em")) && has(&suffixes, "_em_Glow") {
                remove_first(&mut suffixes, "_e");
            }
            if (has(&suffixes, "_e") || has(&suffixes, "_Decal"))
                && has(&suffixes, "_e_Cloth_Decal")
            {
                remove_first(&mut suffixes, "_e");
                remove_first(&mut suffixes, "_Decal");
            }
            MAP_BASE
        }
    };

    format!("{}{}.mtd", base, suffixes.concat())
}

// ─── Measured usage ───────────────────────────────────────────────────────────

/// Vertex attribute usage of the first source mesh drawn with `material_index`.
///
/// Counted from the mesh's buffer layouts; meshes without a valid layout
/// reference are measured from their vertices instead.
pub fn measured_usage(asset: &MeshAsset, material_index: usize) -> AttributeRequirements {
    let Some(mesh) = asset
        .meshes
        .iter()
        .find(|mesh| mesh.material_index == material_index)
    else {
        return AttributeRequirements::default();
    };

    let layouts: Vec<_> = mesh
        .vertex_buffers
        .iter()
        .filter_map(|buffer| asset.buffer_layouts.get(buffer.layout_index))
        .collect();

    if layouts.is_empty() {
        AttributeRequirements::from_vertices(&mesh.vertices)
    } else {
        AttributeRequirements::from_layouts(layouts)
    }
}

// ─── Resolver ─────────────────────────────────────────────────────────────────

/// Maps source materials onto the target catalog for one conversion.
pub struct MaterialResolver<'a> {
    catalog: &'a MaterialCatalog,
    options: &'a ConvertOptions,
    asset_type: AssetType,
}

impl<'a> MaterialResolver<'a> {
    pub fn new(
        catalog: &'a MaterialCatalog,
        options: &'a ConvertOptions,
        asset_type: AssetType,
    ) -> Self {
        Self {
            catalog,
            options,
            asset_type,
        }
    }

    /// Resolve one source material. Returns an unassigned material (empty
    /// definition, no channels) when no catalog entry fits.
    pub fn resolve(&self, source: &Material, usage: &AttributeRequirements) -> Material {
        let resolved = match self.options.material_mode {
            MaterialMode::Dummy => self.resolve_dummy(source),
            MaterialMode::BestFit => self.resolve_best_fit(source, usage),
        };

        resolved.unwrap_or_else(|| {
            log_warn!(
                "No material definition fits '{}' ({}); leaving it unassigned",
                source.name,
                source.definition
            );
            Material {
                name: source.name.clone(),
                definition: String::new(),
                channels: Vec::new(),
            }
        })
    }

    fn resolve_dummy(&self, source: &Material) -> Option<Material> {
        let namespace = self.asset_type.namespace();
        let name = dummy_definition_name(&source.definition, namespace);
        let entry = self.catalog.get(&name)?;

        let channels = entry
            .slots
            .iter()
            .map(|slot| TextureChannel {
                identifier: slot.identifier.clone(),
                role: slot.role,
                path: self.options.placeholders.path_for(slot.role).to_string(),
                tiling: Tiling::default(),
            })
            .collect();

        log_debug!("Material '{}' -> dummy definition '{}'", source.name, entry.name);
        Some(Material {
            name: source.name.clone(),
            definition: self.definition_path(entry),
            channels,
        })
    }

    fn resolve_best_fit(&self, source: &Material, usage: &AttributeRequirements) -> Option<Material> {
        let classification =
            classify_material(source.channels.iter().map(|channel| channel.identifier.as_str()));
        let query = CatalogQuery::default()
            .in_namespace(self.asset_type.namespace())
            .holding(&classification.roles)
            .supporting(usage);
        let entry = self.catalog.find_first(&query)?;

        let mut pool: Vec<(Classification, &TextureChannel)> = source
            .channels
            .iter()
            .filter_map(|channel| classify(&channel.identifier).map(|c| (c, channel)))
            .collect();

        let channels = entry
            .slots
            .iter()
            .map(|slot| {
                let position = slot
                    .role
                    .and_then(|role| pool.iter().position(|(c, _)| c.role == role));
                let taken = position.map(|position| pool.remove(position).1);
                match taken {
                    Some(channel) => TextureChannel {
                        identifier: slot.identifier.clone(),
                        role: slot.role,
                        path: self.rewrite_texture_path(
                            &channel.path,
                            classification.metallic_workflow,
                        ),
                        tiling: channel.tiling,
                    },
                    None => TextureChannel {
                        identifier: slot.identifier.clone(),
                        role: slot.role,
                        path: self.options.placeholders.path_for(slot.role).to_string(),
                        tiling: Tiling::default(),
                    },
                }
            })
            .collect();

        log_debug!("Material '{}' -> best-fit definition '{}'", source.name, entry.name);
        Some(Material {
            name: source.name.clone(),
            definition: self.definition_path(entry),
            channels,
        })
    }

    fn definition_path(&self, entry: &CatalogEntry) -> String {
        format!(
            r"{}\{}\{}",
            self.options.material_root,
            self.asset_type.namespace().folder(),
            entry.name
        )
    }

    /// Move a source texture path into the target's model tree.
    pub fn rewrite_texture_path(&self, source_path: &str, metallic_workflow: bool) -> String {
        let file = file_name(source_path);
        let file = if metallic_workflow {
            file.replace("_m.", "_r.")
        } else {
            file.to_string()
        };

        let root = &self.options.texture_root;
        let id = self.options.effective_id(self.asset_type);
        let group = id.get(..2).unwrap_or(id);
        match self.asset_type {
            AssetType::Character => format!(r"{root}\chr\c{id}\tex\{file}"),
            AssetType::Object => format!(r"{root}\obj\o{group}\o{id}\tex\{file}"),
            AssetType::MapPiece => format!(r"{root}\map\m{group}\tex\{file}"),
        }
    }
}

/// Last component of a path written with either separator.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether a resolved channel carries a texture the source supplied.
pub fn is_placeholder(channel: &TextureChannel, options: &ConvertOptions) -> bool {
    channel.path.is_empty() || channel.path == options.placeholders.path_for(channel.role)
}

#[cfg(test)]
mod tests {
    use nalgebra::{Vector2, Vector3, Vector4};

    use super::*;
    use crate::asset::{
        BufferLayout, LayoutMember, LayoutSemantic, LayoutType, Mesh, Vertex, VertexBuffer,
    };
    use crate::convert::catalog::tests::sample_catalog_document;

    fn source_material(definition: &str, channels: &[(&str, &str)]) -> Material {
        Material {
            name: "body".to_string(),
            definition: definition.to_string(),
            channels: channels
                .iter()
                .map(|(identifier, path)| TextureChannel::new(*identifier, *path))
                .collect(),
        }
    }

    fn options(mode: MaterialMode, ported_id: &str) -> ConvertOptions {
        ConvertOptions {
            material_mode: mode,
            ported_id: Some(ported_id.to_string()),
            ..ConvertOptions::default()
        }
    }

    fn skinned_usage() -> AttributeRequirements {
        AttributeRequirements {
            tangent_count: 1,
            color_count: 1,
            uv_count: 2,
            has_bitangent: true,
            has_joints: true,
        }
    }

    #[test]
    fn given_character_tokens_when_deriving_dummy_name_then_rules_apply() {
        let character = CatalogNamespace::Character;
        assert_eq!(dummy_definition_name("c[amsn].matxml", character), "C[ARSN].mtd");
        assert_eq!(dummy_definition_name("C[AMSN]_e.mtd", character), "C[ARSN]_e.mtd");
        assert_eq!(
            dummy_definition_name("c[amsn]_em_e_glow.matxml", character),
            "C[ARSN]_em_e_Glow.mtd"
        );
        assert_eq!(
            dummy_definition_name("c[amsn]_cloth_em.matxml", character),
            "C[ARSN]_em_e_Glow_Cloth.mtd"
        );
    }

    #[test]
    fn given_map_tokens_when_deriving_dummy_name_then_rules_apply() {
        let map = CatalogNamespace::Map;
        assert_eq!(dummy_definition_name("m[arsn]_m.matxml", map), "M[ARSN]_m.mtd");
        assert_eq!(dummy_definition_name("m[arsn]_e_glow.matxml", map), "M[ARSN]_em_Glow.mtd");
        assert_eq!(
            dummy_definition_name("m[arsn]_e_decal_cloth.matxml", map),
            "M[ARSN]_e_Cloth_Decal.mtd"
        );
    }

    #[test]
    fn given_normal_only_dummy_source_when_resolving_then_albedo_is_empty_and_normal_is_placeholder() {
        let catalog = MaterialCatalog::new(&sample_catalog_document());
        let options = options(MaterialMode::Dummy, "5280");
        let resolver = MaterialResolver::new(&catalog, &options, AssetType::Character);
        let source = source_material("c[amsn].matxml", &[("NormalMap", r"c:\src\c9990_n.dds")]);

        let resolved = resolver.resolve(&source, &AttributeRequirements::default());

        assert_eq!(resolved.definition, r"N:\FDP\data\Material\mtd\character\C[ARSN].mtd");
        let paths: Vec<(&str, &str)> = resolved
            .channels
            .iter()
            .map(|channel| (channel.identifier.as_str(), channel.path.as_str()))
            .collect();
        assert_eq!(paths[0], ("g_DiffuseTexture", ""));
        assert_eq!(
            paths[3],
            ("g_BumpmapTexture", r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummyNormal.tga")
        );
        assert_eq!(resolved.channels.len(), 4);
    }

    #[test]
    fn given_dummy_name_missing_from_catalog_when_resolving_then_material_is_unassigned() {
        let catalog = MaterialCatalog::new(&sample_catalog_document());
        let options = options(MaterialMode::Dummy, "5280");
        let resolver = MaterialResolver::new(&catalog, &options, AssetType::Character);
        let source = source_material("c[amsn]_sss.matxml", &[]);

        let resolved = resolver.resolve(&source, &AttributeRequirements::default());

        assert!(resolved.is_unassigned());
        assert!(resolved.channels.is_empty());
        assert_eq!(resolved.name, "body");
    }

    #[test]
    fn given_metallic_source_when_resolving_best_fit_then_textures_move_and_rename() {
        let catalog = MaterialCatalog::new(&sample_catalog_document());
        let options = options(MaterialMode::BestFit, "5280");
        let resolver = MaterialResolver::new(&catalog, &options, AssetType::Character);
        let mut source = source_material(
            "c[amsn].matxml",
            &[
                ("C_AMSN__AlbedoMap", r"c:\src\c9990_a.dds"),
                ("C_AMSN__MetallicMap", r"c:\src\c9990_m.dds"),
                ("C_AMSN__NormalMap", "c:/src/c9990_n.dds"),
            ],
        );
        source.channels[0].tiling.scale = Vector2::new(2.0, 2.0);

        let resolved = resolver.resolve(&source, &skinned_usage());

        assert_eq!(resolved.definition, r"N:\FDP\data\Material\mtd\character\C[ARSN].mtd");
        let paths: Vec<&str> = resolved.channels.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                r"N:\FDP\data\Model\chr\c5280\tex\c9990_a.dds",
                r"N:\FDP\data\Model\chr\c5280\tex\c9990_r.dds",
                r"N:\SPRJ\data\Other\SysTex\SYSTEX_DummyShininess.tga",
                r"N:\FDP\data\Model\chr\c5280\tex\c9990_n.dds",
            ]
        );
        assert_eq!(resolved.channels[0].tiling.scale, Vector2::new(2.0, 2.0));
        assert!(is_placeholder(&resolved.channels[2], &options));
        assert!(!is_placeholder(&resolved.channels[0], &options));
    }

    #[test]
    fn given_two_albedo_textures_when_resolving_best_fit_then_each_slot_consumes_one() {
        let catalog = MaterialCatalog::new(&sample_catalog_document());
        let options = options(MaterialMode::BestFit, "5280");
        let resolver = MaterialResolver::new(&catalog, &options, AssetType::Character);
        let source = source_material(
            "c[amsn].matxml",
            &[
                ("C_AMSN__AlbedoMap", "first_a.dds"),
                ("C_AMSN__AlbedoMap_2", "second_a.dds"),
            ],
        );

        let resolved = resolver.resolve(&source, &skinned_usage());

        assert!(resolved.definition.ends_with("C[ARSN]_Cloth.mtd"));
        assert!(resolved.channels[0].path.ends_with("first_a.dds"));
        assert!(resolved.channels[1].path.ends_with("second_a.dds"));
    }

    #[test]
    fn given_no_fitting_entry_when_resolving_best_fit_then_material_is_unassigned() {
        let catalog = MaterialCatalog::new(&sample_catalog_document());
        let options = options(MaterialMode::BestFit, "5280");
        let resolver = MaterialResolver::new(&catalog, &options, AssetType::Character);
        let source = source_material("c[amsn].matxml", &[("C_AMSN__AlbedoMap", "a.dds")]);
        let heavy = AttributeRequirements {
            uv_count: 5,
            ..skinned_usage()
        };

        assert!(resolver.resolve(&source, &heavy).is_unassigned());
    }

    #[test]
    fn given_object_and_map_piece_when_rewriting_paths_then_id_prefix_groups_folders() {
        let catalog = MaterialCatalog::default();
        let options = options(MaterialMode::BestFit, "302010");

        let object = MaterialResolver::new(&catalog, &options, AssetType::Object);
        assert_eq!(
            object.rewrite_texture_path(r"x\o1_a.dds", false),
            r"N:\FDP\data\Model\obj\o30\o302010\tex\o1_a.dds"
        );

        let map = MaterialResolver::new(&catalog, &options, AssetType::MapPiece);
        assert_eq!(
            map.rewrite_texture_path("rock_m.dds", false),
            r"N:\FDP\data\Model\map\m30\tex\rock_m.dds"
        );
    }

    #[test]
    fn given_mesh_without_layouts_when_measuring_usage_then_vertices_are_counted() {
        let mut vertex = Vertex::at(Vector3::zeros());
        vertex.tangents = vec![Vector4::zeros(), Vector4::zeros()];
        vertex.uvs = vec![Vector2::zeros()];
        let asset = MeshAsset {
            meshes: vec![Mesh {
                material_index: 0,
                bounding_box: None,
                vertices: vec![vertex],
                vertex_buffers: Vec::new(),
            }],
            ..MeshAsset::default()
        };

        let usage = measured_usage(&asset, 0);
        assert_eq!(usage.tangent_count, 2);
        assert_eq!(usage.uv_count, 1);
        assert!(!usage.has_joints);
        assert_eq!(measured_usage(&asset, 7), AttributeRequirements::default());
    }

    #[test]
    fn given_mesh_with_layouts_when_measuring_usage_then_layout_members_are_counted() {
        let layout = BufferLayout::new(vec![
            LayoutMember::new(LayoutType::Float3, LayoutSemantic::Position, 0),
            LayoutMember::new(LayoutType::UByte4, LayoutSemantic::JointIndices, 0),
            LayoutMember::new(LayoutType::UByte4Norm, LayoutSemantic::VertexColor, 1),
            LayoutMember::new(LayoutType::Float2, LayoutSemantic::Uv, 0),
            LayoutMember::new(LayoutType::Float2, LayoutSemantic::Uv, 1),
        ]);
        let asset = MeshAsset {
            meshes: vec![Mesh {
                material_index: 0,
                bounding_box: None,
                vertices: vec![Vertex::at(Vector3::zeros())],
                vertex_buffers: vec![VertexBuffer {
                    layout_index: 0,
                    buffer_index: 0,
                }],
            }],
            buffer_layouts: vec![layout],
            ..MeshAsset::default()
        };

        let usage = measured_usage(&asset, 0);
        assert_eq!(usage.color_count, 1);
        assert_eq!(usage.uv_count, 2);
        assert!(usage.has_joints);
    }
}
