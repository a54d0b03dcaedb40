use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical role a texture channel is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextureRole {
    Albedo,
    /// Specular or metallic/reflectance map.
    Specular,
    Shininess,
    Normal,
    DetailNormal,
    Displacement,
    BloodMask,
    BlendMask,
    Emissive,
    ScatteringMask,
    Flow,
    Highlight,
    Mask,
    BlendEdge,
    Opacity,
    Rnm,
    SnowHeight,
    Blend,
    Burning,
    DamagedNormal,
    Vector,
    GlobalIllumination,
    Alpha,
}

/// Role token that marks the metallic/roughness workflow.
const METALLIC_TOKEN: &str = "MetallicMap";

/// Channel role tokens as they appear across source games, mapped to their
/// canonical role.
const ROLE_TOKENS: &[(&str, TextureRole)] = &[
    ("AlbedoMap", TextureRole::Albedo),
    ("DiffuseTexture", TextureRole::Albedo),
    ("DiffuseTexture2", TextureRole::Albedo),
    ("DiffuseTexture3", TextureRole::Albedo),
    (METALLIC_TOKEN, TextureRole::Specular),
    ("ReflectanceMap", TextureRole::Specular),
    ("SpecularTexture", TextureRole::Specular),
    ("SpecularTexture2", TextureRole::Specular),
    ("SpecularTexture3", TextureRole::Specular),
    ("ShininessMap", TextureRole::Shininess),
    ("ShininessTexture", TextureRole::Shininess),
    ("ShininessTexture2", TextureRole::Shininess),
    ("ShininessTexture3", TextureRole::Shininess),
    ("NormalMap", TextureRole::Normal),
    ("BumpmapTexture", TextureRole::Normal),
    ("BumpmapTexture2", TextureRole::Normal),
    ("BumpmapTexture3", TextureRole::Normal),
    ("BumpmapTexture4", TextureRole::Normal),
    ("DetailBumpmapTexture", TextureRole::DetailNormal),
    ("DetailBumpmapTexture2", TextureRole::DetailNormal),
    ("DisplacementMap", TextureRole::Displacement),
    ("DisplacementTexture", TextureRole::Displacement),
    ("BloodMaskTexture", TextureRole::BloodMask),
    ("BlendMaskTexture", TextureRole::BlendMask),
    ("BlendMask", TextureRole::BlendMask),
    ("EmissiveTexture", TextureRole::Emissive),
    ("EmissiveTexture2", TextureRole::Emissive),
    ("EmissiveMap", TextureRole::Emissive),
    ("EmissiveMask", TextureRole::Emissive),
    ("ScatteringMaskTexture", TextureRole::ScatteringMask),
    ("SSSMask", TextureRole::ScatteringMask),
    ("FlowTexture", TextureRole::Flow),
    ("FlowMap", TextureRole::Flow),
    ("HighlightTexture", TextureRole::Highlight),
    ("MaskTexture", TextureRole::Mask),
    ("Mask", TextureRole::Mask),
    ("BlendEdgeTexture", TextureRole::BlendEdge),
    ("BlendEdgeTexture2", TextureRole::BlendEdge),
    ("BlendEdge", TextureRole::BlendEdge),
    ("UniqueOpacityMask", TextureRole::Opacity),
    ("OpacityTexture", TextureRole::Opacity),
    ("OpacityTexture2", TextureRole::Opacity),
    ("OpacityTexture3", TextureRole::Opacity),
    ("RNMTexture1", TextureRole::Rnm),
    ("RNMTexture2", TextureRole::Rnm),
    ("RNMTexture3", TextureRole::Rnm),
    ("SnowHeightTexture", TextureRole::SnowHeight),
    ("BlendMap", TextureRole::Blend),
    ("BurningMap", TextureRole::Burning),
    ("DamageNormal", TextureRole::DamagedNormal),
    ("DamagedNormalTexture", TextureRole::DamagedNormal),
    ("DamagedNormalTexture2", TextureRole::DamagedNormal),
    ("VectorMap", TextureRole::Vector),
    ("VectorTexture", TextureRole::Vector),
    ("GITexture", TextureRole::GlobalIllumination),
    ("Alpha", TextureRole::Alpha),
];

/// Result of classifying one channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: TextureRole,
    /// True when the channel belongs to a metallic/roughness material.
    pub metallic_workflow: bool,
}

/// Extract the role token from a channel identifier.
///
/// `g_DiffuseTexture` yields `DiffuseTexture`; a trailing numeric instance
/// suffix (`Foo_AlbedoMap_0`) is skipped.
pub fn role_token(identifier: &str) -> Option<&str> {
    let segments: Vec<&str> = identifier
        .split('_')
        .filter(|segment| !segment.is_empty())
        .collect();

    let (last, rest) = segments.split_last()?;
    if last.parse::<i32>().is_ok() {
        rest.last().copied()
    } else {
        Some(*last)
    }
}

/// Classify a texture channel identifier.
///
/// Returns `None` for unknown tokens; callers drop those channels from
/// role-based matching.
pub fn classify(identifier: &str) -> Option<Classification> {
    let token = role_token(identifier)?;
    ROLE_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(candidate, role)| Classification {
            role: *role,
            metallic_workflow: *candidate == METALLIC_TOKEN,
        })
}

/// Shorthand for [`classify`] when only the role matters.
pub fn classify_role(identifier: &str) -> Option<TextureRole> {
    classify(identifier).map(|classification| classification.role)
}

/// Aggregate classification of every channel of one material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialClassification {
    pub roles: RoleCounts,
    /// Any channel carries the metallic workflow token.
    pub metallic_workflow: bool,
}

pub fn classify_material<'a, I>(identifiers: I) -> MaterialClassification
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = MaterialClassification::default();
    for classification in identifiers.into_iter().filter_map(classify) {
        result.roles.add(classification.role);
        result.metallic_workflow |= classification.metallic_workflow;
    }
    result
}

/// Number of channels per role in a channel list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCounts(BTreeMap<TextureRole, usize>);

impl RoleCounts {
    pub fn from_roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = TextureRole>,
    {
        let mut counts = Self::default();
        for role in roles {
            counts.add(role);
        }
        counts
    }

    pub fn add(&mut self, role: TextureRole) {
        *self.0.entry(role).or_insert(0) += 1;
    }

    /// Count roles of the given identifiers, ignoring unclassified ones.
    pub fn from_identifiers<'a, I>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_roles(identifiers.into_iter().filter_map(classify_role))
    }

    pub fn get(&self, role: TextureRole) -> usize {
        self.0.get(&role).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureRole, usize)> + '_ {
        self.0.iter().map(|(role, count)| (*role, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
