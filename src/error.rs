use thiserror::Error;

/// Structural failures that abort a whole asset conversion.
///
/// Per-mesh and per-vertex problems never surface here; they are recovered
/// locally and reported as validation issues instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("no asset type is set, so no material catalog namespace applies")]
    MissingNamespace,

    #[error("source asset '{0}' contains no meshes")]
    NoSourceMesh(String),

    #[error("cannot infer asset type from container name: {0}")]
    UnknownAssetContainer(String),
}
