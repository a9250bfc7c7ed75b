//! The manifest adapter contract and factory.

use super::error::ManifestError;
use super::image::ImageReference;
use super::kubernetes::KubernetesManifest;
use super::kustomize::KustomizeManifest;
use crate::ledger::Ledger;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// ManifestKind names a manifest file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Kubernetes,
    Kustomize,
    /// Recognized, but not implemented.
    Helm,
}

impl ManifestKind {
    /// Returns the name used for this kind in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Kubernetes => "kubernetes",
            ManifestKind::Kustomize => "kustomize",
            ManifestKind::Helm => "helm",
        }
    }
}

impl FromStr for ManifestKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kubernetes" => Ok(ManifestKind::Kubernetes),
            "kustomize" => Ok(ManifestKind::Kustomize),
            "helm" => Ok(ManifestKind::Helm),
            other => Err(ManifestError::unsupported(
                other,
                "not a known manifest type",
            )),
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manifest is implemented by every supported manifest format.
///
/// An adapter is created without touching the filesystem, loaded once,
/// modified any number of times and written once. Every successful rewrite is
/// recorded in the adapter's ledger.
pub trait Manifest {
    /// Returns the format handled by this adapter.
    fn kind(&self) -> ManifestKind;

    /// Returns the path of the manifest file.
    fn path(&self) -> &Path;

    /// Parses the manifest from `reader`.
    fn load(&mut self, reader: &mut dyn Read) -> Result<(), ManifestError>;

    /// Serializes the (possibly modified) manifest to `writer`.
    fn write(&self, writer: &mut dyn Write) -> Result<(), ManifestError>;

    /// Sets the tag of every image of `repository` to `new_tag`.
    ///
    /// Images of other repositories are left alone; no match is not an error.
    fn modify(&mut self, repository: &str, new_tag: &str) -> Result<(), ManifestError>;

    /// Returns every image reference in the manifest, in document order.
    fn images(&self) -> Result<Vec<ImageReference>, ManifestError>;

    /// Returns the modifications made so far.
    fn modifications(&self) -> &Ledger;

    /// Loads the manifest from its file.
    fn load_file(&mut self) -> Result<(), ManifestError> {
        debug!(path = %self.path().display(), "Reading manifest");
        let mut file = File::open(self.path())?;
        self.load(&mut file)
    }

    /// Overwrites the manifest file with the current content.
    fn write_file(&self) -> Result<(), ManifestError> {
        debug!(path = %self.path().display(), "Writing manifest");
        let mut file = File::create(self.path())?;
        self.write(&mut file)
    }
}

/// Creates the adapter for a manifest type name, without any I/O.
pub fn create_manifest(
    kind: &str,
    path: impl Into<PathBuf>,
) -> Result<Box<dyn Manifest>, ManifestError> {
    match kind.parse::<ManifestKind>()? {
        ManifestKind::Kubernetes => Ok(Box::new(KubernetesManifest::new(path))),
        ManifestKind::Kustomize => Ok(Box::new(KustomizeManifest::new(path))),
        ManifestKind::Helm => Err(ManifestError::unsupported(
            kind,
            "helm manifests are not yet implemented",
        )),
    }
}
