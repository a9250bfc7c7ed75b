//! # Nautikos
//!
//! Updates container image tags across Kubernetes and Kustomize manifests.
//!
//! A configuration file groups manifest files into environments. Given a
//! repository and a new tag, the [`Updater`] rewrites every matching image
//! reference in the selected manifests and records each change in a
//! [`Ledger`]. Manifests are edited in place: everything except the rewritten
//! tags, including comments and quoting, is written back unchanged.
//!
//! ## Modules
//!
//! - [`document`] - Format-preserving YAML documents with path-based edits
//! - [`manifest`] - Kubernetes and Kustomize adapters behind the [`Manifest`] trait
//! - [`ledger`] - Records of the modifications made during a run
//! - [`config`] - The `nautikos.yaml` configuration model
//! - [`updater`] - Environment, repository and label selection over a configuration

pub mod config;
pub mod document;
pub mod ledger;
pub mod manifest;
pub mod updater;

pub use config::{Config, ConfigError, Environment, ManifestConfig};
pub use document::{Document, DocumentError, Node, Path, PathElement};
pub use ledger::{Ledger, Modification};
pub use manifest::{
    create_manifest, ImageReference, KubernetesManifest, KustomizeManifest, Manifest,
    ManifestError, ManifestKind,
};
pub use updater::{UpdateError, Updater, UpdaterBuilder};
