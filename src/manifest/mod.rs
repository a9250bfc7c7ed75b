//! Manifest module - Adapters that find and rewrite image tags in manifest files.
//!
//! Each supported format implements [`Manifest`]; [`create_manifest`] picks
//! the adapter for a type name taken from the configuration.

mod error;
mod image;
mod kubernetes;
mod kustomize;
mod manifest;


pub use error::*;
pub use image::*;
pub use kubernetes::*;
pub use kustomize::*;
pub use manifest::*;
