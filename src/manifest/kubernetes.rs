//! Kubernetes workload manifests.

use super::error::ManifestError;
use super::image::ImageReference;
use super::manifest::{Manifest, ManifestKind};
use crate::document::{self, Document, DocumentError, Node};
use crate::ledger::{Ledger, Modification};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Location of the container list in a workload manifest.
const CONTAINERS: [&str; 4] = ["spec", "template", "spec", "containers"];

/// KubernetesManifest rewrites the inline `image: repository:tag` fields of a
/// workload's pod template containers.
#[derive(Debug)]
pub struct KubernetesManifest {
    path: PathBuf,
    document: Option<Document>,
    modifications: Ledger,
}

impl KubernetesManifest {
    /// Creates a new, unloaded adapter for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KubernetesManifest {
            path: path.into(),
            document: None,
            modifications: Ledger::new(),
        }
    }

    fn document(&self) -> Result<&Document, ManifestError> {
        self.document.as_ref().ok_or_else(|| ManifestError::NotLoaded {
            path: self.path.clone(),
        })
    }
}

/// Returns the path and current value of every container `image` field.
fn image_fields(doc: &Document) -> Result<Vec<(document::Path, String)>, DocumentError> {
    let containers_path = document::Path::keys(CONTAINERS);
    let containers = match doc.get(&containers_path)? {
        Node::Sequence(seq) => seq,
        other => {
            return Err(DocumentError::structure(
                &containers_path,
                format!("expected a sequence of containers, found a {}", other.kind_name()),
            ))
        }
    };

    let mut fields = Vec::with_capacity(containers.len());
    for index in 0..containers.len() {
        let image_path = containers_path.with(index).with("image");
        match doc.get(&image_path)? {
            Node::Scalar(image) if !image.is_null() => {
                fields.push((image_path, image.value.clone()));
            }
            other => {
                return Err(DocumentError::structure(
                    &image_path,
                    format!("expected an image reference, found a {}", other.kind_name()),
                ))
            }
        }
    }
    Ok(fields)
}

impl Manifest for KubernetesManifest {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Kubernetes
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self, reader: &mut dyn Read) -> Result<(), ManifestError> {
        let document = Document::load(reader)?;
        // Validate the container layout up front.
        let fields = image_fields(&document)?;
        debug!(path = %self.path.display(), containers = fields.len(), "Loaded kubernetes manifest");
        self.document = Some(document);
        Ok(())
    }

    fn write(&self, writer: &mut dyn Write) -> Result<(), ManifestError> {
        self.document()?.write(writer)?;
        Ok(())
    }

    fn modify(&mut self, repository: &str, new_tag: &str) -> Result<(), ManifestError> {
        let document = self.document.as_mut().ok_or_else(|| ManifestError::NotLoaded {
            path: self.path.clone(),
        })?;

        for (field, raw) in image_fields(document)? {
            let current = ImageReference::parse(&raw);
            if current.repository != repository {
                continue;
            }
            let target = ImageReference::new(repository, Some(new_tag));
            document.set_scalar(&field, &target.to_image_field())?;
            info!(
                path = %self.path.display(),
                field = %field,
                from = %current,
                to = %target,
                "Updated image"
            );
            self.modifications.push(Modification::new(
                &self.path,
                repository,
                current.tag_or_empty(),
                new_tag,
            ));
        }
        Ok(())
    }

    fn images(&self) -> Result<Vec<ImageReference>, ManifestError> {
        let fields = image_fields(self.document()?)?;
        Ok(fields
            .iter()
            .map(|(_, raw)| ImageReference::parse(raw))
            .collect())
    }

    fn modifications(&self) -> &Ledger {
        &self.modifications
    }
}
