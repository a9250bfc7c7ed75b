//! Kustomization files.

use super::error::ManifestError;
use super::image::ImageReference;
use super::manifest::{Manifest, ManifestKind};
use crate::document::{self, Document, DocumentError, Node};
use crate::ledger::{Ledger, Modification};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const NEW_TAG: &str = "newTag";

/// KustomizeManifest rewrites the `newTag` fields of a kustomization's
/// `images` list.
#[derive(Debug)]
pub struct KustomizeManifest {
    path: PathBuf,
    document: Option<Document>,
    modifications: Ledger,
}

/// One entry of the `images` list.
#[derive(Debug)]
struct ImageEntry {
    /// Path of the entry mapping.
    path: document::Path,
    name: String,
    new_tag: Option<String>,
}

impl KustomizeManifest {
    /// Creates a new, unloaded adapter for the kustomization at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KustomizeManifest {
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

fn scalar_field(doc: &Document, path: &document::Path) -> Result<Option<String>, DocumentError> {
    match doc.find(path) {
        None => Ok(None),
        Some(Node::Scalar(s)) => Ok(Some(s.value.clone())),
        Some(other) => Err(DocumentError::structure(
            path,
            format!("expected a scalar, found a {}", other.kind_name()),
        )),
    }
}

/// Collects the `images` entries. A kustomization without `images` has none.
fn image_entries(doc: &Document) -> Result<Vec<ImageEntry>, DocumentError> {
    let root = match doc.root() {
        Node::Mapping(m) => m,
        other => {
            return Err(DocumentError::structure(
                document::Path::new(),
                format!("expected a mapping, found a {}", other.kind_name()),
            ))
        }
    };
    let images_path = document::Path::keys(["images"]);
    let images = match root.get("images") {
        None => return Ok(Vec::new()),
        Some(Node::Scalar(s)) if s.is_null() => return Ok(Vec::new()),
        Some(Node::Sequence(seq)) => seq,
        Some(other) => {
            return Err(DocumentError::structure(
                &images_path,
                format!("expected a sequence, found a {}", other.kind_name()),
            ))
        }
    };

    let mut entries = Vec::with_capacity(images.len());
    for index in 0..images.len() {
        let path = images_path.with(index);
        let name_path = path.with("name");
        let name = match doc.get(&name_path)? {
            Node::Scalar(s) => s.value.clone(),
            other => {
                return Err(DocumentError::structure(
                    &name_path,
                    format!("expected an image name, found a {}", other.kind_name()),
                ))
            }
        };
        let new_tag = scalar_field(doc, &path.with(NEW_TAG))?;
        entries.push(ImageEntry {
            path,
            name,
            new_tag,
        });
    }
    Ok(entries)
}

impl Manifest for KustomizeManifest {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Kustomize
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self, reader: &mut dyn Read) -> Result<(), ManifestError> {
        let document = Document::load(reader)?;
        let entries = image_entries(&document)?;
        debug!(path = %self.path.display(), images = entries.len(), "Loaded kustomization");
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

        for entry in image_entries(document)? {
            if entry.name != repository {
                continue;
            }
            match &entry.new_tag {
                Some(_) => {
                    document.set_scalar(&entry.path.with(NEW_TAG), new_tag)?;
                }
                None => document.insert_entry(&entry.path, NEW_TAG, new_tag)?,
            }
            let previous = entry.new_tag.unwrap_or_default();
            info!(
                path = %self.path.display(),
                entry = %entry.path,
                from = %previous,
                to = new_tag,
                "Updated image"
            );
            self.modifications
                .push(Modification::new(&self.path, repository, previous, new_tag));
        }
        Ok(())
    }

    fn images(&self) -> Result<Vec<ImageReference>, ManifestError> {
        let entries = image_entries(self.document()?)?;
        Ok(entries
            .into_iter()
            .map(|entry| ImageReference {
                repository: entry.name,
                tag: entry.new_tag,
            })
            .collect())
    }

    fn modifications(&self) -> &Ledger {
        &self.modifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INPUT: &str = "# Comment
resources:
- ../some/path
images:
- name: some-repository
  newTag: '1.0.0'
- name: some-other-repository
  newTag: '1.2.3'

patchesStrategicMerge:
- ingress.yml
";

    const OUTPUT: &str = "# Comment
resources:
- ../some/path
images:
- name: some-repository
  newTag: '1.1'
- name: some-other-repository
  newTag: '1.2.3'

patchesStrategicMerge:
- ingress.yml
";

    fn loaded(input: &str) -> KustomizeManifest {
        let mut manifest = KustomizeManifest::new("kustomization.yaml");
        manifest.load(&mut input.as_bytes()).unwrap();
        manifest
    }

    fn written(manifest: &KustomizeManifest) -> String {
        let mut out = Vec::new();
        manifest.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_modify_and_write() {
        let mut manifest = loaded(INPUT);
        manifest.modify("some-repository", "1.1").unwrap();

        let images = manifest.images().unwrap();
        assert_eq!(images[0], ImageReference::new("some-repository", Some("1.1")));
        assert_eq!(images[1], ImageReference::new("some-other-repository", Some("1.2.3")));
        assert_eq!(written(&manifest), OUTPUT);
        assert_eq!(
            manifest.modifications().iter().cloned().collect::<Vec<_>>(),
            vec![Modification::new("kustomization.yaml", "some-repository", "1.0.0", "1.1")]
        );
    }

    #[test]
    fn test_unquoted_numeric_tags() {
        let input = "images:\n- name: repository-a\n  newTag: 1.0\n- name: repository-b\n  newTag: 2.0\n";
        let mut manifest = loaded(input);
        manifest.modify("repository-b", "4.5.6").unwrap();
        assert_eq!(
            written(&manifest),
            "images:\n- name: repository-a\n  newTag: 1.0\n- name: repository-b\n  newTag: 4.5.6\n"
        );

        // The untouched tag is read back verbatim, not as the number 1.
        assert_eq!(manifest.images().unwrap()[0].tag.as_deref(), Some("1.0"));
        assert_eq!(manifest.modifications().iter().next().unwrap().previous_tag, "2.0");

        // A numeric-looking replacement is quoted so it stays a string.
        manifest.modify("repository-a", "1.1").unwrap();
        assert!(written(&manifest).contains("  newTag: '1.1'\n"));
    }

    #[test]
    fn test_missing_images_key() {
        let input = "resources:\n- deployment.yaml\n";
        let mut manifest = loaded(input);
        assert!(manifest.images().unwrap().is_empty());
        manifest.modify("some-repository", "1.1").unwrap();
        assert!(manifest.modifications().is_empty());
        assert_eq!(written(&manifest), input);
    }

    #[test]
    fn test_missing_new_tag_is_inserted() {
        let input = "images:\n- name: some-repository # pinned below\n  newName: registry/some-repository\nnamespace: prod\n";
        let mut manifest = loaded(input);
        assert_eq!(manifest.images().unwrap()[0].tag, None);

        manifest.modify("some-repository", "2.0.1").unwrap();
        assert_eq!(
            written(&manifest),
            "images:\n- name: some-repository # pinned below\n  newName: registry/some-repository\n  newTag: 2.0.1\nnamespace: prod\n"
        );
        assert_eq!(manifest.modifications().iter().next().unwrap().previous_tag, "");
    }

    #[test]
    fn test_images_must_be_a_sequence() {
        let mut manifest = KustomizeManifest::new("kustomization.yaml");
        let err = manifest.load(&mut "images: some-repository\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), ".images: expected a sequence, found a scalar");
    }

    #[test]
    fn test_root_must_be_a_mapping() {
        let mut manifest = KustomizeManifest::new("kustomization.yaml");
        let err = manifest.load(&mut "- a\n- b\n".as_bytes()).unwrap_err();
        assert!(err.is_document());
    }

    #[test]
    fn test_modify_is_idempotent() {
        let mut manifest = loaded(INPUT);
        manifest.modify("some-repository", "1.1").unwrap();
        manifest.modify("some-repository", "1.1").unwrap();
        assert_eq!(written(&manifest), OUTPUT);
        assert!(!manifest.modifications().iter().last().unwrap().updated());
    }
}
