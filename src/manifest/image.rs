//! Image references.

use serde::Serialize;
use std::fmt;

/// ImageReference is the canonical form of an image reference, independent of
/// how a manifest format encodes it.
///
/// A missing tag (`None`) is distinct from an empty one (`Some("")`): the
/// inline form `repo` has no tag while `repo:` has an empty tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageReference {
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageReference {
    /// Creates a new image reference.
    pub fn new(repository: impl Into<String>, tag: Option<&str>) -> Self {
        ImageReference {
            repository: repository.into(),
            tag: tag.map(str::to_string),
        }
    }

    /// Parses an inline `repository[:tag]` reference.
    ///
    /// The split happens at the first `:`, so a registry port is read as the
    /// start of the tag: `host:5000/app:1.0` has repository `host`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((repository, tag)) => ImageReference::new(repository, Some(tag)),
            None => ImageReference::new(raw, None),
        }
    }

    /// Renders the inline form written back into a manifest. The separator is
    /// always present, even for a missing tag.
    pub fn to_image_field(&self) -> String {
        format!("{}:{}", self.repository, self.tag.as_deref().unwrap_or(""))
    }

    /// Returns the tag, or `""` when there is none.
    pub fn tag_or_empty(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{}", self.repository, tag),
            None => write!(f, "{}", self.repository),
        }
    }
}
