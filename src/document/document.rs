//! The editable document.

use super::error::DocumentError;
use super::node::{Entry, Mapping, Node, Scalar, ScalarStyle, Span};
use super::parser::Parser;
use super::path::{Path, PathElement};
use super::scalar;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::trace;

/// Document is a single YAML document that can be edited in place.
///
/// The document keeps its source text and a node tree whose spans index into
/// it. Edits splice new scalar text into the source, so writing a document
/// back reproduces every byte that was not edited: comments, blank lines,
/// quoting, key order and indentation all survive.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    root: Node,
}

impl Document {
    /// Reads and parses a document.
    pub fn load<R: Read>(mut reader: R) -> Result<Document, DocumentError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            let column = valid.iter().rev().take_while(|&&b| b != b'\n').count() + 1;
            DocumentError::parse(line, column, "input is not valid UTF-8")
        })?;
        Document::from_text(text)
    }

    /// Parses a document from a string.
    pub fn parse(text: &str) -> Result<Document, DocumentError> {
        Document::from_text(text.to_string())
    }

    fn from_text(text: String) -> Result<Document, DocumentError> {
        // serde_yaml is the authority on well-formedness; the span parser
        // then only has to recover structure.
        if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(&text) {
            let (line, column) = e.location().map_or((1, 1), |l| (l.line(), l.column()));
            return Err(DocumentError::parse(line, column, e.to_string()));
        }
        let root = Parser::new(&text).parse()?;
        Ok(Document { text, root })
    }

    /// Writes the document text.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), DocumentError> {
        writer.write_all(self.text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the current document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the node at `path`.
    ///
    /// Fails with a structure error naming the deepest reachable path when a
    /// key is missing, an index is out of range, or a node has the wrong kind.
    pub fn get(&self, path: &Path) -> Result<&Node, DocumentError> {
        let mut node = &self.root;
        let mut walked = Path::new();
        for element in path {
            node = match (element, node) {
                (PathElement::Key(key), Node::Mapping(m)) => m
                    .get(key)
                    .ok_or_else(|| DocumentError::structure(walked.with(key.as_str()), "key not found"))?,
                (PathElement::Index(i), Node::Sequence(s)) => s.get(*i).ok_or_else(|| {
                    DocumentError::structure(
                        walked.with(*i),
                        format!("index out of range for a sequence of {} items", s.len()),
                    )
                })?,
                (element, other) => return Err(wrong_kind(&walked, element, other)),
            };
            walked.push(element.clone());
        }
        Ok(node)
    }

    /// Returns the node at `path`, or `None` if it cannot be reached.
    pub fn find(&self, path: &Path) -> Option<&Node> {
        self.get(path).ok()
    }

    fn get_mut(&mut self, path: &Path) -> Result<&mut Node, DocumentError> {
        let mut node = &mut self.root;
        for element in path {
            node = match (element, node) {
                (PathElement::Key(key), Node::Mapping(m)) => m
                    .get_mut(key)
                    .ok_or_else(|| DocumentError::structure(path, "key not found"))?,
                (PathElement::Index(i), Node::Sequence(s)) => s
                    .items
                    .get_mut(*i)
                    .ok_or_else(|| DocumentError::structure(path, "index out of range"))?,
                (element, other) => return Err(wrong_kind(path, element, other)),
            };
        }
        Ok(node)
    }

    /// Replaces the scalar at `path` with `value`.
    ///
    /// Only the scalar's own bytes change. Its quoting style is kept when it
    /// can carry the new value; a plain scalar whose new text would read back
    /// as something other than a string is single-quoted instead. Returns
    /// false, leaving the text untouched, when the scalar already holds
    /// `value`.
    pub fn set_scalar(&mut self, path: &Path, value: &str) -> Result<bool, DocumentError> {
        let current = match self.get(path)? {
            Node::Scalar(s) => s,
            other => {
                return Err(DocumentError::structure(
                    path,
                    format!("expected a scalar, found {}", describe(other)),
                ))
            }
        };
        if !current.implicit && current.value == value {
            return Ok(false);
        }

        let (rendered, style) = scalar::render(value, current.style, current.flow);
        let span = current.span;
        // `key:` with no value gets a separating space.
        let lead = usize::from(current.implicit);
        let text = if current.implicit {
            format!(" {rendered}")
        } else {
            rendered
        };

        trace!(path = %path, from = span.start, to = span.end, "Rewriting scalar");
        self.splice(span, &text, path);

        if let Node::Scalar(s) = self.get_mut(path)? {
            s.value = value.to_string();
            s.style = style;
            s.implicit = false;
            s.span = Span::new(span.start + lead, span.start + text.len());
        }
        Ok(true)
    }

    /// Appends `key: value` to the mapping at `path`.
    ///
    /// Block mappings get a new line at the indentation of their keys, right
    /// after the line holding the last entry; flow mappings get `, key: value`
    /// before the closing brace.
    pub fn insert_entry(&mut self, path: &Path, key: &str, value: &str) -> Result<(), DocumentError> {
        let mapping = match self.get(path)? {
            Node::Mapping(m) => m,
            other => {
                return Err(DocumentError::structure(
                    path,
                    format!("expected a mapping, found {}", describe(other)),
                ))
            }
        };
        if mapping.has(key) {
            return Err(DocumentError::structure(path.with(key), "key already exists"));
        }

        let (key_text, key_style) = scalar::render(key, ScalarStyle::Plain, mapping.flow);
        let (value_text, value_style) = scalar::render(value, ScalarStyle::Plain, mapping.flow);
        let (at, text, key_offset) = if mapping.flow {
            self.flow_insertion(mapping, &key_text, &value_text)
        } else {
            self.block_insertion(mapping, &key_text, &value_text)
        };
        let flow = mapping.flow;

        trace!(path = %path, key, at, "Inserting mapping entry");
        self.text.insert_str(at, &text);
        let delta = text.len() as isize;
        self.root.shift(at, at, delta);
        self.grow_containers(path, at, at + text.len());

        let key_start = at + key_offset;
        let value_start = key_start + key_text.len() + 2;
        let entry = Entry {
            key: Scalar {
                value: key.to_string(),
                style: key_style,
                tag: None,
                anchor: None,
                implicit: false,
                flow,
                span: Span::new(key_start, key_start + key_text.len()),
            },
            value: Node::Scalar(Scalar {
                value: value.to_string(),
                style: value_style,
                tag: None,
                anchor: None,
                implicit: false,
                flow,
                span: Span::new(value_start, value_start + value_text.len()),
            }),
        };
        if let Node::Mapping(m) = self.get_mut(path)? {
            m.entries.push(entry);
        }
        Ok(())
    }

    fn block_insertion(&self, mapping: &Mapping, key: &str, value: &str) -> (usize, String, usize) {
        let last_end = mapping
            .entries
            .last()
            .map_or(mapping.span.end, |e| e.key.span.end.max(e.value.span().end));
        let mut at = self.text[last_end..]
            .find('\n')
            .map_or(self.text.len(), |i| last_end + i);
        let newline = if at > 0 && self.text.as_bytes()[at - 1] == b'\r' {
            at -= 1;
            "\r\n"
        } else {
            "\n"
        };
        let indent = " ".repeat(mapping.indent);
        let text = format!("{newline}{indent}{key}: {value}");
        (at, text, newline.len() + indent.len())
    }

    fn flow_insertion(&self, mapping: &Mapping, key: &str, value: &str) -> (usize, String, usize) {
        let close = mapping.span.end.saturating_sub(1);
        let at = self.text[..close].trim_end().len();
        let separator = if mapping.is_empty() {
            ""
        } else if self.text[..at].ends_with(',') {
            " "
        } else {
            ", "
        };
        let text = format!("{separator}{key}: {value}");
        (at, text, separator.len())
    }

    fn splice(&mut self, span: Span, text: &str, path: &Path) {
        self.text.replace_range(span.start..span.end, text);
        let delta = text.len() as isize - span.len() as isize;
        self.root.shift(span.start, span.end, delta);
        if span.is_empty() {
            self.grow_containers(path, span.start, span.start + text.len());
        }
    }

    /// Extends the containers along `path` that ended at or before `at` so
    /// they cover text inserted there.
    fn grow_containers(&mut self, path: &Path, at: usize, new_end: usize) {
        let mut node = &mut self.root;
        let mut elements = path.iter();
        loop {
            match &mut *node {
                Node::Mapping(m) if m.span.end <= at => m.span.end = new_end,
                Node::Sequence(s) if s.span.end <= at => s.span.end = new_end,
                _ => {}
            }
            let Some(element) = elements.next() else {
                return;
            };
            node = match (element, node) {
                (PathElement::Key(key), Node::Mapping(m)) => match m.get_mut(key) {
                    Some(next) => next,
                    None => return,
                },
                (PathElement::Index(i), Node::Sequence(s)) => match s.items.get_mut(*i) {
                    Some(next) => next,
                    None => return,
                },
                _ => return,
            };
        }
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Scalar(s) if s.is_null() => "null".to_string(),
        Node::Alias(a) => format!("an alias (*{})", a.name),
        other => format!("a {}", other.kind_name()),
    }
}

fn wrong_kind(at: &Path, element: &PathElement, node: &Node) -> DocumentError {
    let expected = match element {
        PathElement::Key(_) => "a mapping",
        PathElement::Index(_) => "a sequence",
    };
    DocumentError::structure(at, format!("expected {expected}, found {}", describe(node)))
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
