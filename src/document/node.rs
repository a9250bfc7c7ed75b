//! Node types of the document tree.

/// Span is a byte range into the document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Creates an empty span at the given offset.
    pub fn empty(at: usize) -> Self {
        Span { start: at, end: at }
    }

    /// Returns the length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Moves the span to account for the bytes `[at, old_end)` having been
    /// replaced by a text `delta` bytes longer (or shorter).
    ///
    /// Spans that end before the edit are untouched; spans that enclose it
    /// grow; spans after it move.
    fn shift(&mut self, at: usize, old_end: usize, delta: isize) {
        let moved = |offset: usize| (offset as isize + delta) as usize;
        if at == old_end {
            // Pure insertion: spans sitting exactly at the insertion point
            // stay in front of the inserted text.
            if self.start > at {
                self.start = moved(self.start);
            }
            if self.end > at {
                self.end = moved(self.end);
            }
        } else {
            if self.start >= old_end {
                self.start = moved(self.start);
            }
            if self.end >= old_end {
                self.end = moved(self.end);
            }
        }
    }
}

/// ScalarStyle is the presentation of a scalar in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Returns true for the two quoted styles.
    pub fn is_quoted(&self) -> bool {
        matches!(self, ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted)
    }
}

/// Scalar is a leaf value together with its presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    /// Decoded value. Plain scalars keep their literal text, so `1.0` stays
    /// `"1.0"` and is never read as a number.
    pub value: String,
    pub style: ScalarStyle,
    /// Explicit tag such as `!!str`, if any.
    pub tag: Option<String>,
    pub anchor: Option<String>,
    /// True for `key:` with nothing after it.
    pub implicit: bool,
    /// Whether the scalar sits inside a flow collection.
    pub flow: bool,
    pub span: Span,
}

impl Scalar {
    /// Returns the decoded value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns true if this scalar is a null in the YAML core schema.
    pub fn is_null(&self) -> bool {
        self.implicit
            || (self.style == ScalarStyle::Plain
                && matches!(self.value.as_str(), "~" | "null" | "Null" | "NULL"))
    }
}

/// Entry is a single key/value pair of a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Scalar,
    pub value: Node,
}

/// Mapping keeps its entries in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub entries: Vec<Entry>,
    /// Column of the keys for block mappings.
    pub indent: usize,
    pub flow: bool,
    pub anchor: Option<String>,
    pub span: Span,
}

impl Mapping {
    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|e| e.key.value == key)
            .map(|e| &e.value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|e| e.key.value == key)
            .map(|e| &mut e.value)
    }

    /// Returns true if the mapping has an entry for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key.value == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over keys and values, in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|e| (e.key.value.as_str(), &e.value))
    }
}

/// Sequence keeps its items in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub flow: bool,
    pub anchor: Option<String>,
    pub span: Span,
}

impl Sequence {
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.items.iter()
    }
}

/// Alias is a `*name` reference to an anchored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub span: Span,
}

/// Node is one node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
    Alias(Alias),
}

impl Node {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the scalar value, if this node is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(Scalar::as_str)
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns a short name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Alias(_) => "alias",
        }
    }

    /// Returns the byte range this node occupies in the document text.
    pub fn span(&self) -> Span {
        match self {
            Node::Scalar(s) => s.span,
            Node::Sequence(s) => s.span,
            Node::Mapping(m) => m.span,
            Node::Alias(a) => a.span,
        }
    }

    /// Shifts every span in this subtree after a text edit.
    pub(crate) fn shift(&mut self, at: usize, old_end: usize, delta: isize) {
        match self {
            Node::Scalar(s) => s.span.shift(at, old_end, delta),
            Node::Alias(a) => a.span.shift(at, old_end, delta),
            Node::Sequence(seq) => {
                seq.span.shift(at, old_end, delta);
                for item in &mut seq.items {
                    item.shift(at, old_end, delta);
                }
            }
            Node::Mapping(map) => {
                map.span.shift(at, old_end, delta);
                for entry in &mut map.entries {
                    entry.key.span.shift(at, old_end, delta);
                    entry.value.shift(at, old_end, delta);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_shift_replacement() {
        // "a: 1.0\nb: 2" with "1.0" (3..6) replaced by "1.25"
        let mut before = Span::new(0, 1);
        let mut edited_parent = Span::new(0, 11);
        let mut after = Span::new(7, 8);
        before.shift(3, 6, 1);
        edited_parent.shift(3, 6, 1);
        after.shift(3, 6, 1);
        assert_eq!(before, Span::new(0, 1));
        assert_eq!(edited_parent, Span::new(0, 12));
        assert_eq!(after, Span::new(8, 9));
    }

    #[test]
    fn test_span_shift_insertion_keeps_spans_at_point() {
        let mut ending_at_point = Span::new(3, 6);
        let mut empty_at_point = Span::empty(6);
        let mut later = Span::new(7, 9);
        ending_at_point.shift(6, 6, 4);
        empty_at_point.shift(6, 6, 4);
        later.shift(6, 6, 4);
        assert_eq!(ending_at_point, Span::new(3, 6));
        assert_eq!(empty_at_point, Span::empty(6));
        assert_eq!(later, Span::new(11, 13));
    }

    #[test]
    fn test_scalar_null() {
        let scalar = Scalar {
            value: "~".into(),
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            implicit: false,
            flow: false,
            span: Span::new(0, 1),
        };
        assert!(scalar.is_null());
        let quoted = Scalar {
            style: ScalarStyle::SingleQuoted,
            ..scalar
        };
        assert!(!quoted.is_null());
    }
}
