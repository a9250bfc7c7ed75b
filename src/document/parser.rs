//! Span-tracking YAML parser.
//!
//! Builds the node tree of a single document, recording the byte range of
//! every node so edits can splice the source text instead of re-emitting it.
//! Input has already been checked by `serde_yaml`, so the parser only needs to
//! recover structure; it still reports the constructs it does not model.

use super::error::DocumentError;
use super::node::{Alias, Entry, Mapping, Node, Scalar, ScalarStyle, Sequence, Span};

type Result<T> = std::result::Result<T, DocumentError>;

/// Tag and anchor written in front of a node.
#[derive(Debug, Default)]
struct Properties {
    tag: Option<String>,
    anchor: Option<String>,
}

impl Properties {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.anchor.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    bom: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        let bom = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Parser {
            src,
            bytes: src.as_bytes(),
            pos: bom,
            bom,
        }
    }

    /// Parses the whole input as one document and returns its root node.
    pub(crate) fn parse(mut self) -> Result<Node> {
        self.skip_trivia();
        while self.peek() == Some(b'%') && self.column(self.pos) == 0 {
            self.pos = self.line_end(self.pos);
            self.skip_trivia();
        }
        if self.at_marker(b"---") {
            self.pos += 3;
            self.skip_trivia();
        }

        let root = if self.at_end() || self.at_marker(b"...") || self.at_marker(b"---") {
            null_at(self.pos, false)
        } else {
            self.parse_block_node(-1, false)?
        };

        self.skip_trivia();
        if self.at_marker(b"...") {
            self.pos += 3;
            self.skip_trivia();
        }
        if self.at_marker(b"---") {
            return Err(self.error(self.pos, "multiple documents are not supported"));
        }
        if !self.at_end() {
            return Err(self.error(self.pos, "unexpected content after the document"));
        }
        Ok(root)
    }

    // ------------------------------------------------------------------
    // Block context
    // ------------------------------------------------------------------

    /// Parses the node starting at the current (non-blank) position.
    ///
    /// Continuation lines of the node must be indented deeper than `parent`.
    /// `in_mapping` admits a block sequence at exactly `parent`, the usual
    /// `key:` / `- item` layout.
    fn parse_block_node(&mut self, parent: isize, in_mapping: bool) -> Result<Node> {
        if self.is_mapping_entry(self.pos) {
            let indent = self.column(self.pos);
            return self.parse_block_mapping(indent, None);
        }

        let props = self.parse_properties(false);
        if !props.is_empty() && self.at_line_break() {
            let after = self.pos;
            self.skip_trivia();
            let col = self.column(self.pos) as isize;
            let nested = !self.at_end()
                && !self.at_document_marker()
                && (col > parent || (col == parent && in_mapping && self.at_sequence_entry()));
            if !nested {
                self.pos = after;
                return Ok(with_properties(null_at(after, false), props));
            }
            if self.is_mapping_entry(self.pos) {
                let indent = self.column(self.pos);
                return self.parse_block_mapping(indent, props.anchor);
            }
        }

        let node = match self.peek() {
            Some(b'-') if is_blank(self.peek_at(self.pos + 1)) => {
                let indent = self.column(self.pos);
                self.parse_block_sequence(indent, None)?
            }
            Some(b'?') if is_blank(self.peek_at(self.pos + 1)) => {
                return Err(self.error(self.pos, "explicit mapping keys are not supported"));
            }
            Some(b'|' | b'>') => Node::Scalar(self.parse_block_scalar(parent)?),
            Some(b'[' | b'{') => {
                let node = self.parse_flow_node()?;
                let save = self.pos;
                self.skip_spaces();
                if self.peek() == Some(b':') && is_blank(self.peek_at(self.pos + 1)) {
                    return Err(self.error(self.pos, "complex mapping keys are not supported"));
                }
                self.pos = save;
                node
            }
            Some(b'*') => self.parse_alias(false),
            Some(q @ (b'\'' | b'"')) => Node::Scalar(self.parse_quoted(q, false)?),
            Some(_) => Node::Scalar(self.parse_plain_block(parent)?),
            None => null_at(self.pos, false),
        };
        Ok(with_properties(node, props))
    }

    fn parse_block_mapping(&mut self, indent: usize, anchor: Option<String>) -> Result<Node> {
        let start = self.pos;
        let mut entries: Vec<Entry> = Vec::new();
        let mut end = start;

        loop {
            let key_start = self.pos;
            let key = self.parse_key()?;
            let colon_end = self.pos;
            self.skip_spaces();

            let value = if self.at_line_break() {
                self.skip_trivia();
                let col = self.column(self.pos);
                if self.at_end() || self.at_document_marker() {
                    self.pos = colon_end;
                    null_at(colon_end, false)
                } else if col > indent {
                    self.parse_block_node(indent as isize, true)?
                } else if col == indent && self.at_sequence_entry() {
                    self.parse_block_sequence(indent, None)?
                } else {
                    self.pos = colon_end;
                    null_at(colon_end, false)
                }
            } else {
                self.parse_block_node(indent as isize, true)?
            };

            if entries.iter().any(|e| e.key.value == key.value) {
                return Err(self.error(key_start, format!("duplicate mapping key '{}'", key.value)));
            }
            end = end.max(key.span.end).max(value.span().end);
            entries.push(Entry { key, value });

            let save = self.pos;
            self.skip_trivia();
            if self.at_end() || self.at_document_marker() {
                self.pos = save;
                break;
            }
            let col = self.column(self.pos);
            if col < indent || (col == indent && self.at_sequence_entry()) {
                self.pos = save;
                break;
            }
            if col > indent {
                return Err(self.error(self.pos, "unexpected indentation"));
            }
            if !self.is_mapping_entry(self.pos) {
                return Err(self.error(self.pos, "expected a mapping key"));
            }
        }

        Ok(Node::Mapping(Mapping {
            entries,
            indent,
            flow: false,
            anchor,
            span: Span::new(start, end),
        }))
    }

    /// Parses a block mapping key, leaving the position after its `:`.
    fn parse_key(&mut self) -> Result<Scalar> {
        let props = self.parse_properties(false);
        let key = match self.peek() {
            Some(q @ (b'\'' | b'"')) => self.parse_quoted(q, false)?,
            _ => {
                let start = self.pos;
                let line_end = self.line_end(start);
                let mut p = start;
                while p < line_end && !(self.bytes[p] == b':' && is_blank(self.peek_at(p + 1))) {
                    p += 1;
                }
                let text = self.src[start..p].trim_end();
                self.pos = p;
                plain(text.to_string(), Span::new(start, start + text.len()), false)
            }
        };
        self.skip_spaces();
        if self.peek() != Some(b':') {
            return Err(self.error(self.pos, "expected ':' after a mapping key"));
        }
        self.pos += 1;
        Ok(scalar_with_properties(key, props))
    }

    fn parse_block_sequence(&mut self, indent: usize, anchor: Option<String>) -> Result<Node> {
        let start = self.pos;
        let mut items = Vec::new();
        let mut end = start;

        loop {
            let dash = self.pos;
            self.pos += 1;
            self.skip_spaces();

            let item = if self.at_line_break() {
                self.skip_trivia();
                if !self.at_end() && !self.at_document_marker() && self.column(self.pos) > indent {
                    self.parse_block_node(indent as isize, false)?
                } else {
                    self.pos = dash + 1;
                    null_at(dash + 1, false)
                }
            } else {
                self.parse_block_node(indent as isize, false)?
            };
            end = end.max(dash + 1).max(item.span().end);
            items.push(item);

            let save = self.pos;
            self.skip_trivia();
            if self.at_end()
                || self.at_document_marker()
                || self.column(self.pos) != indent
                || !self.at_sequence_entry()
            {
                self.pos = save;
                break;
            }
        }

        Ok(Node::Sequence(Sequence {
            items,
            flow: false,
            anchor,
            span: Span::new(start, end),
        }))
    }

    /// Parses a plain scalar in block context, folding continuation lines.
    fn parse_plain_block(&mut self, parent: isize) -> Result<Scalar> {
        let start = self.pos;
        let (first_end, mut comment) = self.plain_line_end(start);
        if first_end == start {
            return Err(self.error(start, "expected a value"));
        }
        let mut value = self.src[start..first_end].to_string();
        let mut end = first_end;

        while !comment {
            let mut p = self.line_end(end);
            let mut blank_lines = 0;
            let (line_start, text_start) = loop {
                if p >= self.bytes.len() {
                    break (p, p);
                }
                let line_start = p + 1;
                let mut q = line_start;
                while matches!(self.peek_at(q), Some(b' ' | b'\t')) {
                    q += 1;
                }
                match self.peek_at(q) {
                    Some(b'\n') => {
                        blank_lines += 1;
                        p = q;
                    }
                    Some(b'\r') if self.peek_at(q + 1) == Some(b'\n') => {
                        blank_lines += 1;
                        p = q + 1;
                    }
                    _ => break (line_start, q),
                }
            };
            if text_start >= self.bytes.len() || self.peek_at(text_start) == Some(b'#') {
                break;
            }
            let col = (text_start - line_start) as isize;
            if col <= parent || (col == 0 && self.is_marker_at(text_start)) {
                break;
            }
            let (line_end, has_comment) = self.plain_line_end(text_start);
            if line_end == text_start {
                break;
            }
            if blank_lines == 0 {
                value.push(' ');
            } else {
                value.extend(std::iter::repeat('\n').take(blank_lines));
            }
            value.push_str(&self.src[text_start..line_end]);
            end = line_end;
            comment = has_comment;
        }

        self.pos = end;
        Ok(plain(value, Span::new(start, end), false))
    }

    /// Returns where the plain text on the line starting at `from` ends, and
    /// whether a comment follows it.
    fn plain_line_end(&self, from: usize) -> (usize, bool) {
        let line_end = self.line_end(from);
        let mut p = from;
        let mut comment = false;
        while p < line_end {
            if self.bytes[p] == b'#' && p > from && matches!(self.bytes[p - 1], b' ' | b'\t') {
                comment = true;
                break;
            }
            p += 1;
        }
        let text = self.src[from..p].trim_end();
        (from + text.len(), comment)
    }

    /// Parses a literal (`|`) or folded (`>`) block scalar.
    fn parse_block_scalar(&mut self, parent: isize) -> Result<Scalar> {
        let start = self.pos;
        let folded = self.peek() == Some(b'>');
        self.pos += 1;

        let mut chomp = Chomp::Clip;
        let mut explicit_indent = None;
        for _ in 0..2 {
            match self.peek() {
                Some(b'-') => chomp = Chomp::Strip,
                Some(b'+') => chomp = Chomp::Keep,
                Some(d @ b'1'..=b'9') => explicit_indent = Some((d - b'0') as usize),
                _ => break,
            }
            self.pos += 1;
        }
        let header_end = self.pos;
        self.skip_spaces();
        if !self.at_line_break() {
            return Err(self.error(self.pos, "invalid block scalar header"));
        }

        let base = parent.max(0) as usize;
        let mut content_indent = explicit_indent.map(|d| if parent < 0 { d } else { base + d });
        let mut lines: Vec<&str> = Vec::new();
        let mut trailing_blank = 0;
        let mut end = header_end;
        let mut newline = self.line_end(self.pos);

        while newline < self.bytes.len() {
            let line_start = newline + 1;
            if line_start >= self.bytes.len() {
                break;
            }
            let line_end = self.line_end(line_start);
            let text = self.src[line_start..line_end].trim_end_matches('\r');
            let indent = text.len() - text.trim_start_matches(' ').len();
            if text.trim().is_empty() {
                trailing_blank += 1;
                newline = line_end;
                continue;
            }
            let ci = *content_indent.get_or_insert(indent);
            if indent < ci || indent as isize <= parent {
                break;
            }
            lines.extend(std::iter::repeat("").take(trailing_blank));
            trailing_blank = 0;
            lines.push(&text[ci..]);
            end = line_start + text.trim_end().len();
            newline = line_end;
        }

        let mut value = if folded {
            fold_block_lines(&lines)
        } else {
            lines.join("\n")
        };
        if !lines.is_empty() {
            match chomp {
                Chomp::Strip => {}
                Chomp::Clip => value.push('\n'),
                Chomp::Keep => value.extend(std::iter::repeat('\n').take(trailing_blank + 1)),
            }
        }

        self.pos = end;
        Ok(Scalar {
            value,
            style: if folded {
                ScalarStyle::Folded
            } else {
                ScalarStyle::Literal
            },
            tag: None,
            anchor: None,
            implicit: false,
            flow: false,
            span: Span::new(start, end),
        })
    }

    // ------------------------------------------------------------------
    // Flow context
    // ------------------------------------------------------------------

    fn parse_flow_node(&mut self) -> Result<Node> {
        let props = self.parse_properties(true);
        self.skip_trivia();
        let node = match self.peek() {
            Some(b'[') => self.parse_flow_sequence()?,
            Some(b'{') => self.parse_flow_mapping()?,
            Some(b'*') => self.parse_alias(true),
            Some(q @ (b'\'' | b'"')) => Node::Scalar(self.parse_quoted(q, true)?),
            Some(b',' | b']' | b'}') if !props.is_empty() => null_at(self.pos, true),
            Some(_) => Node::Scalar(self.parse_plain_flow()?),
            None => return Err(self.error(self.pos, "unterminated flow collection")),
        };
        Ok(with_properties(node, props))
    }

    fn parse_flow_sequence(&mut self) -> Result<Node> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error(start, "unterminated flow sequence")),
                _ => {}
            }
            let item = self.parse_flow_node()?;
            self.skip_trivia();
            if self.peek() == Some(b':') {
                return Err(self.error(self.pos, "mappings inside flow sequences are not supported"));
            }
            items.push(item);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error(self.pos, "expected ',' or ']' in flow sequence")),
            }
        }

        Ok(Node::Sequence(Sequence {
            items,
            flow: true,
            anchor: None,
            span: Span::new(start, self.pos),
        }))
    }

    fn parse_flow_mapping(&mut self) -> Result<Node> {
        let start = self.pos;
        self.pos += 1;
        let mut entries: Vec<Entry> = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'?') if is_blank(self.peek_at(self.pos + 1)) => {
                    return Err(self.error(self.pos, "explicit mapping keys are not supported"));
                }
                None => return Err(self.error(start, "unterminated flow mapping")),
                _ => {}
            }

            let key_start = self.pos;
            let props = self.parse_properties(true);
            let key = match self.peek() {
                Some(q @ (b'\'' | b'"')) => self.parse_quoted(q, true)?,
                Some(b'[' | b'{') => {
                    return Err(self.error(self.pos, "complex mapping keys are not supported"));
                }
                _ => self.parse_plain_flow()?,
            };
            let key = scalar_with_properties(key, props);

            self.skip_trivia();
            let value = if self.peek() == Some(b':') {
                self.pos += 1;
                let colon_end = self.pos;
                self.skip_trivia();
                if matches!(self.peek(), Some(b',' | b'}')) {
                    null_at(colon_end, true)
                } else {
                    self.parse_flow_node()?
                }
            } else {
                null_at(key.span.end, true)
            };

            if entries.iter().any(|e| e.key.value == key.value) {
                return Err(self.error(key_start, format!("duplicate mapping key '{}'", key.value)));
            }
            entries.push(Entry { key, value });

            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error(self.pos, "expected ',' or '}' in flow mapping")),
            }
        }

        Ok(Node::Mapping(Mapping {
            entries,
            indent: self.column(start),
            flow: true,
            anchor: None,
            span: Span::new(start, self.pos),
        }))
    }

    fn parse_plain_flow(&mut self) -> Result<Scalar> {
        let start = self.pos;
        let mut p = start;
        while let Some(b) = self.peek_at(p) {
            match b {
                b',' | b'[' | b']' | b'{' | b'}' | b'\n' | b'\r' => break,
                b':' if matches!(
                    self.peek_at(p + 1),
                    None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b'[' | b']' | b'{' | b'}')
                ) =>
                {
                    break
                }
                b'#' if p > start && matches!(self.bytes[p - 1], b' ' | b'\t') => break,
                _ => p += 1,
            }
        }
        let text = self.src[start..p].trim_end();
        if text.is_empty() {
            return Err(self.error(start, "expected a value"));
        }
        let end = start + text.len();
        self.pos = end;
        Ok(plain(text.to_string(), Span::new(start, end), true))
    }

    // ------------------------------------------------------------------
    // Shared scalars
    // ------------------------------------------------------------------

    fn parse_quoted(&mut self, quote: u8, flow: bool) -> Result<Scalar> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(b) = self.peek() else {
                return Err(self.error(start, "unterminated quoted scalar"));
            };
            match b {
                b'\'' if quote == b'\'' => {
                    if self.peek_at(self.pos + 1) == Some(b'\'') {
                        value.push('\'');
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                b'"' if quote == b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' if quote == b'"' => self.parse_escape(&mut value)?,
                b'\n' | b'\r' => self.fold_quoted_break(&mut value),
                _ => {
                    if let Some(c) = self.src[self.pos..].chars().next() {
                        value.push(c);
                        self.pos += c.len_utf8();
                    }
                }
            }
        }

        Ok(Scalar {
            value,
            style: if quote == b'\'' {
                ScalarStyle::SingleQuoted
            } else {
                ScalarStyle::DoubleQuoted
            },
            tag: None,
            anchor: None,
            implicit: false,
            flow,
            span: Span::new(start, self.pos),
        })
    }

    /// Folds a line break inside a quoted scalar: one break becomes a space,
    /// `n` breaks become `n - 1` newlines.
    fn fold_quoted_break(&mut self, value: &mut String) {
        let kept = value.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
        value.truncate(kept);
        let mut breaks = 0;
        while let Some(b) = self.peek() {
            match b {
                b'\n' => breaks += 1,
                b'\r' | b' ' | b'\t' => {}
                _ => break,
            }
            self.pos += 1;
        }
        if breaks <= 1 {
            value.push(' ');
        } else {
            value.extend(std::iter::repeat('\n').take(breaks - 1));
        }
    }

    fn parse_escape(&mut self, value: &mut String) -> Result<()> {
        let at = self.pos;
        self.pos += 1;
        let Some(b) = self.peek() else {
            return Err(self.error(at, "unterminated escape sequence"));
        };
        self.pos += 1;
        let c = match b {
            b'0' => '\0',
            b'a' => '\x07',
            b'b' => '\x08',
            b't' | b'\t' => '\t',
            b'n' => '\n',
            b'v' => '\x0b',
            b'f' => '\x0c',
            b'r' => '\r',
            b'e' => '\x1b',
            b' ' => ' ',
            b'"' => '"',
            b'/' => '/',
            b'\\' => '\\',
            b'N' => '\u{85}',
            b'_' => '\u{a0}',
            b'L' => '\u{2028}',
            b'P' => '\u{2029}',
            b'x' => self.parse_hex_escape(at, 2)?,
            b'u' => self.parse_hex_escape(at, 4)?,
            b'U' => self.parse_hex_escape(at, 8)?,
            b'\n' | b'\r' => {
                // Escaped line break: the lines are joined without a space.
                if b == b'\r' && self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
                self.skip_spaces();
                return Ok(());
            }
            _ => return Err(self.error(at, "invalid escape sequence")),
        };
        value.push(c);
        Ok(())
    }

    fn parse_hex_escape(&mut self, at: usize, digits: usize) -> Result<char> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error(at, "truncated escape sequence"))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| self.error(at, "invalid escape sequence"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error(at, "invalid unicode escape"))
    }

    fn parse_alias(&mut self, flow: bool) -> Node {
        let start = self.pos;
        self.pos += 1;
        let name = self.take_token(flow);
        Node::Alias(Alias {
            name,
            span: Span::new(start, self.pos),
        })
    }

    fn parse_properties(&mut self, flow: bool) -> Properties {
        let mut props = Properties::default();
        loop {
            match self.peek() {
                Some(b'!') => props.tag = Some(self.take_token(flow)),
                Some(b'&') => {
                    self.pos += 1;
                    props.anchor = Some(self.take_token(flow));
                }
                _ => break,
            }
            self.skip_spaces();
        }
        props
    }

    fn take_token(&mut self, flow: bool) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_blank(Some(b)) || (flow && is_flow_indicator(b)) {
                break;
            }
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// Returns true if the line starting at `from` holds an implicit
    /// `key: value` entry.
    fn is_mapping_entry(&self, from: usize) -> bool {
        let line_end = self.line_end(from);
        let mut p = from;
        while matches!(self.peek_at(p), Some(b'!' | b'&')) {
            while p < line_end && !is_blank(self.peek_at(p)) {
                p += 1;
            }
            while matches!(self.peek_at(p), Some(b' ' | b'\t')) {
                p += 1;
            }
        }

        match self.peek_at(p) {
            Some(q @ (b'\'' | b'"')) => match self.quoted_end(p, q, line_end) {
                Some(mut close) => {
                    while matches!(self.peek_at(close), Some(b' ' | b'\t')) {
                        close += 1;
                    }
                    self.peek_at(close) == Some(b':') && is_blank(self.peek_at(close + 1))
                }
                None => false,
            },
            None | Some(b'#' | b'[' | b'{' | b'|' | b'>' | b'*' | b'\n' | b'\r') => false,
            Some(b'-' | b'?') if is_blank(self.peek_at(p + 1)) => false,
            Some(_) => {
                while p < line_end {
                    let b = self.bytes[p];
                    if b == b':' && is_blank(self.peek_at(p + 1)) {
                        return true;
                    }
                    if b == b'#' && p > from && matches!(self.bytes[p - 1], b' ' | b'\t') {
                        return false;
                    }
                    p += 1;
                }
                false
            }
        }
    }

    /// Returns the offset just past the closing quote, if it is on this line.
    fn quoted_end(&self, open: usize, quote: u8, line_end: usize) -> Option<usize> {
        let mut p = open + 1;
        while p < line_end {
            let b = self.bytes[p];
            if quote == b'"' && b == b'\\' {
                p += 2;
                continue;
            }
            if b == quote {
                if quote == b'\'' && self.peek_at(p + 1) == Some(b'\'') {
                    p += 2;
                    continue;
                }
                return Some(p + 1);
            }
            p += 1;
        }
        None
    }

    fn at_sequence_entry(&self) -> bool {
        self.peek() == Some(b'-') && is_blank(self.peek_at(self.pos + 1))
    }

    fn at_document_marker(&self) -> bool {
        self.at_marker(b"---") || self.at_marker(b"...")
    }

    fn at_marker(&self, marker: &[u8; 3]) -> bool {
        self.column(self.pos) == 0
            && self.bytes[self.pos..].starts_with(marker)
            && is_blank(self.peek_at(self.pos + 3))
    }

    fn is_marker_at(&self, at: usize) -> bool {
        let rest = &self.bytes[at..];
        (rest.starts_with(b"---") || rest.starts_with(b"...")) && is_blank(self.peek_at(at + 3))
    }

    /// True at a comment or line break (after optional spaces were skipped).
    fn at_line_break(&self) -> bool {
        matches!(self.peek(), None | Some(b'#' | b'\n' | b'\r'))
    }

    // ------------------------------------------------------------------
    // Low-level cursor helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Skips spaces, line breaks and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(b'#') => self.pos = self.line_end(self.pos),
                Some(b'\n' | b'\r') => self.pos += 1,
                _ => break,
            }
        }
    }

    fn line_start(&self, pos: usize) -> usize {
        self.bytes[..pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |i| pos + i)
    }

    fn column(&self, pos: usize) -> usize {
        let line_start = self.line_start(pos);
        let col = pos - line_start;
        if line_start == 0 {
            col.saturating_sub(self.bom)
        } else {
            col
        }
    }

    fn error(&self, pos: usize, message: impl Into<String>) -> DocumentError {
        let line = self.bytes[..pos].iter().filter(|&&b| b == b'\n').count() + 1;
        DocumentError::parse(line, self.column(pos) + 1, message)
    }
}

fn is_blank(b: Option<u8>) -> bool {
    matches!(b, None | Some(b' ' | b'\t' | b'\n' | b'\r'))
}

fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

fn plain(value: String, span: Span, flow: bool) -> Scalar {
    Scalar {
        value,
        style: ScalarStyle::Plain,
        tag: None,
        anchor: None,
        implicit: false,
        flow,
        span,
    }
}

fn null_at(at: usize, flow: bool) -> Node {
    Node::Scalar(Scalar {
        value: String::new(),
        style: ScalarStyle::Plain,
        tag: None,
        anchor: None,
        implicit: true,
        flow,
        span: Span::empty(at),
    })
}

fn scalar_with_properties(mut scalar: Scalar, props: Properties) -> Scalar {
    if props.tag.is_some() {
        scalar.tag = props.tag;
    }
    if props.anchor.is_some() {
        scalar.anchor = props.anchor;
    }
    scalar
}

fn with_properties(node: Node, props: Properties) -> Node {
    match node {
        Node::Scalar(scalar) => Node::Scalar(scalar_with_properties(scalar, props)),
        Node::Mapping(mut mapping) => {
            if props.anchor.is_some() {
                mapping.anchor = props.anchor;
            }
            Node::Mapping(mapping)
        }
        Node::Sequence(mut sequence) => {
            if props.anchor.is_some() {
                sequence.anchor = props.anchor;
            }
            Node::Sequence(sequence)
        }
        alias @ Node::Alias(_) => alias,
    }
}

/// Folds the content lines of a `>` block scalar.
fn fold_block_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut pending_blank = 0;
    let mut previous_indented = false;
    let mut first = true;

    for line in lines {
        if line.is_empty() {
            pending_blank += 1;
            continue;
        }
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if first {
            out.extend(std::iter::repeat('\n').take(pending_blank));
        } else if pending_blank == 0 {
            out.push(if indented || previous_indented { '\n' } else { ' ' });
        } else {
            let extra = usize::from(indented || previous_indented);
            out.extend(std::iter::repeat('\n').take(pending_blank + extra));
        }
        out.push_str(line);
        previous_indented = indented;
        pending_blank = 0;
        first = false;
    }
    out
}
