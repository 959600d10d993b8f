//! Source locations shared by the lowering visitor, converter and source map.
//!
//! Byte offsets (`TextSize`/`TextRange`) are the primary currency — they are
//! what the parser hands us and what the source map ultimately encodes — but
//! diagnostics and the public API want line/column, so a [`LineIndex`]
//! converts between the two without re-scanning the buffer on every lookup.

use std::collections::HashMap;

pub use text_size::{TextRange, TextSize};

/// A 0-indexed line/column position, as exposed to callers and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open line/column span, the line/column counterpart of [`TextRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: Position) -> bool {
        if pos.line < self.start.line || pos.line > self.end.line {
            return false;
        }
        if pos.line == self.start.line && pos.column < self.start.column {
            return false;
        }
        if pos.line == self.end.line && pos.column > self.end.column {
            return false;
        }
        true
    }
}

/// Maps byte offsets into a source buffer to line/column positions.
///
/// Built once per conversion from the original SRC text; every lowered node
/// location and every emitted source-map entry goes through this rather than
/// re-walking the string.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    pub fn line_col(&self, offset: TextSize) -> Position {
        let offset: u32 = offset.into();
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let col = offset - self.line_starts[line];
        Position::new(line as u32, col)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.line_col(range.start()), self.line_col(range.end()))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Per-source-file bookkeeping that the public API keys diagnostics by: the
/// file name (or a synthetic one) plus its [`LineIndex`].
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub index: LineIndex,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            index: LineIndex::new(text),
        }
    }
}

/// Symbol-name interning table used by the source map to avoid repeating
/// identifier strings across many mappings (see `source_map::Mapping::name`).
#[derive(Debug, Default)]
pub struct NameTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
