//! Positions and output chunks.
//!
//! A render pass produces a flat stream of [`Chunk`]s. Concatenating their
//! text gives the rendered source; the optional position and original name
//! carried by each chunk are what source map generation works from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line/column location in the original source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One emitted unit of output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The rendered text.
    pub text: String,
    /// Where the text came from in the original source, if anywhere.
    pub pos: Option<Position>,
    /// The original source text when `text` is a substitute for it
    /// (e.g. a renamed identifier). Becomes a source map `names` entry.
    pub original: Option<String>,
}

impl Chunk {
    /// A chunk with no source position (layout output, synthesized text).
    pub fn new(text: impl Into<String>) -> Self {
        Chunk {
            text: text.into(),
            pos: None,
            original: None,
        }
    }

    /// A chunk originating from `pos` in the original source.
    pub fn at(text: impl Into<String>, pos: Option<Position>) -> Self {
        Chunk {
            text: text.into(),
            pos,
            original: None,
        }
    }

    #[must_use]
    pub fn with_original(mut self, original: Option<String>) -> Self {
        self.original = original;
        self
    }
}

/// Concatenate the text of a chunk stream.
pub fn join_text<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> String {
    chunks.into_iter().map(|chunk| chunk.text.as_str()).collect()
}
