//! Source Map (v3) encoding and generation.
//!
//! The mappings string is a `;`-separated list of generated lines, each a
//! `,`-separated list of segments, each segment a run of VLQ integers. The
//! codec functions here ([`encode_mappings`] / [`decode_mappings`]) work on
//! segments exactly as they are stored, i.e. already in delta form.
//! [`to_relative`] and [`to_absolute`] convert between that form and
//! absolute positions: the generated column restarts on every line while
//! the source index, source line, source column and name index deltas run
//! across the whole mapping.

pub mod vlq;

use crate::position::Chunk;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding VLQ text or mappings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceMapError {
    #[error("invalid base64 character {ch:?} at offset {offset}")]
    InvalidBase64 { ch: char, offset: usize },
    #[error("truncated VLQ value: last digit has the continuation bit set")]
    UnexpectedEnd,
    #[error("VLQ value does not fit in a 64-bit integer")]
    Overflow,
    #[error("segment {segment} on line {line} has {found} fields, expected 4 or 5")]
    SegmentArity {
        line: usize,
        segment: usize,
        found: usize,
    },
}

impl SourceMapError {
    pub(crate) fn offset_by(self, base: usize) -> Self {
        match self {
            SourceMapError::InvalidBase64 { ch, offset } => SourceMapError::InvalidBase64 {
                ch,
                offset: offset + base,
            },
            other => other,
        }
    }
}

/// One mapping segment.
///
/// The four mandatory fields follow the v3 ordering; `name_index` is the
/// optional fifth field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Segment {
    pub generated_column: i64,
    pub source_index: i64,
    pub source_line: i64,
    pub source_column: i64,
    pub name_index: Option<i64>,
}

impl Segment {
    pub const fn new(
        generated_column: i64,
        source_index: i64,
        source_line: i64,
        source_column: i64,
    ) -> Self {
        Segment {
            generated_column,
            source_index,
            source_line,
            source_column,
            name_index: None,
        }
    }

    #[must_use]
    pub const fn with_name(mut self, name_index: i64) -> Self {
        self.name_index = Some(name_index);
        self
    }

    fn write_to(&self, out: &mut String) {
        vlq::encode_vlq_into(self.generated_column, out);
        vlq::encode_vlq_into(self.source_index, out);
        vlq::encode_vlq_into(self.source_line, out);
        vlq::encode_vlq_into(self.source_column, out);
        if let Some(name_index) = self.name_index {
            vlq::encode_vlq_into(name_index, out);
        }
    }
}

impl From<(i64, i64, i64, i64)> for Segment {
    fn from(
        (generated_column, source_index, source_line, source_column): (i64, i64, i64, i64),
    ) -> Self {
        Segment::new(generated_column, source_index, source_line, source_column)
    }
}

/// Encode line groups of (delta) segments into a mappings string.
pub fn encode_mappings(groups: &[Vec<Segment>]) -> String {
    let mut out = String::new();
    for (line_idx, line) in groups.iter().enumerate() {
        if line_idx > 0 {
            out.push(';');
        }
        for (seg_idx, segment) in line.iter().enumerate() {
            if seg_idx > 0 {
                out.push(',');
            }
            segment.write_to(&mut out);
        }
    }
    out
}

/// Decode a mappings string into line groups of (delta) segments.
///
/// The inverse of [`encode_mappings`]; an empty string decodes to a single
/// empty line.
pub fn decode_mappings(text: &str) -> Result<Vec<Vec<Segment>>, SourceMapError> {
    let mut groups = Vec::new();
    for (line_idx, line) in text.split(';').enumerate() {
        let mut segments = Vec::new();
        if !line.is_empty() {
            for (seg_idx, raw) in line.split(',').enumerate() {
                let fields = vlq::decode_vlqs(raw)?;
                let segment = match fields.as_slice() {
                    &[g, s, l, c] => Segment::new(g, s, l, c),
                    &[g, s, l, c, n] => Segment::new(g, s, l, c).with_name(n),
                    _ => {
                        return Err(SourceMapError::SegmentArity {
                            line: line_idx,
                            segment: seg_idx,
                            found: fields.len(),
                        });
                    }
                };
                segments.push(segment);
            }
        }
        groups.push(segments);
    }
    Ok(groups)
}

/// Convert absolute segments into the v3 delta form.
pub fn to_relative(groups: &[Vec<Segment>]) -> Vec<Vec<Segment>> {
    let mut prev = Segment::default();
    let mut prev_name = 0;
    groups
        .iter()
        .map(|line| {
            prev.generated_column = 0;
            line.iter()
                .map(|abs| {
                    let rel = Segment {
                        generated_column: abs.generated_column - prev.generated_column,
                        source_index: abs.source_index - prev.source_index,
                        source_line: abs.source_line - prev.source_line,
                        source_column: abs.source_column - prev.source_column,
                        name_index: abs.name_index.map(|name| name - prev_name),
                    };
                    if let Some(name) = abs.name_index {
                        prev_name = name;
                    }
                    prev = *abs;
                    rel
                })
                .collect()
        })
        .collect()
}

/// Convert v3 delta segments back into absolute positions.
pub fn to_absolute(groups: &[Vec<Segment>]) -> Vec<Vec<Segment>> {
    let mut acc = Segment::default();
    let mut acc_name = 0;
    groups
        .iter()
        .map(|line| {
            acc.generated_column = 0;
            line.iter()
                .map(|rel| {
                    acc.generated_column += rel.generated_column;
                    acc.source_index += rel.source_index;
                    acc.source_line += rel.source_line;
                    acc.source_column += rel.source_column;
                    acc.name_index = rel.name_index.map(|delta| {
                        acc_name += delta;
                        acc_name
                    });
                    acc
                })
                .collect()
        })
        .collect()
}

/// A source map v3 document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
}

impl SourceMap {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Decode this document's mappings string.
    pub fn decoded_mappings(&self) -> Result<Vec<Vec<Segment>>, SourceMapError> {
        decode_mappings(&self.mappings)
    }
}

/// Assemble a source map document from (delta) line groups.
pub fn create_sourcemap(
    filename: &str,
    groups: &[Vec<Segment>],
    sources: &[&str],
    names: &[&str],
    source_root: Option<&str>,
) -> SourceMap {
    SourceMap {
        version: 3,
        sources: sources.iter().map(|s| (*s).to_string()).collect(),
        names: names.iter().map(|s| (*s).to_string()).collect(),
        mappings: encode_mappings(groups),
        file: filename.to_string(),
        source_root: source_root.map(str::to_string),
    }
}

// =============================================================================
// Chunk-driven mapping generation
// =============================================================================

/// Builds mapping segments from a rendered chunk stream.
///
/// Generated columns are counted in UTF-16 code units, as source map
/// consumers expect. A segment is recorded for every chunk that carries a
/// source position; chunks with an `original` name also register that name.
#[derive(Debug, Default)]
pub struct MappingBuilder {
    source_index: i64,
    /// Absolute segments, one group per generated line.
    lines: Vec<Vec<Segment>>,
    names: IndexSet<String>,
    column: i64,
}

impl MappingBuilder {
    pub fn new() -> Self {
        MappingBuilder {
            lines: vec![Vec::new()],
            ..Self::default()
        }
    }

    /// Attribute subsequent segments to the source at `source_index`.
    pub fn set_source_index(&mut self, source_index: i64) {
        self.source_index = source_index;
    }

    pub fn push(&mut self, chunk: &Chunk) {
        if let Some(pos) = chunk.pos {
            let mut segment = Segment::new(
                self.column,
                self.source_index,
                i64::from(pos.line.saturating_sub(1)),
                i64::from(pos.column.saturating_sub(1)),
            );
            if let Some(original) = &chunk.original {
                let (index, _) = self.names.insert_full(original.clone());
                segment = segment.with_name(index as i64);
            }
            if let Some(line) = self.lines.last_mut() {
                line.push(segment);
            }
        }
        self.advance(&chunk.text);
    }

    fn advance(&mut self, text: &str) {
        let mut tail_start = None;
        for newline in memchr::memchr_iter(b'\n', text.as_bytes()) {
            self.lines.push(Vec::new());
            tail_start = Some(newline + 1);
        }
        match tail_start {
            Some(start) => self.column = utf16_len(&text[start..]),
            None => self.column += utf16_len(text),
        }
    }

    /// Absolute segments recorded so far.
    pub fn absolute(&self) -> &[Vec<Segment>] {
        &self.lines
    }

    /// Finish building: the delta-encoded line groups and the name table.
    pub fn finish(self) -> (Vec<Vec<Segment>>, Vec<String>) {
        (to_relative(&self.lines), self.names.into_iter().collect())
    }
}

impl<'a> Extend<&'a Chunk> for MappingBuilder {
    fn extend<T: IntoIterator<Item = &'a Chunk>>(&mut self, iter: T) {
        for chunk in iter {
            self.push(chunk);
        }
    }
}

fn utf16_len(text: &str) -> i64 {
    text.chars().map(|ch| ch.len_utf16() as i64).sum()
}

#[cfg(test)]
#[path = "../../tests/source_map.rs"]
mod tests;

#[cfg(test)]
#[path = "../../tests/vlq.rs"]
mod vlq_tests;
