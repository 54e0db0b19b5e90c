//! Common types and utilities for the unparse renderer.
//!
//! This crate provides the leaf types shared by every other unparse crate:
//! - Source positions and emitted output chunks (`Position`, `Chunk`)
//! - The base64 VLQ codec and source map v3 mappings (`source_map`)
//! - Source map document assembly and chunk-driven mapping generation

// Position/Chunk types for line/column source locations
pub mod position;
pub use position::{Chunk, Position, join_text};

// Source Map encoding, decoding and generation
pub mod source_map;
pub use source_map::{
    MappingBuilder, Segment, SourceMap, SourceMapError, create_sourcemap, decode_mappings,
    encode_mappings,
};
