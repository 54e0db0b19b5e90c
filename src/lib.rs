//! Rule-driven syntax tree unparser.
//!
//! Renders a typed tree back into source text by interpreting a per-kind
//! rule table, optionally renaming local identifiers and producing a
//! source map for the output.
//!
//! # Crates
//!
//! - [`unparse_common`]: positions, chunks and the source map codec.
//! - [`unparse_walker`]: rule types, the dispatcher and the walk engine.
//! - [`unparse_mangler`]: scope tracking and identifier shortening.
//! - [`es5`]: a reference ES5 tree and grammar.
//!
//! # Example
//!
//! ```
//! use unparse::es5::Node;
//! use unparse::{RenderOptions, Style, es5_unparser, render};
//!
//! let program = Node::program(vec![Node::func_decl(
//!     "f",
//!     &["value"],
//!     vec![Node::ret(Some(Node::id("value")))],
//! )]);
//! let options = RenderOptions {
//!     style: Style::Minify,
//!     obfuscate: true,
//!     ..RenderOptions::default()
//! };
//! assert_eq!(
//!     render(&es5_unparser(&options), &program).unwrap(),
//!     "function f(a){return a;}"
//! );
//! ```

pub mod tracing_config;

pub use tracing_config::{LogFormat, init_tracing};

pub use unparse_common::source_map::{self, vlq};
pub use unparse_common::{
    Chunk, MappingBuilder, Position, Segment, SourceMap, SourceMapError, create_sourcemap,
    decode_mappings, encode_mappings, join_text,
};
pub use unparse_mangler::{Shortener, ShortenerOptions, obfuscate};
pub use unparse_walker::layout::{
    default_layout_handlers, indentation, minimum_layout_handlers, token_handler_unobfuscate,
};
pub use unparse_walker::{
    Dispatcher, DispatcherBuilder, Grammar, Layout, Node, Rule, RuleSet, Unparser,
    UnparserOptions, Value, WalkError,
};

pub use unparse_es5 as es5;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overall output style of the ES5 unparser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Indented, one statement per line.
    #[default]
    Pretty,
    /// Minimum whitespace.
    Minify,
}

/// Knobs for [`es5_unparser`], loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub style: Style,
    /// Rename local identifiers to short names.
    pub obfuscate: bool,
    pub shortener: ShortenerOptions,
    #[serde(flatten)]
    pub unparser: UnparserOptions,
}

/// An ES5 unparser configured by `options`.
pub fn es5_unparser(options: &RenderOptions) -> Unparser<es5::Node> {
    let unparser = match options.style {
        Style::Pretty => es5::pretty_printer(),
        Style::Minify => es5::minifier(),
    };
    let unparser = unparser.options(options.unparser.clone());
    if options.obfuscate {
        unparser.rule(obfuscate::<es5::Node>(options.shortener.clone()))
    } else {
        unparser
    }
}

/// Render `root` to text.
pub fn render<N: Node>(unparser: &Unparser<N>, root: &N) -> Result<String, WalkError> {
    unparser.render_to_string(root)
}

/// Render `root` and build the source map relating the output to `source`.
///
/// `filename` names the generated file in the map; positions reported by
/// the nodes are taken to be in `source`.
pub fn render_with_sourcemap<N: Node>(
    unparser: &Unparser<N>,
    root: &N,
    filename: &str,
    source: &str,
) -> Result<(String, SourceMap), WalkError> {
    let chunks = unparser.render(root)?;
    let mut builder = MappingBuilder::new();
    builder.extend(&chunks);
    let (groups, names) = builder.finish();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let map = create_sourcemap(filename, &groups, &[source], &names, None);
    debug!(
        file = filename,
        lines = groups.len(),
        names = names.len(),
        "source map built"
    );
    Ok((join_text(&chunks), map))
}
