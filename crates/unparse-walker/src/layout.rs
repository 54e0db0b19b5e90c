//! Stock token and layout handlers, and the rule sets built from them.

use crate::dispatcher::{Dispatcher, LayoutContext};
use crate::node::Node;
use crate::rules::{AttrSource, Deferred, Layout, Token};
use crate::unparser::RuleSet;
use std::cell::Cell;
use std::rc::Rc;
use unparse_common::Chunk;

pub fn rule_handler_noop<N: Node>(
    _dispatcher: &Dispatcher<N>,
    _node: &N,
    _context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    Vec::new()
}

fn is_resolve(token: &Token) -> bool {
    matches!(token, Token::Attr(AttrSource::Deferred(Deferred::Resolve)))
}

/// Whether the token renders data carried by the node itself, as opposed
/// to punctuation or keywords from the definition.
fn carries_node_text(token: &Token) -> bool {
    matches!(token, Token::Attr(_) | Token::ElisionToken { .. })
}

/// One chunk per value. Node-derived values carry the node's position; a
/// resolved identifier rendered under a different name records the
/// original name.
pub fn token_handler_str_default<N: Node>(
    token: &Token,
    _dispatcher: &Dispatcher<N>,
    node: &N,
    value: &str,
) -> Vec<Chunk> {
    let pos = if carries_node_text(token) {
        node.position()
    } else {
        None
    };
    let original = if is_resolve(token) {
        node.identifier_name()
            .filter(|name| *name != value)
            .map(str::to_string)
    } else {
        None
    };
    vec![Chunk::at(value, pos).with_original(original)]
}

/// Like [`token_handler_str_default`] but resolved identifiers always
/// render their original name.
pub fn token_handler_unobfuscate<N: Node>(
    token: &Token,
    dispatcher: &Dispatcher<N>,
    node: &N,
    value: &str,
) -> Vec<Chunk> {
    match node.identifier_name() {
        Some(name) if is_resolve(token) => vec![Chunk::at(name, node.position())],
        _ => token_handler_str_default(token, dispatcher, node, value),
    }
}

fn ends_with_space(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_whitespace)
}

fn starts_with_space(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_whitespace)
}

/// A space, unless the batch already produced one.
pub fn layout_handler_space_imply<N: Node>(
    _dispatcher: &Dispatcher<N>,
    _node: &N,
    context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    if context.prev == Some(" ") {
        return Vec::new();
    }
    vec![Chunk::new(" ")]
}

/// A space only between two pieces of text that don't already have one.
pub fn layout_handler_space_optional_pretty<N: Node>(
    _dispatcher: &Dispatcher<N>,
    _node: &N,
    context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    let (Some(before), Some(after)) = (context.before, context.after) else {
        return Vec::new();
    };
    if before.is_empty()
        || after.is_empty()
        || ends_with_space(before)
        || starts_with_space(after)
        || context.prev.is_some_and(ends_with_space)
    {
        return Vec::new();
    }
    vec![Chunk::new(" ")]
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// A space only where the neighbouring tokens would otherwise fuse.
pub fn layout_handler_space_minimum<N: Node>(
    _dispatcher: &Dispatcher<N>,
    _node: &N,
    context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    let (Some(before), Some(after)) = (context.before, context.after) else {
        return Vec::new();
    };
    if context.prev.is_some_and(ends_with_space) {
        return Vec::new();
    }
    let (Some(last), Some(first)) = (before.chars().next_back(), after.chars().next()) else {
        return Vec::new();
    };
    let fuses = (is_word_char(last) && is_word_char(first))
        || (last == '+' && first == '+')
        || (last == '-' && first == '-');
    if fuses {
        vec![Chunk::new(" ")]
    } else {
        Vec::new()
    }
}

pub fn layout_handler_newline_simple<N: Node>(
    dispatcher: &Dispatcher<N>,
    _node: &N,
    _context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    vec![Chunk::new(dispatcher.newline_str())]
}

/// True when the output so far ends in a newline, ignoring indentation.
fn at_line_start(context: &LayoutContext<'_>) -> bool {
    let last = context.prev.or(context.before).unwrap_or("");
    last.trim_end_matches([' ', '\t']).ends_with(['\n', '\r'])
}

/// A newline, except at either end of the output or right after another.
pub fn layout_handler_newline_optional_pretty<N: Node>(
    dispatcher: &Dispatcher<N>,
    _node: &N,
    context: &LayoutContext<'_>,
) -> Vec<Chunk> {
    if context.before.is_none() || context.after.is_none() || at_line_start(context) {
        return Vec::new();
    }
    vec![Chunk::new(dispatcher.newline_str())]
}

/// Indentation-aware newline handling.
///
/// One instance holds the indentation depth for one render pass; the
/// handlers registered by [`indentation`] share it.
#[derive(Clone, Debug, Default)]
pub struct Indentator {
    /// Overrides the dispatcher's `indent_str` when set.
    indent_str: Option<String>,
    level: Rc<Cell<usize>>,
}

impl Indentator {
    pub fn new(indent_str: Option<String>) -> Self {
        Indentator {
            indent_str,
            level: Rc::new(Cell::new(0)),
        }
    }

    pub fn level(&self) -> usize {
        self.level.get()
    }

    pub fn indent(&self) {
        self.level.set(self.level.get() + 1);
    }

    pub fn dedent(&self) {
        self.level.set(self.level.get().saturating_sub(1));
    }

    /// Newline followed by the current indentation. No indentation is
    /// written before a line that is itself empty.
    pub fn newline<N: Node>(
        &self,
        dispatcher: &Dispatcher<N>,
        context: &LayoutContext<'_>,
    ) -> Vec<Chunk> {
        let mut chunks = vec![Chunk::new(dispatcher.newline_str())];
        let level = self.level();
        let blank_line = context
            .after
            .is_none_or(|after| after.is_empty() || after.starts_with(['\n', '\r']));
        if level > 0 && !blank_line {
            let indent_str = self.indent_str.as_deref().unwrap_or(dispatcher.indent_str());
            chunks.push(Chunk::new(indent_str.repeat(level)));
        }
        chunks
    }

    pub fn newline_optional<N: Node>(
        &self,
        dispatcher: &Dispatcher<N>,
        context: &LayoutContext<'_>,
    ) -> Vec<Chunk> {
        if context.before.is_none() || context.after.is_none() || at_line_start(context) {
            return Vec::new();
        }
        self.newline(dispatcher, context)
    }
}

/// Space implied, optional space pretty, plain newlines, and nothing for
/// an `Indent, Newline, Dedent` run with no content inside.
pub fn default_layout_handlers<N: Node>() -> RuleSet<N> {
    RuleSet::new()
        .layout(&[Layout::Space], layout_handler_space_imply::<N>)
        .layout(&[Layout::OptionalSpace], layout_handler_space_optional_pretty::<N>)
        .layout(&[Layout::Newline], layout_handler_newline_simple::<N>)
        .layout(&[Layout::OptionalNewline], layout_handler_newline_optional_pretty::<N>)
        .layout(
            &[Layout::Indent, Layout::Newline, Layout::Dedent],
            rule_handler_noop::<N>,
        )
}

/// Spaces only where required; newline and indentation markers produce
/// nothing.
pub fn minimum_layout_handlers<N: Node>() -> RuleSet<N> {
    RuleSet::new()
        .layout(&[Layout::Space], layout_handler_space_minimum::<N>)
        .layout(&[Layout::OptionalSpace], layout_handler_space_minimum::<N>)
        .layout(&[Layout::Newline], rule_handler_noop::<N>)
        .layout(&[Layout::OptionalNewline], rule_handler_noop::<N>)
}

/// A rule-set factory wiring a fresh [`Indentator`] on every call.
pub fn indentation<N: Node>(indent_str: Option<String>) -> impl Fn() -> RuleSet<N> + 'static {
    move || {
        let indentator = Indentator::new(indent_str.clone());
        let on_indent = indentator.clone();
        let on_dedent = indentator.clone();
        let on_newline = indentator.clone();
        let on_optional = indentator;
        RuleSet::new()
            .layout(&[Layout::Indent], move |_: &Dispatcher<N>, _: &N, _: &LayoutContext<'_>| {
                on_indent.indent();
                Vec::new()
            })
            .layout(&[Layout::Dedent], move |_: &Dispatcher<N>, _: &N, _: &LayoutContext<'_>| {
                on_dedent.dedent();
                Vec::new()
            })
            .layout(
                &[Layout::Newline],
                move |dispatcher: &Dispatcher<N>, _: &N, context: &LayoutContext<'_>| {
                    on_newline.newline(dispatcher, context)
                },
            )
            .layout(
                &[Layout::OptionalNewline],
                move |dispatcher: &Dispatcher<N>, _: &N, context: &LayoutContext<'_>| {
                    on_optional.newline_optional(dispatcher, context)
                },
            )
            .layout(
                &[Layout::Indent, Layout::Newline, Layout::Dedent],
                rule_handler_noop::<N>,
            )
    }
}

#[cfg(test)]
#[path = "../tests/layout.rs"]
mod tests;
