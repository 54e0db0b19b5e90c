//! Replacement name generation.

const HEAD: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TAIL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789$_";

/// Words that can never be used as an identifier, plus the names whose
/// shadowing changes program behaviour.
pub const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// The `index`-th candidate name: `a`..`Z`, then `aa`, `ba`, ... with
/// digits, `$` and `_` allowed after the first character.
pub fn name_at(index: usize) -> String {
    let mut name = String::with_capacity(4);
    name.push(char::from(HEAD[index % HEAD.len()]));
    let mut rest = index / HEAD.len();
    while rest > 0 {
        rest -= 1;
        name.push(char::from(TAIL[rest % TAIL.len()]));
        rest /= TAIL.len();
    }
    name
}

/// Endless stream of short identifiers, reserved words skipped.
#[derive(Clone, Debug, Default)]
pub struct NameGenerator {
    index: usize,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let name = name_at(self.index);
            self.index += 1;
            if !is_reserved_word(&name) {
                return Some(name);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/names.rs"]
mod tests;
