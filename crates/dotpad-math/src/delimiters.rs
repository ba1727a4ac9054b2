//! Inline math delimiter grammar.
//!
//! ```text
//! math    := dollar | paren | bracket
//! dollar  := "$" [^$]+ "$"
//! paren   := "\(" .+? "\)"
//! bracket := "\[" .+? "\]"
//! ```
//!
//! Only the first expression of a label is typeset. The rules are tried in the order above: a
//! `$…$` anywhere in the label wins over an earlier `\(…\)`.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Dollar,
    Paren,
    Bracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimited<'a> {
    pub delimiter: Delimiter,
    /// Enclosed expression, trimmed. May be empty (`$ $`), in which case nothing is typeset.
    pub tex: &'a str,
}

fn re_dollar() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"\$([^$]+)\$").unwrap())
}

fn re_paren() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"\\\((.+?)\\\)").unwrap())
}

fn re_bracket() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"\\\[(.+?)\\\]").unwrap())
}

const RULES: [(Delimiter, fn() -> &'static Regex); 3] = [
    (Delimiter::Dollar, re_dollar),
    (Delimiter::Paren, re_paren),
    (Delimiter::Bracket, re_bracket),
];

pub fn contains_math(text: &str) -> bool {
    RULES.iter().any(|(_, re)| re().is_match(text))
}

pub fn extract_first(text: &str) -> Option<Delimited<'_>> {
    RULES.iter().find_map(|(delimiter, re)| {
        let caps = re().captures(text)?;
        Some(Delimited {
            delimiter: *delimiter,
            tex: caps.get(1)?.as_str().trim(),
        })
    })
}
