//! Static probing data: anchor text, context catalogs and the starter deny-list.

use std::fmt::Write;

use crate::key::short_hash;

/// Sentence every probe is appended to, so the identifier never starts the text.
pub const ANCHOR_TEXT: &str = "Test Test";

/// Surrounding text an identifier is embedded in: `anchor + lead + prefix + id + trail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub lead: &'static str,
    pub trail: &'static str,
}

impl Context {
    pub const fn new(lead: &'static str, trail: &'static str) -> Self {
        Self { lead, trail }
    }

    pub fn render(&self, prefix: &str, body: &str) -> String {
        format!("{ANCHOR_TEXT}{}{prefix}{body}{}", self.lead, self.trail)
    }
}

/// Whitespace-led framing; the reference for all base contexts.
pub const BASE_FRAMING: Context = Context::new(" ", "");

/// Symbol-led framing; the reference for all alt contexts.
pub const ALT_FRAMING: Context = Context::new(" @", "");

pub const BASE_CONTEXTS: &[Context] = &[
    BASE_FRAMING,
    Context::new(": ", ""),
    Context::new(": ", "."),
    Context::new(": ", ","),
    Context::new(": ", "!"),
    Context::new(" ", "-"),
    Context::new(" ", ";"),
    Context::new(" ", ":"),
];

pub const ALT_CONTEXTS: &[Context] = &[
    ALT_FRAMING,
    Context::new(" #", ""),
    Context::new(" ,", ""),
    Context::new(" \"", "\""),
    Context::new(" '", "'"),
    Context::new(" (", ")"),
    Context::new(" <", ">"),
    Context::new(" [", "]"),
    Context::new(" {", "}"),
    Context::new(" -", "-"),
    Context::new(" ,", ","),
    Context::new(" _", "_"),
];

/// Short words that would read as text; repeated-letter starters
/// (`Aa`, `Bbb`, ...) are denied by rule in [`is_banned`].
pub const BANNED_WORDS: &[&str] = &[
    "Am", "An", "As", "At", "Be", "By", "Do", "Go", "He", "If", "In", "Is", "It", "Me", "My",
    "No", "Of", "On", "Or", "So", "To", "Up", "Us", "We", "Id",
    "Not", "Non", "Yes", "Oui", "Out", "Msg", "For", "The", "And", "Are", "But", "You", "All",
    "Any", "His", "Him", "Her", "Was", "One", "Two", "Six", "Ten", "Get", "Our", "Has", "Its",
    "Who", "Why", "How", "Let", "Now", "See",
];

pub fn is_banned(starter: &str) -> bool {
    BANNED_WORDS.contains(&starter) || is_repeated_letter(starter)
}

fn is_repeated_letter(starter: &str) -> bool {
    let mut chars = starter.chars().map(|c| c.to_ascii_lowercase());
    let Some(first) = chars.next() else {
        return false;
    };
    matches!(starter.len(), 2 | 3) && first.is_ascii_lowercase() && chars.all(|c| c == first)
}

/// Every allowed starter: uppercase + lowercase (+ lowercase when `long`).
pub fn candidate_starters(long: bool) -> Vec<String> {
    let tails: Vec<Option<char>> = if long {
        ('a'..='z').map(Some).collect()
    } else {
        vec![None]
    };

    let mut starters = Vec::with_capacity(26 * 26 * tails.len());
    for upper in 'A'..='Z' {
        for lower in 'a'..='z' {
            for tail in &tails {
                let mut starter = String::with_capacity(3);
                starter.push(upper);
                starter.push(lower);
                starter.extend(*tail);
                if !is_banned(&starter) {
                    starters.push(starter);
                }
            }
        }
    }
    starters
}

/// All 260 digit + lowercase suffixes (10 × 26), digit-major.
pub fn candidate_suffixes() -> Vec<String> {
    ('0'..='9')
        .flat_map(|digit| ('a'..='z').map(move |letter| format!("{digit}{letter}")))
        .collect()
}

/// Short digest of everything that shapes a generated space besides the
/// tokenizer and options. Part of every cache key.
pub fn catalog_fingerprint() -> String {
    let mut material = String::new();
    let _ = writeln!(material, "anchor:{ANCHOR_TEXT:?}");
    for (name, contexts) in [("base", BASE_CONTEXTS), ("alt", ALT_CONTEXTS)] {
        for context in contexts {
            let _ = writeln!(material, "{name}:{:?}:{:?}", context.lead, context.trail);
        }
    }
    let _ = writeln!(material, "banned:{}", BANNED_WORDS.join(","));
    let _ = writeln!(material, "banned:repeated-letters");
    short_hash(&material)
}
