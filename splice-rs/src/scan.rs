//! Template tokenizer and the first (counting) pass.
//!
//! Both passes over a template go through [`Tokens`] and [`split_clip`], so
//! they always agree on where a site starts, where it ends and which part of
//! it is the key.
//!
//! | Sequence      | Meaning                                              |
//! |---------------|------------------------------------------------------|
//! | `{}`          | unkeyed site: next positional argument               |
//! | `{:verb}`     | unkeyed site with a format verb                      |
//! | `{key}`       | keyed site: attribute `key` (dotted for groups)      |
//! | `{key:verb}`  | keyed site with a format verb                        |
//! | `\x`          | literal `x` (`\{`, `\}`, `\:`, `\\`)                 |
//!
//! The verb starts after the last unescaped `:` of the clip.  When the
//! character just before that colon is itself an escaped colon (`\:`), the
//! whole clip is the key.

use std::collections::HashMap;

use crate::value::Value;

/// Resolution dictionary: scoped key → value, `None` until resolved.
pub type Dictionary = HashMap<String, Option<Value>>;

/// One piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, escapes still in place.
    Text(&'a str),
    /// The raw clip between an unescaped `{` and the next unescaped `}`.
    Site(&'a str),
    /// From an unescaped `{` with no closing `}` to the end of the template.
    Unterminated(&'a str),
}

/// Iterator over the [`Token`]s of a template.
///
/// Only ASCII bytes (`\`, `{`, `}`) are ever inspected, so every slice
/// boundary falls on a character boundary.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

/// Index of the first unescaped `target` in `bytes[from..]`.
fn find_unescaped(bytes: &[u8], from: usize, target: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == target => return Some(i),
            _ => i += 1,
        }
    }
    None
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.src.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }
        let start = self.pos;
        let Some(open) = find_unescaped(bytes, start, b'{') else {
            self.pos = bytes.len();
            return Some(Token::Text(&self.src[start..]));
        };
        if open > start {
            self.pos = open;
            return Some(Token::Text(&self.src[start..open]));
        }
        match find_unescaped(bytes, open + 1, b'}') {
            Some(close) => {
                self.pos = close + 1;
                Some(Token::Site(&self.src[open + 1..close]))
            }
            None => {
                self.pos = bytes.len();
                Some(Token::Unterminated(&self.src[open..]))
            }
        }
    }
}

/// A site's clip split into key and verb, both still escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip<'a> {
    pub key: &'a str,
    pub verb: Option<&'a str>,
}

/// Split a clip at its last unescaped `:`.
pub fn split_clip(clip: &str) -> Clip<'_> {
    let bytes = clip.as_bytes();
    let mut last_colon = None;
    // End offset of the most recent `\:` pair.
    let mut escaped_colon_end = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if bytes.get(i + 1) == Some(&b':') {
                    escaped_colon_end = Some(i + 2);
                }
                i += 2;
            }
            b':' => {
                last_colon = Some(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    match last_colon {
        Some(p) if escaped_colon_end != Some(p) => Clip {
            key: &clip[..p],
            verb: Some(&clip[p + 1..]).filter(|v| !v.is_empty()),
        },
        _ => Clip { key: clip, verb: None },
    }
}

/// Append `raw` to `out` with every `\x` replaced by `x`.
///
/// A trailing lone backslash is kept.
pub fn unescape_into(out: &mut String, raw: &str) {
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(ch);
        }
    }
}

/// Count unkeyed sites in `template` and register every keyed site in `dict`
/// as unresolved.
///
/// `scratch` stages the unescaped key; it is left empty.
pub fn scan(template: &str, dict: &mut Dictionary, scratch: &mut String) -> usize {
    let mut unkeyed = 0;
    for token in Tokens::new(template) {
        match token {
            Token::Text(_) => {}
            Token::Site(clip) => {
                let clip = split_clip(clip);
                scratch.clear();
                unescape_into(scratch, clip.key);
                if scratch.is_empty() {
                    unkeyed += 1;
                } else if !dict.contains_key(scratch.as_str()) {
                    dict.insert(scratch.clone(), None);
                }
            }
            Token::Unterminated(_) => break,
        }
    }
    scratch.clear();
    unkeyed
}

// ── Tests ─────────────────────────────────────────────────────────────────────
