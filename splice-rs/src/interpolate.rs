//! The second pass: writing the final text.

use crate::format::write_value;
use crate::scan::{split_clip, unescape_into, Dictionary, Token, Tokens};
use crate::sentinel;
use crate::value::Value;

/// Positional values plus a cursor over the ones already consumed.
#[derive(Debug)]
pub struct Positional<'a> {
    pub values: &'a [Value],
    pub consumed: &'a mut usize,
}

impl Positional<'_> {
    fn next(&mut self) -> Option<&Value> {
        let v = self.values.get(*self.consumed)?;
        *self.consumed += 1;
        Some(v)
    }
}

/// Render `template` into `text`.
///
/// `scratch` stages unescaped keys and is left empty.
pub fn interpolate(
    template: &str,
    text: &mut String,
    scratch: &mut String,
    dict: &Dictionary,
    mut positional: Positional<'_>,
) {
    for token in Tokens::new(template) {
        match token {
            Token::Text(raw) => unescape_into(text, raw),
            Token::Site(clip) => {
                let clip = split_clip(clip);
                scratch.clear();
                unescape_into(scratch, clip.key);
                if scratch.is_empty() {
                    match positional.next() {
                        Some(v) => write_value(text, v, clip.verb),
                        None => text.push_str(sentinel::MISSING_ARG),
                    }
                } else {
                    match dict.get(scratch.as_str()) {
                        Some(Some(v)) => write_value(text, v, clip.verb),
                        _ => text.push_str(sentinel::MISSING_ATTR),
                    }
                }
            }
            Token::Unterminated(raw) => {
                unescape_into(text, raw);
                text.push_str(sentinel::MISSING_RIGHT_BRACKET);
                break;
            }
        }
    }
    scratch.clear();
}

// ── Tests ─────────────────────────────────────────────────────────────────────
