//! printf-style format verbs.
//!
//! A verb follows the last `:` of an interpolation site, e.g. `{n:%08.3f}`
//! or `{name:-10s}`.  Grammar (the leading `%` is optional):
//!
//! ```text
//! %? [flags] [width] [.precision] [conversion]
//! ```
//!
//! | Flag    | Meaning                                        |
//! |---------|------------------------------------------------|
//! | `-`     | left-align within `width`                      |
//! | `+`     | always print a sign for numbers                |
//! | ` `     | leave a space where a `+` would go             |
//! | `#`     | alternate form (`0x` prefixes, pretty `Debug`) |
//! | `0`     | pad numbers with leading zeros                 |
//!
//! Which conversions are accepted depends on the value kind; see the
//! `write_*` functions below.

use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use regex::Regex;

/// Widths and precisions beyond this are clamped.
pub const MAX_WIDTH: usize = 4096;

static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^%?([-+# 0]*)([0-9]+)?(?:\.([0-9]*))?([a-zA-Z?])?$")
        .expect("verb pattern is a valid regex")
});

/// The value kind does not support the requested conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadVerb;

/// A parsed verb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spec {
    pub minus: bool,
    pub plus: bool,
    pub space: bool,
    pub sharp: bool,
    pub zero: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub conv: Option<char>,
}

impl Spec {
    /// Parse `verb`, returning `None` when it does not fit the grammar.
    pub fn parse(verb: &str) -> Option<Self> {
        let caps = SPEC_RE.captures(verb)?;
        let mut spec = Spec::default();
        for flag in caps.get(1).map_or("", |m| m.as_str()).chars() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '#' => spec.sharp = true,
                '0' => spec.zero = true,
                _ => {}
            }
        }
        spec.width = caps.get(2).map(|m| clamp(m.as_str()));
        spec.precision = caps.get(3).map(|m| if m.as_str().is_empty() { 0 } else { clamp(m.as_str()) });
        spec.conv = caps.get(4).and_then(|m| m.as_str().chars().next());
        Some(spec)
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }
}

/// Parse a run of digits, saturating at [`MAX_WIDTH`].
fn clamp(digits: &str) -> usize {
    digits.parse::<usize>().map_or(MAX_WIDTH, |n| n.min(MAX_WIDTH))
}

// ── Padding ───────────────────────────────────────────────────────────────────

/// Write `body` padded to the spec's width.
///
/// Zero padding goes between the sign/radix prefix and the digits, and only
/// applies when `numeric` is set.
fn pad(out: &mut String, body: &str, spec: &Spec, numeric: bool) {
    let len = body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(body);
        return;
    }
    let fill = width - len;
    if spec.minus {
        out.push_str(body);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero && numeric {
        let split = prefix_len(body);
        out.push_str(&body[..split]);
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(&body[split..]);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(body);
    }
}

/// Byte length of a leading sign plus an optional `0x`/`0X`/`0b`/`0o` prefix.
fn prefix_len(body: &str) -> usize {
    let b = body.as_bytes();
    let mut n = usize::from(matches!(b.first(), Some(b'+' | b'-' | b' ')));
    if b.len() >= n + 2 && b[n] == b'0' && matches!(b[n + 1], b'x' | b'X' | b'b' | b'o') {
        n += 2;
    }
    n
}

// ── Per-kind writers ──────────────────────────────────────────────────────────

/// Strings: `s`/`v` (precision truncates), `q` quoted, `x`/`X` hex bytes.
pub fn write_str(out: &mut String, s: &str, spec: &Spec) -> Result<(), BadVerb> {
    let body: String = match spec.conv {
        None | Some('s' | 'v') => match spec.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.to_owned(),
        },
        Some('q') => format!("{s:?}"),
        Some('x') => s.bytes().map(|b| format!("{b:02x}")).collect(),
        Some('X') => s.bytes().map(|b| format!("{b:02X}")).collect(),
        Some(_) => return Err(BadVerb),
    };
    pad(out, &body, spec, false);
    Ok(())
}

/// Booleans: `t` or `v`.
pub fn write_bool(out: &mut String, b: bool, spec: &Spec) -> Result<(), BadVerb> {
    match spec.conv {
        None | Some('t' | 'v') => {
            pad(out, if b { "true" } else { "false" }, spec, false);
            Ok(())
        }
        Some(_) => Err(BadVerb),
    }
}

/// Signed and unsigned integers share this path; `i128` holds both.
pub fn write_integer(out: &mut String, n: i128, spec: &Spec) -> Result<(), BadVerb> {
    let mag = n.unsigned_abs();
    let (digits, prefix) = match spec.conv {
        None | Some('d' | 'v') => (mag.to_string(), ""),
        Some('x') => (format!("{mag:x}"), "0x"),
        Some('X') => (format!("{mag:X}"), "0X"),
        Some('o') => (format!("{mag:o}"), "0"),
        Some('b') => (format!("{mag:b}"), "0b"),
        Some('c') => {
            pad(out, &to_char(n).to_string(), spec, false);
            return Ok(());
        }
        Some('q') => {
            pad(out, &format!("{:?}", to_char(n)), spec, false);
            return Ok(());
        }
        Some('e' | 'E' | 'f' | 'F' | 'g' | 'G') => return write_float(out, n as f64, spec),
        Some(_) => return Err(BadVerb),
    };
    let mut body = String::with_capacity(digits.len() + 4);
    body.push_str(spec.sign(n < 0));
    if spec.sharp {
        body.push_str(prefix);
    }
    if let Some(p) = spec.precision {
        body.extend(std::iter::repeat('0').take(p.saturating_sub(digits.len())));
    }
    body.push_str(&digits);
    // An explicit precision disables zero padding, as in C.
    pad(out, &body, spec, spec.precision.is_none());
    Ok(())
}

fn to_char(n: i128) -> char {
    u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Floats: `f`/`F` fixed, `e`/`E` scientific, `g`/`G`/`v` shortest.
pub fn write_float(out: &mut String, x: f64, spec: &Spec) -> Result<(), BadVerb> {
    let mut body = match spec.conv {
        None | Some('v' | 'g' | 'G') => match spec.precision {
            Some(p) => significant(x, p),
            None => compact(x),
        },
        Some('f' | 'F') => format!("{:.*}", spec.precision.unwrap_or(6), x),
        Some('e') => exponent(x, spec.precision.unwrap_or(6)),
        Some('E') => exponent(x, spec.precision.unwrap_or(6)).to_uppercase(),
        Some(_) => return Err(BadVerb),
    };
    if !body.starts_with('-') && !x.is_nan() {
        body.insert_str(0, spec.sign(false));
    }
    pad(out, &body, spec, x.is_finite());
    Ok(())
}

/// Decimal exponents at or above this print in scientific form.
const COMPACT_EXP_MAX: i32 = 21;

/// Shortest round-trip form; scientific (`1e+300`, `1e-05`) when the decimal
/// exponent is below -4 or at least 21.
pub fn compact(x: f64) -> String {
    if !x.is_finite() || x == 0.0 {
        return x.to_string();
    }
    let sci = format!("{x:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            if (-4..COMPACT_EXP_MAX).contains(&exp) {
                x.to_string()
            } else {
                signed_exponent(mantissa, exp)
            }
        }
        None => sci,
    }
}

/// Scientific notation with a signed, two-digit exponent: `1.5e+03`.
fn exponent(x: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, x);
    match s.split_once('e') {
        Some((mantissa, exp)) => signed_exponent(mantissa, exp.parse().unwrap_or(0)),
        None => s,
    }
}

fn signed_exponent(mantissa: &str, exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}

/// Round to `digits` significant digits and print in compact form.
fn significant(x: f64, digits: usize) -> String {
    let s = format!("{:.*e}", digits.max(1) - 1, x);
    s.parse::<f64>().map_or(s, compact)
}

/// Opaque values: `s`/`v`/`q` use `Display`, `?` uses `Debug` (`#?` pretty).
pub fn write_any<T>(out: &mut String, v: &T, spec: &Spec) -> Result<(), BadVerb>
where
    T: fmt::Debug + fmt::Display + ?Sized,
{
    let mut body = String::new();
    match spec.conv {
        None | Some('s' | 'v') => {
            let _ = write!(body, "{v}");
            if let Some(p) = spec.precision {
                body = body.chars().take(p).collect();
            }
        }
        Some('q') => {
            let _ = write!(body, "{:?}", v.to_string());
        }
        Some('?') if spec.sharp => {
            let _ = write!(body, "{v:#?}");
        }
        Some('?') => {
            let _ = write!(body, "{v:?}");
        }
        Some(_) => return Err(BadVerb),
    }
    pad(out, &body, spec, false);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(v: &str) -> Spec {
        Spec::parse(v).expect("verb should parse")
    }

    fn int(n: i128, v: &str) -> String {
        let mut out = String::new();
        write_integer(&mut out, n, &spec(v)).expect("supported conversion");
        out
    }

    fn float(x: f64, v: &str) -> String {
        let mut out = String::new();
        write_float(&mut out, x, &spec(v)).expect("supported conversion");
        out
    }

    fn string(s: &str, v: &str) -> String {
        let mut out = String::new();
        write_str(&mut out, s, &spec(v)).expect("supported conversion");
        out
    }

    #[test]
    fn parse_full_spec() {
        let s = spec("%-08.3f");
        assert!(s.minus && s.zero);
        assert_eq!(s.width, Some(8));
        assert_eq!(s.precision, Some(3));
        assert_eq!(s.conv, Some('f'));
    }

    #[test]
    fn percent_is_optional() {
        assert_eq!(Spec::parse("5d"), Spec::parse("%5d"));
    }

    #[test]
    fn parse_rejects_words() {
        assert_eq!(Spec::parse("kitchen"), None);
        assert_eq!(Spec::parse("%5dd"), None);
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(spec("99999999999999999999999d").width, Some(MAX_WIDTH));
    }

    #[test]
    fn integer_radixes() {
        assert_eq!(int(255, "x"), "ff");
        assert_eq!(int(255, "#X"), "0XFF");
        assert_eq!(int(5, "b"), "101");
        assert_eq!(int(8, "#o"), "010");
        assert_eq!(int(-255, "x"), "-ff");
    }

    #[test]
    fn integer_padding_and_sign() {
        assert_eq!(int(42, "5d"), "   42");
        assert_eq!(int(42, "-5d"), "42   ");
        assert_eq!(int(-42, "05d"), "-0042");
        assert_eq!(int(42, "+d"), "+42");
        assert_eq!(int(7, ".3d"), "007");
        assert_eq!(int(255, "#06x"), "0x00ff");
    }

    #[test]
    fn integer_as_char() {
        assert_eq!(int(65, "c"), "A");
        assert_eq!(int(65, "q"), "'A'");
        assert_eq!(int(-1, "c"), "\u{FFFD}");
    }

    #[test]
    fn integer_rejects_string_verb() {
        let mut out = String::new();
        assert_eq!(write_integer(&mut out, 1, &spec("s")), Err(BadVerb));
    }

    #[test]
    fn float_forms() {
        assert_eq!(float(3.14159, ".2f"), "3.14");
        assert_eq!(float(1.0, "f"), "1.000000");
        assert_eq!(float(1500.0, ".1e"), "1.5e+03");
        assert_eq!(float(0.00012, ".2E"), "1.20E-04");
        assert_eq!(float(123.456, ".4g"), "123.5");
        assert_eq!(float(2.5, "+v"), "+2.5");
        assert_eq!(float(-1.5, "08.2f"), "-0001.50");
    }

    #[test]
    fn compact_switches_to_exponent_at_extremes() {
        assert_eq!(compact(1e300), "1e+300");
        assert_eq!(compact(-2.5e-7), "-2.5e-07");
        assert_eq!(compact(1e21), "1e+21");
        assert_eq!(compact(1e20), "100000000000000000000");
        assert_eq!(compact(0.0001), "0.0001");
        assert_eq!(compact(0.0), "0");
        assert_eq!(compact(f64::INFINITY), "inf");
        assert_eq!(float(1e300, "v"), "1e+300");
    }

    #[test]
    fn string_forms() {
        assert_eq!(string("abc", "5s"), "  abc");
        assert_eq!(string("abc", "-5s"), "abc  ");
        assert_eq!(string("abcdef", ".3s"), "abc");
        assert_eq!(string("a\"b", "q"), "\"a\\\"b\"");
        assert_eq!(string("hi", "x"), "6869");
    }

    #[test]
    fn string_zero_flag_pads_with_spaces() {
        assert_eq!(string("ab", "04s"), "  ab");
    }

    #[test]
    fn bool_forms() {
        let mut out = String::new();
        write_bool(&mut out, true, &spec("6t")).unwrap();
        assert_eq!(out, "  true");
        assert_eq!(write_bool(&mut out, true, &spec("d")), Err(BadVerb));
    }

    #[test]
    fn any_debug_and_display() {
        let mut out = String::new();
        write_any(&mut out, "x y", &spec("?")).unwrap();
        assert_eq!(out, "\"x y\"");
        out.clear();
        write_any(&mut out, &5, &spec("3v")).unwrap();
        assert_eq!(out, "  5");
    }
}
