//! Rendering a single [`Value`] as text.
//!
//! | Kind       | No verb                         | With verb                          |
//! |------------|---------------------------------|------------------------------------|
//! | string     | raw                             | [`verb::write_str`]                |
//! | bool       | `true` / `false`                | [`verb::write_bool`]               |
//! | int / uint | decimal                         | [`verb::write_integer`]            |
//! | float      | compact, `1e+300` at extremes   | [`verb::write_float`]              |
//! | duration   | unit-scaled, e.g. `1h2m3.5s`    | `d` = nanoseconds, else as string  |
//! | time       | RFC 3339, millisecond precision | named form or strftime layout      |
//! | group      | `[k1=v1 k2=v2]`                 | verb ignored                       |
//! | lazy       | resolved, then as above         | resolved, then as above            |
//! | any        | `Display`                       | [`verb::write_any`]                |
//!
//! A verb that the kind cannot honour renders as `!bad-verb(<verb>)`.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::sentinel;
use crate::value::{Attr, Value};
use crate::verb::{self, BadVerb, Spec};

/// Layout used when a timestamp has no verb.
const DEFAULT_TIME: SecondsFormat = SecondsFormat::Millis;

/// Append `value` to `out`, honouring an optional format verb.
///
/// An empty verb is the same as no verb.
pub fn write_value(out: &mut String, value: &Value, verb: Option<&str>) {
    let verb = verb.filter(|v| !v.is_empty());
    match value {
        Value::Str(s) => match verb {
            None => out.push_str(s),
            Some(v) => with_spec(out, v, |out, spec| verb::write_str(out, s, spec)),
        },
        Value::Bool(b) => match verb {
            None => out.push_str(if *b { "true" } else { "false" }),
            Some(v) => with_spec(out, v, |out, spec| verb::write_bool(out, *b, spec)),
        },
        Value::Int(n) => match verb {
            None => {
                let _ = write!(out, "{n}");
            }
            Some(v) => with_spec(out, v, |out, spec| verb::write_integer(out, i128::from(*n), spec)),
        },
        Value::Uint(n) => match verb {
            None => {
                let _ = write!(out, "{n}");
            }
            Some(v) => with_spec(out, v, |out, spec| verb::write_integer(out, i128::from(*n), spec)),
        },
        Value::Float(x) => match verb {
            None => out.push_str(&verb::compact(*x)),
            Some(v) => with_spec(out, v, |out, spec| verb::write_float(out, *x, spec)),
        },
        Value::Duration(d) => write_duration_verb(out, *d, verb),
        Value::Time(t) => write_time(out, t, verb),
        Value::Group(attrs) => write_group(out, attrs),
        Value::Lazy(_) => {
            let resolved = value.clone().resolve();
            write_value(out, &resolved, verb);
        }
        Value::Any(a) => match verb {
            None => {
                let _ = write!(out, "{a}");
            }
            Some(v) => with_spec(out, v, |out, spec| verb::write_any(out, &**a, spec)),
        },
    }
}

/// Parse `verb` and hand it to `f`; on failure, discard any partial output
/// and write the bad-verb marker.
fn with_spec<F>(out: &mut String, verb: &str, f: F)
where
    F: FnOnce(&mut String, &Spec) -> Result<(), BadVerb>,
{
    let mark = out.len();
    let ok = match Spec::parse(verb) {
        Some(spec) => f(out, &spec).is_ok(),
        None => false,
    };
    if !ok {
        out.truncate(mark);
        write_bad_verb(out, verb);
    }
}

fn write_bad_verb(out: &mut String, verb: &str) {
    out.push_str(sentinel::BAD_VERB);
    out.push('(');
    out.push_str(verb);
    out.push(')');
}

fn write_group(out: &mut String, attrs: &[Attr]) {
    out.push('[');
    for (i, attr) in attrs.iter().filter(|a| !a.is_empty()).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&attr.key);
        out.push('=');
        write_value(out, &attr.value, None);
    }
    out.push(']');
}

// ── Durations ─────────────────────────────────────────────────────────────────

fn write_duration_verb(out: &mut String, d: Duration, verb: Option<&str>) {
    let Some(v) = verb else {
        write_duration(out, d);
        return;
    };
    with_spec(out, v, |out, spec| {
        if spec.conv == Some('d') {
            // Raw tick count; nanoseconds saturate far beyond any real duration.
            let ticks = i128::try_from(d.as_nanos()).unwrap_or(i128::MAX);
            verb::write_integer(out, ticks, spec)
        } else {
            let mut scaled = String::new();
            write_duration(&mut scaled, d);
            verb::write_str(out, &scaled, spec)
        }
    });
}

/// Unit-scaled duration: `0s`, `750ns`, `1.5µs`, `20ms`, `1m0s`, `1h1m1s`.
pub fn write_duration(out: &mut String, d: Duration) {
    let nanos = d.as_nanos();
    if nanos == 0 {
        out.push_str("0s");
        return;
    }
    if nanos < 1_000_000_000 {
        let (scale, unit) = match nanos {
            n if n < 1_000 => (1, "ns"),
            n if n < 1_000_000 => (1_000, "µs"),
            _ => (1_000_000, "ms"),
        };
        write_scaled(out, nanos, scale);
        out.push_str(unit);
        return;
    }
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    if h > 0 {
        let _ = write!(out, "{h}h");
    }
    if h > 0 || m > 0 {
        let _ = write!(out, "{m}m");
    }
    write_scaled(out, u128::from(s) * 1_000_000_000 + u128::from(d.subsec_nanos()), 1_000_000_000);
    out.push('s');
}

/// Write `value / scale` with the remainder as a trimmed decimal fraction.
fn write_scaled(out: &mut String, value: u128, scale: u128) {
    let _ = write!(out, "{}", value / scale);
    let rem = value % scale;
    if rem > 0 {
        let digits = scale.ilog10() as usize;
        let frac = format!("{rem:0digits$}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
}

// ── Timestamps ────────────────────────────────────────────────────────────────

fn write_time(out: &mut String, t: &DateTime<FixedOffset>, verb: Option<&str>) {
    let layout = match verb {
        None => {
            out.push_str(&t.to_rfc3339_opts(DEFAULT_TIME, true));
            return;
        }
        Some("RFC3339") => {
            out.push_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true));
            return;
        }
        Some("RFC3339Nano") => {
            out.push_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            return;
        }
        Some("epoch") => {
            let _ = write!(out, "{}", t.timestamp());
            return;
        }
        Some("epochmilli") => {
            let _ = write!(out, "{}", t.timestamp_millis());
            return;
        }
        Some("RFC822") => "%d %b %y %H:%M %z".to_owned(),
        Some("kitchen") => "%-I:%M%p".to_owned(),
        Some("clock") => "%H:%M:%S".to_owned(),
        Some("date") => "%Y-%m-%d".to_owned(),
        Some("stamp") => "%b %e %H:%M:%S".to_owned(),
        Some("stampmilli") => "%b %e %H:%M:%S%.3f".to_owned(),
        // `:` cannot appear in a verb, so layouts spell it `;`.
        Some(custom) => custom.replace(';', ":"),
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(&layout).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        write_bad_verb(out, verb.unwrap_or_default());
        return;
    }
    let _ = write!(out, "{}", t.format_with_items(items.iter()));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
