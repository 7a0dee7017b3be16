//! Joining attribute sources into the export list and matching them against
//! the dictionary.
//!
//! Sources are applied in order: the logger's persisted attributes, then the
//! call's arguments.  Every attribute that survives the replace hook is
//! exported, then matched: if its dotted path (with or without the scope
//! prefix) was registered by the scan, the dictionary entry is overwritten.
//! Group values are matched recursively, one path segment per level.

use crate::scan::Dictionary;
use crate::sentinel;
use crate::value::{Attr, Value};

/// Hook applied to each leaf attribute before it is exported or matched.
///
/// Returning an attribute with an empty key drops it.
pub type Replace<'a> = &'a dyn Fn(Attr) -> Attr;

/// One call-time argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A bare value: positional, or a key (if a string) awaiting its value.
    Value(Value),
    Attr(Attr),
    /// A list of attributes, spread in place.
    Attrs(Vec<Attr>),
}

macro_rules! arg_from_value {
    ($($t:ty),*) => {$(
        impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::Value(Value::from(v))
            }
        }
    )*};
}

arg_from_value!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, &str, String,
    std::time::Duration,
    std::time::SystemTime,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::DateTime<chrono::Utc>
);

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Attr> for Arg {
    fn from(a: Attr) -> Self {
        Arg::Attr(a)
    }
}

impl From<Vec<Attr>> for Arg {
    fn from(attrs: Vec<Attr>) -> Self {
        Arg::Attrs(attrs)
    }
}

// ── Scope stack ───────────────────────────────────────────────────────────────

/// Dotted-path builder over a borrowed scratch buffer.
///
/// [`push`](Self::push) returns a mark; [`pop`](Self::pop) truncates back to
/// it.  Pushes and pops must nest.
#[derive(Debug)]
pub struct ScopeStack<'a> {
    buf: &'a mut String,
}

impl<'a> ScopeStack<'a> {
    /// Start a stack holding `scope`, normalised to end in `.` when non-empty.
    pub fn new(buf: &'a mut String, scope: &str) -> Self {
        buf.clear();
        buf.push_str(scope);
        if !scope.is_empty() && !scope.ends_with('.') {
            buf.push('.');
        }
        Self { buf }
    }

    pub fn push(&mut self, segment: &str) -> usize {
        let mark = self.buf.len();
        self.buf.push_str(segment);
        mark
    }

    pub fn pop(&mut self, mark: usize) {
        debug_assert!(mark <= self.buf.len(), "scope pop past its push");
        self.buf.truncate(mark);
    }

    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Drop for ScopeStack<'_> {
    fn drop(&mut self) {
        self.buf.clear();
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Borrowed working state for one resolve call.
pub struct Resolver<'s> {
    dict: &'s mut Dictionary,
    export: &'s mut Vec<Attr>,
    positional: &'s mut Vec<Value>,
    stack: ScopeStack<'s>,
    /// Length of the scope prefix at the bottom of `stack`.
    base: usize,
    replace: Option<Replace<'s>>,
}

impl<'s> Resolver<'s> {
    pub fn new(
        dict: &'s mut Dictionary,
        export: &'s mut Vec<Attr>,
        positional: &'s mut Vec<Value>,
        stack: ScopeStack<'s>,
        replace: Option<Replace<'s>>,
    ) -> Self {
        let base = stack.len();
        Self { dict, export, positional, stack, base, replace }
    }

    /// Apply persisted attributes, then call arguments.
    ///
    /// The first `unkeyed` arguments are positional.
    pub fn run(&mut self, persisted: &[Attr], args: &[Arg], unkeyed: usize) {
        for attr in persisted {
            self.add(attr.clone());
        }

        let mut rest = args.iter();
        for arg in rest.by_ref().take(unkeyed) {
            let value = match arg {
                Arg::Value(v) => v.clone().resolve_deep(),
                Arg::Attr(a) => match self.add(a.clone()) {
                    Some(exported) => exported.value.clone(),
                    None => Value::Str(sentinel::MISSING_ARG.to_owned()),
                },
                Arg::Attrs(list) => {
                    let start = self.export.len();
                    for a in list {
                        self.add(a.clone());
                    }
                    Value::Group(self.export[start..].to_vec())
                }
            };
            self.positional.push(value);
        }

        while let Some(arg) = rest.next() {
            match arg {
                Arg::Attr(a) => {
                    self.add(a.clone());
                }
                Arg::Attrs(list) => {
                    for a in list {
                        self.add(a.clone());
                    }
                }
                Arg::Value(Value::Str(key)) => {
                    let value = match rest.next() {
                        Some(Arg::Value(v)) => v.clone(),
                        Some(Arg::Attr(a)) => Value::Group(vec![a.clone()]),
                        Some(Arg::Attrs(list)) => Value::Group(list.clone()),
                        None => Value::Str(sentinel::MISSING_KEY.to_owned()),
                    };
                    self.add(Attr { key: key.clone(), value });
                }
                Arg::Value(other) => {
                    self.add(Attr { key: sentinel::BAD_KEY.to_owned(), value: other.clone() });
                }
            }
        }

        debug_assert_eq!(self.stack.len(), self.base, "scope stack unbalanced");
    }

    /// Resolve, hook and export `attr`, then match it against the
    /// dictionary.  Returns the exported attribute, or `None` if it was
    /// dropped.
    fn add(&mut self, attr: Attr) -> Option<&Attr> {
        let attr = prepare(Attr { key: attr.key, value: attr.value.resolve_deep() }, self.replace);
        if attr.is_empty() {
            return None;
        }
        self.export.push(attr);
        let last = self.export.last()?;
        match_attr(self.dict, &mut self.stack, self.base, last);
        Some(last)
    }
}

/// Run `hook` over every non-group attribute, descending into groups, and
/// drop group children left with an empty key.
fn prepare(attr: Attr, hook: Option<Replace<'_>>) -> Attr {
    match attr.value {
        Value::Group(children) => Attr {
            key: attr.key,
            value: Value::Group(
                children
                    .into_iter()
                    .map(|c| prepare(c, hook))
                    .filter(|c| !c.is_empty())
                    .collect(),
            ),
        },
        value => {
            let leaf = Attr { key: attr.key, value };
            match hook {
                Some(hook) => hook(leaf),
                None => leaf,
            }
        }
    }
}

/// Write `attr` (and, for groups, its descendants) into every matching
/// dictionary entry.
///
/// `stack` holds `scope + parent path + "."`; `base` is the scope length, so
/// `stack[base..]` is the unscoped path.
fn match_attr(dict: &mut Dictionary, stack: &mut ScopeStack<'_>, base: usize, attr: &Attr) {
    if attr.is_empty() {
        return;
    }
    let mark = stack.push(&attr.key);
    assign(dict, stack.as_str(), base, &attr.value);
    if let Value::Group(children) = &attr.value {
        let dot = stack.push(".");
        for child in children {
            match_attr(dict, stack, base, child);
        }
        stack.pop(dot);
    }
    stack.pop(mark);
}

fn assign(dict: &mut Dictionary, path: &str, base: usize, value: &Value) {
    if let Some(slot) = dict.get_mut(&path[base..]) {
        *slot = Some(value.clone());
    }
    if base > 0 {
        if let Some(slot) = dict.get_mut(path) {
            *slot = Some(value.clone());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
