//! Per-call working state.
//!
//! A [`Splicer`] threads one logging call through the three passes:
//!
//! 1. [`scan`](Splicer::scan) registers the template's keys and counts its
//!    unkeyed sites;
//! 2. [`resolve`](Splicer::resolve) exports attributes and fills in the
//!    registered keys;
//! 3. [`interpolate`](Splicer::interpolate) writes the final text.
//!
//! Splicers are meant to be recycled through a
//! [`SplicerPool`](crate::pool::SplicerPool); every buffer keeps its capacity
//! across [`clear`](Splicer::clear).

use crate::format;
use crate::interpolate::{self, Positional};
use crate::resolve::{Arg, Replace, Resolver, ScopeStack};
use crate::scan::{self, Dictionary};
use crate::value::{Attr, Value};

#[derive(Debug, Default)]
pub struct Splicer {
    text: String,
    /// Key unescaping and scope building.
    scratch: String,
    dict: Dictionary,
    export: Vec<Attr>,
    positional: Vec<Value>,
    unkeyed: usize,
    consumed: usize,
}

impl Splicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the keyed sites of `template` and return its unkeyed count.
    pub fn scan(&mut self, template: &str) -> usize {
        let n = scan::scan(template, &mut self.dict, &mut self.scratch);
        self.unkeyed += n;
        n
    }

    /// Build the export list and fill the dictionary.
    ///
    /// `persisted` attributes live under `scope` (e.g. `"req."`); the first
    /// [`unkeyed`](Self::unkeyed) entries of `args` become positional values.
    pub fn resolve(&mut self, scope: &str, persisted: &[Attr], args: &[Arg], replace: Option<Replace<'_>>) {
        let stack = ScopeStack::new(&mut self.scratch, scope);
        let mut resolver = Resolver::new(&mut self.dict, &mut self.export, &mut self.positional, stack, replace);
        resolver.run(persisted, args, self.unkeyed);
    }

    /// Append the rendered `template` to the text buffer.
    pub fn interpolate(&mut self, template: &str) {
        let positional = Positional { values: &self.positional, consumed: &mut self.consumed };
        interpolate::interpolate(template, &mut self.text, &mut self.scratch, &self.dict, positional);
    }

    /// Scan, resolve and interpolate in one go.
    pub fn splice(
        &mut self,
        template: &str,
        scope: &str,
        persisted: &[Attr],
        args: &[Arg],
        replace: Option<Replace<'_>>,
    ) -> &str {
        self.scan(template);
        self.resolve(scope, persisted, args, replace);
        self.interpolate(template);
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn export(&self) -> &[Attr] {
        &self.export
    }

    /// Number of unkeyed sites found by [`scan`](Self::scan) so far.
    pub fn unkeyed(&self) -> usize {
        self.unkeyed
    }

    /// Number of positional values already drawn by unkeyed sites.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Resolved value of a registered key.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.dict.get(key).and_then(Option::as_ref)
    }

    // ── Per-field write primitives ───────────────────────────────────────────

    pub fn write_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn write_value(&mut self, value: &Value, verb: Option<&str>) {
        format::write_value(&mut self.text, value, verb);
    }

    /// Append `key=value`.
    pub fn write_attr(&mut self, attr: &Attr) {
        self.text.push_str(&attr.key);
        self.text.push('=');
        format::write_value(&mut self.text, &attr.value, None);
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Forget everything from the previous call, keeping allocations.
    pub fn clear(&mut self) {
        self.text.clear();
        self.scratch.clear();
        self.dict.clear();
        self.export.clear();
        self.positional.clear();
        self.unkeyed = 0;
        self.consumed = 0;
    }

    /// Dictionary plus export entries currently held.
    pub fn entries(&self) -> usize {
        self.dict.len() + self.export.len()
    }

    pub fn text_capacity(&self) -> usize {
        self.text.capacity()
    }

    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    pub fn is_clear(&self) -> bool {
        self.text.is_empty()
            && self.scratch.is_empty()
            && self.dict.is_empty()
            && self.export.is_empty()
            && self.positional.is_empty()
            && self.unkeyed == 0
            && self.consumed == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline() {
        let mut s = Splicer::new();
        let text = s.splice(
            "{} took {elapsed} for {user.name}",
            "",
            &[Attr::group("user", vec![Attr::string("name", "ada")])],
            &["login".into(), "elapsed".into(), std::time::Duration::from_millis(20).into()],
            None,
        );
        assert_eq!(text, "login took 20ms for ada");
        assert_eq!(s.export().len(), 2);
        assert_eq!(s.consumed(), 1);
    }

    #[test]
    fn scope_prefix_applies_to_call_args() {
        let mut s = Splicer::new();
        let text = s.splice("{req.id} {id}", "req", &[], &[Attr::int("id", 3).into()], None);
        assert_eq!(text, "3 3");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut s = Splicer::new();
        s.splice("{a} {b}", "", &[], &["a".into(), 1.into(), "b".into(), 2.into()], None);
        let cap = s.text_capacity();
        s.clear();
        assert!(s.is_clear());
        assert_eq!(s.text_capacity(), cap);
    }

    #[test]
    fn write_primitives_append() {
        let mut s = Splicer::new();
        s.write_str("level=INFO ");
        s.write_attr(&Attr::float("ratio", 0.25));
        s.write_str(" ");
        s.write_value(&Value::Int(10), Some("x"));
        assert_eq!(s.text(), "level=INFO ratio=0.25 a");
    }

    #[test]
    fn scratch_is_empty_between_passes() {
        let mut s = Splicer::new();
        s.scan("{x.y}");
        assert!(s.scratch.is_empty());
        s.resolve("outer.", &[Attr::group("x", vec![Attr::int("y", 1)])], &[], None);
        assert!(s.scratch.is_empty());
        s.interpolate("{x.y}");
        assert!(s.scratch.is_empty());
        assert_eq!(s.text(), "1");
    }

    #[test]
    fn lookup_reports_resolved_only() {
        let mut s = Splicer::new();
        s.scan("{a} {b}");
        s.resolve("", &[Attr::int("a", 1)], &[], None);
        assert_eq!(s.lookup("a"), Some(&Value::Int(1)));
        assert_eq!(s.lookup("b"), None);
    }
}
