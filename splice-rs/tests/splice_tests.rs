/// End-to-end tests: templates and arguments go through a pooled splicer and
/// the rendered text and export list are checked.
///
/// Each case is written with `check(template, persisted, args, expected)`;
/// cases that care about the export list or the scope call the splicer
/// directly.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use splice::{Arg, Attr, PoolConfig, SplicerPool, Value};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pool() -> SplicerPool {
    SplicerPool::new(PoolConfig::default())
}

/// Render `template` with no scope and no replace hook.
fn render(template: &str, persisted: &[Attr], args: &[Arg]) -> String {
    let pool = pool();
    let mut s = pool.acquire();
    s.splice(template, "", persisted, args, None).to_owned()
}

fn check(template: &str, persisted: &[Attr], args: &[Arg], expected: &str) {
    let got = render(template, persisted, args);
    assert_eq!(got, expected, "\nTemplate: {template:?}\nGot:  {got:?}\nWant: {expected:?}");
}

fn keys(attrs: &[Attr]) -> Vec<&str> {
    attrs.iter().map(|a| a.key.as_str()).collect()
}

fn epoch() -> DateTime<FixedOffset> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default().fixed_offset()
}

// ── Templates ─────────────────────────────────────────────────────────────────

#[test]
fn plain_text_unchanged() {
    check("server started", &[], &[], "server started");
}

#[test]
fn escaped_braces() {
    check(r"\{x\}", &[], &[], "{x}");
}

#[test]
fn escaped_colon() {
    check(r"a\:b", &[], &[], "a:b");
}

#[test]
fn unterminated_site() {
    check("a {b", &[], &[], "a {b!missing-right-bracket");
}

#[test]
fn unterminated_site_after_resolved_ones() {
    check("{} and {rest", &[], &["one".into()], "one and {rest!missing-right-bracket");
}

// ── Positional arguments ──────────────────────────────────────────────────────

#[test]
fn three_positional() {
    check("{} {} {}", &[], &[0.into(), 1.into(), 2.into()], "0 1 2");
}

#[test]
fn positional_exhausted() {
    check("{} {} {}", &[], &[0.into(), 1.into()], "0 1 !missing-arg");
}

#[test]
fn positional_then_key_value_pairs() {
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{} by {user}", "", &[], &["login".into(), "user".into(), "ada".into()], None);
    assert_eq!(text, "login by ada");
    assert_eq!(keys(s.export()), vec!["user"]);
}

#[test]
fn positional_with_verb() {
    check("{:5.1f}|{:-4s}|", &[], &[3.14159.into(), "ab".into()], "  3.1|ab  |");
}

// ── Keyed sites ───────────────────────────────────────────────────────────────

#[test]
fn missing_attr() {
    check("{nope}", &[], &[], "!missing-attr");
}

#[test]
fn nested_groups_resolve() {
    let outer = Attr::group("outer", vec![Attr::group("inner", vec![Attr::int("x", 42)])]);
    check("{outer.inner.x}", &[outer], &[], "42");
}

#[test]
fn group_renders_bracketed() {
    let g = Attr::group("g", vec![Attr::int("a", 1), Attr::string("b", "two")]);
    check("{g}", &[g], &[], "[a=1 b=two]");
}

#[test]
fn empty_group_renders_empty_brackets() {
    check("{g}", &[Attr::group("g", vec![])], &[], "[]");
}

#[test]
fn same_key_twice_last_wins_both_exported() {
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{k}", "", &[Attr::int("k", 1)], &["k".into(), 2.into()], None);
    assert_eq!(text, "2");
    assert_eq!(s.export(), &[Attr::int("k", 1), Attr::int("k", 2)]);
}

#[test]
fn trailing_key_without_value() {
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{dangling}", "", &[], &["dangling".into()], None);
    assert_eq!(text, "!missing-key");
    assert_eq!(s.export(), &[Attr::string("dangling", "!missing-key")]);
}

#[test]
fn non_string_in_key_position() {
    let pool = pool();
    let mut s = pool.acquire();
    s.splice("done", "", &[], &[7.into()], None);
    assert_eq!(s.export(), &[Attr::int("!bad-key", 7)]);
}

#[test]
fn key_followed_by_attr_list_forms_group() {
    let list = vec![Attr::int("id", 9), Attr::bool("ok", true)];
    check("{req.id} {req.ok}", &[], &["req".into(), list.into()], "9 true");
}

#[test]
fn escaped_colon_in_key() {
    check(r"{a\:b}", &[Attr::int("a:b", 5)], &[], "5");
}

#[test]
fn key_with_verb() {
    check("{n:08.3f}", &[Attr::float("n", -1.5)], &[], "-001.500");
}

#[test]
fn bad_verb() {
    check("{flag:d}", &[Attr::bool("flag", true)], &[], "!bad-verb(d)");
}

// ── Scope ─────────────────────────────────────────────────────────────────────

#[test]
fn scoped_and_unscoped_keys_both_resolve() {
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{db.host} {host}", "db", &[Attr::string("host", "h1")], &[], None);
    assert_eq!(text, "h1 h1");
}

#[test]
fn scope_with_trailing_dot() {
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{a.b.c}", "a.b.", &[Attr::int("c", 1)], &[], None);
    assert_eq!(text, "1");
}

// ── Value kinds ───────────────────────────────────────────────────────────────

#[test]
fn durations() {
    check("{}", &[], &[Duration::from_secs(1).into()], "1s");
    check("{}", &[], &[Duration::ZERO.into()], "0s");
    check("{}", &[], &[Duration::from_secs(3661).into()], "1h1m1s");
    check("{}", &[], &[Duration::from_millis(1500).into()], "1.5s");
}

#[test]
fn duration_tick_count() {
    check("{:d}", &[], &[Duration::from_micros(2).into()], "2000");
}

#[test]
fn epoch_verbs() {
    check("{t:epoch}", &[Attr::time("t", epoch())], &[], "0");
    check("{t:epochmilli}", &[Attr::time("t", epoch())], &[], "0");
}

#[test]
fn default_time_layout() {
    check("{t}", &[Attr::time("t", epoch())], &[], "1970-01-01T00:00:00.000Z");
}

#[test]
fn custom_time_layout_uses_semicolons() {
    check("{t:%H;%M}", &[Attr::time("t", epoch())], &[], "00:00");
}

#[test]
fn lazy_values_resolve_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = Attr::lazy("v", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::from("computed")
    });
    check("{v} {v}", &[lazy], &[], "computed computed");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_group_flattens() {
    let lazy = Attr::lazy("user", || Value::from(vec![Attr::string("name", "ada")]));
    check("{user.name}", &[lazy], &[], "ada");
}

#[test]
fn any_value_uses_display_and_debug() {
    let v = Attr::any("addr", std::net::Ipv4Addr::LOCALHOST);
    check("{addr} {addr:?}", &[v], &[], "127.0.0.1 127.0.0.1");
}

// ── Replace hook ──────────────────────────────────────────────────────────────

#[test]
fn replace_hook_redacts_before_text_and_export() {
    let redact = |a: Attr| {
        if a.key == "password" {
            Attr::string(a.key, "***")
        } else {
            a
        }
    };
    let pool = pool();
    let mut s = pool.acquire();
    let login = Attr::group("login", vec![Attr::string("user", "ada"), Attr::string("password", "hunter2")]);
    let text = s.splice("{login.user} {login.password}", "", &[login], &[], Some(&redact));
    assert_eq!(text, "ada ***");
    let rendered = format!("{:?}", s.export());
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn replace_hook_can_drop_attributes() {
    let drop_secret = |a: Attr| if a.key == "secret" { Attr::default() } else { a };
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("{secret}", "", &[Attr::int("secret", 1), Attr::int("kept", 2)], &[], Some(&drop_secret));
    assert_eq!(text, "!missing-attr");
    assert_eq!(keys(s.export()), vec!["kept"]);
}

#[test]
fn replace_hook_redacts_positional_attr() {
    let redact = |a: Attr| if a.key == "password" { Attr::string(a.key, "***") } else { a };
    let pool = pool();
    let mut s = pool.acquire();
    let text = s.splice("pw={}", "", &[], &[Attr::string("password", "hunter2").into()], Some(&redact));
    assert_eq!(text, "pw=***");
    assert_eq!(s.export(), &[Attr::string("password", "***")]);
}

#[test]
fn replace_hook_redacts_positional_attr_list() {
    let redact = |a: Attr| if a.key == "token" { Attr::string(a.key, "***") } else { a };
    let pool = pool();
    let mut s = pool.acquire();
    let list = vec![Attr::string("user", "ada"), Attr::string("token", "s3cret")];
    let text = s.splice("creds={}", "", &[], &[list.into()], Some(&redact));
    assert_eq!(text, "creds=[user=ada token=***]");
}

#[test]
fn positional_lazy_attr_resolves_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = Attr::lazy("v", move || Value::from(counter.fetch_add(1, Ordering::SeqCst) + 1));
    check("{}", &[], &[lazy.into()], "1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Pool lifecycle ────────────────────────────────────────────────────────────

#[test]
fn reacquired_splicer_is_empty() {
    let pool = SplicerPool::new(PoolConfig::new().with_max_idle(1));
    let mut s = pool.acquire();
    s.splice("{} {k}", "", &[Attr::int("k", 1)], &["x".into()], None);
    s.free();
    assert_eq!(pool.available(), 1);

    let s = pool.acquire();
    assert!(s.export().is_empty());
    assert_eq!(s.text(), "");
    assert_eq!(s.lookup("k"), None);
    assert_eq!(s.unkeyed(), 0);
}

#[test]
fn per_field_writers_follow_interpolation() {
    let pool = pool();
    let mut s = pool.acquire();
    s.splice("msg={}", "", &[], &["hi".into()], None);
    s.write_str(" ");
    s.write_attr(&Attr::uint("n", 255));
    s.write_str(" ");
    s.write_value(&Value::Uint(255), Some("#x"));
    assert_eq!(s.text(), "msg=hi n=255 0xff");
}
