/*
 * golden.rs
 * Copyright (c) 2026 The brine developers
 */

//! End-to-end rendering cases. Every case renders twice, once through the
//! blocking entry point and once on a tokio runtime, and the two outputs
//! must match byte for byte.

use brine::{Environment, TemplateError};
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use serde_json::json;

static RT: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
    tokio::runtime::Runtime::new().expect("tokio runtime")
});

fn check(template: &str, globals: serde_json::Value, want: &str) {
    let env = Environment::new();
    let template = env
        .parse(template)
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
    let blocking = template.render(&globals).unwrap_or_else(|e| panic!("render failed: {e}"));
    let suspended = RT
        .block_on(template.render_async(&globals))
        .unwrap_or_else(|e| panic!("async render failed: {e}"));
    assert_eq!(blocking, suspended, "blocking and async output diverged");
    assert_eq!(blocking, want);
}

fn check_render_err(template: &str, globals: serde_json::Value) -> TemplateError {
    let env = Environment::new();
    let template = env.parse(template).expect("template should parse");
    let blocking = template.render(&globals).expect_err("render should fail");
    RT.block_on(template.render_async(&globals))
        .expect_err("async render should fail");
    blocking
}

#[test]
fn test_plain_text_and_output() {
    check("Hello, World!", json!({}), "Hello, World!");
    check("Hello, {{ name }}!", json!({"name": "World"}), "Hello, World!");
    check("{{ a }}{{ b }}", json!({"a": 1, "b": 2}), "12");
    check("{{ missing }}", json!({}), "");
    check("{{ nil }}", json!({}), "");
}

#[test]
fn test_value_rendering() {
    check("{{ n }}", json!({"n": 42}), "42");
    check("{{ n }}", json!({"n": 42.0}), "42.0");
    check("{{ b }}", json!({"b": true}), "true");
    check("{{ items }}", json!({"items": ["a", 1, "b"]}), "a1b");
    check(
        "{{ obj }}",
        json!({"obj": {"b": 1, "a": 2}}),
        r#"{"a":2,"b":1}"#,
    );
}

#[test]
fn test_path_resolution() {
    let globals = json!({
        "settings": {"foo": true, "items": ["x", "y", "z"]},
    });
    check("{{ settings.items[0] }}", globals.clone(), "x");
    check("{{ settings.items[-1] }}", globals.clone(), "z");
    check("{{ settings.items.size }}", globals.clone(), "3");
    check("{{ settings.items.first }}{{ settings.items.last }}", globals.clone(), "xz");
    check("{{ settings.missing.deeper }}", globals, "");
}

#[test]
fn test_if_elsif_else() {
    let t = "{% if a %}A{% elsif b %}B{% else %}C{% endif %}";
    check(t, json!({"a": true}), "A");
    check(t, json!({"a": false, "b": true}), "B");
    check(t, json!({}), "C");
}

#[test]
fn test_if_not() {
    check("{% if not false %}foo{% endif %}", json!({}), "foo");
    check("{% if not true %}foo{% endif %}", json!({}), "");
    check(
        "{% if not user.banned %}welcome{% endif %}",
        json!({"user": {"banned": false}}),
        "welcome",
    );
    check("{% if not a and not b %}x{% endif %}", json!({}), "x");
    // `not` binds looser than comparison.
    check("{% if not foo != true %}hello{% endif %}", json!({"foo": false}), "");
    check("{% if not foo != true %}hello{% endif %}", json!({"foo": true}), "hello");
    check(
        "{% if not (foo contains 'z') %}bar{% endif %}",
        json!({"foo": ["a", "b", "c"]}),
        "bar",
    );
    check("{% if not '' == empty %}x{% endif %}", json!({}), "");
}

#[test]
fn test_truthiness() {
    // Only nil, undefined and false are falsy.
    check("{% if '' %}y{% else %}n{% endif %}", json!({}), "y");
    check("{% if 0 %}y{% else %}n{% endif %}", json!({}), "y");
    check("{% if items %}y{% else %}n{% endif %}", json!({"items": []}), "y");
    check("{% if x %}y{% else %}n{% endif %}", json!({"x": null}), "n");
    check("{% if x %}y{% else %}n{% endif %}", json!({"x": false}), "n");
    check("{% if x %}y{% else %}n{% endif %}", json!({}), "n");
}

#[test]
fn test_unless() {
    let t = "{% unless done %}pending{% else %}done{% endunless %}";
    check(t, json!({}), "pending");
    check(t, json!({"done": true}), "done");
}

#[test]
fn test_comparisons_and_contains() {
    check("{% if 1 == 1.0 %}eq{% endif %}", json!({}), "eq");
    check("{% if 2 > 1 and 'a' < 'b' %}ok{% endif %}", json!({}), "ok");
    check("{% if x == nil %}nil{% endif %}", json!({}), "nil");
    check("{% if 1 != '1' %}diff{% endif %}", json!({}), "diff");
    check("{% if 'hello' contains 'ell' %}in{% endif %}", json!({}), "in");
    check(
        "{% if items contains 2 %}in{% endif %}",
        json!({"items": [1, 2, 3]}),
        "in",
    );
    check(
        "{% if obj contains 'key' %}in{% endif %}",
        json!({"obj": {"key": 1}}),
        "in",
    );
}

#[test]
fn test_empty_and_blank() {
    check("{% if s == empty %}empty{% endif %}", json!({"s": ""}), "empty");
    check("{% if items == empty %}empty{% endif %}", json!({"items": []}), "empty");
    check("{% if s != empty %}full{% endif %}", json!({"s": "x"}), "full");
    check("{% if s == blank %}blank{% endif %}", json!({"s": "   "}), "blank");
    check("{% if s == blank %}blank{% else %}no{% endif %}", json!({"s": " x "}), "no");
}

#[test]
fn test_filters() {
    check("{{ 'hello' | upcase }}", json!({}), "HELLO");
    check("{{ name | upcase | append: '!' }}", json!({"name": "bob"}), "BOB!");
    check("{{ 'a b' | capitalize }}", json!({}), "A b");
    check("{{ items | join: ', ' }}", json!({"items": ["a", "b"]}), "a, b");
    check("{{ missing | default: 'fallback' }}", json!({}), "fallback");
    check("{{ false | default: true }}", json!({}), "true");
    check(
        "{{ false | default: true, allow_false: true }}",
        json!({}),
        "false",
    );
}

#[test]
fn test_inline_conditionals() {
    check("{{ 'hello' if true }}", json!({}), "hello");
    check("{{ 'hello' if false }}", json!({}), "");
    check("{{ 'hello' if false else 'goodbye' }}", json!({}), "goodbye");
    check("{{ 'hello' | upcase if true }}", json!({}), "HELLO");
    check("{{ 'hello' | upcase if false }}", json!({}), "");
    check(
        "{{ greeting if settings.foo else 'bar' }}",
        json!({"greeting": "hello", "settings": {"foo": true}}),
        "hello",
    );
    // Tail filters apply to whichever branch was selected.
    check(
        "{{ greeting if settings.foo else 'bar' || upcase }}",
        json!({"greeting": "hello", "settings": {"foo": true}}),
        "HELLO",
    );
    check(
        "{{ greeting if settings.foo else 'bar' || upcase }}",
        json!({"greeting": "hello", "settings": {"foo": false}}),
        "BAR",
    );
}

#[test]
fn test_assign_and_echo() {
    check("{% assign x = 'hi' %}{{ x }}", json!({}), "hi");
    check("{% assign x = n | append: '!' %}{{ x }}", json!({"n": "yo"}), "yo!");
    check(
        "{% assign greeting = 'hi' if morning else 'bye' %}{{ greeting }}",
        json!({"morning": true}),
        "hi",
    );
    check("{% assign foo = 'hello' if false %}{{ foo }}", json!({}), "");
    check("{% echo 'hello' | upcase %}", json!({}), "HELLO");
    check("{% echo 'a' if false else 'b' %}", json!({}), "b");
}

#[test]
fn test_for_loops() {
    check(
        "{% for x in items %}{{ x }} {% endfor %}",
        json!({"items": [1, 2, 3]}),
        "1 2 3 ",
    );
    check(
        "{% for x in items %}{{ forloop.index }}:{{ x }}{% unless forloop.last %},{% endunless %}{% endfor %}",
        json!({"items": ["a", "b"]}),
        "1:a,2:b",
    );
    check(
        "{% for x in items %}{{ x }}{% else %}none{% endfor %}",
        json!({"items": []}),
        "none",
    );
    check("{% for x in missing %}{{ x }}{% else %}none{% endfor %}", json!({}), "none");
    // Scalars iterate once; objects iterate as [key, value] pairs.
    check("{% for x in n %}({{ x }}){% endfor %}", json!({"n": 7}), "(7)");
    check(
        "{% for pair in obj %}{{ pair[0] }}={{ pair[1] }};{% endfor %}",
        json!({"obj": {"b": 2, "a": 1}}),
        "a=1;b=2;",
    );
}

#[test]
fn test_loop_variable_scoping() {
    // The loop variable and forloop vanish after the loop; prior bindings
    // reappear.
    check(
        "{% assign x = 'outer' %}{% for x in items %}{{ x }}{% endfor %}{{ x }}",
        json!({"items": ["a"]}),
        "aouter",
    );
    check("{% for x in items %}{% endfor %}{{ forloop }}", json!({"items": [1]}), "");
}

#[test]
fn test_nested_blocks() {
    check(
        "{% for row in rows %}{% if row.on %}{{ row.name }} {% endif %}{% endfor %}",
        json!({"rows": [
            {"name": "a", "on": true},
            {"name": "b", "on": false},
            {"name": "c", "on": true},
        ]}),
        "a c ",
    );
}

#[test]
fn test_whitespace_control() {
    check("a  {{- 'b' -}}  c", json!({}), "abc");
    check(
        "x\n{%- if true -%}\ny\n{%- endif -%}\nz",
        json!({}),
        "xyz",
    );
    check("a {{ 'b' }} c", json!({}), "a b c");
}

#[test]
fn test_raw_and_comment() {
    check("{% raw %}{{ not evaluated }}{% endraw %}", json!({}), "{{ not evaluated }}");
    check("a{% comment %}ignored {{ junk }}{% endcomment %}b", json!({}), "ab");
    check(
        "a{% comment %}{% comment %}inner{% endcomment %}still{% endcomment %}b",
        json!({}),
        "ab",
    );
}

#[test]
fn test_parse_errors() {
    let env = Environment::new();
    for source in [
        "{{ a b }}",
        "{% if %}x{% endif %}",
        "{% if a %}x",
        "{% endif %}",
        "{% nosuchtag %}",
        "{{ unterminated",
        "{{ 'a' if }}",
    ] {
        assert!(env.parse(source).is_err(), "expected parse error for {source:?}");
    }
}

#[test]
fn test_render_errors() {
    assert!(matches!(
        check_render_err("{{ 1 < 'a' }}", json!({})),
        TemplateError::Type { .. }
    ));
    assert!(matches!(
        check_render_err("{{ 'x' | nosuchfilter }}", json!({})),
        TemplateError::Filter { .. }
    ));
    assert!(matches!(
        check_render_err("{% if 1 contains 2 %}{% endif %}", json!({})),
        TemplateError::Type { .. }
    ));
}

#[test]
fn test_error_positions() {
    let env = Environment::new();
    match env.parse("line one\n  {{ a b }}").unwrap_err() {
        TemplateError::Syntax { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, 3);
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}
