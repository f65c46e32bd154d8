use std::collections::HashMap;

use client_hints::hints::{self, color_scheme, reduced_motion, time_zone, ColorScheme, ReducedMotion};
use client_hints::{ClientHint, CookieSource, Error, HintRegistry, HintValue};
use fixtures::fixtures;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ResolveFixture {
    name: String,
    cookie: String,
    expected: IndexMap<String, String>,
}

fn load_fixtures(path: &std::path::Path) -> Vec<ResolveFixture> {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

// ---------------------------------------------------------------------------
// Resolution fixtures
// ---------------------------------------------------------------------------

#[fixtures(["tests/fixtures/*.yml"])]
#[test]
fn test_resolve_fixtures(path: &std::path::Path) {
    let resolver = hints::defaults().unwrap().into_resolver();

    for f in load_fixtures(path) {
        // Same answer whether the cookies come from a document or a request.
        let from_document = resolver.resolve(CookieSource::Document(&f.cookie));
        assert_eq!(from_document.to_string_map(), f.expected, "case: {}", f.name);

        let mut headers = HashMap::new();
        headers.insert("cookie".to_string(), f.cookie.clone());
        let from_request = resolver.resolve(CookieSource::select(None, Some(&headers)));
        assert_eq!(from_request.to_string_map(), f.expected, "case: {}", f.name);
    }
}

// ---------------------------------------------------------------------------
// Typed values
// ---------------------------------------------------------------------------

#[test]
fn bundled_hints_resolve_to_typed_values() {
    let resolver = hints::defaults().unwrap().into_resolver();
    let resolved = resolver.resolve(CookieSource::Document(
        "CH-prefers-color-scheme=dark; CH-time-zone=America%2FDenver; CH-reduced-motion=reduce",
    ));
    assert_eq!(*resolved.get::<ColorScheme>("colorScheme").unwrap(), ColorScheme::Dark);
    assert_eq!(*resolved.get::<ReducedMotion>("reducedMotion").unwrap(), ReducedMotion::Reduce);
    assert_eq!(resolved.get::<String>("timeZone").unwrap(), "America/Denver");
}

#[test]
fn unknown_hint_is_reported() {
    let resolver = hints::defaults().unwrap().into_resolver();
    let resolved = resolver.resolve(None);
    assert!(matches!(
        resolved.get::<String>("locale"),
        Err(Error::UnknownHint(name)) if name == "locale"
    ));
    assert!(matches!(
        resolver.cookie_value("", "locale"),
        Err(Error::UnknownHint(_))
    ));
}

#[test]
fn request_without_cookie_header_uses_fallbacks() {
    let resolver = hints::defaults().unwrap().into_resolver();
    let headers: IndexMap<String, String> =
        [("accept".to_string(), "text/html".to_string())].into_iter().collect();
    let resolved = resolver.resolve(CookieSource::select(None, Some(&headers)));
    assert_eq!(*resolved.get::<ColorScheme>("colorScheme").unwrap(), ColorScheme::Light);
    assert_eq!(resolved.get::<String>("timeZone").unwrap(), time_zone::FALLBACK);
}

#[test]
fn snapshot_serializes_as_flat_map() {
    let resolver = hints::defaults().unwrap().into_resolver();
    let resolved = resolver.resolve(CookieSource::Document("CH-prefers-color-scheme=dark"));
    let yaml = serde_yaml::to_string(&resolved).unwrap();
    assert_eq!(
        yaml,
        "colorScheme: dark\nreducedMotion: no-preference\ntimeZone: UTC\n"
    );
}

// ---------------------------------------------------------------------------
// Custom structured hint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    label: String,
    value: u32,
}

impl HintValue for Widget {
    fn to_hint_string(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

fn widget_fallback() -> Widget {
    Widget {
        label: "two".to_string(),
        value: 2,
    }
}

fn custom_registry() -> HintRegistry {
    HintRegistry::new()
        .with("colorScheme", color_scheme::hint())
        .unwrap()
        .with(
            "widget",
            ClientHint::with_transform("CH-widget", "1", widget_fallback(), |raw: &str| {
                serde_json::from_str(raw).unwrap_or_else(|_| widget_fallback())
            }),
        )
        .unwrap()
        .with("reducedMotion", reduced_motion::hint())
        .unwrap()
        .with("timeZone", time_zone::hint())
        .unwrap()
}

#[test]
fn custom_hint_falls_back() {
    let resolved = custom_registry().into_resolver().resolve(None);
    assert_eq!(*resolved.get::<Widget>("widget").unwrap(), widget_fallback());
    assert_eq!(resolved.len(), 4);
}

#[test]
fn custom_hint_from_request_cookie() {
    let resolver = custom_registry().into_resolver();
    let headers = [(
        "Cookie",
        r#"CH-prefers-color-scheme=dark; CH-widget={"label": "one", "value": 1}; CH-reduced-motion=reduce; CH-time-zone=America%2FDenver"#,
    )];
    let resolved = resolver.resolve(CookieSource::select(None, Some(&headers)));
    assert_eq!(
        *resolved.get::<Widget>("widget").unwrap(),
        Widget {
            label: "one".to_string(),
            value: 1
        }
    );
    assert_eq!(*resolved.get::<ColorScheme>("colorScheme").unwrap(), ColorScheme::Dark);
    assert_eq!(resolved.get_string("timeZone").unwrap(), "America/Denver");
}

#[test]
fn custom_hint_with_garbage_uses_transform_default() {
    let resolver = custom_registry().into_resolver();
    let resolved = resolver.resolve(CookieSource::Document("CH-widget=not-json"));
    assert_eq!(*resolved.get::<Widget>("widget").unwrap(), widget_fallback());
}

// ---------------------------------------------------------------------------
// Reconciliation script
// ---------------------------------------------------------------------------

#[test]
fn script_contains_each_hint_once() {
    let script = hints::defaults().unwrap().into_resolver().emit_script();
    for (probe, cookie) in [
        (color_scheme::PROBE, color_scheme::COOKIE_NAME),
        (reduced_motion::PROBE, reduced_motion::COOKIE_NAME),
        (time_zone::PROBE, time_zone::COOKIE_NAME),
    ] {
        assert_eq!(script.matches(probe).count(), 1, "probe {probe}");
        assert_eq!(script.matches(&format!("\"{cookie}\"")).count(), 1, "cookie {cookie}");
    }
}

#[test]
fn script_keeps_registry_order() {
    let script = hints::defaults().unwrap().into_resolver().emit_script();
    let color = script.find(color_scheme::COOKIE_NAME).unwrap();
    let motion = script.find(reduced_motion::COOKIE_NAME).unwrap();
    let zone = script.find(time_zone::COOKIE_NAME).unwrap();
    assert!(color < motion && motion < zone);
}

#[test]
fn script_has_loop_guards() {
    let script = hints::defaults().unwrap().into_resolver().emit_script();
    assert!(script.contains("navigator.cookieEnabled"));
    assert!(script.contains("const cookies = Object.create(null);"));
    assert!(script.contains("\"canSetCookies=1\""));
    assert!(script.contains("sessionStorage.getItem(attemptsKey)"));
    assert!(script.contains("attempts > 3"));
    assert!(script.contains("sessionStorage.setItem(attemptsKey, String(attempts + 1))"));
    assert!(script.contains("sessionStorage.removeItem(attemptsKey)"));
    assert!(script.contains("try {"));
    assert!(script.contains("decodeURIComponent(stored)"));
    assert!(script.contains("} catch (error) {"));
    assert!(script.contains("Max-Age=31536000; path=/"));
    assert!(script.contains("window.location.reload()"));
    assert!(script.contains("encodeURIComponent(hint.fallback)"));
    assert!(script.contains("fallback: \"light\""));
}

#[test]
fn script_options_are_applied() {
    let options = client_hints::ScriptOptions {
        reload_threshold: 5,
        hide_content_on_reload: false,
        ..Default::default()
    };
    let resolver = client_hints::HintResolver::with_options(hints::defaults().unwrap(), options);
    let script = resolver.emit_script();
    assert!(script.contains("attempts > 5"));
    assert!(!script.contains("visibility = 'hidden'"));
}

#[test]
fn script_escapes_hostile_fallback() {
    let resolver = HintRegistry::new()
        .with("x", ClientHint::new("CH-x", "'x'", "</script><script>alert(1)"))
        .unwrap()
        .into_resolver();
    let tag = resolver.emit_script_tag(None);
    assert_eq!(tag.matches("</script>").count(), 1);
}
