use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::resolver::HintResolver;
use crate::types::{ClientHint, HintValue, ProbeExpression};

/// Type-erased view of a `ClientHint<V>` so hints with different value
/// types can live in one registry.
pub(crate) trait RegisteredHint: Send + Sync {
    fn cookie_name(&self) -> &str;
    fn probe(&self) -> &ProbeExpression;
    fn fallback_string(&self) -> String;
    fn resolve(&self, raw: Option<String>) -> Box<dyn HintValue>;
}

impl<V: HintValue + Clone> RegisteredHint for ClientHint<V> {
    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn probe(&self) -> &ProbeExpression {
        &self.probe
    }

    fn fallback_string(&self) -> String {
        self.fallback.to_hint_string()
    }

    fn resolve(&self, raw: Option<String>) -> Box<dyn HintValue> {
        Box::new(self.value_from(raw))
    }
}

/// Read-only view of one registered hint.
#[derive(Debug, Clone, Copy)]
pub struct HintInfo<'a> {
    pub name: &'a str,
    pub cookie_name: &'a str,
    pub probe: &'a ProbeExpression,
}

/// Logical hint name → hint definition.
///
/// Insertion order is kept; it only decides the order hints appear in the
/// generated script.
#[derive(Default)]
pub struct HintRegistry {
    hints: IndexMap<String, Box<dyn RegisteredHint>>,
}

impl HintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hint` under the logical `name`.
    ///
    /// A transformed hint must map the string form of its fallback back to
    /// the fallback, since that string is what the transform sees on a first
    /// visit. Cookie names are expected to be unique but this is not enforced.
    pub fn register<V>(&mut self, name: impl Into<String>, hint: ClientHint<V>) -> Result<()>
    where
        V: HintValue + Clone + PartialEq,
    {
        let name = name.into();
        if self.hints.contains_key(&name) {
            return Err(Error::DuplicateHint(name));
        }
        if hint.has_transform() && hint.value_from(None) != hint.fallback {
            return Err(Error::FallbackMismatch {
                name,
                fallback: hint.fallback.to_hint_string(),
            });
        }
        if let Some(other) = self
            .iter()
            .find(|info| info.cookie_name == hint.cookie_name())
        {
            tracing::debug!(
                hint = %name,
                other = other.name,
                cookie = hint.cookie_name(),
                "client hints share a cookie name"
            );
        }
        self.hints.insert(name, Box::new(hint));
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<V>(mut self, name: impl Into<String>, hint: ClientHint<V>) -> Result<Self>
    where
        V: HintValue + Clone + PartialEq,
    {
        self.register(name, hint)?;
        Ok(self)
    }

    pub(crate) fn get(&self, name: &str) -> Result<&dyn RegisteredHint> {
        self.hints
            .get(name)
            .map(|h| h.as_ref())
            .ok_or_else(|| Error::UnknownHint(name.to_string()))
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &dyn RegisteredHint)> {
        self.hints.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = HintInfo<'_>> {
        self.entries().map(|(name, hint)| HintInfo {
            name,
            cookie_name: hint.cookie_name(),
            probe: hint.probe(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hints.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn into_resolver(self) -> HintResolver {
        HintResolver::new(self)
    }
}

impl std::fmt::Debug for HintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let registry = HintRegistry::new()
            .with("b", ClientHint::new("CH-b", "'b'", "b"))
            .unwrap()
            .with("a", ClientHint::new("CH-a", "'a'", "a"))
            .unwrap();
        let names: Vec<_> = registry.iter().map(|h| h.name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = HintRegistry::new();
        registry
            .register("a", ClientHint::new("CH-a", "'a'", "a"))
            .unwrap();
        assert!(matches!(
            registry.register("a", ClientHint::new("CH-other", "'a'", "a")),
            Err(Error::DuplicateHint(name)) if name == "a"
        ));
    }

    #[test]
    fn shared_cookie_names_are_allowed() {
        let registry = HintRegistry::new()
            .with("a", ClientHint::new("CH-same", "'a'", "a"))
            .unwrap()
            .with("b", ClientHint::new("CH-same", "'b'", "b"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_fallback_that_does_not_round_trip() {
        let hint = ClientHint::with_transform("CH-x", "'x'", "x".to_string(), |s: &str| {
            s.to_uppercase()
        });
        assert!(matches!(
            HintRegistry::new().register("x", hint),
            Err(Error::FallbackMismatch { .. })
        ));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = HintRegistry::new();
        assert!(matches!(registry.get("nope"), Err(Error::UnknownHint(n)) if n == "nope"));
    }
}
