use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::registry::HintRegistry;
use crate::resolver::HintResolver;
use crate::script::ScriptOptions;
use crate::types::ClientHint;

// ---------------------------------------------------------------------------
// YAML schema
//
// script:   optional ScriptOptions, every field defaulted
// hints:    logical name → HintEntry, in script order
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HintsConfig {
    #[serde(default)]
    pub script: ScriptOptions,
    pub hints: IndexMap<String, HintEntry>,
}

/// A string-valued hint declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HintEntry {
    pub cookie_name: String,
    pub probe: String,
    pub fallback: String,
    /// Closed set of accepted values; anything else resolves to the fallback.
    #[serde(default)]
    pub values: Option<Vec<String>>,
    /// Regex an accepted value must match; anything else resolves to the fallback.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl HintsConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn registry(&self) -> Result<HintRegistry> {
        let mut registry = HintRegistry::new();
        for (name, entry) in &self.hints {
            registry.register(name.clone(), entry.to_hint(name)?)?;
        }
        tracing::debug!(hints = registry.len(), "built client hint registry from config");
        Ok(registry)
    }

    pub fn build(self) -> Result<HintResolver> {
        let registry = self.registry()?;
        Ok(HintResolver::with_options(registry, self.script))
    }
}

impl HintEntry {
    fn invalid(name: &str, reason: impl Into<String>) -> Error {
        Error::InvalidHint {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn to_hint(&self, name: &str) -> Result<ClientHint> {
        let fallback = self.fallback.clone();
        match (&self.values, &self.pattern) {
            (Some(_), Some(_)) => Err(Self::invalid(name, "`values` and `pattern` are mutually exclusive")),
            (Some(values), None) => {
                if !values.contains(&fallback) {
                    return Err(Self::invalid(
                        name,
                        format!("fallback {fallback:?} is not one of {values:?}"),
                    ));
                }
                let values = values.clone();
                Ok(ClientHint::with_transform(
                    self.cookie_name.clone(),
                    self.probe.clone(),
                    fallback.clone(),
                    move |raw: &str| {
                        if values.iter().any(|v| v == raw) {
                            raw.to_string()
                        } else {
                            fallback.clone()
                        }
                    },
                ))
            }
            (None, Some(pattern)) => {
                let re = fancy_regex::Regex::new(pattern)?;
                if !re.is_match(&fallback).unwrap_or(false) {
                    return Err(Self::invalid(
                        name,
                        format!("fallback {fallback:?} does not match {pattern:?}"),
                    ));
                }
                Ok(ClientHint::with_transform(
                    self.cookie_name.clone(),
                    self.probe.clone(),
                    fallback.clone(),
                    move |raw: &str| {
                        // Backtracking limit errors count as a non-match.
                        if re.is_match(raw).unwrap_or(false) {
                            raw.to_string()
                        } else {
                            fallback.clone()
                        }
                    },
                ))
            }
            (None, None) => Ok(ClientHint::new(
                self.cookie_name.clone(),
                self.probe.clone(),
                fallback,
            )),
        }
    }
}
