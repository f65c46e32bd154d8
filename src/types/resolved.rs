use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::hint::HintValue;
use crate::error::{Error, Result};

/// Per-call snapshot of every registered hint's value.
///
/// Always fully populated: one entry per registered hint, in registry order.
#[derive(Debug)]
pub struct ResolvedHints {
    pub(crate) values: IndexMap<String, Box<dyn HintValue>>,
}

impl ResolvedHints {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(n),
        }
    }

    pub(crate) fn insert(&mut self, name: &str, value: Box<dyn HintValue>) {
        self.values.insert(name.to_string(), value);
    }

    /// Typed access to a hint's value.
    pub fn get<V: HintValue>(&self, name: &str) -> Result<&V> {
        self.value(name)?
            .as_any()
            .downcast_ref::<V>()
            .ok_or_else(|| Error::HintType {
                name: name.to_string(),
                expected: std::any::type_name::<V>(),
            })
    }

    /// The value in its cookie string form, regardless of type.
    pub fn get_string(&self, name: &str) -> Result<String> {
        Ok(self.value(name)?.to_hint_string())
    }

    pub fn value(&self, name: &str) -> Result<&dyn HintValue> {
        self.values
            .get(name)
            .map(|v| v.as_ref())
            .ok_or_else(|| Error::UnknownHint(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn HintValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat name → string map, handy for templates.
    pub fn to_string_map(&self) -> IndexMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_hint_string()))
            .collect()
    }
}

impl Serialize for ResolvedHints {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value.to_hint_string())?;
        }
        map.end()
    }
}
