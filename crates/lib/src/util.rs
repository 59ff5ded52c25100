//! Input normalization shared by the key store and the security reconciler.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

/// An ordered list of names, roles or key ids.
///
/// Public operations accept anything convertible into a `NameList`: a single string, a
/// sequence of strings, or a map whose keys are the names (values are ignored). Map
/// conversions keep the map's own iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for NameList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<&str> for NameList {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for NameList {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for NameList {
    fn from(names: Vec<&str>) -> Self {
        names.as_slice().into()
    }
}

impl From<&[String]> for NameList {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

impl From<&[&str]> for NameList {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for NameList {
    fn from(names: [&str; N]) -> Self {
        names.as_slice().into()
    }
}

impl<V> From<&HashMap<String, V>> for NameList {
    fn from(map: &HashMap<String, V>) -> Self {
        Self(map.keys().cloned().collect())
    }
}

impl<V> From<&BTreeMap<String, V>> for NameList {
    fn from(map: &BTreeMap<String, V>) -> Self {
        Self(map.keys().cloned().collect())
    }
}

impl From<&Map<String, Value>> for NameList {
    fn from(map: &Map<String, Value>) -> Self {
        Self(map.keys().cloned().collect())
    }
}

impl FromIterator<String> for NameList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
