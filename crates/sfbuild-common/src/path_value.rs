// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Value;

/// An artifact path value: a single path, an ordered sequence of paths, or
/// a mapping from sub-name to path value. Every path-walking operation
/// (existence checks, cache updates, staleness probes) traverses all three
/// shapes uniformly via [`PathValue::for_each_path`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathValue {
    Single(PathBuf),
    Seq(Vec<PathValue>),
    Map(IndexMap<String, PathValue>),
}

impl PathValue {
    /// Visit every concrete path contained in this value, in a stable,
    /// left-to-right / key-sorted order.
    pub fn for_each_path<'a>(&'a self, f: &mut impl FnMut(&'a Path)) {
        match self {
            PathValue::Single(p) => f(p),
            PathValue::Seq(items) => items.iter().for_each(|item| item.for_each_path(f)),
            PathValue::Map(map) => map.values().for_each(|item| item.for_each_path(f)),
        }
    }

    /// True if every contained path currently exists on disk.
    pub fn exists(&self) -> bool {
        let mut all_exist = true;
        self.for_each_path(&mut |p| {
            if !(p.is_file() || p.is_dir() || p.is_symlink()) {
                all_exist = false;
            }
        });
        all_exist
    }
}

impl std::fmt::Display for PathValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathValue::Single(p) => write!(f, "{}", p.display()),
            PathValue::Seq(_) | PathValue::Map(_) => {
                let mut parts = Vec::new();
                self.for_each_path(&mut |p| parts.push(p.display().to_string()));
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl TryFrom<&Value> for PathValue {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let json = serde_json::to_value(value)?;
        serde_json::from_value(json)
    }
}

impl From<PathBuf> for PathValue {
    fn from(p: PathBuf) -> Self {
        PathValue::Single(p)
    }
}

impl From<&str> for PathValue {
    fn from(p: &str) -> Self {
        PathValue::Single(PathBuf::from(p))
    }
}

#[cfg(test)]
mod path_value_test {
    use super::*;

    #[test]
    fn for_each_path_visits_nested_shapes() {
        let mut map = IndexMap::new();
        map.insert("a".to_owned(), PathValue::from("a.txt"));
        let v = PathValue::Seq(vec![PathValue::from("x.txt"), PathValue::Map(map)]);
        let mut seen = Vec::new();
        v.for_each_path(&mut |p| seen.push(p.to_path_buf()));
        assert_eq!(seen, vec![PathBuf::from("x.txt"), PathBuf::from("a.txt")]);
    }

    #[test]
    fn exists_is_false_when_any_path_missing() {
        let v = PathValue::Seq(vec![
            PathValue::from("/definitely/does/not/exist/sfbuild"),
            PathValue::from("/"),
        ]);
        assert!(!v.exists());
    }
}
