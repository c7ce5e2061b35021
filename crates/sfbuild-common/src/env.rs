// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result, Value};

#[cfg(test)]
#[path = "./env_test.rs"]
mod env_test;

/// References are written `${name}`; nesting (`${a${b}}`) is not supported,
/// matching the reference implementation's single-pass scan per string.
static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// A depth cap is the "simplest acceptable rule" for cycle detection: no
/// flow document legitimately nests references this deep.
const MAX_EXPANSION_DEPTH: usize = 32;

/// The merged value scope used to expand `${name}` reference tokens inside
/// flow and module configuration values.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    values: IndexMap<String, Value>,
}

impl Environment {
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Merge `values` into the environment; existing names are overwritten.
    pub fn add_values(&mut self, values: IndexMap<String, Value>) {
        self.values.extend(values);
    }

    /// Resolve every `${name}` reference inside `v`, recursing into
    /// sequences and mappings. Total over the value domain; idempotent
    /// once no references remain.
    pub fn resolve(&self, v: &Value) -> Result<Value> {
        self.resolve_at(v, 0, "<value>")
    }

    fn resolve_at(&self, v: &Value, depth: usize, context: &str) -> Result<Value> {
        match v {
            Value::String(s) => self.resolve_string(s, depth, context),
            Value::Seq(items) => {
                let resolved = items
                    .iter()
                    .map(|item| self.resolve_at(item, depth, context))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Seq(resolved))
            }
            Value::Map(map) => {
                let mut resolved = IndexMap::with_capacity(map.len());
                for (k, item) in map {
                    resolved.insert(k.clone(), self.resolve_at(item, depth, k)?);
                }
                Ok(Value::Map(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&self, s: &str, depth: usize, context: &str) -> Result<Value> {
        let matches: Vec<_> = REFERENCE.captures_iter(s).collect();
        if matches.is_empty() {
            return Ok(Value::String(s.to_owned()));
        }

        // A string that is *exactly* one reference token preserves the
        // referenced value's shape (lists and maps can be passed through
        // whole); anything with surrounding text is textual substitution.
        if matches.len() == 1 && matches[0].get(0).unwrap().as_str() == s {
            let name = matches[0][1].to_owned();
            return self.expand_name(&name, depth, context);
        }

        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for cap in &matches {
            let whole = cap.get(0).unwrap();
            out.push_str(&s[last..whole.start()]);
            let name = &cap[1];
            let expanded = self.expand_name(name, depth, context)?;
            out.push_str(&expanded.to_string());
            last = whole.end();
        }
        out.push_str(&s[last..]);
        Ok(Value::String(out))
    }

    fn expand_name(&self, name: &str, depth: usize, context: &str) -> Result<Value> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(Error::CyclicReference {
                name: name.to_owned(),
                context: context.to_owned(),
            });
        }
        let value = self.values.get(name).ok_or_else(|| Error::UnknownReference {
            name: name.to_owned(),
            context: context.to_owned(),
        })?;
        self.resolve_at(value, depth + 1, name)
    }

    /// Resolve each value in `values` against this environment, adding the
    /// resolved result back into the environment as it goes so that later
    /// entries in the same mapping may reference earlier ones.
    ///
    /// Mirrors the reference implementation's `import_values`.
    pub fn import_values(&mut self, values: &IndexMap<String, Value>) -> Result<IndexMap<String, Value>> {
        let mut imported = IndexMap::with_capacity(values.len());
        for (k, v) in values {
            let resolved = self.resolve(v)?;
            self.values.insert(k.clone(), resolved.clone());
            imported.insert(k.clone(), resolved);
        }
        Ok(imported)
    }
}
