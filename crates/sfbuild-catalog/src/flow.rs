// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use sfbuild_common::Value;
use serde::Deserialize;

/// A user-authored project flow document: values and explicit dependency
/// paths for a specific build, optionally overridden per platform.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectFlow {
    #[serde(default)]
    pub dependencies: IndexMap<String, Value>,
    #[serde(default)]
    pub values: IndexMap<String, Value>,
    /// Per-platform overrides, keyed by platform name. Captures every key
    /// of the document other than `dependencies`/`values`.
    #[serde(flatten)]
    pub platforms: IndexMap<String, PlatformSection>,
}

impl ProjectFlow {
    pub fn platform(&self, platform_name: &str) -> PlatformSection {
        self.platforms.get(platform_name).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlatformSection {
    #[serde(default)]
    pub dependencies: IndexMap<String, Value>,
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}

/// The per-stage module reference plus its overrides, as declared in a
/// platform flow document's `module_options`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModuleOptions {
    pub params: Option<Value>,
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}

/// A document describing the stages and defaults available for a named
/// target platform.
#[derive(Debug, Deserialize)]
pub struct PlatformFlow {
    pub modules: IndexMap<String, String>,
    #[serde(default)]
    pub module_options: IndexMap<String, ModuleOptions>,
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}
