// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use sfbuild_common::{ArtifactName, Environment, PathValue, Value};
use sfbuild_module::ModuleClient;

use crate::flow::PlatformFlow;
use crate::module_ref::{discover_module_collections, resolve_module_ref};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./stage_test.rs"]
mod stage_test;

/// An immutable stage descriptor, built once during catalog load.
///
/// `takes`, `produces` and `module_path` never change after construction;
/// they are consistent with what the module reported in `io` mode by
/// construction.
#[derive(Clone, Debug)]
pub struct Stage {
    pub name: String,
    pub module_path: PathBuf,
    pub takes: Vec<ArtifactName>,
    pub produces: Vec<ArtifactName>,
    /// Values that shadow the global scope for this stage only.
    pub value_overrides: IndexMap<String, Value>,
    /// Opaque module-specific parameters, passed verbatim on every call.
    pub params: Option<Value>,
    /// Human-readable description per produced artifact.
    pub meta: IndexMap<String, String>,
}

impl Stage {
    async fn load(
        name: String,
        modstr: &str,
        module_options: Option<&crate::flow::ModuleOptions>,
        env: &Environment,
        collections: &IndexMap<String, PathBuf>,
        client: &ModuleClient,
    ) -> Result<Self> {
        let module_path = resolve_module_ref(modstr, collections)?;
        if !module_path.is_file() && !module_path.is_symlink() {
            return Err(Error::ModuleNotFound(module_path));
        }

        let params = module_options.and_then(|o| o.params.clone());
        let value_overrides = match module_options {
            Some(opts) if !opts.values.is_empty() => {
                let mut scoped = env.clone();
                scoped.import_values(&opts.values)?
            }
            _ => IndexMap::new(),
        };

        let io_config = match &params {
            Some(p) => serde_json::json!({ "params": p }),
            None => serde_json::json!({}),
        };
        let io_resp = client.io(&module_path, &io_config).await?;

        Ok(Stage {
            name,
            module_path,
            takes: io_resp.takes.iter().map(|s| ArtifactName::parse(s)).collect(),
            produces: io_resp.produces.iter().map(|s| ArtifactName::parse(s)).collect(),
            value_overrides,
            params,
            meta: io_resp.meta,
        })
    }

    /// The effective value scope for this stage: the flow's global values
    /// shadowed by this stage's own `value_overrides`.
    pub fn merged_values(&self, base_values: &IndexMap<String, Value>) -> IndexMap<String, Value> {
        let mut values = base_values.clone();
        values.extend(self.value_overrides.clone());
        values
    }

    /// Build the `{takes, produces, values, platform, params?}` document
    /// sent to this stage's module in `map` and `exec` mode.
    ///
    /// `produces` paths fall back to `fallback_paths` (the flow's explicit
    /// dependency paths) when the planner hasn't resolved one yet, mirroring
    /// the reference's `prepare_stage_input`.
    pub fn build_config(
        &self,
        platform_name: &str,
        values: &IndexMap<String, Value>,
        dep_paths: &IndexMap<String, PathValue>,
        fallback_paths: &IndexMap<String, PathValue>,
    ) -> serde_json::Value {
        let mut takes = serde_json::Map::new();
        for take in &self.takes {
            if let Some(p) = dep_paths.get(&take.name) {
                takes.insert(take.name.clone(), serde_json::to_value(p).expect("PathValue serializes"));
            }
        }
        let mut produces = serde_json::Map::new();
        for prod in &self.produces {
            let path = dep_paths.get(&prod.name).or_else(|| fallback_paths.get(&prod.name));
            if let Some(p) = path {
                produces.insert(prod.name.clone(), serde_json::to_value(p).expect("PathValue serializes"));
            }
        }
        let mut cfg = serde_json::json!({
            "takes": takes,
            "produces": produces,
            "values": values,
            "platform": platform_name,
        });
        if let Some(params) = &self.params {
            cfg["params"] = serde_json::to_value(params).expect("Value serializes");
        }
        cfg
    }
}

/// The stage descriptors for one flow, plus the output -> producer map
/// implied by their `produces` lists.
#[derive(Debug)]
pub struct Catalog {
    pub stages: Vec<Stage>,
}

impl Catalog {
    /// Parse `platform_flow`'s `modules` map, resolve each module
    /// reference against collections discovered under `sfbuild_home`, and
    /// construct every stage via one `io` call. Enforces the
    /// single-producer invariant across the whole flow.
    pub async fn load(
        platform_flow: &PlatformFlow,
        env: &Environment,
        sfbuild_home: &Path,
        client: &ModuleClient,
    ) -> Result<Self> {
        let collections = discover_module_collections(sfbuild_home);
        let mut stages = Vec::with_capacity(platform_flow.modules.len());
        for (stage_name, modstr) in &platform_flow.modules {
            let opts = platform_flow.module_options.get(stage_name);
            let stage = Stage::load(stage_name.clone(), modstr, opts, env, &collections, client).await?;
            stages.push(stage);
        }
        if stages.is_empty() {
            return Err(Error::NoStages);
        }
        Self::check_single_producer(&stages)?;
        Ok(Catalog { stages })
    }

    fn check_single_producer(stages: &[Stage]) -> Result<()> {
        let mut owner: IndexMap<&str, &str> = IndexMap::new();
        for stage in stages {
            for output in &stage.produces {
                match owner.get(output.name.as_str()) {
                    None => {
                        owner.insert(output.name.as_str(), stage.name.as_str());
                    }
                    Some(first) if *first != stage.name => {
                        return Err(Error::MultipleProducers {
                            artifact: output.name.clone(),
                            first: (*first).to_owned(),
                            second: stage.name.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// The output -> producing-stage map, by artifact name.
    pub fn output_map(&self) -> IndexMap<String, &Stage> {
        let mut map = IndexMap::new();
        for stage in &self.stages {
            for output in &stage.produces {
                map.entry(output.name.clone()).or_insert(stage);
            }
        }
        map
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }
}
