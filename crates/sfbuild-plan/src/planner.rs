// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use indexmap::IndexMap;
use sfbuild_cache::{Status, SymbiCache};
use sfbuild_catalog::{Catalog, Stage};
use sfbuild_common::{PathValue, Value};
use sfbuild_module::ModuleClient;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./planner_test.rs"]
mod planner_test;

/// Planner output: consumed by the executor.
#[derive(Debug)]
pub struct Plan {
    /// Every resolved artifact name mapped to its concrete path value.
    pub dep_paths: IndexMap<String, PathValue>,
    /// Stage names that must execute.
    pub run_stages: HashSet<String>,
    /// Number of consumers that saw each artifact as "will differ";
    /// reporting only, not consulted by the executor.
    pub deps_rebuilds: IndexMap<String, usize>,
}

struct UnreachableInfo {
    stage: String,
    input: String,
}

/// Builds a [`Plan`] by back-chaining from a target through the catalog
/// and cache, exactly as spec'd: one `map` call per stage, a stage whose
/// outputs all exist and whose inputs are all unchanged is not scheduled,
/// an unresolved optional take is simply omitted.
pub struct Planner<'a> {
    catalog: &'a Catalog,
    output_map: IndexMap<String, &'a Stage>,
    platform_name: String,
    base_values: IndexMap<String, Value>,
    client: &'a ModuleClient,
    cache: &'a mut SymbiCache,

    config_paths: IndexMap<String, PathValue>,
    dep_paths: IndexMap<String, PathValue>,
    run_stages: HashSet<String>,
    deps_rebuilds: IndexMap<String, usize>,
    visited: HashSet<String>,
    unreachable: Vec<UnreachableInfo>,
}

impl<'a> Planner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        platform_name: impl Into<String>,
        base_values: IndexMap<String, Value>,
        config_paths: IndexMap<String, PathValue>,
        cache: &'a mut SymbiCache,
        client: &'a ModuleClient,
    ) -> Self {
        let output_map = catalog.output_map();
        // Seed dep_paths with the subset of explicit dependencies whose
        // paths currently exist on disk.
        let dep_paths = config_paths
            .iter()
            .filter(|(_, p)| p.exists())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Planner {
            catalog,
            output_map,
            platform_name: platform_name.into(),
            base_values,
            client,
            cache,
            config_paths,
            dep_paths,
            run_stages: HashSet::new(),
            deps_rebuilds: IndexMap::new(),
            visited: HashSet::new(),
            unreachable: Vec::new(),
        }
    }

    /// Back-chain from `target` and produce the plan.
    pub async fn plan(mut self, target: &str) -> Result<Plan> {
        self.resolve(target.to_owned()).await?;
        if !self.dep_paths.contains_key(target) {
            if let Some(info) = self.unreachable.first() {
                return Err(Error::UnreachableTarget {
                    stage: info.stage.clone(),
                    input: info.input.clone(),
                });
            }
            return Err(Error::NoProducer(target.to_owned()));
        }
        Ok(Plan {
            dep_paths: self.dep_paths,
            run_stages: self.run_stages,
            deps_rebuilds: self.deps_rebuilds,
        })
    }

    fn resolve<'f>(&'f mut self, dep: String) -> Pin<Box<dyn Future<Output = Result<()>> + 'f>> {
        Box::pin(async move {
            self.deps_rebuilds.entry(dep.clone()).or_insert(0);

            let has_explicit = self.dep_paths.contains_key(&dep);
            let has_producer = self.output_map.contains_key(&dep);
            if has_explicit && !has_producer {
                return Ok(());
            }

            let Some(provider_name) = self.output_map.get(&dep).map(|s| s.name.clone()) else {
                return Ok(());
            };
            if self.visited.contains(&provider_name) {
                return Ok(());
            }
            // Clone the stage to avoid holding a borrow of `self.catalog`
            // across the recursive, mutably-borrowing calls below.
            let provider = self
                .catalog
                .stage(&provider_name)
                .expect("output_map only references stages in the catalog")
                .clone();

            for take in &provider.takes {
                self.resolve(take.name.clone()).await?;

                let take_paths = self.dep_paths.get(&take.name).cloned();
                if take_paths.is_none() && take.required {
                    tracing::info!(stage = %provider.name, input = %take.name, "stage unreachable: required input unresolved");
                    self.unreachable.push(UnreachableInfo {
                        stage: provider.name.clone(),
                        input: take.name.clone(),
                    });
                    return Ok(());
                }
                if let Some(paths) = &take_paths {
                    if self.dep_will_differ(&take.name, paths, &provider.name) {
                        self.run_stages.insert(provider.name.clone());
                        *self.deps_rebuilds.entry(take.name.clone()).or_insert(0) += 1;
                    }
                }
            }

            let values = provider.merged_values(&self.base_values);
            let mod_input = provider.build_config(&self.platform_name, &values, &self.dep_paths, &self.config_paths);
            let outputs = self.client.map(&provider.module_path, &mod_input).await?;
            self.visited.insert(provider.name.clone());

            for (name, path) in &outputs {
                self.dep_paths.insert(name.clone(), path.clone());
            }
            for out_path in outputs.values() {
                if !out_path.exists() {
                    self.run_stages.insert(provider.name.clone());
                }
            }
            Ok(())
        })
    }

    /// Mirrors the reference's `dep_will_differ`: a take will differ for
    /// its consumer either because its own producer is already scheduled
    /// to rerun, or because the cache reports it changed/untracked for
    /// this consumer.
    fn dep_will_differ(&mut self, take_name: &str, paths: &PathValue, consumer: &str) -> bool {
        if let Some(producer) = self.output_map.get(take_name) {
            if self.run_stages.contains(&producer.name) {
                return true;
            }
        }
        self.dep_differ(paths, consumer)
    }

    /// Mirrors `dep_differ`: any path within the value that differs makes
    /// the whole artifact differ. An untracked path is not itself treated
    /// as "differing" but is recorded on this first look, so later
    /// consumers in the same run see `same`.
    fn dep_differ(&mut self, paths: &PathValue, consumer: &str) -> bool {
        let mut leaves = Vec::new();
        paths.for_each_path(&mut |p| leaves.push(p.to_path_buf()));

        let mut differs = false;
        for path in leaves {
            match self.cache.get_status(&path, consumer) {
                Status::Untracked => self.cache.update(&path, consumer),
                Status::Changed => differs = true,
                Status::Same => {}
            }
        }
        differs
    }
}
