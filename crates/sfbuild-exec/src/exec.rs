// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::pin::Pin;

use indexmap::IndexMap;
use sfbuild_cache::{TARGET_CONSUMER, SymbiCache};
use sfbuild_catalog::{Catalog, Stage};
use sfbuild_common::Value;
use sfbuild_module::ModuleClient;
use sfbuild_plan::Plan;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./exec_test.rs"]
mod exec_test;

/// Realises a [`Plan`]: runs every stage it marked `run_stages`, in the
/// order demanded by back-chaining from the target, and keeps the cache in
/// sync with what each producer actually consumed.
pub struct Executor<'a> {
    catalog: &'a Catalog,
    output_map: IndexMap<String, &'a Stage>,
    platform_name: String,
    base_values: IndexMap<String, Value>,
    client: &'a ModuleClient,
    cache: &'a mut SymbiCache,
    plan: Plan,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        platform_name: impl Into<String>,
        base_values: IndexMap<String, Value>,
        client: &'a ModuleClient,
        cache: &'a mut SymbiCache,
        plan: Plan,
    ) -> Self {
        Executor {
            catalog,
            output_map: catalog.output_map(),
            platform_name: platform_name.into(),
            base_values,
            client,
            cache,
            plan,
        }
    }

    /// Realise `target`, then record and persist its own fingerprint under
    /// the sentinel `__target` consumer.
    pub async fn execute(&mut self, target: &str) -> Result<()> {
        self.build_dep(target.to_owned()).await?;

        let Some(path) = self.plan.dep_paths.get(target).cloned() else {
            return Err(Error::NoProducer(target.to_owned()));
        };
        let mut leaves = Vec::new();
        path.for_each_path(&mut |p| leaves.push(p.to_path_buf()));
        for leaf in leaves {
            self.cache.update(&leaf, TARGET_CONSUMER);
        }
        Ok(())
    }

    fn build_dep<'f>(&'f mut self, dep: String) -> Pin<Box<dyn Future<Output = Result<()>> + 'f>> {
        Box::pin(async move {
            let Some(provider_name) = self.output_map.get(dep.as_str()).map(|s| s.name.clone()) else {
                // No producer: either an explicit path (already on disk, or
                // nothing more we can do about it) or truly absent.
                return Ok(());
            };
            if !self.plan.run_stages.contains(&provider_name) {
                // Not scheduled: whatever is on disk (or already resolved
                // by the planner) is what we use.
                return Ok(());
            }
            let provider = self
                .catalog
                .stage(&provider_name)
                .expect("output_map only references stages in the catalog")
                .clone();

            for take in &provider.takes {
                self.build_dep(take.name.clone()).await?;
                match self.plan.dep_paths.get(&take.name).cloned() {
                    Some(path) => {
                        let mut leaves = Vec::new();
                        path.for_each_path(&mut |p| leaves.push(p.to_path_buf()));
                        for leaf in leaves {
                            self.cache.update(&leaf, &provider.name);
                        }
                    }
                    None if take.required => {
                        return Err(Error::MissingRequiredInput {
                            stage: provider.name.clone(),
                            input: take.name.clone(),
                        });
                    }
                    None => {}
                }
            }

            if !self.plan.run_stages.contains(&provider.name) {
                // A take's recursive build may have already run this stage
                // (reached via a second sink) before we got back here.
                return Ok(());
            }

            let values = provider.merged_values(&self.base_values);
            let config = provider.build_config(&self.platform_name, &values, &self.plan.dep_paths, &IndexMap::new());
            self.client.exec(&provider.module_path, &config).await?;
            self.plan.run_stages.remove(&provider.name);

            for output in &provider.produces {
                let Some(path) = self.plan.dep_paths.get(&output.name) else {
                    return Err(Error::PromiseViolation {
                        stage: provider.name.clone(),
                        artifact: output.name.clone(),
                    });
                };
                if !path.exists() {
                    return Err(Error::PromiseViolation {
                        stage: provider.name.clone(),
                        artifact: output.name.clone(),
                    });
                }
            }
            Ok(())
        })
    }
}
