// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use sfbuild_catalog::Catalog;

use crate::Plan;

/// A per-artifact status for `--pretend`/status rendering. Distinct from
/// the planner's own bookkeeping: this is purely a display concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanStatus {
    /// Exists on disk; a consumer saw it differ from its recorded
    /// fingerprint this run (freshly produced).
    New,
    /// Exists on disk; unchanged since the last run.
    Unchanged,
    /// Exists on disk, but its producer is scheduled to rerun.
    Outdated,
    /// Its producer is scheduled to run and the path does not exist yet.
    Pending,
    /// Has a producer, but no path could be resolved for it.
    Unresolved,
    /// No producer and no explicit path.
    Missing,
}

pub struct PlanEntry {
    pub name: String,
    pub status: PlanStatus,
    /// `Some(stage name)` when a stage produces this artifact.
    pub producer: Option<String>,
    pub path: Option<String>,
}

/// Describe every artifact touched by planning, sorted by name for
/// reproducible output (spec's resolved open question on `produces`
/// iteration order).
pub fn describe(plan: &Plan, catalog: &Catalog) -> Vec<PlanEntry> {
    let output_map = catalog.output_map();
    let mut names: Vec<&String> = plan.deps_rebuilds.keys().collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let producer = output_map.get(name.as_str()).map(|s| s.name.clone());
            let path = plan.dep_paths.get(name);
            let rebuilds = plan.deps_rebuilds.get(name).copied().unwrap_or(0);

            let status = match path {
                Some(p) => {
                    let exists = p.exists();
                    match &producer {
                        Some(stage_name) if plan.run_stages.contains(stage_name) => {
                            if exists {
                                PlanStatus::Outdated
                            } else {
                                PlanStatus::Pending
                            }
                        }
                        _ if exists && rebuilds > 0 => PlanStatus::New,
                        _ if exists => PlanStatus::Unchanged,
                        _ => PlanStatus::Unresolved,
                    }
                }
                None => {
                    if producer.is_some() {
                        PlanStatus::Unresolved
                    } else {
                        PlanStatus::Missing
                    }
                }
            };

            PlanEntry {
                name: name.clone(),
                status,
                producer,
                path: path.map(|p| p.to_string()),
            }
        })
        .collect()
}
