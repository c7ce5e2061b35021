// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use colored::Colorize;
use indexmap::{indexmap, IndexMap};
use sfbuild_cache::SymbiCache;
use sfbuild_catalog::{Catalog, PlatformFlow, PlatformSection, ProjectFlow};
use sfbuild_common::{Environment, PathValue, Value};
use sfbuild_exec::Executor;
use sfbuild_module::ModuleClient;
use sfbuild_plan::{Planner, PlanStatus};

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::info;

const CACHE_FILE: &str = ".symbicache";

#[cfg(test)]
#[path = "./driver_test.rs"]
mod driver_test;

/// Run the full INIT..DONE/FAILED state machine for one invocation.
/// Returns the process exit code; never panics on user-facing failure.
pub async fn run(cli: Cli) -> i32 {
    println!("sfbuild: Symbiflow Build System");

    let cache_path = PathBuf::from(CACHE_FILE);
    let mut cache: Option<SymbiCache> = None;

    let outcome = tokio::select! {
        result = run_inner(&cli, &mut cache) => result,
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    match outcome {
        Ok(RunOutcome::Done) => {
            if let Some(cache) = &cache {
                if let Err(err) = cache.save(&cache_path).map_err(|e| Error::CacheSave(cache_path.clone(), e)) {
                    eprintln!("{}", format!("sfbuild: {err}").red());
                    return 1;
                }
            }
            sfbuild_done();
            0
        }
        Ok(RunOutcome::PretendOrInfoDone) => {
            sfbuild_done();
            0
        }
        Err(err) => {
            // A FAILED terminal state still flushes whatever the cache
            // learned this run (e.g. freshly-seen untracked fingerprints),
            // unlike a plain crash.
            if let Some(cache) = &cache {
                let _ = cache.save(&cache_path);
            }
            eprintln!("{}", format!("sfbuild: error: {err}").red());
            1
        }
    }
}

enum RunOutcome {
    Done,
    PretendOrInfoDone,
}

async fn run_inner(cli: &Cli, cache_slot: &mut Option<SymbiCache>) -> Result<RunOutcome> {
    let sfbuild_home = sfbuild_home()?;
    let share_dir = share_dir(&sfbuild_home);

    let flow_cfg: ProjectFlow = read_json(&cli.flow_path)
        .map_err(|err| flow_file_error(&cli.flow_path, err))?;

    let platform_path = sfbuild_home.join("platforms").join(format!("{}.json", cli.platform));
    let platform_flow: PlatformFlow = read_json(&platform_path).map_err(|err| match err {
        ReadJsonError::Missing => Error::PlatformFileMissing {
            path: platform_path.clone(),
            platform: cli.platform.clone(),
            flow_path: cli.flow_path.clone(),
        },
        ReadJsonError::Invalid(e) => Error::PlatformFileInvalid(platform_path.clone(), e),
    })?;

    let platform_section = flow_cfg.platform(&cli.platform);

    let mut env = Environment::new(indexmap! {
        "shareDir".to_owned() => Value::from(share_dir.display().to_string()),
    });
    if !platform_section.values.is_empty() {
        env.add_values(platform_section.values.clone());
    }

    println!("Scanning modules...");
    let client = ModuleClient::new(share_dir);
    let catalog = Catalog::load(&platform_flow, &env, &sfbuild_home, &client).await?;

    if cli.info {
        info::print(&catalog);
        return Ok(RunOutcome::PretendOrInfoDone);
    }

    let target = cli.target.clone().ok_or(Error::MissingTarget)?;

    let config_paths = explicit_dependencies(&flow_cfg, &platform_section, &env)?;
    let base_values = flow_values(&platform_flow, &flow_cfg, &platform_section);

    let mut cache = SymbiCache::load(Path::new(CACHE_FILE));
    let planner = Planner::new(&catalog, cli.platform.clone(), base_values.clone(), config_paths, &mut cache, &client);
    let plan = planner.plan(&target).await;
    *cache_slot = Some(cache);

    let plan = plan?;

    println!("\nProject status:");
    print_resolved_dependencies(&plan, &catalog);
    println!();

    if cli.pretend {
        return Ok(RunOutcome::PretendOrInfoDone);
    }

    let target_path = plan.dep_paths.get(&target).map(|p| p.to_string());

    let cache = cache_slot.as_mut().expect("cache populated above");
    let mut executor = Executor::new(&catalog, cli.platform.clone(), base_values, &client, cache, plan);
    executor.execute(&target).await?;

    println!(
        "Target `{}` -> {}",
        target.bold(),
        target_path.unwrap_or_default()
    );

    Ok(RunOutcome::Done)
}

fn print_resolved_dependencies(plan: &sfbuild_plan::Plan, catalog: &Catalog) {
    for entry in sfbuild_plan::describe(plan, catalog) {
        let (tag, source) = match entry.status {
            PlanStatus::New => ("[N]".green(), entry.path.clone().unwrap_or_default()),
            PlanStatus::Unchanged => ("[O]".green(), entry.path.clone().unwrap_or_default()),
            PlanStatus::Outdated => (
                "[R]".yellow(),
                format!("{} -> {}", entry.producer.clone().unwrap_or_default(), entry.path.clone().unwrap_or_default()),
            ),
            PlanStatus::Pending => (
                "[S]".yellow(),
                format!("{} -> {}", entry.producer.clone().unwrap_or_default(), entry.path.clone().unwrap_or_default()),
            ),
            PlanStatus::Unresolved => (
                "[U]".red(),
                format!("{} -> ???", entry.producer.clone().unwrap_or_default()),
            ),
            PlanStatus::Missing => ("[X]".red(), "MISSING".yellow().to_string()),
        };
        println!("    {} {}:  {}", tag.bold(), entry.name, source);
    }
}

enum ReadJsonError {
    Missing,
    Invalid(serde_json::Error),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> std::result::Result<T, ReadJsonError> {
    let contents = std::fs::read_to_string(path).map_err(|_| ReadJsonError::Missing)?;
    serde_json::from_str(&contents).map_err(ReadJsonError::Invalid)
}

fn flow_file_error(path: &Path, err: ReadJsonError) -> Error {
    match err {
        ReadJsonError::Missing => Error::FlowFileMissing(path.to_path_buf()),
        ReadJsonError::Invalid(e) => Error::FlowFileInvalid(path.to_path_buf(), e),
    }
}

/// sfbuild discovers module collections and the platforms directory
/// relative to its own executable's directory.
fn sfbuild_home() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(Error::CurrentExe)?;
    Ok(exe.parent().expect("executable always has a parent directory").to_path_buf())
}

/// Shared module data directory, two levels above the install directory.
fn share_dir(sfbuild_home: &Path) -> PathBuf {
    sfbuild_home
        .join("..")
        .join("..")
        .join("share")
        .join("symbiflow")
}

/// Resolves `flow_cfg.dependencies` then `flow_cfg[platform].dependencies`,
/// later keys overwriting earlier ones, mirroring the reference's
/// `get_explicit_deps`.
fn explicit_dependencies(
    flow_cfg: &ProjectFlow,
    platform_section: &PlatformSection,
    env: &Environment,
) -> Result<IndexMap<String, PathValue>> {
    let mut deps = IndexMap::new();
    for (name, value) in flow_cfg.dependencies.iter().chain(platform_section.dependencies.iter()) {
        let resolved = env.resolve(value)?;
        let path = PathValue::try_from(&resolved).map_err(|e| Error::DependencyNotAPath(name.clone(), e))?;
        deps.insert(name.clone(), path);
    }
    Ok(deps)
}

/// Merges `platform_flow.values`, `flow_cfg.values`, then
/// `flow_cfg[platform].values`, each layer overwriting the last, mirroring
/// the reference's `get_flow_values`. Unlike explicit dependencies, these
/// are never environment-resolved here; resolution happens per-stage via
/// `Stage::merged_values` and module option overrides only.
fn flow_values(platform_flow: &PlatformFlow, flow_cfg: &ProjectFlow, platform_section: &PlatformSection) -> IndexMap<String, Value> {
    let mut values = platform_flow.values.clone();
    values.extend(flow_cfg.values.clone());
    values.extend(platform_section.values.clone());
    values
}

fn sfbuild_done() {
    println!("sfbuild: {}", "DONE".bold().green());
}
