// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use indexmap::indexmap;
use sfbuild_cache::SymbiCache;
use sfbuild_catalog::{Catalog, PlatformFlow};
use sfbuild_plan::Planner;

use super::*;

/// A shell-script fixture module: `--io` reports a fixed interface,
/// `--map` reports a fixed path mapping, and plain invocation (exec mode)
/// runs `exec_body` (typically writing the promised output file).
fn write_module(dir: &Path, name: &str, takes: &str, produces: &str, map_body: &str, exec_body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "#!/bin/sh\nif [ \"$1\" = \"--io\" ]; then\n  cat >/dev/null\n  echo '{{\"takes\": [{takes}], \"produces\": [{produces}], \"meta\": {{}}}}'\nelif [ \"$1\" = \"--map\" ]; then\n  cat >/dev/null\n  echo '{map_body}'\nelse\n  cat >/dev/null\n  {exec_body}\nfi\n"
        ),
    )
    .unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn trivial_single_stage_execution_creates_output_and_clears_run_stages() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.bit");
    write_module(
        dir.path(),
        "gen",
        "",
        "\"bitstream\"",
        &format!(r#"{{"bitstream": "{}"}}"#, out.display()),
        &format!("touch {}", out.display()),
    );
    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"gen": "{0}/gen"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = sfbuild_common::Environment::new(indexmap! {});
    let client = sfbuild_module::ModuleClient::new(dir.path().to_path_buf());
    let catalog = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap();

    let mut cache = SymbiCache::new();
    let planner = Planner::new(&catalog, "demo", indexmap! {}, indexmap! {}, &mut cache, &client);
    let plan = planner.plan("bitstream").await.unwrap();
    assert!(plan.run_stages.contains("gen"));

    let mut executor = Executor::new(&catalog, "demo", indexmap! {}, &client, &mut cache, plan);
    executor.execute("bitstream").await.unwrap();

    assert!(out.exists());
}

#[tokio::test]
async fn chained_stages_realise_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let mid = dir.path().join("mid.txt");
    let out = dir.path().join("out.bit");
    write_module(
        dir.path(),
        "gen",
        "",
        "\"constraints\"",
        &format!(r#"{{"constraints": "{}"}}"#, mid.display()),
        &format!("touch {}", mid.display()),
    );
    write_module(
        dir.path(),
        "pack",
        "\"constraints\"",
        "\"bitstream\"",
        &format!(r#"{{"bitstream": "{}"}}"#, out.display()),
        &format!(
            "if [ ! -f {} ]; then exit 1; fi; touch {}",
            mid.display(),
            out.display()
        ),
    );
    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"gen": "{0}/gen", "pack": "{0}/pack"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = sfbuild_common::Environment::new(indexmap! {});
    let client = sfbuild_module::ModuleClient::new(dir.path().to_path_buf());
    let catalog = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap();

    let mut cache = SymbiCache::new();
    let planner = Planner::new(&catalog, "demo", indexmap! {}, indexmap! {}, &mut cache, &client);
    let plan = planner.plan("bitstream").await.unwrap();
    assert!(plan.run_stages.contains("gen"));
    assert!(plan.run_stages.contains("pack"));

    let mut executor = Executor::new(&catalog, "demo", indexmap! {}, &client, &mut cache, plan);
    executor.execute("bitstream").await.unwrap();

    assert!(mid.exists());
    assert!(out.exists());
}

#[tokio::test]
async fn missing_declared_output_is_a_promise_violation() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.bit");
    write_module(
        dir.path(),
        "gen",
        "",
        "\"bitstream\"",
        &format!(r#"{{"bitstream": "{}"}}"#, out.display()),
        "true",
    );
    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"gen": "{0}/gen"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = sfbuild_common::Environment::new(indexmap! {});
    let client = sfbuild_module::ModuleClient::new(dir.path().to_path_buf());
    let catalog = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap();

    let mut cache = SymbiCache::new();
    let planner = Planner::new(&catalog, "demo", indexmap! {}, indexmap! {}, &mut cache, &client);
    let plan = planner.plan("bitstream").await.unwrap();

    let mut executor = Executor::new(&catalog, "demo", indexmap! {}, &client, &mut cache, plan);
    let err = executor.execute("bitstream").await.unwrap_err();
    match err {
        Error::PromiseViolation { stage, artifact } => {
            assert_eq!(stage, "gen");
            assert_eq!(artifact, "bitstream");
        }
        other => panic!("expected PromiseViolation, got {other:?}"),
    }
}
