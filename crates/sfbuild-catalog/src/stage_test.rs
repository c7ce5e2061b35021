// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::os::unix::fs::PermissionsExt;

use indexmap::indexmap;

use super::*;
use crate::flow::PlatformFlow;

fn write_module(dir: &Path, name: &str, takes: &str, produces: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "#!/bin/sh\ncat >/dev/null\necho '{{\"takes\": [{takes}], \"produces\": [{produces}], \"meta\": {{}}}}'\n"
        ),
    )
    .unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn loads_stages_and_builds_output_map() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "synth", "", "\"netlist\"");
    write_module(dir.path(), "place", "\"netlist\"", "\"bitstream\"");

    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"synth": "{0}/synth", "place": "{0}/place"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = Environment::new(indexmap! {});
    let client = ModuleClient::new(dir.path().to_path_buf());
    let catalog = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap();

    assert_eq!(catalog.stages.len(), 2);
    let output_map = catalog.output_map();
    assert_eq!(output_map["bitstream"].name, "place");
    assert_eq!(output_map["netlist"].name, "synth");
}

#[tokio::test]
async fn multiple_producers_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "a", "", "\"bitstream\"");
    write_module(dir.path(), "b", "", "\"bitstream\"");

    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"a": "{0}/a", "b": "{0}/b"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = Environment::new(indexmap! {});
    let client = ModuleClient::new(dir.path().to_path_buf());
    let err = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap_err();
    assert!(matches!(err, Error::MultipleProducers { .. }));
}

#[tokio::test]
async fn missing_module_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let platform_flow: PlatformFlow = serde_json::from_str(&format!(
        r#"{{"modules": {{"ghost": "{0}/does-not-exist"}}}}"#,
        dir.path().display()
    ))
    .unwrap();

    let env = Environment::new(indexmap! {});
    let client = ModuleClient::new(dir.path().to_path_buf());
    let err = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap_err();
    assert!(matches!(err, Error::ModuleNotFound(_)));
}

#[tokio::test]
async fn no_stages_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let platform_flow: PlatformFlow = serde_json::from_str(r#"{"modules": {}}"#).unwrap();
    let env = Environment::new(indexmap! {});
    let client = ModuleClient::new(dir.path().to_path_buf());
    let err = Catalog::load(&platform_flow, &env, dir.path(), &client).await.unwrap_err();
    assert!(matches!(err, Error::NoStages));
}
