// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[error("the provided flow definition file does not exist: {0}")]
    FlowFileMissing(PathBuf),

    #[error("flow definition file {0} is not valid: {1}")]
    FlowFileInvalid(PathBuf, #[source] serde_json::Error),

    #[error(
        "the platform flow definition file {path} for platform `{platform}` referenced in {flow_path} cannot be found"
    )]
    PlatformFileMissing {
        path: PathBuf,
        platform: String,
        flow_path: PathBuf,
    },

    #[error("platform flow file {0} is not valid: {1}")]
    PlatformFileInvalid(PathBuf, #[source] serde_json::Error),

    #[error("please specify a desired target using `-t`/`--target`")]
    MissingTarget,

    #[error(transparent)]
    Catalog(#[from] sfbuild_catalog::Error),

    #[error(transparent)]
    Plan(#[from] sfbuild_plan::Error),

    #[error(transparent)]
    Exec(#[from] sfbuild_exec::Error),

    #[error(transparent)]
    Resolve(#[from] sfbuild_common::Error),

    #[error("failed to save build cache to {0}")]
    CacheSave(PathBuf, #[source] sfbuild_cache::Error),

    #[error("interrupted")]
    Interrupted,

    #[error("could not determine sfbuild's own install directory: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("dependency `{0}` does not resolve to a path or path structure: {1}")]
    DependencyNotAPath(String, #[source] serde_json::Error),
}
