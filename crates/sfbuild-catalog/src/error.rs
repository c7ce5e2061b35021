// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// `ConfigError`: missing or malformed flow/platform file, missing
/// required CLI argument, multiple producers for one artifact, unknown
/// module collection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("module collection `{0}` does not exist")]
    UnknownCollection(String),

    #[error("malformed module reference `{0}`: expected one ':' or none")]
    MalformedModuleRef(String),

    #[error("module file `{0}` does not exist")]
    ModuleNotFound(std::path::PathBuf),

    #[error(
        "dependency `{artifact}` is generated by stage `{first}` and stage `{second}`; \
         dependencies can have only one producer"
    )]
    MultipleProducers {
        artifact: String,
        first: String,
        second: String,
    },

    #[error("platform flow does not define any stage")]
    NoStages,

    #[error(transparent)]
    Resolve(#[from] sfbuild_common::Error),

    #[error(transparent)]
    Module(#[from] sfbuild_module::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
