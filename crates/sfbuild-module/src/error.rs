// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

use crate::Mode;

/// `ModuleFailure`: a module exited non-zero or produced unparseable
/// output. Reported with the module path, the mode, and both captured
/// streams.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn module `{path}`")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "module `{path}` failed with code {code:?} in `{mode}` mode\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}"
    )]
    NonZeroExit {
        path: PathBuf,
        mode: Mode,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("module `{path}` produced unparseable {mode} output: {source}")]
    UnparseableOutput {
        path: PathBuf,
        mode: Mode,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
