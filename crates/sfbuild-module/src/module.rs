// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use indexmap::IndexMap;
use sfbuild_common::PathValue;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWriteExt, AsyncReadExt};
use tokio::process::Command;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./module_test.rs"]
mod module_test;

/// The three modes a stage module is interrogated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Declare `takes`/`produces`/`meta`; no side effects.
    Io,
    /// Return resolved output paths for the given inputs; no side effects.
    Map,
    /// Perform the real work; output streamed to the operator's stdout.
    Exec,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Io => write!(f, "io"),
            Mode::Map => write!(f, "map"),
            Mode::Exec => write!(f, "exec"),
        }
    }
}

/// The `io` mode response: a module's declared interface.
#[derive(Debug, Deserialize, Serialize)]
pub struct IoResponse {
    pub takes: Vec<String>,
    pub produces: Vec<String>,
    #[serde(default)]
    pub meta: IndexMap<String, String>,
}

/// Invokes stage modules over their three-mode stdio protocol.
///
/// A module is any executable accepting a mode flag and reading one JSON
/// configuration document from stdin. The client passes the parent
/// process's environment through to every child unmodified (spec §6: "the
/// reference implementation passes its own process environment through to
/// child modules").
pub struct ModuleClient {
    share_dir: PathBuf,
}

impl ModuleClient {
    pub fn new(share_dir: PathBuf) -> Self {
        Self { share_dir }
    }

    /// Run `module` in `io` mode and parse its declared interface.
    pub async fn io(&self, module: &Path, config: &serde_json::Value) -> Result<IoResponse> {
        let mut cmd = Command::new(module);
        cmd.arg("--io");
        let (stdout, _stderr) = self.run_capturing(&mut cmd, module, Mode::Io, config).await?;
        serde_json::from_slice(&stdout).map_err(|source| Error::UnparseableOutput {
            path: module.to_path_buf(),
            mode: Mode::Io,
            source,
        })
    }

    /// Run `module` in `map` mode and parse the path-value mapping it
    /// returns, one entry per produced artifact.
    pub async fn map(
        &self,
        module: &Path,
        config: &serde_json::Value,
    ) -> Result<IndexMap<String, PathValue>> {
        let mut cmd = Command::new(module);
        cmd.arg("--map").arg("--share").arg(&self.share_dir);
        let (stdout, _stderr) = self.run_capturing(&mut cmd, module, Mode::Map, config).await?;
        serde_json::from_slice(&stdout).map_err(|source| Error::UnparseableOutput {
            path: module.to_path_buf(),
            mode: Mode::Map,
            source,
        })
    }

    /// Run `module` in `exec` mode, streaming its stdout to the operator's
    /// own stdout, and block until it completes.
    pub async fn exec(&self, module: &Path, config: &serde_json::Value) -> Result<()> {
        let mut cmd = Command::new(module);
        cmd.arg("--share")
            .arg(&self.share_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            path: module.to_path_buf(),
            source,
        })?;

        let payload = serde_json::to_vec(config).expect("module config is always serializable");
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.flush().await;
        }

        let status = child.wait().await.map_err(|source| Error::Spawn {
            path: module.to_path_buf(),
            source,
        })?;

        if !status.success() {
            return Err(Error::NonZeroExit {
                path: module.to_path_buf(),
                mode: Mode::Exec,
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn run_capturing(
        &self,
        cmd: &mut Command,
        module: &Path,
        mode: Mode,
        config: &serde_json::Value,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            path: module.to_path_buf(),
            source,
        })?;

        let payload = serde_json::to_vec(config).expect("module config is always serializable");
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.flush().await;
            drop(stdin);
        }

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        if let Some(mut out) = child.stdout.take() {
            let _ = out.read_to_end(&mut stdout).await;
        }
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_end(&mut stderr).await;
        }

        let status = child.wait().await.map_err(|source| Error::Spawn {
            path: module.to_path_buf(),
            source,
        })?;

        if !status.success() {
            tracing::error!(path = %module.display(), %mode, code = ?status.code(), "module failed");
            return Err(Error::NonZeroExit {
                path: module.to_path_buf(),
                mode,
                code: status.code(),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        Ok((stdout, stderr))
    }
}
