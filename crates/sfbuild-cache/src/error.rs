// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

/// `CacheIOError`: reading the cache file is non-fatal (the cache simply
/// starts empty); writing it is fatal, since the operator explicitly asked
/// for the run's fingerprints to be persisted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {0}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to save cache file {0}")]
    Save(PathBuf, #[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
