// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

//! Executes a [`sfbuild_plan::Plan`]: runs the scheduled stages in `exec`
//! mode, in dependency order, keeping the cache in sync as it goes.

mod error;
mod exec;

pub use error::{Error, Result};
pub use exec::Executor;
