// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// `PromiseViolation`: a stage exited zero but at least one of its declared
/// outputs is missing afterwards. `Internal` covers states the planner is
/// supposed to rule out (a required take still missing at exec time) —
/// reaching one means the plan and the catalog disagreed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("stage `{stage}` exited successfully but did not produce `{artifact}`")]
    PromiseViolation { stage: String, artifact: String },

    #[error("stage `{stage}` is missing required input `{input}` at execution time")]
    MissingRequiredInput { stage: String, input: String },

    #[error("target `{0}` has no producer and no existing path")]
    NoProducer(String),

    #[error(transparent)]
    Module(#[from] sfbuild_module::Error),

    #[error(transparent)]
    Cache(#[from] sfbuild_cache::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
