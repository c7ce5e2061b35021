// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// `UnreachableTarget`: the planner could not supply a required input for
/// a stage that would otherwise produce the requested target. Reported
/// with the offending stage and the missing input's name.
#[derive(Debug, Error)]
pub enum Error {
    #[error("stage `{stage}` is unreachable due to unmet dependency `{input}`")]
    UnreachableTarget { stage: String, input: String },

    #[error("target `{0}` has no producer and no explicit path")]
    NoProducer(String),

    #[error(transparent)]
    Module(#[from] sfbuild_module::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
