// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while resolving values against an [`crate::Environment`].
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("unknown reference `${{{name}}}` in {context}")]
    UnknownReference { name: String, context: String },

    #[error("cyclic reference detected while expanding `${{{name}}}` in {context}")]
    CyclicReference { name: String, context: String },
}

pub type Result<T> = std::result::Result<T, Error>;
