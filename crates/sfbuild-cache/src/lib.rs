// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

//! Persistent, content-addressed staleness cache keyed by `(path,
//! consumer)`, used by the planner to decide which stages must rerun.

mod cache;
mod digest;
mod error;

pub use cache::{SymbiCache, Status, TARGET_CONSUMER};
pub use digest::{fingerprint, Digest, Fingerprint};
pub use error::{Error, Result};
