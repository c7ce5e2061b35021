// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

//! Flow document parsing, module reference resolution and stage
//! construction: the catalog of everything a platform flow declares.

mod error;
mod flow;
mod module_ref;
mod stage;

pub use error::{Error, Result};
pub use flow::{ModuleOptions, PlatformFlow, PlatformSection, ProjectFlow};
pub use module_ref::{discover_module_collections, resolve_module_ref};
pub use stage::{Catalog, Stage};
