// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{Error, Result};

/// Scan `sfbuild_home` for module collection directories matching
/// `sf_<name>_modules`, mapping each collection name to its directory.
pub fn discover_module_collections(sfbuild_home: &Path) -> IndexMap<String, PathBuf> {
    let mut collections = IndexMap::new();
    let Ok(entries) = fs::read_dir(sfbuild_home) else {
        return collections;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(collection) = name.strip_prefix("sf_").and_then(|s| s.strip_suffix("_modules")) {
            collections.insert(collection.to_owned(), entry.path());
        }
    }
    collections
}

/// Resolve a module reference string to a concrete executable path.
///
/// `modstr` is either a bare filesystem path, or `<collection>:<name>`.
/// Exactly zero or one `:` is permitted.
pub fn resolve_module_ref(
    modstr: &str,
    collections: &IndexMap<String, PathBuf>,
) -> Result<PathBuf> {
    let parts: Vec<&str> = modstr.split(':').collect();
    match parts.as_slice() {
        [path] => Ok(PathBuf::from(path)),
        [collection, name] => {
            let col_path = collections
                .get(*collection)
                .ok_or_else(|| Error::UnknownCollection((*collection).to_owned()))?;
            Ok(col_path.join(name))
        }
        _ => Err(Error::MalformedModuleRef(modstr.to_owned())),
    }
}

#[cfg(test)]
mod module_ref_test {
    use super::*;

    #[test]
    fn bare_path_is_used_directly() {
        let collections = IndexMap::new();
        let p = resolve_module_ref("/opt/modules/bitstream", &collections).unwrap();
        assert_eq!(p, PathBuf::from("/opt/modules/bitstream"));
    }

    #[test]
    fn collection_reference_resolves_against_discovered_dir() {
        let mut collections = IndexMap::new();
        collections.insert("xc7".to_owned(), PathBuf::from("/home/sfbuild/sf_xc7_modules"));
        let p = resolve_module_ref("xc7:bitstream", &collections).unwrap();
        assert_eq!(p, PathBuf::from("/home/sfbuild/sf_xc7_modules/bitstream"));
    }

    #[test]
    fn unknown_collection_is_an_error() {
        let collections = IndexMap::new();
        let err = resolve_module_ref("xc7:bitstream", &collections).unwrap_err();
        assert!(matches!(err, Error::UnknownCollection(name) if name == "xc7"));
    }

    #[test]
    fn two_colons_is_a_syntax_error() {
        let collections = IndexMap::new();
        let err = resolve_module_ref("a:b:c", &collections).unwrap_err();
        assert!(matches!(err, Error::MalformedModuleRef(_)));
    }

    #[test]
    fn discover_finds_collection_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sf_xc7_modules")).unwrap();
        fs::create_dir(dir.path().join("sf_ice40_modules")).unwrap();
        fs::create_dir(dir.path().join("platforms")).unwrap();
        let collections = discover_module_collections(dir.path());
        assert_eq!(collections.len(), 2);
        assert!(collections.contains_key("xc7"));
        assert!(collections.contains_key("ice40"));
    }
}
