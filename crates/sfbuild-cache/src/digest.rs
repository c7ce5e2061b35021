// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use data_encoding::BASE32;
use ring::digest::{Context, SHA256};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::Result;

/// A content digest, rendered as unpadded base32 for use in diagnostics and
/// the persisted cache file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(#[serde(with = "digest_bytes")] [u8; 32]);

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE32.encode(&self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

mod digest_bytes {
    use data_encoding::BASE32;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE32.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = BASE32
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|_| serde::de::Error::custom("digest must be 32 bytes"))
    }
}

/// The fingerprint of a dependency's content: either a content digest, or
/// the distinguished `Absent` value for a path that does not currently
/// exist. `Absent` is a separate variant, never a magic byte pattern, so it
/// can never collide with a real digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Fingerprint {
    Absent,
    Hash(Digest),
}

/// Compute the current fingerprint of `path`.
///
/// Files are hashed directly. Directories are hashed by feeding a sorted,
/// deterministic walk of `(relative path, file digest)` pairs into one
/// running hasher, matching spec §4.2's "stable serialization of their file
/// list plus each file's hash."
pub fn fingerprint(path: &Path) -> Result<Fingerprint> {
    if path.is_file() {
        return Ok(Fingerprint::Hash(hash_file(path)?));
    }
    if path.is_dir() {
        return Ok(Fingerprint::Hash(hash_dir(path)?));
    }
    Ok(Fingerprint::Absent)
}

fn hash_file(path: &Path) -> Result<Digest> {
    let mut file = fs::File::open(path).map_err(|e| crate::Error::Io(path.to_path_buf(), e))?;
    let mut ctx = Context::new(&SHA256);
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| crate::Error::Io(path.to_path_buf(), e))?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
    }
    Ok(Digest(ctx.finish().as_ref().try_into().expect("sha256 is 32 bytes")))
}

fn hash_dir(path: &Path) -> Result<Digest> {
    let mut entries: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    entries.sort();

    let mut ctx = Context::new(&SHA256);
    for entry in entries {
        let rel = entry.strip_prefix(path).unwrap_or(&entry);
        ctx.update(rel.to_string_lossy().as_bytes());
        ctx.update(b"\0");
        let file_digest = hash_file(&entry)?;
        ctx.update(file_digest.to_string().as_bytes());
        ctx.update(b"\n");
    }
    Ok(Digest(ctx.finish().as_ref().try_into().expect("sha256 is 32 bytes")))
}
