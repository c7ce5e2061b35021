// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::digest::{fingerprint, Fingerprint};
use crate::Result;

#[cfg(test)]
#[path = "./cache_test.rs"]
mod cache_test;

/// The sentinel consumer recorded when the target artifact itself is
/// realised, as opposed to being consumed by a downstream stage.
pub const TARGET_CONSUMER: &str = "__target";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Same,
    Changed,
    Untracked,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
struct Key {
    path: PathBuf,
    consumer: String,
}

#[derive(Serialize, Deserialize)]
struct Record {
    #[serde(flatten)]
    key: Key,
    fingerprint: Fingerprint,
}

/// Persistent `(path, consumer) -> content fingerprint` table used to
/// decide which stages the planner must schedule.
///
/// A record is rewritten whenever a consumer observes an artifact; records
/// are never individually deleted, only replaced by wholesale cache
/// removal (deleting the cache file).
#[derive(Default)]
pub struct SymbiCache {
    records: HashMap<Key, Fingerprint>,
}

impl SymbiCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from `path`. A missing or unparsable file is not
    /// fatal: the cache just starts empty (spec §7, `CacheIOError` is
    /// "non-fatal on read").
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Vec<Record>>(&contents) {
                Ok(records) => {
                    let records = records.into_iter().map(|r| (r.key, r.fingerprint)).collect();
                    Self { records }
                }
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "cache file is unparsable, starting empty");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::debug!(%err, path = %path.display(), "no existing cache file");
                Self::default()
            }
        }
    }

    /// Persist the entire table to `path`. Fatal on failure: the operator
    /// asked for this run's fingerprints to be durable.
    pub fn save(&self, path: &Path) -> Result<()> {
        let records: Vec<Record> = self
            .records
            .iter()
            .map(|(key, fingerprint)| Record {
                key: key.clone(),
                fingerprint: *fingerprint,
            })
            .collect();
        let json = serde_json::to_string_pretty(&records)
            .expect("Record serialization is infallible for this shape");
        fs::write(path, json).map_err(|e| crate::Error::Save(path.to_path_buf(), e))
    }

    /// Classify `path` relative to `consumer`'s last recorded fingerprint.
    ///
    /// Pure: does not write a record. The "first untracked look also
    /// records" policy (spec §4.2) belongs to whichever caller owns that
    /// look (the planner's `dep_differ`), so that repeated calls to
    /// `get_status` stay side-effect free and testable in isolation.
    pub fn get_status(&self, path: &Path, consumer: &str) -> Status {
        let key = Key {
            path: path.to_path_buf(),
            consumer: consumer.to_owned(),
        };
        let Some(recorded) = self.records.get(&key) else {
            return Status::Untracked;
        };
        match fingerprint(path) {
            Ok(current) if current == *recorded => Status::Same,
            Ok(_) => Status::Changed,
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "could not fingerprint path, treating as changed");
                Status::Changed
            }
        }
    }

    /// Record the current fingerprint of `path` under `consumer`.
    pub fn update(&mut self, path: &Path, consumer: &str) {
        let key = Key {
            path: path.to_path_buf(),
            consumer: consumer.to_owned(),
        };
        match fingerprint(path) {
            Ok(fp) => {
                self.records.insert(key, fp);
            }
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "could not fingerprint path for update");
            }
        }
    }
}
