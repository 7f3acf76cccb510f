//! Candidate filtering and result mapping.
//!
//! Converts expansion candidates into typed results and applies the
//! type / mount / metadata predicates. The mount filter reference is
//! resolved to a canonical key before this layer runs.

use std::collections::BTreeMap;

use sango_types::{drive_path_url, drive_url, DriveKey};

use crate::types::FileKind;

use super::expand::WorkingPath;
use super::{FsQueryResult, QueryOptions};

/// Compiled predicates for one query call.
pub(crate) struct ResultFilter {
    kind: Option<FileKind>,
    mount_key: Option<DriveKey>,
    metadata: Option<BTreeMap<String, String>>,
}

impl ResultFilter {
    pub(crate) fn new(opts: &QueryOptions, mount_key: Option<DriveKey>) -> Self {
        Self {
            kind: opts.kind,
            mount_key,
            metadata: opts.metadata.clone(),
        }
    }

    /// Classify a candidate and apply the predicates; `None` means the
    /// candidate is rejected. Candidates without a resolved stat never
    /// survive (a pruned branch cannot produce a result).
    pub(crate) fn apply(&self, candidate: WorkingPath) -> Option<FsQueryResult> {
        let stat = candidate.stat?;
        let kind = FileKind::classify(&stat);

        if let Some(wanted) = self.kind {
            if kind != wanted {
                return None;
            }
        }
        if let Some(mount_key) = self.mount_key {
            let is_match = kind == FileKind::Mount
                && stat.mount.is_some_and(|mount| mount.key == mount_key);
            if !is_match {
                return None;
            }
        }
        if let Some(metadata) = &self.metadata {
            let all_match = metadata
                .iter()
                .all(|(key, value)| stat.metadata.get(key) == Some(value));
            if !all_match {
                return None;
            }
        }

        let mount = (kind == FileKind::Mount)
            .then(|| stat.mount.map(|m| drive_url(&m.key)))
            .flatten();
        Some(FsQueryResult {
            kind,
            url: drive_path_url(&candidate.drive, &candidate.inner_path),
            path: candidate.path,
            drive: drive_url(&candidate.drive),
            mount,
            stat,
        })
    }
}
