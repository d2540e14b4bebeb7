//! Zip archive expansion into a Buffer Set.
//!
//! Expansion runs in passes. Each pass decodes every archive currently in the
//! set into a staging map, then merges the staging map and drops the archive
//! keys. Archives found inside archives are picked up by the next pass.

use std::io::{Cursor, Read};

use bytes::Bytes;
use corelib::{IntakeError, IntakeResult};
use indexmap::IndexMap;
use zip::ZipArchive;

use crate::{buffers::BufferSet, paths};

/// Maximum number of nested archive levels that will be unpacked.
pub const MAX_ARCHIVE_DEPTH: usize = 8;

/// What an expansion did to the Buffer Set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Archives that were unpacked and removed.
    pub archives: Vec<String>,
    /// Member files inserted.
    pub members: usize,
    /// Keys whose previous content was replaced by a member.
    pub overwritten: Vec<String>,
}

/// Expand every zip archive in `buffers` in place.
pub fn expand_archives(buffers: &mut BufferSet) -> IntakeResult<ExpansionReport> {
    let mut report = ExpansionReport::default();

    for depth in 0.. {
        let pending: Vec<String> = buffers
            .paths()
            .filter(|p| paths::is_zip(p))
            .map(str::to_owned)
            .collect();
        if pending.is_empty() {
            break;
        }
        if depth == MAX_ARCHIVE_DEPTH {
            return Err(IntakeError::decode(
                pending[0].clone(),
                format!("archives nested deeper than {MAX_ARCHIVE_DEPTH} levels"),
            ));
        }

        let mut staging: IndexMap<String, Bytes> = IndexMap::new();
        for archive_path in &pending {
            if let Some(data) = buffers.get(archive_path) {
                let members = read_archive(archive_path, data)?;
                log::debug!("Unpacked '{}': {} member(s)", archive_path, members.len());
                staging.extend(members);
            }
        }

        for archive_path in &pending {
            buffers.remove(archive_path);
        }
        for (path, data) in staging {
            report.members += 1;
            if buffers.insert(&path, data).is_some() {
                log::warn!("Archive member '{}' replaced an existing file", path);
                report.overwritten.push(path);
            }
        }
        report.archives.extend(pending);
    }

    Ok(report)
}

/// Decode a zip container into its (normalized path, content) members.
/// Directory entries are skipped.
pub fn read_archive(archive_path: &str, data: &Bytes) -> IntakeResult<Vec<(String, Bytes)>> {
    let mut archive = ZipArchive::new(Cursor::new(data.clone()))
        .map_err(|e| IntakeError::decode(archive_path, e))?;

    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| IntakeError::decode(archive_path, e))?;
        if file.is_dir() {
            continue;
        }

        let name = paths::normalize(file.name());
        let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut content)
            .map_err(|e| IntakeError::decode(archive_path, e))?;
        members.push((name, Bytes::from(content)));
    }

    Ok(members)
}
