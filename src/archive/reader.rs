use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use super::codec;
use super::manifest::{Manifest, FORMAT_VERSION, MANIFEST_NAME};
use crate::document::Document;
use crate::error::ArchiveError;
use crate::snapshot::Snapshot;

const MAX_PREALLOC: u64 = 1 << 20;

/// Everything recovered from an archive
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveContents {
    pub manifest: Manifest,
    /// The exported snapshot, with its original document id and sequence
    pub snapshot: Snapshot,
}

/// Read an archive from disk
pub fn read_archive(path: impl AsRef<Path>) -> Result<ArchiveContents, ArchiveError> {
    let file = File::open(path.as_ref())?;
    read_from(BufReader::new(file))
}

/// Read an archive held in memory
pub fn decode_archive(bytes: &[u8]) -> Result<ArchiveContents, ArchiveError> {
    read_from(Cursor::new(bytes))
}

/// Rebuild a document from an archive on disk
pub fn import_archive(path: impl AsRef<Path>) -> Result<Document, ArchiveError> {
    let contents = read_archive(path)?;
    Ok(Document::from_snapshot(&contents.snapshot))
}

fn read_from<R: Read + Seek>(reader: R) -> Result<ArchiveContents, ArchiveError> {
    let mut archive = ZipArchive::new(reader)?;

    let manifest: Manifest = {
        let bytes = read_entry(&mut archive, MANIFEST_NAME).map_err(|err| match err {
            ArchiveError::Zip(ZipError::FileNotFound) => ArchiveError::MissingManifest,
            other => other,
        })?;
        serde_json::from_slice(&bytes)?
    };

    if manifest.format_version != FORMAT_VERSION {
        return Err(ArchiveError::UnsupportedVersion(manifest.format_version));
    }
    if manifest.entries.len() != manifest.element_count {
        return Err(ArchiveError::Corrupt(format!(
            "manifest lists {} entries but counts {} elements",
            manifest.entries.len(),
            manifest.element_count
        )));
    }

    let mut elements = Vec::with_capacity(manifest.element_count);
    for entry in &manifest.entries {
        let bytes = read_entry(&mut archive, &entry.name)?;
        let element = codec::decode_element(&bytes)?;
        if element.id() != entry.id || element.kind() != entry.kind {
            return Err(ArchiveError::Corrupt(format!(
                "entry {} does not hold {} {}",
                entry.name, entry.kind, entry.id
            )));
        }
        elements.push(element);
    }

    log::debug!(
        "Read archive of document {} at sequence {} ({} elements)",
        manifest.document_id,
        manifest.sequence,
        elements.len()
    );

    let snapshot = Snapshot::from_parts(
        manifest.document_id,
        manifest.sequence,
        manifest.captured_at,
        elements,
    );
    Ok(ArchiveContents { manifest, snapshot })
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut file = archive.by_name(name)?;
    let mut bytes = Vec::with_capacity(prealloc_hint(file.size()));
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

// The declared size comes from the archive itself, so it is only a hint
fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_size_is_capped() {
        assert_eq!(prealloc_hint(512), 512);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC as usize);
    }
}
