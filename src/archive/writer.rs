use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::codec;
use super::manifest::{self, Manifest, ManifestEntry, FORMAT_VERSION, MANIFEST_NAME};
use crate::config::{Compression, ExportConfig};
use crate::element::ElementId;
use crate::error::EncodeError;
use crate::id_generator;
use crate::snapshot::Snapshot;

/// Options controlling how a snapshot is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Abort on the first element that cannot be serialized
    pub strict: bool,
    pub compression: Compression,
}

impl From<&ExportConfig> for WriteOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            strict: config.strict,
            compression: config.compression,
        }
    }
}

/// An element left out of a best-effort archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    pub id: ElementId,
    pub reason: String,
}

/// Summary of a finished write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub element_count: usize,
    pub sequence: u64,
    pub skipped: Vec<SkippedElement>,
}

/// Why a write stopped before producing an archive
#[derive(Debug)]
pub enum WriteError {
    Io(io::Error),
    Serialization { id: ElementId, source: EncodeError },
    Cancelled,
}

impl From<io::Error> for WriteError {
    fn from(err: io::Error) -> Self {
        WriteError::Io(err)
    }
}

impl From<ZipError> for WriteError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(err) => WriteError::Io(err),
            other => WriteError::Io(io::Error::other(other)),
        }
    }
}

/// Hooks the writer calls between entries
pub trait WriteObserver {
    /// Polled before each entry and before the archive is finalised
    fn is_cancelled(&self) -> bool {
        false
    }

    /// Called after each element has been handled, written or skipped
    fn entry_written(&mut self, _done: usize, _total: usize) {}
}

impl WriteObserver for () {}

/// Serialize a snapshot into an in-memory archive.
///
/// Entry timestamps are pinned, so the same snapshot always yields the same
/// bytes.
pub fn encode_snapshot(snapshot: &Snapshot, options: WriteOptions) -> Result<(Vec<u8>, WriteReport), WriteError> {
    let (cursor, report) = write_entries(snapshot, Cursor::new(Vec::new()), options, &mut ())?;
    Ok((cursor.into_inner(), report))
}

/// Write a snapshot to `destination`.
///
/// The archive is written to a uniquely named temporary file next to the
/// destination and renamed into place only after it is complete, so readers
/// never see a partial archive. Any failure or cancellation removes the
/// temporary file.
pub fn write_archive(
    snapshot: &Snapshot,
    destination: &Path,
    options: WriteOptions,
    observer: &mut dyn WriteObserver,
) -> Result<WriteReport, WriteError> {
    let partial = PartialFile::create(destination)?;
    log::debug!(
        "Writing {} elements to {}",
        snapshot.len(),
        partial.path.display()
    );

    let file = partial.open()?;
    let (sink, report) = write_entries(snapshot, BufWriter::new(file), options, observer)?;
    let file = sink.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    drop(file);

    if observer.is_cancelled() {
        return Err(WriteError::Cancelled);
    }

    partial.persist(destination)?;
    log::info!(
        "Wrote archive {} ({} elements, {} skipped)",
        destination.display(),
        report.element_count,
        report.skipped.len()
    );
    Ok(report)
}

fn write_entries<W: Write + Seek>(
    snapshot: &Snapshot,
    sink: W,
    options: WriteOptions,
    observer: &mut dyn WriteObserver,
) -> Result<(W, WriteReport), WriteError> {
    let method = match options.compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
    };
    let mut zip = ZipWriter::new(sink);
    let total = snapshot.len();
    let mut entries = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (z_index, element) in snapshot.elements().iter().enumerate() {
        if observer.is_cancelled() {
            return Err(WriteError::Cancelled);
        }

        match codec::encode_element(element, z_index) {
            Ok(bytes) => {
                let name = manifest::entry_name(z_index, element.id());
                zip.start_file(name.as_str(), entry_options(method))?;
                zip.write_all(&bytes)?;
                entries.push(ManifestEntry {
                    name,
                    id: element.id(),
                    kind: element.kind(),
                });
            }
            Err(source) if options.strict => {
                log::error!("Failed to serialize element {}: {}", element.id(), source);
                return Err(WriteError::Serialization {
                    id: element.id(),
                    source,
                });
            }
            Err(source) => {
                log::warn!("Skipping element {}: {}", element.id(), source);
                skipped.push(SkippedElement {
                    id: element.id(),
                    reason: source.to_string(),
                });
            }
        }

        observer.entry_written(z_index + 1, total);
    }

    if observer.is_cancelled() {
        return Err(WriteError::Cancelled);
    }

    let manifest = Manifest {
        format_version: FORMAT_VERSION,
        document_id: snapshot.document_id(),
        sequence: snapshot.sequence(),
        captured_at: snapshot.captured_at(),
        element_count: entries.len(),
        entries,
        skipped: skipped.iter().map(|s| s.id).collect(),
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest).map_err(io::Error::other)?;
    zip.start_file(MANIFEST_NAME, entry_options(method))?;
    zip.write_all(&manifest_bytes)?;

    let sink = zip.finish()?;
    let report = WriteReport {
        element_count: manifest.element_count,
        sequence: manifest.sequence,
        skipped,
    };
    Ok((sink, report))
}

// Fixed timestamp and permissions keep the output reproducible
fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644)
}

/// Temporary archive file, removed on drop unless persisted
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn create(destination: &Path) -> io::Result<Self> {
        let file_name = destination
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
        let name = format!(
            ".{}.{}.partial",
            file_name.to_string_lossy(),
            id_generator::temp_token()
        );
        let path = match destination.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        };
        Ok(Self {
            path,
            persisted: false,
        })
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(&self.path)
    }

    fn persist(mut self, destination: &Path) -> io::Result<()> {
        fs::rename(&self.path, destination)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed partial archive {}", self.path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("Failed to remove partial archive {}: {}", self.path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::element::{factory, Color, Point};
    use crate::operation::Operation;

    struct CancelAfter {
        limit: usize,
        done: usize,
    }

    impl WriteObserver for CancelAfter {
        fn is_cancelled(&self) -> bool {
            self.done >= self.limit
        }

        fn entry_written(&mut self, done: usize, _total: usize) {
            self.done = done;
        }
    }

    fn document(count: usize) -> Document {
        let mut document = Document::new();
        for i in 0..count {
            let stroke = factory::create_stroke(vec![Point::new(i as f32, 0.0)], 1.0, Color::BLACK);
            document.apply_operation(Operation::add(stroke)).unwrap();
        }
        document
    }

    #[test]
    fn test_cancel_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("paper.zip");
        let snapshot = Snapshot::capture(&document(5));

        let mut observer = CancelAfter { limit: 2, done: 0 };
        let result = write_archive(&snapshot, &destination, WriteOptions::default(), &mut observer);

        assert!(matches!(result, Err(WriteError::Cancelled)));
        assert_eq!(observer.done, 2);
        assert!(!destination.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing").join("paper.zip");
        let snapshot = Snapshot::capture(&document(1));

        let result = write_archive(&snapshot, &destination, WriteOptions::default(), &mut ());
        assert!(matches!(result, Err(WriteError::Io(_))));
        assert!(!destination.exists());
    }

    #[test]
    fn test_stored_and_deflated_both_write() {
        let snapshot = Snapshot::capture(&document(3));
        for compression in [Compression::Stored, Compression::Deflated] {
            let options = WriteOptions {
                strict: true,
                compression,
            };
            let (bytes, report) = encode_snapshot(&snapshot, options).unwrap();
            assert!(!bytes.is_empty());
            assert_eq!(report.element_count, 3);
            assert!(report.skipped.is_empty());
        }
    }
}
