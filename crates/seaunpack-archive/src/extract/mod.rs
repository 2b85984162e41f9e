//! Archive extraction support for ZIP and TAR formats.
//!
//! Every entry path goes through [`sanitize_path`] before anything touches the
//! disk. Nothing is cleaned up on failure: callers extract into a directory
//! they own and discard it as a whole.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use crate::classify::format_hint;
use crate::entry::{ArchiveReport, Entry, EntryKind};
use crate::error::{Error, Result};
use crate::format::{self, ArchiveFormat};
use crate::sanitize::{
    SanitizedPath, lexical_link_target, reject_symlink_components, sanitize_path,
    sanitize_symlink_target,
};

mod tar;
mod zip;

pub use tar::TarSource;
pub use zip::ZipSource;

/// An entry read from the archive but not yet written.
pub struct PendingEntry<'a> {
    pub original_path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
    pub reader: &'a mut dyn Read,
}

/// Archive-specific entry source.
pub trait EntrySource {
    /// Feed every entry to `visitor` in archive order, stopping at the first error.
    fn visit<F>(&mut self, visitor: F) -> Result<()>
    where
        F: FnMut(PendingEntry<'_>) -> Result<()>;

    fn format(&self) -> ArchiveFormat;
}

/// Extract the archive at `archive` into `destination`, creating it if absent.
///
/// The format is sniffed from the content; the file name's suffix is only
/// consulted when sniffing is inconclusive.
pub fn extract_file(archive: &Path, destination: &Path) -> Result<ArchiveReport> {
    let file = File::open(archive).map_err(|e| Error::ExtractionFailed {
        path: archive.to_path_buf(),
        source: e,
    })?;
    let hint = archive
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(format_hint);

    let report = extract_from_reader(BufReader::new(file), destination, hint)?;
    tracing::debug!(
        "extracted {} entries ({} bytes) from {}",
        report.entry_count,
        report.total_bytes,
        archive.display()
    );
    Ok(report)
}

/// Extract archive with automatic format detection.
pub fn extract_from_reader<R: Read + Seek>(
    mut reader: R,
    destination: &Path,
    hint: Option<ArchiveFormat>,
) -> Result<ArchiveReport> {
    let format = format::detect_from_reader(&mut reader)?
        .or(hint)
        .ok_or(Error::UnsupportedFormat)?;

    match format {
        ArchiveFormat::Zip => {
            let mut source = ZipSource::new(reader)?;
            extract(&mut source, destination)
        }
        ArchiveFormat::Tar(codec) => {
            let mut source = TarSource::new(reader, codec)?;
            extract(&mut source, destination)
        }
    }
}

/// Main extraction pipeline.
///
/// Sanitizes each entry path against `destination` and writes it to disk.
pub fn extract<S: EntrySource>(source: &mut S, destination: &Path) -> Result<ArchiveReport> {
    ensure_directory(destination)?;

    let mut entries = Vec::new();
    let mut total_bytes = 0u64;

    source.visit(|mut pending| {
        let sanitized = sanitize_path(&pending.original_path, destination)?;
        write_entry(&mut pending, &sanitized, destination)?;

        total_bytes += pending.size;
        entries.push(Entry {
            original_path: pending.original_path,
            target_path: sanitized.resolved,
            size: pending.size,
            mode: pending.mode,
            kind: pending.kind,
        });
        Ok(())
    })?;

    Ok(ArchiveReport {
        format: source.format(),
        entry_count: entries.len(),
        total_bytes,
        entries,
    })
}

fn write_entry(pending: &mut PendingEntry<'_>, entry: &SanitizedPath, base: &Path) -> Result<()> {
    // Links written by earlier entries must never redirect this one
    reject_symlink_components(base, &entry.relative)?;
    let target_path = entry.resolved.as_path();

    match &pending.kind {
        EntryKind::File => write_file(pending.reader, target_path),
        EntryKind::Directory => ensure_directory(target_path),
        EntryKind::Symlink { target } => {
            let resolved = sanitize_symlink_target(target, target_path, base)?;
            let pointee = resolved.strip_prefix(base).map_err(|_| Error::InvalidPath)?;
            let link_dir = entry.relative.parent().unwrap_or(Path::new(""));
            ensure_parent(target_path)?;
            write_symlink(&lexical_link_target(link_dir, pointee), target_path)
        }
        EntryKind::Hardlink { target } => {
            let source = sanitize_path(target, base)?;
            reject_symlink_components(base, &source.relative)?;
            ensure_parent(target_path)?;
            std::fs::copy(&source.resolved, target_path)
                .map(|_| ())
                .map_err(|e| Error::LinkCreationFailed {
                    target: source.resolved,
                    link: target_path.to_path_buf(),
                    source: e,
                })
        }
    }
}

fn write_file(reader: &mut dyn Read, target_path: &Path) -> Result<()> {
    ensure_parent(target_path)?;
    let mut file = File::create(target_path).map_err(|e| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;
    std::io::copy(reader, &mut file)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_directory(parent),
        None => Ok(()),
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::unix::fs::symlink;
    symlink(target, link).map_err(|e| Error::LinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}

#[cfg(windows)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::windows::fs;
    let is_dir_target = link.parent().is_some_and(|p| p.join(target).is_dir());
    let result = if is_dir_target {
        fs::symlink_dir(target, link)
    } else {
        fs::symlink_file(target, link)
    };
    result.map_err(|e| Error::LinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}
