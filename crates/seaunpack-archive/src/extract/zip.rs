use std::io::{Read, Seek};
use std::path::PathBuf;

use crate::entry::EntryKind;
use crate::error::Error;
use crate::extract::{EntrySource, PendingEntry};
use crate::format::ArchiveFormat;
use crate::Result;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(|_| Error::Corrupted)?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn visit<F>(&mut self, mut visitor: F) -> Result<()>
    where
        F: FnMut(PendingEntry<'_>) -> Result<()>,
    {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(|_| Error::Corrupted)?;

            let original_path = PathBuf::from(file.name());
            let size = file.size();
            let mode = file.unix_mode();

            let kind = if file.is_dir() {
                EntryKind::Directory
            } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                // Link targets are stored as the entry body
                let mut target = String::new();
                file.read_to_string(&mut target)
                    .map_err(|_| Error::Corrupted)?;
                EntryKind::Symlink {
                    target: PathBuf::from(target),
                }
            } else {
                EntryKind::File
            };

            visitor(PendingEntry {
                original_path,
                size,
                mode,
                kind,
                reader: &mut file,
            })?;
        }
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}
