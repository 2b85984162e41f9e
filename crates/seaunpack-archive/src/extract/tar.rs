use std::io::Read;

use crate::entry::EntryKind;
use crate::error::Error;
use crate::extract::{EntrySource, PendingEntry};
use crate::format::{ArchiveFormat, Decoder, TarCompress};
use crate::Result;

pub struct TarSource<R: Read> {
    archive: tar::Archive<Decoder<R>>,
    codec: TarCompress,
}

impl<R: Read> TarSource<R> {
    pub fn new(reader: R, codec: TarCompress) -> Result<Self> {
        let archive = tar::Archive::new(codec.decoder(reader)?);
        Ok(Self { archive, codec })
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn visit<F>(&mut self, mut visitor: F) -> Result<()>
    where
        F: FnMut(PendingEntry<'_>) -> Result<()>,
    {
        for entry in self.archive.entries().map_err(|_| Error::Corrupted)? {
            let mut entry = entry.map_err(|_| Error::Corrupted)?;

            let original_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
            let size = entry.size();
            let mode = entry.header().mode().ok();
            let entry_type = entry.header().entry_type();

            let kind = if entry_type.is_dir() {
                EntryKind::Directory
            } else if entry_type.is_symlink() || entry_type.is_hard_link() {
                let target = match entry.link_name() {
                    Ok(Some(t)) => t.into_owned(),
                    _ => return Err(Error::InvalidPath),
                };
                if entry_type.is_symlink() {
                    EntryKind::Symlink { target }
                } else {
                    EntryKind::Hardlink { target }
                }
            } else if entry_type.is_file() || entry_type.is_contiguous() || entry_type.is_gnu_sparse() {
                EntryKind::File
            } else {
                tracing::debug!(
                    "skipping tar entry {} of type {:?}",
                    original_path.display(),
                    entry_type
                );
                continue;
            };

            visitor(PendingEntry {
                original_path,
                size,
                mode,
                kind,
                reader: &mut entry,
            })?;
        }
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar(self.codec)
    }
}
