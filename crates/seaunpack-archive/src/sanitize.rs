use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    /// Normalized path below the base, free of `.` and `..`.
    pub relative: PathBuf,
    pub resolved: PathBuf,
}

/// Resolve an entry path under `base`, rejecting anything that would land outside it.
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();

    if entry_path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::InvalidPath);
    }

    // Reject absolute paths (zip-slip protection)
    if entry_path.has_root() {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved: entry_path.to_path_buf(),
        });
    }

    let relative = normalize_relative(entry_path).ok_or_else(|| Error::ZipSlip {
        entry: entry_path.to_path_buf(),
        resolved: base.join(entry_path),
    })?;

    Ok(SanitizedPath {
        resolved: base.join(&relative),
        relative,
    })
}

/// Validate a symlink target, returning the absolute path it resolves to.
pub fn sanitize_symlink_target<P: AsRef<Path>, L: AsRef<Path>, B: AsRef<Path>>(
    target: P,
    symlink_location: L,
    base: B,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let symlink_location = symlink_location.as_ref();
    let base = base.as_ref();

    if target.has_root() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: symlink_location.to_path_buf(),
        });
    }

    // Resolve relative to the directory holding the link, expressed relative to base
    let link_dir = symlink_location
        .parent()
        .and_then(|p| p.strip_prefix(base).ok())
        .unwrap_or_else(|| Path::new(""));

    let escape = || Error::SymlinkEscape {
        target: target.to_path_buf(),
        resolved: symlink_location
            .parent()
            .unwrap_or(base)
            .join(target),
    };

    let relative = normalize_relative(&link_dir.join(target)).ok_or_else(escape)?;
    Ok(base.join(relative))
}

/// Fail if walking `relative` down from `base` passes through a symlink on disk.
///
/// The textual checks above cannot see links written by earlier entries of the
/// same archive, so every write and link target is re-checked against the
/// tree as it exists at that moment.
pub(crate) fn reject_symlink_components(base: &Path, relative: &Path) -> Result<()> {
    let mut current = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                current.push(part);
                if let Ok(meta) = std::fs::symlink_metadata(&current) {
                    if meta.file_type().is_symlink() {
                        return Err(Error::SymlinkInPath { path: current });
                    }
                }
            }
            Component::ParentDir => {
                if !current.pop() || !current.starts_with(base) {
                    return Err(Error::InvalidPath);
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(Error::InvalidPath),
        }
    }
    Ok(())
}

/// Spell a link from `link_dir` to `pointee` (both normalized, relative to the
/// same base) as leading `..` segments followed by plain names.
///
/// The `..` segments only climb directories that exist for real, so the link
/// cannot be bent outside the base by symlinks extracted after it.
pub(crate) fn lexical_link_target(link_dir: &Path, pointee: &Path) -> PathBuf {
    let from: Vec<_> = link_dir.components().collect();
    let to: Vec<_> = pointee.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut target = PathBuf::new();
    for _ in common..from.len() {
        target.push("..");
    }
    for part in &to[common..] {
        target.push(part);
    }
    if target.as_os_str().is_empty() {
        target.push(".");
    }
    target
}

/// Collapse `.` and `..` components of a relative path.
///
/// Returns `None` when a `..` would climb above the starting directory or a
/// root/prefix component appears.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Normal(part) => {
                result.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                result.pop();
                depth -= 1;
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(result)
}
