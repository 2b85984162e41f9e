//! Remote paths are absolute, `/`-separated strings rooted at the library.

use std::path::{Component, Path};

pub const ROOT: &str = "/";

/// Append `name` to `parent` with exactly one separator between them.
pub fn join(parent: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Append a local relative path, converting its components to `/` separators.
pub fn join_relative(parent: &str, relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .fold(parent.to_string(), |acc, part| join(&acc, &part))
}

/// Parent of a remote path; the parent of the root is the root.
pub fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Canonical form: leading `/`, no trailing `/` except for the root itself.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn is_root(path: &str) -> bool {
    path.trim_end_matches('/').is_empty()
}
