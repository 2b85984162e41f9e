use std::collections::{HashSet, VecDeque};

use seaunpack_archive::is_archive;
use seaunpack_remote::{RemoteEntry, path};

/// Breadth-first queue of remote directories; each path is handed out at most once.
#[derive(Debug)]
pub struct Walker {
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

impl Walker {
    pub fn new(root: &str) -> Self {
        Self {
            queue: VecDeque::from([path::normalize(root)]),
            visited: HashSet::new(),
        }
    }

    pub fn enqueue(&mut self, dir: &str) {
        self.queue.push_back(path::normalize(dir));
    }

    /// Next directory not handed out before, or `None` once the queue drains.
    pub fn next_dir(&mut self) -> Option<String> {
        while let Some(dir) = self.queue.pop_front() {
            if self.visited.insert(dir.clone()) {
                return Some(dir);
            }
        }
        None
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Split a listing into archive files and subdirectories; other files are dropped.
pub fn partition(entries: Vec<RemoteEntry>) -> (Vec<RemoteEntry>, Vec<RemoteEntry>) {
    let mut archives = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries {
        if entry.is_dir() {
            dirs.push(entry);
        } else if is_archive(&entry.name) {
            archives.push(entry);
        }
    }
    (archives, dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_in_fifo_order() {
        let mut walker = Walker::new("/");
        assert_eq!(walker.next_dir().as_deref(), Some("/"));
        walker.enqueue("/a");
        walker.enqueue("/b");
        assert_eq!(walker.next_dir().as_deref(), Some("/a"));
        walker.enqueue("/a/c");
        assert_eq!(walker.next_dir().as_deref(), Some("/b"));
        assert_eq!(walker.next_dir().as_deref(), Some("/a/c"));
        assert_eq!(walker.next_dir(), None);
    }

    #[test]
    fn duplicates_are_handed_out_once() {
        let mut walker = Walker::new("/data");
        walker.enqueue("/data/");
        walker.enqueue("/data/x");
        walker.enqueue("/data/x");

        let mut seen = Vec::new();
        while let Some(dir) = walker.next_dir() {
            seen.push(dir);
            walker.enqueue("/data");
        }
        assert_eq!(seen, vec!["/data", "/data/x"]);
        assert_eq!(walker.visited_count(), 2);
    }

    #[test]
    fn partition_keeps_archives_and_dirs() {
        let (archives, dirs) = partition(vec![
            RemoteEntry::file("notes.txt"),
            RemoteEntry::file("report.zip"),
            RemoteEntry::dir("photos"),
            RemoteEntry::file("logs.TAR.GZ"),
            RemoteEntry::dir("backup.zip"),
        ]);

        let names = |v: &[RemoteEntry]| v.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&archives), vec!["report.zip", "logs.TAR.GZ"]);
        assert_eq!(names(&dirs), vec!["photos", "backup.zip"]);
    }
}
