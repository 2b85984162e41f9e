//! Filename based archive recognition.
//!
//! Suffixes are matched ASCII case-insensitively and the table is ordered
//! longest first, so `.tar.gz` wins over `.tar` wherever both could apply.

use crate::format::{ArchiveFormat, TarCompress};

/// Recognised archive suffixes with the format each one implies, longest first.
pub const ARCHIVE_SUFFIXES: [(&str, ArchiveFormat); 6] = [
    (".tar.bz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tbz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tgz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tar", ArchiveFormat::Tar(TarCompress::None)),
    (".zip", ArchiveFormat::Zip),
];

/// Appended to names that carry no recognised suffix.
pub const EXTRACTED_SUFFIX: &str = "_extracted";

/// Returns `true` if `filename` ends with a recognised archive suffix.
pub fn is_archive(filename: &str) -> bool {
    matching_suffix(filename).is_some()
}

/// Folder name the archive is extracted into, both locally and remotely.
///
/// The longest matching suffix is stripped, keeping the stem's original case.
/// Unrecognised names get [`EXTRACTED_SUFFIX`] appended.
pub fn target_folder_name(filename: &str) -> String {
    match matching_suffix(filename) {
        Some((suffix, _)) => filename[..filename.len() - suffix.len()].to_string(),
        None => format!("{filename}{EXTRACTED_SUFFIX}"),
    }
}

/// Format implied by the filename, used when content sniffing is inconclusive.
pub fn format_hint(filename: &str) -> Option<ArchiveFormat> {
    matching_suffix(filename).map(|(_, format)| format)
}

fn matching_suffix(filename: &str) -> Option<(&'static str, ArchiveFormat)> {
    ARCHIVE_SUFFIXES
        .iter()
        .copied()
        .find(|(suffix, _)| ends_with_ignore_case(filename, suffix))
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    let Some(start) = name.len().checked_sub(suffix.len()) else {
        return false;
    };
    name.is_char_boundary(start) && name[start..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_table_is_longest_first() {
        let lengths: Vec<usize> = ARCHIVE_SUFFIXES.iter().map(|(s, _)| s.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn recognises_every_suffix() {
        for name in [
            "a.zip",
            "a.tar",
            "a.tar.gz",
            "a.tar.bz2",
            "a.tgz",
            "a.tbz2",
        ] {
            assert!(is_archive(name), "{name} should be an archive");
        }
    }

    #[test]
    fn recognition_ignores_case() {
        assert!(is_archive("REPORT.ZIP"));
        assert!(is_archive("Backup.Tar.Gz"));
    }

    #[test]
    fn rejects_other_files() {
        assert!(!is_archive("notes.txt"));
        assert!(!is_archive("archive.gz"));
        assert!(!is_archive("zip"));
        assert!(!is_archive(""));
    }

    #[test]
    fn strips_longest_suffix() {
        assert_eq!(target_folder_name("backup.tar.gz"), "backup");
        assert_eq!(target_folder_name("backup.tar.bz2"), "backup");
        assert_eq!(target_folder_name("backup.tar"), "backup");
        assert_eq!(target_folder_name("report.zip"), "report");
        assert_eq!(target_folder_name("x.tgz"), "x");
        assert_eq!(target_folder_name("x.tbz2"), "x");
    }

    #[test]
    fn keeps_stem_case() {
        assert_eq!(target_folder_name("Q3-Report.ZIP"), "Q3-Report");
        assert_eq!(target_folder_name("Data.TAR.GZ"), "Data");
    }

    #[test]
    fn strips_only_the_outermost_suffix() {
        assert_eq!(target_folder_name("nested.zip.tar.gz"), "nested.zip");
        assert_eq!(target_folder_name("x.tar.tar"), "x.tar");
    }

    #[test]
    fn unrecognised_names_get_extracted_suffix() {
        for name in ["notes.txt", "archive.gz", "README", ""] {
            assert_eq!(target_folder_name(name), format!("{name}_extracted"));
        }
    }

    #[test]
    fn reapplying_suffix_is_stable() {
        for name in ["a.zip", "b.tar.gz", "c.tar.bz2", "d.tgz", "e.TBZ2", "f.g.tar"] {
            let folder = target_folder_name(name);
            let (suffix, _) = matching_suffix(name).unwrap();
            assert_eq!(target_folder_name(&format!("{folder}{suffix}")), folder);
        }
    }

    #[test]
    fn suffix_only_name_has_empty_stem() {
        assert_eq!(target_folder_name(".zip"), "");
    }

    #[test]
    fn non_ascii_names_do_not_panic() {
        assert_eq!(target_folder_name("данные.zip"), "данные");
        assert!(!is_archive("ファイル"));
        assert_eq!(target_folder_name("é"), "é_extracted");
    }

    #[test]
    fn hints_follow_suffix() {
        assert_eq!(format_hint("a.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(
            format_hint("a.tgz"),
            Some(ArchiveFormat::Tar(TarCompress::Gzip))
        );
        assert_eq!(
            format_hint("a.tar.bz2"),
            Some(ArchiveFormat::Tar(TarCompress::Bzip2))
        );
        assert_eq!(
            format_hint("a.tar"),
            Some(ArchiveFormat::Tar(TarCompress::None))
        );
        assert_eq!(format_hint("a.txt"), None);
    }
}
