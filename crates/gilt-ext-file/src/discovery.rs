//! Locating gilt workbooks on disk.
//!
//! Workbooks named `YYYYMMDD - Gilts in Issue.xls` are ordered by the date
//! in their name. Any other `.xls` file whose name contains
//! `Gilts in Issue` is ordered by modification time and placed after them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;

use crate::error::{IngestError, IngestResult};

const NAME_MARKER: &str = "Gilts in Issue";
const DATED_SUFFIX: &str = " - Gilts in Issue.xls";

/// Identity of one workbook file, used to detect changes on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileSignature {
    /// Canonical path.
    pub path: PathBuf,
    /// Modification time in nanoseconds since the epoch.
    pub modified_ns: u128,
    /// Size in bytes.
    pub size: u64,
}

impl FileSignature {
    /// Reads the signature of a file.
    pub fn of(path: &Path) -> IngestResult<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            path: path.canonicalize()?,
            modified_ns: modified_ns(&meta),
            size: meta.len(),
        })
    }
}

fn modified_ns(meta: &fs::Metadata) -> u128 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos())
}

/// Extracts the date from a `YYYYMMDD - Gilts in Issue.xls` file name.
pub fn dated_file_name(name: &str) -> Option<NaiveDate> {
    let stamp = name.strip_suffix(DATED_SUFFIX)?;
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

fn is_candidate(name: &str) -> bool {
    name.contains(NAME_MARKER) && name.ends_with(".xls")
}

/// Lists gilt workbooks in `dir`, oldest first.
///
/// # Errors
///
/// Returns `IngestError::MissingDirectory` if `dir` does not exist and
/// `IngestError::NoWorkbooks` if it holds no matching file.
pub fn discover_workbooks(dir: &Path) -> IngestResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }

    let mut dated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    let mut undated: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_candidate(name) {
            continue;
        }

        match dated_file_name(name) {
            Some(date) => dated.push((date, path)),
            None => {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(UNIX_EPOCH);
                undated.push((modified, path));
            }
        }
    }

    if dated.is_empty() && undated.is_empty() {
        return Err(IngestError::NoWorkbooks(dir.to_path_buf()));
    }

    dated.sort();
    undated.sort();

    Ok(dated
        .into_iter()
        .map(|(_, p)| p)
        .chain(undated.into_iter().map(|(_, p)| p))
        .collect())
}

/// Signatures of the given files, in the same order.
pub fn signature(paths: &[PathBuf]) -> IngestResult<Vec<FileSignature>> {
    paths.iter().map(|p| FileSignature::of(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_dated_file_name() {
        assert_eq!(
            dated_file_name("20250303 - Gilts in Issue.xls"),
            NaiveDate::from_ymd_opt(2025, 3, 3)
        );
        assert_eq!(dated_file_name("20251399 - Gilts in Issue.xls"), None);
        assert_eq!(dated_file_name("2025033 - Gilts in Issue.xls"), None);
        assert_eq!(dated_file_name("Gilts in Issue.xls"), None);
    }

    #[test]
    fn test_discover_orders_dated_then_undated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "20250303 - Gilts in Issue.xls");
        touch(dir.path(), "Gilts in Issue copy.xls");
        touch(dir.path(), "20241231 - Gilts in Issue.xls");
        touch(dir.path(), "20250101 - Gilts in Issue.xlsx");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("old Gilts in Issue.xls")).unwrap();

        let found = discover_workbooks(dir.path()).unwrap();

        assert_eq!(
            names(&found),
            vec![
                "20241231 - Gilts in Issue.xls",
                "20250303 - Gilts in Issue.xls",
                "Gilts in Issue copy.xls",
            ]
        );
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_workbooks(&missing),
            Err(IngestError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.md");
        assert!(matches!(
            discover_workbooks(dir.path()),
            Err(IngestError::NoWorkbooks(_))
        ));
    }

    #[test]
    fn test_signature_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "20250303 - Gilts in Issue.xls");

        let before = signature(std::slice::from_ref(&path)).unwrap();
        assert_eq!(before[0].size, "20250303 - Gilts in Issue.xls".len() as u64);

        fs::write(&path, b"a longer replacement body").unwrap();
        let after = signature(&[path]).unwrap();
        assert_ne!(before, after);
    }
}
