// mortar: A small incremental build orchestrator for C projects.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

//! Modification-time comparisons, the only cache invalidation signal.
//!
//! There is no content hashing: touching a source without changing it still
//! triggers a rebuild, and a source restored with an older timestamp does not.

use std::path::Path;

use filetime::FileTime;

pub fn modified(path: &Path) -> Option<FileTime> {
    let meta = std::fs::metadata(path).ok()?;
    Some(FileTime::from_last_modification_time(&meta))
}

/// Whether `artifact` must be regenerated from `source`.
///
/// True if the artifact is missing, if the source cannot be inspected, or if
/// the source was modified strictly after the artifact.
pub fn is_stale(source: &Path, artifact: &Path) -> bool {
    let Some(artifact_time) = modified(artifact) else {
        return true;
    };
    match modified(source) {
        Some(source_time) => source_time > artifact_time,
        None => true,
    }
}

/// Whether `file` was modified strictly after `reference`.
///
/// Unlike [`is_stale`], a file that cannot be inspected counts as unchanged.
/// The driver self-rebuild check relies on this.
pub fn changed_after(file: &Path, reference: &Path) -> bool {
    match (modified(file), modified(reference)) {
        (Some(file_time), Some(reference_time)) => file_time > reference_time,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use filetime::set_file_mtime;

    fn touch(path: &Path, secs: i64) {
        if !path.exists() {
            std::fs::write(path, "").unwrap();
        }
        set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
    }

    #[test]
    fn test_missing_artifact_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        touch(&src, 100);
        assert!(is_stale(&src, &dir.path().join("a.o")));
    }

    #[test]
    fn test_newer_source_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        touch(&src, 200);
        touch(&obj, 100);
        assert!(is_stale(&src, &obj));
    }

    #[test]
    fn test_equal_or_older_source_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        touch(&src, 100);
        touch(&obj, 100);
        assert!(!is_stale(&src, &obj));
        touch(&obj, 300);
        assert!(!is_stale(&src, &obj));
    }

    #[test]
    fn test_missing_source_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("a.o");
        touch(&obj, 100);
        assert!(is_stale(&dir.path().join("a.c"), &obj));
    }

    #[test]
    fn test_changed_after_treats_missing_as_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("driver.c");
        let bin = dir.path().join("driver");
        touch(&src, 200);
        assert!(!changed_after(&src, &bin));
        touch(&bin, 100);
        assert!(changed_after(&src, &bin));
        touch(&bin, 200);
        assert!(!changed_after(&src, &bin));
    }
}
