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

use std::path::{Path, PathBuf};

use mortarutil::common::LIB_EXTS;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::target::{Target, TargetGraph, TargetId};

use crate::build::BuildContext;
use crate::walker::Walker;

/// Every file a build of `target` could have produced: the bare name, each
/// library extension, and one object per source, whatever the target's kind.
pub fn derived_files(target: &Target) -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(&target.name)];
    files.extend(
        LIB_EXTS
            .iter()
            .map(|ext| PathBuf::from(format!("{}.{}", target.name, ext))),
    );
    files.extend(target.objects());
    files
}

/// Removes `files` under `root`. Missing files are skipped. Returns how many
/// files were actually removed.
pub fn remove_files(root: &Path, files: &[PathBuf]) -> BuildResult<usize> {
    let mut removed = 0;
    for file in files {
        let path = root.join(file);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::filesystem("remove", path, e)),
        }
    }
    Ok(removed)
}

impl BuildContext {
    /// Cleans `id` after cleaning its dependencies.
    pub fn clean(&self, graph: &TargetGraph, id: TargetId) -> BuildResult<()> {
        self.clean_many(graph, &[id])
    }

    pub fn clean_many(&self, graph: &TargetGraph, ids: &[TargetId]) -> BuildResult<()> {
        Walker::new(graph).visit_all(ids, &mut |t: &Target| self.clean_target(t))
    }

    pub fn clean_target(&self, target: &Target) -> BuildResult<()> {
        target.validate()?;
        self.reporter
            .info(format!("Clean build files for '{}'", target.name));
        let files = derived_files(target);
        if self.dry_run {
            for f in files.iter().filter(|f| self.root.join(f).exists()) {
                self.reporter.info(format!("Would remove '{}'", f.display()));
            }
            return Ok(());
        }
        let removed = remove_files(&self.root, &files)?;
        tracing::debug!(name = %target.name, removed, "cleaned");
        Ok(())
    }
}
