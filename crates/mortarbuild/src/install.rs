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

use mortarutil::error::{BuildError, BuildResult};
use mortarutil::target::{Target, TargetGraph, TargetId};
use walkdir::WalkDir;

use crate::build::BuildContext;
use crate::walker::Walker;

/// Copies `src` into `dest_dir` under the same file name, creating
/// `dest_dir` first. An existing file is overwritten.
pub fn install_file(src: &Path, dest_dir: &Path) -> BuildResult<PathBuf> {
    let file_name = src.file_name().ok_or_else(|| {
        BuildError::filesystem(
            "install",
            src,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    std::fs::create_dir_all(dest_dir)
        .map_err(|e| BuildError::filesystem("create directory", dest_dir, e))?;
    let dest = dest_dir.join(file_name);
    std::fs::copy(src, &dest).map_err(|e| BuildError::filesystem("copy", src, e))?;
    Ok(dest)
}

/// Copies the directory `src_dir` with everything below it into `dest_dir`,
/// so that `a/b.h` lands at `<dest_dir>/a/b.h`. Returns the number of files
/// copied.
pub fn install_tree(src_dir: &Path, dest_dir: &Path) -> BuildResult<usize> {
    let base = src_dir.parent().unwrap_or(src_dir);
    let mut copied = 0;
    for entry in WalkDir::new(src_dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            BuildError::filesystem("read", path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let dest = match rel.parent() {
            Some(parent) => dest_dir.join(parent),
            None => dest_dir.to_path_buf(),
        };
        install_file(entry.path(), &dest)?;
        copied += 1;
    }
    Ok(copied)
}

impl BuildContext {
    /// Installs `id` after installing its dependencies.
    pub fn install(&self, graph: &TargetGraph, id: TargetId) -> BuildResult<()> {
        self.install_many(graph, &[id])
    }

    pub fn install_many(&self, graph: &TargetGraph, ids: &[TargetId]) -> BuildResult<()> {
        Walker::new(graph).visit_all(ids, &mut |t: &Target| self.install_target(t))
    }

    /// Executables go to the bin directory; libraries and their headers to
    /// the lib and include directories.
    pub fn install_target(&self, target: &Target) -> BuildResult<()> {
        target.validate()?;
        let dirs = &self.install_dirs;
        let mut copies: Vec<(PathBuf, &Path)> = vec![];
        if target.kind.is_executable() {
            copies.push((target.executable_path(), target.bin_dir(dirs)));
        }
        if target.kind.builds_shared() {
            copies.push((target.shared_lib_path(), target.lib_dir(dirs)));
        }
        if target.kind.builds_static() {
            copies.push((target.static_lib_path(), target.lib_dir(dirs)));
        }
        if target.kind.is_library() {
            for header in target.headers.iter() {
                copies.push((header.clone(), target.include_dir(dirs)));
            }
        }

        for (src, dest_dir) in copies {
            self.reporter.info(format!(
                "Install file '{}' to '{}'",
                src.display(),
                dest_dir.display()
            ));
            if !self.dry_run {
                install_file(&self.root.join(&src), dest_dir)?;
            }
        }
        Ok(())
    }
}
