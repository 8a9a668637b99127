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

use anyhow::Context;

use crate::common::MORTAR_JSON;

pub const DEFAULT_BIN_DIR: &str = "/usr/local/bin";
pub const DEFAULT_LIB_DIR: &str = "/usr/local/lib";
pub const DEFAULT_INCLUDE_DIR: &str = "/usr/local/include";

#[derive(Debug, clap::Parser, Clone)]
pub struct ProjectDir {
    /// The project directory. Defaults to the nearest ancestor of the current
    /// directory containing `mortar.json`.
    #[arg(long = "directory", global = true, short = 'C')]
    directory: Option<PathBuf>,
}

impl ProjectDir {
    pub fn try_into_project_root(&self) -> anyhow::Result<PathBuf> {
        let start = match self.directory.clone() {
            Some(v) => v,
            None => std::env::current_dir().context("failed to get current directory")?,
        };
        let start = dunce::canonicalize(&start)
            .with_context(|| format!("failed to resolve directory `{}`", start.display()))?;
        find_ancestor_with_manifest(&start).ok_or_else(|| {
            anyhow::anyhow!(
                "could not find a `{}` file in `{}` or its ancestors",
                MORTAR_JSON,
                start.display()
            )
        })
    }
}

pub fn check_manifest_exists(dir: &Path) -> bool {
    dir.join(MORTAR_JSON).exists()
}

pub fn find_ancestor_with_manifest(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|dir| check_manifest_exists(dir))
        .map(|p| p.to_path_buf())
}

/// Install destinations used when a target does not name its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDirs {
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub include_dir: PathBuf,
}

impl Default for InstallDirs {
    fn default() -> Self {
        InstallDirs {
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            lib_dir: PathBuf::from(DEFAULT_LIB_DIR),
            include_dir: PathBuf::from(DEFAULT_INCLUDE_DIR),
        }
    }
}
