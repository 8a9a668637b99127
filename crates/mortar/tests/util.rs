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

use expect_test::Expect;

pub fn check<S: AsRef<str>>(actual: S, expect: Expect) {
    expect.assert_eq(actual.as_ref())
}

pub fn mortar_bin() -> PathBuf {
    snapbox::cmd::cargo_bin("mortar")
}

/// A `mortar` command in `dir` that ignores toolchain and install
/// directory settings of the environment running the tests.
pub fn mortar_cmd(dir: &impl AsRef<Path>) -> snapbox::cmd::Command {
    snapbox::cmd::Command::new(mortar_bin())
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("CC")
        .env_remove("AR")
        .env_remove("BINDIR")
        .env_remove("LIBDIR")
        .env_remove("INCLUDEDIR")
        .env_remove("RUST_LOG")
        .env_remove("MORTAR_TRACE")
        .env_remove("RUST_BACKTRACE")
        .env_remove("RUST_LIB_BACKTRACE")
}

pub fn replace_dir(s: &str, dir: impl AsRef<std::path::Path>) -> String {
    let path_str = dunce::canonicalize(dir)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let s = s.replace(&path_str, "$ROOT");
    let s = s.replace(mortar_bin().to_string_lossy().as_ref(), "mortar");
    s.replace("\r\n", "\n").replace('\\', "/")
}

pub fn copy(src: &Path, dest: &Path) -> anyhow::Result<()> {
    if src.is_dir() {
        if !dest.exists() {
            std::fs::create_dir_all(dest)?;
        }
        for entry in walkdir::WalkDir::new(src) {
            let entry = entry?;
            let path = entry.path();
            let relative_path = path.strip_prefix(src)?;
            let dest_path = dest.join(relative_path);
            if path.is_dir() {
                if !dest_path.exists() {
                    std::fs::create_dir_all(dest_path)?;
                }
            } else {
                std::fs::copy(path, dest_path)?;
            }
        }
    } else {
        std::fs::copy(src, dest)?;
    }
    Ok(())
}

#[track_caller]
pub fn read<P: AsRef<Path>>(p: P) -> String {
    std::fs::read_to_string(p).unwrap().replace("\r\n", "\n")
}
