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

pub const MORTAR_JSON: &str = "mortar.json";

pub const O_EXT: &str = if cfg!(windows) { "obj" } else { "o" };

pub const SHARED_LIB_EXT: &str = if cfg!(windows) { "dll" } else { "so" };

pub const STATIC_LIB_EXT: &str = "a";

/// Every extension a shared or static library might have been produced with,
/// on any platform. Clean removes all of them.
pub const LIB_EXTS: &[&str] = &["so", "a", "dll"];

/// The object file that `source` compiles to.
///
/// The final extension is replaced with [`O_EXT`]; a path without an extension
/// gets it appended. The object always sits next to its source.
pub fn object_path(source: &Path) -> PathBuf {
    source.with_extension(O_EXT)
}

pub fn object_paths<P: AsRef<Path>>(sources: &[P]) -> Vec<PathBuf> {
    sources.iter().map(|s| object_path(s.as_ref())).collect()
}

pub fn shared_lib_name(name: &str) -> String {
    format!("{name}.{SHARED_LIB_EXT}")
}

pub fn static_lib_name(name: &str) -> String {
    format!("{name}.{STATIC_LIB_EXT}")
}

#[test]
#[cfg(unix)]
fn test_object_path() {
    assert_eq!(object_path(Path::new("a.c")), PathBuf::from("a.o"));
    assert_eq!(object_path(Path::new("src/main.c")), PathBuf::from("src/main.o"));
    assert_eq!(object_path(Path::new("lib.tar.c")), PathBuf::from("lib.tar.o"));
    assert_eq!(object_path(Path::new("noext")), PathBuf::from("noext.o"));
    assert_eq!(object_path(Path::new("dir.d/noext")), PathBuf::from("dir.d/noext.o"));
    assert_eq!(object_path(Path::new(".hidden")), PathBuf::from(".hidden.o"));
}

#[test]
#[cfg(unix)]
fn test_lib_names() {
    assert_eq!(shared_lib_name("libadd"), "libadd.so");
    assert_eq!(static_lib_name("libadd"), "libadd.a");
}
