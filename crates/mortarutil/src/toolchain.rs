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

//! The external C toolchain and the exact command shapes passed to it.
//!
//! The argument order of every command below is relied upon by existing
//! build configurations and must not change.

use std::path::Path;

use crate::command::ToolCommand;
use crate::error::{BuildError, BuildResult};

pub const DEFAULT_CC: &str = "cc";
pub const DEFAULT_AR: &str = "ar";

pub const PIC_FLAG: &str = "-fPIC";

/// Compiler and archiver command prefixes, each already split into words so
/// that wrappers like `ccache gcc` work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    cc: ToolCommand,
    ar: ToolCommand,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            cc: ToolCommand::new(DEFAULT_CC),
            ar: ToolCommand::new(DEFAULT_AR),
        }
    }
}

impl Toolchain {
    pub fn from_commands(cc: &str, ar: &str) -> BuildResult<Self> {
        Ok(Toolchain {
            cc: command_prefix("compiler", cc)?,
            ar: command_prefix("archiver", ar)?,
        })
    }

    pub fn cc_name(&self) -> &str {
        &self.cc.program
    }

    fn cc(&self) -> ToolCommand {
        self.cc.clone()
    }

    fn ar(&self) -> ToolCommand {
        self.ar.clone()
    }
}

fn command_prefix(what: &str, value: &str) -> BuildResult<ToolCommand> {
    ToolCommand::from_words(split_flags(what, value)?).ok_or_else(|| BuildError::BadFlags {
        what: what.to_string(),
        value: value.to_string(),
    })
}

/// Splits an opaque flag string with POSIX shell word rules.
pub fn split_flags(what: &str, flags: &str) -> BuildResult<Vec<String>> {
    shlex::split(flags).ok_or_else(|| BuildError::BadFlags {
        what: what.to_string(),
        value: flags.to_string(),
    })
}

/// `<cc> [-fPIC] -c <cflags> -o <object> <source>`
pub fn make_compile_command(
    tc: &Toolchain,
    cflags: &[String],
    pic: bool,
    source: &Path,
    object: &Path,
) -> ToolCommand {
    let mut cmd = tc.cc();
    cmd.args_with_cond(pic, [PIC_FLAG])
        .arg("-c")
        .args(cflags.iter().cloned())
        .arg("-o")
        .path_arg(object)
        .path_arg(source);
    cmd
}

/// `<cc> <objects> <ldflags> -o <dest>`
pub fn make_link_command<P: AsRef<Path>>(
    tc: &Toolchain,
    objects: &[P],
    ldflags: &[String],
    dest: &Path,
) -> ToolCommand {
    let mut cmd = tc.cc();
    cmd.path_args(objects)
        .args(ldflags.iter().cloned())
        .arg("-o")
        .path_arg(dest);
    cmd
}

/// `<cc> -shared -o <dest> <objects>`
pub fn make_shared_lib_command<P: AsRef<Path>>(
    tc: &Toolchain,
    objects: &[P],
    dest: &Path,
) -> ToolCommand {
    let mut cmd = tc.cc();
    cmd.arg("-shared").arg("-o").path_arg(dest).path_args(objects);
    cmd
}

/// `<ar> rcs <dest> <objects>`
pub fn make_archive_command<P: AsRef<Path>>(
    tc: &Toolchain,
    objects: &[P],
    dest: &Path,
) -> ToolCommand {
    let mut cmd = tc.ar();
    cmd.arg("rcs").path_arg(dest).path_args(objects);
    cmd
}

/// `<cc> -o <binary> <source>`, used to rebuild a C driver program.
pub fn make_driver_command(tc: &Toolchain, source: &Path, binary: &Path) -> ToolCommand {
    let mut cmd = tc.cc();
    cmd.arg("-o").path_arg(binary).path_arg(source);
    cmd
}
