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

//! The command line a driver program was started with.
//!
//! Captured once at startup and passed around explicitly. The self-rebuild
//! bootstrap needs the untouched argument vector to re-launch the driver.

use std::ffi::{OsStr, OsString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<OsString>,
}

impl Invocation {
    pub fn capture() -> Self {
        Invocation {
            args: std::env::args_os().collect(),
        }
    }

    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Invocation {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The full argument vector, program name included, exactly as received.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn program(&self) -> Option<&OsStr> {
        self.args.first().map(OsString::as_os_str)
    }

    /// Arguments after the program name.
    pub fn user_args(&self) -> &[OsString] {
        self.args.get(1..).unwrap_or(&[])
    }

    /// Whether `arg` was passed verbatim, e.g. `clean` or `--build-static`.
    pub fn arg_bool(&self, arg: &str, default: bool) -> bool {
        if self.user_args().iter().any(|a| a == arg) {
            true
        } else {
            default
        }
    }

    /// The value of a `--name=value` argument. `name` is given without the
    /// `=value` part.
    pub fn arg_value(&self, name: &str, default: &str) -> String {
        self.user_args()
            .iter()
            .filter_map(|a| a.to_str())
            .find_map(|a| a.strip_prefix(name)?.strip_prefix('='))
            .unwrap_or(default)
            .to_string()
    }

    /// The first verb (a non-flag argument), if any.
    pub fn verb(&self) -> Option<&str> {
        self.user_args()
            .iter()
            .filter_map(|a| a.to_str())
            .find(|a| !a.starts_with('-'))
    }
}

pub fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}
