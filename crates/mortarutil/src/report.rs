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

//! User-facing progress lines.
//!
//! Lifecycle steps are printed as `info: ...` and every external tool
//! invocation is echoed as `command: ...` before it runs. Both go to stdout.

use std::fmt::Display;

use colored::Colorize;

use crate::command::ToolCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Reporter { quiet }
    }

    pub fn info(&self, msg: impl Display) {
        if !self.quiet {
            println!("{}: {}", "info".green().bold(), msg);
        }
    }

    pub fn command(&self, cmd: &ToolCommand) {
        if !self.quiet {
            println!("{}: {}", "command".cyan().bold(), cmd);
        }
    }
}

/// Prints a fatal diagnostic with its cause chain to stderr.
pub fn print_error(e: &anyhow::Error) {
    eprintln!("{}: {:?}", "error".red().bold(), e);
}
