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

//! Execution of external tools.
//!
//! Every compiler, linker, archiver and rebuild invocation goes through a
//! [`ToolRunner`], so the scheduler and the walker never spawn processes
//! themselves. Tests substitute recording runners.

use std::path::PathBuf;
use std::process::Stdio;

use futures::FutureExt;
use futures::future::BoxFuture;
use mortarutil::command::ToolCommand;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::report::Reporter;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    /// `None` if the tool was terminated by a signal.
    pub code: Option<i32>,
}

impl ToolStatus {
    pub const SUCCESS: ToolStatus = ToolStatus { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turns a failed status into a [`BuildError::ToolchainFailure`].
    pub fn check(self, cmd: &ToolCommand) -> BuildResult<()> {
        if self.success() {
            Ok(())
        } else {
            Err(BuildError::ToolchainFailure {
                command: cmd.build(),
                code: self.code,
            })
        }
    }
}

pub trait ToolRunner: Send + Sync {
    /// Runs one tool to completion. An `Err` means the tool could not be
    /// started at all; a tool that ran and failed is an `Ok` with a non-zero
    /// status.
    fn run<'a>(&'a self, cmd: ToolCommand) -> BoxFuture<'a, BuildResult<ToolStatus>>;
}

/// Spawns real child processes, echoing each command line first.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    reporter: Reporter,
    cwd: PathBuf,
}

impl ProcessRunner {
    /// Commands without their own working directory run in `cwd`.
    pub fn new(reporter: Reporter, cwd: impl Into<PathBuf>) -> Self {
        ProcessRunner {
            reporter,
            cwd: cwd.into(),
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run<'a>(&'a self, cmd: ToolCommand) -> BoxFuture<'a, BuildResult<ToolStatus>> {
        async move {
            self.reporter.command(&cmd);
            let cwd = cmd.cwd.as_deref().unwrap_or(&self.cwd);
            let mut child = tokio::process::Command::new(&cmd.program);
            child
                .args(&cmd.args)
                .current_dir(cwd)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            let status = child.status().await.map_err(|source| BuildError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;
            debug!(command = %cmd, code = ?status.code(), "tool finished");
            Ok(ToolStatus {
                code: status.code(),
            })
        }
        .boxed()
    }
}

/// Echoes commands without running anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunner {
    reporter: Reporter,
}

impl DryRunner {
    pub fn new(reporter: Reporter) -> Self {
        DryRunner { reporter }
    }
}

impl ToolRunner for DryRunner {
    fn run<'a>(&'a self, cmd: ToolCommand) -> BoxFuture<'a, BuildResult<ToolStatus>> {
        self.reporter.command(&cmd);
        futures::future::ready(Ok(ToolStatus::SUCCESS)).boxed()
    }
}
