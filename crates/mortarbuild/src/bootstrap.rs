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

//! Self-rebuild of a driver program.
//!
//! A driver is a program describing a project's targets in code. When its
//! source is newer than its binary, the driver recompiles itself, launches
//! the fresh binary with the exact argument vector it was given and exits,
//! so the build always runs with the latest description.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use mortarutil::command::ToolCommand;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::invocation::Invocation;
use mortarutil::mtime::changed_after;
use mortarutil::report::Reporter;
use mortarutil::toolchain::{Toolchain, make_driver_command};
use tracing::debug;

use crate::runner::{ProcessRunner, ToolRunner};

static BOOTSTRAP_RAN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// The binary reflects its source; carry on.
    Fresh,
    /// The source changed after the binary was built.
    Stale,
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub source: PathBuf,
    pub binary: PathBuf,
    pub rebuild: ToolCommand,
    /// Exit with the relaunched driver's exit code instead of 0.
    pub propagate_exit_code: bool,
}

impl BootstrapConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        binary: impl Into<PathBuf>,
        rebuild: ToolCommand,
    ) -> Self {
        BootstrapConfig {
            source: source.into(),
            binary: binary.into(),
            rebuild,
            propagate_exit_code: false,
        }
    }

    /// A single-file C driver, rebuilt with `<cc> -o <binary> <source>`.
    pub fn c_driver(
        source: impl Into<PathBuf>,
        binary: impl Into<PathBuf>,
        cc: &str,
    ) -> BuildResult<Self> {
        let source = source.into();
        let binary = binary.into();
        let toolchain = Toolchain::from_commands(cc, mortarutil::toolchain::DEFAULT_AR)?;
        let rebuild = make_driver_command(&toolchain, &source, &binary);
        Ok(Self::new(source, binary, rebuild))
    }

    pub fn propagate_exit_code(mut self, propagate: bool) -> Self {
        self.propagate_exit_code = propagate;
        self
    }
}

/// A missing source is a configuration error. A binary that cannot be
/// inspected is taken as fresh: there is nothing to compare against.
pub fn check(config: &BootstrapConfig) -> BuildResult<BootstrapState> {
    if !config.source.exists() {
        return Err(BuildError::MissingConfigSource {
            path: config.source.clone(),
        });
    }
    if changed_after(&config.source, &config.binary) {
        Ok(BootstrapState::Stale)
    } else {
        Ok(BootstrapState::Fresh)
    }
}

/// Runs the rebuild command, then relaunches the program with the argument
/// vector of `invocation`. Returns the code the stale process should exit
/// with.
pub fn rebuild_and_reexec(
    invocation: &Invocation,
    config: &BootstrapConfig,
    reporter: &Reporter,
) -> BuildResult<i32> {
    reporter.info(format!("Rebuilding '{}'", config.binary.display()));
    let cwd = std::env::current_dir().map_err(|e| BuildError::filesystem("read", ".", e))?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(BuildError::Runtime)?;
    let runner = ProcessRunner::new(*reporter, cwd);
    rt.block_on(runner.run(config.rebuild.clone()))?
        .check(&config.rebuild)?;

    let Some((program, args)) = invocation.args().split_first() else {
        return Err(BuildError::MissingField {
            target: "<invocation>".to_string(),
            field: "program",
        });
    };
    debug!(?program, ?args, "relaunching");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| BuildError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;
    if config.propagate_exit_code {
        Ok(status.code().unwrap_or(1))
    } else {
        Ok(0)
    }
}

/// Must be called once, first thing in the driver. Returns if the binary is
/// fresh; otherwise rebuilds, hands off to the new binary and terminates the
/// process.
pub fn self_rebuild(
    invocation: &Invocation,
    config: &BootstrapConfig,
    reporter: &Reporter,
) -> BuildResult<()> {
    if BOOTSTRAP_RAN.swap(true, Ordering::SeqCst) {
        return Err(BuildError::BootstrapAlreadyRan);
    }
    match check(config)? {
        BootstrapState::Fresh => Ok(()),
        BootstrapState::Stale => {
            let code = rebuild_and_reexec(invocation, config, reporter)?;
            std::process::exit(code);
        }
    }
}
