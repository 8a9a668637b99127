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

//! The link/archive stage: turns a target's objects into its final artifacts.

use mortarutil::command::ToolCommand;
use mortarutil::error::BuildResult;
use mortarutil::report::Reporter;
use mortarutil::target::Target;
use mortarutil::toolchain::{
    Toolchain, make_archive_command, make_link_command, make_shared_lib_command, split_flags,
};

use crate::runner::ToolRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStep {
    Executable,
    SharedLibrary,
    StaticLibrary,
}

impl LinkStep {
    fn describe(self, name: &str) -> String {
        match self {
            LinkStep::Executable => format!("Linking executable '{name}'"),
            LinkStep::SharedLibrary => format!("Building shared library '{name}'"),
            LinkStep::StaticLibrary => format!("Building static library '{name}'"),
        }
    }
}

/// The commands producing every artifact of `target`, over its full object
/// set. A combined library yields the shared step before the static one.
pub fn link_commands(
    toolchain: &Toolchain,
    target: &Target,
) -> BuildResult<Vec<(LinkStep, ToolCommand)>> {
    let objects = target.objects();
    let mut steps = vec![];
    if target.kind.is_executable() {
        let ldflags = split_flags("ldflags", &target.ldflags)?;
        steps.push((
            LinkStep::Executable,
            make_link_command(toolchain, &objects, &ldflags, &target.executable_path()),
        ));
    }
    if target.kind.builds_shared() {
        steps.push((
            LinkStep::SharedLibrary,
            make_shared_lib_command(toolchain, &objects, &target.shared_lib_path()),
        ));
    }
    if target.kind.builds_static() {
        steps.push((
            LinkStep::StaticLibrary,
            make_archive_command(toolchain, &objects, &target.static_lib_path()),
        ));
    }
    Ok(steps)
}

/// Runs the link steps one after the other. The first failing tool aborts
/// the stage.
pub async fn link_or_archive(
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    reporter: &Reporter,
    target: &Target,
) -> BuildResult<()> {
    for (step, cmd) in link_commands(toolchain, target)? {
        reporter.info(step.describe(&target.name));
        runner.run(cmd.clone()).await?.check(&cmd)?;
    }
    Ok(())
}
