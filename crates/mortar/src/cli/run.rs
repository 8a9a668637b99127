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

use anyhow::Context;
use mortarutil::cli::UniversalFlags;
use tracing::instrument;

use super::{ToolchainFlags, load_project, make_context, resolve_toolchain};

/// Build an executable target, then run it from the project directory
#[derive(Debug, clap::Parser, Clone)]
pub struct RunSubcommand {
    /// The executable target to run
    pub target: String,

    /// The arguments provided to the program to be run
    #[clap(last = true)]
    pub args: Vec<String>,

    #[clap(flatten)]
    pub toolchain_flags: ToolchainFlags,
}

#[instrument(skip_all)]
pub fn run_run(cli: &UniversalFlags, cmd: &RunSubcommand) -> anyhow::Result<i32> {
    let project = load_project(cli)?;
    let graph = &project.manifest.graph;
    let id = graph.lookup(&cmd.target)?;
    let toolchain = resolve_toolchain(&cmd.toolchain_flags, &project.manifest)?;
    let ctx = make_context(cli, &project.root, toolchain, cmd.toolchain_flags.jobs)?;
    ctx.run(graph, id, &cmd.args)
        .with_context(|| format!("failed to run `{}`", cmd.target))
}
