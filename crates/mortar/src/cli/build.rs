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

use mortarutil::cli::UniversalFlags;
use tracing::instrument;

use super::{ToolchainFlags, load_project, make_context, resolve_toolchain, select_targets};

/// Build targets and their dependencies
#[derive(Debug, clap::Parser, Clone)]
pub struct BuildSubcommand {
    /// Targets to build. Defaults to every target no other target depends on
    pub targets: Vec<String>,

    #[clap(flatten)]
    pub toolchain_flags: ToolchainFlags,
}

#[instrument(skip_all)]
pub fn run_build(cli: &UniversalFlags, cmd: &BuildSubcommand) -> anyhow::Result<i32> {
    let project = load_project(cli)?;
    let graph = &project.manifest.graph;
    let ids = select_targets(graph, &cmd.targets)?;
    let toolchain = resolve_toolchain(&cmd.toolchain_flags, &project.manifest)?;
    let ctx = make_context(cli, &project.root, toolchain, cmd.toolchain_flags.jobs)?;
    ctx.build_many(graph, &ids)?;
    Ok(0)
}
