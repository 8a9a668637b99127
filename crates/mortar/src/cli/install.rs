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

use super::{
    InstallDirFlags, ToolchainFlags, load_project, make_context, resolve_toolchain, select_targets,
};

/// Build, then copy executables, libraries and headers to their install
/// directories
#[derive(Debug, clap::Parser, Clone)]
pub struct InstallSubcommand {
    /// Targets to install. Defaults to every target no other target depends on
    pub targets: Vec<String>,

    #[clap(flatten)]
    pub toolchain_flags: ToolchainFlags,

    #[clap(flatten)]
    pub install_dirs: InstallDirFlags,

    /// Install what is already built without building first
    #[clap(long)]
    pub no_build: bool,
}

pub fn run_install(cli: &UniversalFlags, cmd: &InstallSubcommand) -> anyhow::Result<i32> {
    let project = load_project(cli)?;
    let graph = &project.manifest.graph;
    let ids = select_targets(graph, &cmd.targets)?;
    let toolchain = resolve_toolchain(&cmd.toolchain_flags, &project.manifest)?;
    let ctx = make_context(cli, &project.root, toolchain, cmd.toolchain_flags.jobs)?
        .with_install_dirs(cmd.install_dirs.to_install_dirs());
    if !cmd.no_build {
        ctx.build_many(graph, &ids)?;
    }
    ctx.install_many(graph, &ids)?;
    Ok(0)
}
