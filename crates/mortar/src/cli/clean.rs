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
use mortarutil::toolchain::Toolchain;

use super::{load_project, make_context, select_targets};

/// Remove objects and final artifacts of targets and their dependencies
#[derive(Debug, clap::Parser, Clone)]
pub struct CleanSubcommand {
    /// Targets to clean. Defaults to every target no other target depends on
    pub targets: Vec<String>,
}

pub fn run_clean(cli: &UniversalFlags, cmd: &CleanSubcommand) -> anyhow::Result<i32> {
    let project = load_project(cli)?;
    let graph = &project.manifest.graph;
    let ids = select_targets(graph, &cmd.targets)?;
    let ctx = make_context(cli, &project.root, Toolchain::default(), None)?;
    ctx.clean_many(graph, &ids)?;
    Ok(0)
}
