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

use std::path::Path;

use mortarutil::command::ToolCommand;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::target::{TargetGraph, TargetId};

use crate::build::BuildContext;

impl BuildContext {
    /// Builds an executable target, then runs `./<name> <args>` in the
    /// project root. Returns the program's exit code.
    pub fn run(&self, graph: &TargetGraph, id: TargetId, args: &[String]) -> BuildResult<i32> {
        let target = &graph[id];
        if !target.kind.is_executable() {
            return Err(BuildError::NotExecutable {
                name: target.name.clone(),
            });
        }
        self.build(graph, id)?;

        let mut cmd = ToolCommand::new(
            Path::new(".")
                .join(target.executable_path())
                .display()
                .to_string(),
        );
        cmd.args(args.iter().cloned()).current_dir(&self.root);
        let status = self.rt.block_on(self.runner.run(cmd))?;
        Ok(status.code.unwrap_or(-1))
    }
}
