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

use std::collections::HashSet;

use mortarutil::error::{BuildError, BuildResult};
use mortarutil::target::{Target, TargetGraph, TargetId};

/// Depth-first traversal visiting every dependency, in declaration order,
/// before the target that declares it.
///
/// One walker is meant to live for one verb of one driver run: a target that
/// was already visited is skipped, so shared dependencies are processed once.
pub struct Walker<'g> {
    graph: &'g TargetGraph,
    stack: Vec<TargetId>,
    done: HashSet<TargetId>,
}

impl<'g> Walker<'g> {
    pub fn new(graph: &'g TargetGraph) -> Self {
        Walker {
            graph,
            stack: vec![],
            done: HashSet::new(),
        }
    }

    pub fn visit<F>(&mut self, id: TargetId, f: &mut F) -> BuildResult<()>
    where
        F: FnMut(&Target) -> BuildResult<()>,
    {
        if self.done.contains(&id) {
            return Ok(());
        }
        if let Some(pos) = self.stack.iter().position(|x| *x == id) {
            let mut cycle: Vec<String> = self.stack[pos..]
                .iter()
                .map(|x| self.graph[*x].name.clone())
                .collect();
            cycle.push(self.graph[id].name.clone());
            return Err(BuildError::CycleDetected { cycle });
        }

        let graph = self.graph;
        self.stack.push(id);
        for dep in graph[id].dependencies.iter() {
            self.visit(*dep, f)?;
        }
        self.stack.pop();

        f(&graph[id])?;
        self.done.insert(id);
        Ok(())
    }

    pub fn visit_all<F>(&mut self, ids: &[TargetId], f: &mut F) -> BuildResult<()>
    where
        F: FnMut(&Target) -> BuildResult<()>,
    {
        for id in ids {
            self.visit(*id, f)?;
        }
        Ok(())
    }
}
