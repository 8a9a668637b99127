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

//! The buildable unit and the arena that owns all of them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::common::{object_paths, shared_lib_name, static_lib_name};
use crate::dirs::InstallDirs;
use crate::error::{BuildError, BuildResult};

slotmap::new_key_type! {
    /// A handle to a [`Target`] stored in a [`TargetGraph`].
    pub struct TargetId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    Executable,
    SharedLibrary,
    StaticLibrary,
    /// Both library forms, produced from the same object set.
    #[serde(rename = "library")]
    SharedAndStaticLibrary,
}

impl TargetKind {
    pub fn is_executable(self) -> bool {
        matches!(self, TargetKind::Executable)
    }

    pub fn is_library(self) -> bool {
        !self.is_executable()
    }

    pub fn builds_shared(self) -> bool {
        matches!(
            self,
            TargetKind::SharedLibrary | TargetKind::SharedAndStaticLibrary
        )
    }

    pub fn builds_static(self) -> bool {
        matches!(
            self,
            TargetKind::StaticLibrary | TargetKind::SharedAndStaticLibrary
        )
    }

    /// Library objects are compiled as position independent code.
    pub fn needs_pic(self) -> bool {
        self.is_library()
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    pub kind: TargetKind,
    pub name: String,
    pub sources: Vec<PathBuf>,
    /// Only used by install, and only for libraries.
    pub headers: Vec<PathBuf>,
    pub cflags: String,
    pub ldflags: String,
    /// Built, in order, before this target. Owned by the graph, not by us.
    pub dependencies: Vec<TargetId>,
    /// pkg-config names probed before compiling.
    pub requires: Vec<String>,
    pub install_dir: Option<PathBuf>,
    pub lib_install_dir: Option<PathBuf>,
    pub headers_install_dir: Option<PathBuf>,
}

impl Target {
    pub fn new(kind: TargetKind, name: impl Into<String>) -> Self {
        Target {
            kind,
            name: name.into(),
            sources: Vec::new(),
            headers: Vec::new(),
            cflags: String::new(),
            ldflags: String::new(),
            dependencies: Vec::new(),
            requires: Vec::new(),
            install_dir: None,
            lib_install_dir: None,
            headers_install_dir: None,
        }
    }

    pub fn executable(name: impl Into<String>) -> Self {
        Self::new(TargetKind::Executable, name)
    }

    pub fn shared_library(name: impl Into<String>) -> Self {
        Self::new(TargetKind::SharedLibrary, name)
    }

    pub fn static_library(name: impl Into<String>) -> Self {
        Self::new(TargetKind::StaticLibrary, name)
    }

    pub fn library(name: impl Into<String>) -> Self {
        Self::new(TargetKind::SharedAndStaticLibrary, name)
    }

    pub fn sources<I, P>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn headers<I, P>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    pub fn cflags(mut self, flags: impl Into<String>) -> Self {
        self.cflags = flags.into();
        self
    }

    pub fn ldflags(mut self, flags: impl Into<String>) -> Self {
        self.ldflags = flags.into();
        self
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = TargetId>) -> Self {
        self.dependencies.extend(deps);
        self
    }

    pub fn requires<I, S>(mut self, libs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(libs.into_iter().map(Into::into));
        self
    }

    pub fn install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    pub fn lib_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_install_dir = Some(dir.into());
        self
    }

    pub fn headers_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.headers_install_dir = Some(dir.into());
        self
    }

    /// The fields every build step needs: a name and at least one source.
    /// Sources must also map to distinct objects, since their compile jobs
    /// run concurrently.
    pub fn validate(&self) -> BuildResult<()> {
        if self.name.is_empty() {
            return Err(BuildError::MissingField {
                target: "<unnamed>".to_string(),
                field: "name",
            });
        }
        if self.sources.is_empty() {
            return Err(BuildError::EmptySources {
                target: self.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        for object in self.objects() {
            if !seen.insert(object.clone()) {
                return Err(BuildError::DuplicateObject {
                    target: self.name.clone(),
                    object,
                });
            }
        }
        Ok(())
    }

    pub fn objects(&self) -> Vec<PathBuf> {
        object_paths(&self.sources)
    }

    pub fn executable_path(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }

    pub fn shared_lib_path(&self) -> PathBuf {
        PathBuf::from(shared_lib_name(&self.name))
    }

    pub fn static_lib_path(&self) -> PathBuf {
        PathBuf::from(static_lib_name(&self.name))
    }

    /// The final artifacts this target's kind produces, relative to the
    /// project root.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        let mut out = vec![];
        if self.kind.is_executable() {
            out.push(self.executable_path());
        }
        if self.kind.builds_shared() {
            out.push(self.shared_lib_path());
        }
        if self.kind.builds_static() {
            out.push(self.static_lib_path());
        }
        out
    }

    pub fn bin_dir<'a>(&'a self, defaults: &'a InstallDirs) -> &'a Path {
        self.install_dir.as_deref().unwrap_or(&defaults.bin_dir)
    }

    pub fn lib_dir<'a>(&'a self, defaults: &'a InstallDirs) -> &'a Path {
        self.lib_install_dir.as_deref().unwrap_or(&defaults.lib_dir)
    }

    pub fn include_dir<'a>(&'a self, defaults: &'a InstallDirs) -> &'a Path {
        self.headers_install_dir
            .as_deref()
            .unwrap_or(&defaults.include_dir)
    }
}

/// Owns every [`Target`] of one driver run. Targets refer to each other
/// through [`TargetId`]s, so dependency cycles can be expressed and are
/// detected when the graph is walked.
#[derive(Debug, Default)]
pub struct TargetGraph {
    targets: SlotMap<TargetId, Target>,
    names: IndexMap<String, TargetId>,
}

impl TargetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target. Unnamed targets are accepted here and rejected when
    /// they are built, but two targets cannot share a name.
    pub fn add(&mut self, target: Target) -> BuildResult<TargetId> {
        if !target.name.is_empty() && self.names.contains_key(&target.name) {
            return Err(BuildError::DuplicateTarget { name: target.name });
        }
        let name = target.name.clone();
        let id = self.targets.insert(target);
        if !name.is_empty() {
            self.names.insert(name, id);
        }
        Ok(id)
    }

    pub fn add_dependency(&mut self, dependent: TargetId, dependency: TargetId) {
        self.targets[dependent].dependencies.push(dependency);
    }

    pub fn get(&self, id: TargetId) -> &Target {
        &self.targets[id]
    }

    pub fn lookup(&self, name: &str) -> BuildResult<TargetId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownTarget {
                name: name.to_string(),
            })
    }

    /// Named targets, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = (&str, TargetId)> {
        self.names.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Every target, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys()
    }

    /// Targets no other target depends on, in insertion order.
    pub fn roots(&self) -> Vec<TargetId> {
        let depended: HashSet<TargetId> = self
            .targets
            .values()
            .flat_map(|t| t.dependencies.iter().copied())
            .collect();
        self.targets
            .keys()
            .filter(|id| !depended.contains(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl std::ops::Index<TargetId> for TargetGraph {
    type Output = Target;

    fn index(&self, id: TargetId) -> &Target {
        self.get(id)
    }
}
