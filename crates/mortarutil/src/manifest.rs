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

//! The declarative `mortar.json` project description.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::MORTAR_JSON;
use crate::error::BuildError;
use crate::target::{Target, TargetGraph, TargetId, TargetKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MortarJSON {
    /// Compiler command, e.g. `cc` or `ccache gcc`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,

    /// Archiver command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,

    #[serde(default)]
    pub targets: Vec<TargetJSON>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetJSON {
    pub name: String,

    pub kind: TargetKind,

    #[serde(default)]
    pub sources: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cflags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldflags: Option<String>,

    /// Names of targets built before this one, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,

    /// pkg-config package names that must be installed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_install_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_install_dir: Option<PathBuf>,
}

impl From<&TargetJSON> for Target {
    fn from(j: &TargetJSON) -> Self {
        Target {
            kind: j.kind,
            name: j.name.clone(),
            sources: j.sources.clone(),
            headers: j.headers.clone(),
            cflags: j.cflags.clone().unwrap_or_default(),
            ldflags: j.ldflags.clone().unwrap_or_default(),
            dependencies: vec![],
            requires: j.requires.clone(),
            install_dir: j.install_dir.clone(),
            lib_install_dir: j.lib_install_dir.clone(),
            headers_install_dir: j.headers_install_dir.clone(),
        }
    }
}

/// A loaded manifest: toolchain overrides plus the resolved target graph.
#[derive(Debug)]
pub struct Manifest {
    pub cc: Option<String>,
    pub ar: Option<String>,
    pub graph: TargetGraph,
}

impl TryFrom<MortarJSON> for Manifest {
    type Error = BuildError;

    fn try_from(j: MortarJSON) -> Result<Self, Self::Error> {
        let mut graph = TargetGraph::new();
        let mut ids: Vec<TargetId> = Vec::with_capacity(j.targets.len());
        for t in j.targets.iter() {
            ids.push(graph.add(Target::from(t))?);
        }
        // dependencies may point forward, so they are resolved in a second pass
        for (t, id) in j.targets.iter().zip(ids) {
            for dep in t.deps.iter() {
                let dep_id = graph
                    .lookup(dep)
                    .map_err(|_| BuildError::UnknownDependency {
                        target: t.name.clone(),
                        dependency: dep.clone(),
                    })?;
                graph.add_dependency(id, dep_id);
            }
        }
        Ok(Manifest {
            cc: j.cc,
            ar: j.ar,
            graph,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load `{}`", path.display())]
pub struct ManifestFormatError {
    path: Box<Path>,
    #[source]
    kind: ManifestFormatErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestFormatErrorKind {
    #[error("I/O error")]
    IO(#[from] std::io::Error),
    #[error("Parse error")]
    Parse(#[from] serde_json_lenient::Error),
    #[error("invalid target graph")]
    Graph(#[from] BuildError),
}

pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestFormatError> {
    let err = |kind: ManifestFormatErrorKind| ManifestFormatError {
        path: path.into(),
        kind,
    };
    let file = File::open(path).map_err(|e| err(e.into()))?;
    let reader = BufReader::new(file);
    let j: MortarJSON = serde_json_lenient::from_reader(reader).map_err(|e| err(e.into()))?;
    debug!(path = %path.display(), targets = j.targets.len(), "loaded manifest");
    Manifest::try_from(j).map_err(|e| err(e.into()))
}

pub fn read_manifest_in_dir(dir: &Path) -> anyhow::Result<Manifest> {
    if !dir.join(MORTAR_JSON).exists() {
        bail!("`{}` does not exist", dir.join(MORTAR_JSON).display());
    }
    Ok(read_manifest(&dir.join(MORTAR_JSON))?)
}

#[cfg(test)]
mod test {
    use super::*;
    use expect_test::expect;

    fn parse(s: &str) -> Result<Manifest, BuildError> {
        let j: MortarJSON = serde_json_lenient::from_str(s).unwrap();
        Manifest::try_from(j)
    }

    #[test]
    fn test_parse_library_project() {
        let m = parse(
            r#"{
                "cc": "gcc",
                "targets": [
                    {
                        "name": "testlibadd",
                        "kind": "executable",
                        "sources": ["test.c"],
                        "ldflags": "-L. -ladd -Wl,-rpath,.",
                        "deps": ["libadd"]
                    },
                    {
                        "name": "libadd",
                        "kind": "library",
                        "sources": ["libadd.c"],
                        "headers": ["libadd.h"],
                        "lib-install-dir": "/opt/lib"
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(m.cc.as_deref(), Some("gcc"));
        assert_eq!(m.ar, None);

        let app = m.graph.lookup("testlibadd").unwrap();
        let lib = m.graph.lookup("libadd").unwrap();
        assert_eq!(m.graph[app].dependencies, vec![lib]);
        assert_eq!(m.graph[lib].kind, TargetKind::SharedAndStaticLibrary);
        assert_eq!(
            m.graph[lib].lib_install_dir.as_deref(),
            Some(Path::new("/opt/lib"))
        );
        assert_eq!(m.graph.roots(), vec![app]);
    }

    #[test]
    fn test_unknown_dependency() {
        let e = parse(
            r#"{"targets": [{"name": "app", "kind": "executable", "sources": ["a.c"], "deps": ["nope"]}]}"#,
        )
        .unwrap_err();
        expect!["target `app` depends on unknown target `nope`"].assert_eq(&e.to_string());
    }

    #[test]
    fn test_duplicate_target() {
        let e = parse(
            r#"{"targets": [
                {"name": "app", "kind": "executable", "sources": ["a.c"]},
                {"name": "app", "kind": "static-library", "sources": ["b.c"]}
            ]}"#,
        )
        .unwrap_err();
        expect!["target `app` is declared more than once"].assert_eq(&e.to_string());
    }

    #[test]
    fn test_read_manifest_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MORTAR_JSON), "{ not json").unwrap();
        let e = read_manifest_in_dir(dir.path()).unwrap_err();
        assert!(format!("{e:?}").contains("Parse error"));
        assert!(e.to_string().starts_with("failed to load"));
    }
}
