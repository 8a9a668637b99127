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

pub mod build;
pub mod clean;
pub mod install;
pub mod run;

pub use build::*;
pub use clean::*;
pub use install::*;
pub use run::*;

use std::path::{Path, PathBuf};

use anyhow::Context;
use mortarbuild::BuildContext;
use mortarutil::cli::UniversalFlags;
use mortarutil::dirs::InstallDirs;
use mortarutil::manifest::{Manifest, read_manifest_in_dir};
use mortarutil::report::Reporter;
use mortarutil::target::{TargetGraph, TargetId};
use mortarutil::toolchain::{DEFAULT_AR, DEFAULT_CC, Toolchain};

#[derive(Debug, clap::Parser)]
#[clap(
    name = "mortar",
    about = "A small incremental build orchestrator for C projects."
)]
pub struct MortarCli {
    #[clap(subcommand)]
    pub subcommand: MortarSubcommands,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum MortarSubcommands {
    Build(BuildSubcommand),
    Clean(CleanSubcommand),
    Install(InstallSubcommand),
    Run(RunSubcommand),
}

#[derive(Debug, clap::Parser, Clone, Default)]
pub struct ToolchainFlags {
    /// The C compiler command. Overrides `cc` in mortar.json
    #[clap(long, env = "CC")]
    pub cc: Option<String>,

    /// The archiver command. Overrides `ar` in mortar.json
    #[clap(long, env = "AR")]
    pub ar: Option<String>,

    /// Maximum number of compilers running at once. Defaults to the number of
    /// available CPUs
    #[clap(long, short = 'j')]
    pub jobs: Option<usize>,
}

#[derive(Debug, clap::Parser, Clone, Default)]
pub struct InstallDirFlags {
    /// Where executables are installed, unless a target sets `install-dir`
    #[clap(long, env = "BINDIR")]
    pub bin_dir: Option<PathBuf>,

    /// Where libraries are installed, unless a target sets `lib-install-dir`
    #[clap(long, env = "LIBDIR")]
    pub lib_dir: Option<PathBuf>,

    /// Where headers are installed, unless a target sets `headers-install-dir`
    #[clap(long, env = "INCLUDEDIR")]
    pub include_dir: Option<PathBuf>,
}

impl InstallDirFlags {
    pub fn to_install_dirs(&self) -> InstallDirs {
        let defaults = InstallDirs::default();
        InstallDirs {
            bin_dir: self.bin_dir.clone().unwrap_or(defaults.bin_dir),
            lib_dir: self.lib_dir.clone().unwrap_or(defaults.lib_dir),
            include_dir: self.include_dir.clone().unwrap_or(defaults.include_dir),
        }
    }
}

pub(crate) struct Project {
    pub root: PathBuf,
    pub manifest: Manifest,
}

pub(crate) fn load_project(cli: &UniversalFlags) -> anyhow::Result<Project> {
    let root = cli.project_dir.try_into_project_root()?;
    let manifest = read_manifest_in_dir(&root)?;
    Ok(Project { root, manifest })
}

/// Command line first, then the manifest, then the built-in default.
pub(crate) fn resolve_toolchain(
    flags: &ToolchainFlags,
    manifest: &Manifest,
) -> anyhow::Result<Toolchain> {
    let cc = flags
        .cc
        .as_deref()
        .or(manifest.cc.as_deref())
        .unwrap_or(DEFAULT_CC);
    let ar = flags
        .ar
        .as_deref()
        .or(manifest.ar.as_deref())
        .unwrap_or(DEFAULT_AR);
    Toolchain::from_commands(cc, ar).context("invalid toolchain")
}

pub(crate) fn make_context(
    cli: &UniversalFlags,
    root: &Path,
    toolchain: Toolchain,
    jobs: Option<usize>,
) -> anyhow::Result<BuildContext> {
    let ctx = BuildContext::new(root, toolchain, Reporter::new(cli.quiet))?
        .with_jobs(jobs)
        .with_dry_run(cli.dry_run);
    Ok(ctx)
}

/// The targets named on the command line, or else every target: the roots
/// first, then the rest in declaration order. Targets no root reaches can
/// only sit on a cycle, so they must be walked for it to be reported.
pub(crate) fn select_targets(
    graph: &TargetGraph,
    names: &[String],
) -> anyhow::Result<Vec<TargetId>> {
    if !names.is_empty() {
        return names
            .iter()
            .map(|n| graph.lookup(n).map_err(Into::into))
            .collect();
    }
    let mut selected = graph.roots();
    for id in graph.ids() {
        if !selected.contains(&id) {
            selected.push(id);
        }
    }
    Ok(selected)
}
