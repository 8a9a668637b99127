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

use std::path::{Path, PathBuf};

use mortarutil::dirs::InstallDirs;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::report::Reporter;
use mortarutil::target::{Target, TargetGraph, TargetId};
use mortarutil::toolchain::Toolchain;
use tracing::{debug, info_span};

use crate::compile::{compile, host_parallelism};
use crate::link::link_or_archive;
use crate::probe::require_libs;
use crate::runner::{DryRunner, ProcessRunner, ToolRunner};
use crate::walker::Walker;

/// Everything one driver run needs to act on targets: where the project
/// lives, which tools to call and how to call them.
pub struct BuildContext {
    pub(crate) root: PathBuf,
    pub(crate) toolchain: Toolchain,
    pub(crate) runner: Box<dyn ToolRunner>,
    pub(crate) reporter: Reporter,
    pub(crate) parallelism: usize,
    pub(crate) install_dirs: InstallDirs,
    pub(crate) dry_run: bool,
    pub(crate) rt: tokio::runtime::Runtime,
}

impl BuildContext {
    /// A context running real tools in `root` with host parallelism.
    pub fn new(
        root: impl Into<PathBuf>,
        toolchain: Toolchain,
        reporter: Reporter,
    ) -> BuildResult<Self> {
        let root = root.into();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BuildError::Runtime)?;
        Ok(BuildContext {
            runner: Box::new(ProcessRunner::new(reporter, &root)),
            root,
            toolchain,
            reporter,
            parallelism: host_parallelism(),
            install_dirs: InstallDirs::default(),
            dry_run: false,
            rt,
        })
    }

    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Overrides host parallelism. `None` keeps the current value.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if let Some(jobs) = jobs {
            self.parallelism = jobs.max(1);
        }
        self
    }

    pub fn with_install_dirs(mut self, dirs: InstallDirs) -> Self {
        self.install_dirs = dirs;
        self
    }

    /// Echo tool invocations and filesystem changes without performing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        if dry_run {
            self.runner = Box::new(DryRunner::new(self.reporter));
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Builds `id` after all of its dependencies.
    pub fn build(&self, graph: &TargetGraph, id: TargetId) -> BuildResult<()> {
        self.build_many(graph, &[id])
    }

    /// Builds several targets in one walk, so a target shared between them
    /// is built once.
    pub fn build_many(&self, graph: &TargetGraph, ids: &[TargetId]) -> BuildResult<()> {
        Walker::new(graph).visit_all(ids, &mut |t: &Target| self.build_target(t))
    }

    /// Compiles and, if anything was recompiled, links one target. Its
    /// dependencies must already be built.
    pub fn build_target(&self, target: &Target) -> BuildResult<()> {
        target.validate()?;
        let _span = info_span!("build_target", name = %target.name).entered();
        if !target.requires.is_empty() {
            require_libs(&self.reporter, &target.name, &target.requires)?;
        }
        self.reporter
            .info(format!("Building target '{}'", target.name));

        self.rt.block_on(async {
            let recompiled = compile(
                &self.root,
                &self.toolchain,
                self.runner.as_ref(),
                target,
                self.parallelism,
            )
            .await?;
            if recompiled {
                link_or_archive(&self.toolchain, self.runner.as_ref(), &self.reporter, target).await
            } else {
                // The final artifacts are trusted as they are, even if missing.
                debug!(name = %target.name, "nothing recompiled, skipping link");
                self.reporter
                    .info(format!("Target '{}' is up to date", target.name));
                Ok(())
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::Path;

    use filetime::{FileTime, set_file_mtime};

    use super::*;
    use crate::runner::test_util::RecordingRunner;

    pub fn touch(path: &Path, secs: i64) {
        if !path.exists() {
            std::fs::write(path, "").unwrap();
        }
        set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
    }

    /// A quiet context whose tools are recorded instead of run.
    pub fn context(root: &Path, runner: RecordingRunner) -> BuildContext {
        BuildContext::new(root, Toolchain::default(), Reporter::new(true))
            .unwrap()
            .with_runner(runner)
            .with_jobs(Some(2))
    }

    /// Recorded commands, sorted within each run of compile commands since
    /// those may complete in any order.
    pub fn normalized(commands: Vec<String>) -> Vec<String> {
        let mut out: Vec<String> = vec![];
        let mut batch: Vec<String> = vec![];
        for cmd in commands {
            if cmd.contains(" -c ") {
                batch.push(cmd);
            } else {
                batch.sort();
                out.append(&mut batch);
                out.push(cmd);
            }
        }
        batch.sort();
        out.append(&mut batch);
        out
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::test_util::*;
    use super::*;
    use crate::runner::ToolStatus;
    use crate::runner::test_util::RecordingRunner;
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use mortarutil::command::ToolCommand;

    /// Shares one recording runner between a context and the test body.
    struct Shared(Arc<RecordingRunner>);

    impl ToolRunner for Shared {
        fn run<'a>(&'a self, cmd: ToolCommand) -> BoxFuture<'a, BuildResult<ToolStatus>> {
            async move { self.0.run(cmd).await }.boxed()
        }
    }

    fn shared_context(root: &Path) -> (BuildContext, Arc<RecordingRunner>) {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = BuildContext::new(root, Toolchain::default(), Reporter::new(true))
            .unwrap()
            .with_runner(Shared(Arc::clone(&runner)))
            .with_jobs(Some(2));
        (ctx, runner)
    }

    #[test]
    fn test_fresh_build_compiles_all_then_links() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.c"), 100);
        touch(&root.join("b.c"), 100);

        let mut g = TargetGraph::new();
        let app = g
            .add(Target::executable("app").sources(["a.c", "b.c"]))
            .unwrap();
        let (ctx, runner) = shared_context(root);
        ctx.build(&g, app).unwrap();
        assert_eq!(
            normalized(runner.commands()),
            [
                "cc -c -o a.o a.c",
                "cc -c -o b.o b.c",
                "cc a.o b.o -o app"
            ]
        );
    }

    #[test]
    fn test_partial_rebuild_still_links() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.c"), 100);
        touch(&root.join("a.o"), 200);
        touch(&root.join("b.c"), 300);
        touch(&root.join("b.o"), 200);

        let mut g = TargetGraph::new();
        let app = g
            .add(Target::executable("app").sources(["a.c", "b.c"]))
            .unwrap();
        let (ctx, runner) = shared_context(root);
        ctx.build(&g, app).unwrap();
        assert_eq!(runner.commands(), ["cc -c -o b.o b.c", "cc a.o b.o -o app"]);
    }

    #[test]
    fn test_missing_artifact_is_not_relinked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.c"), 100);
        touch(&root.join("a.o"), 200);

        let mut g = TargetGraph::new();
        let app = g.add(Target::executable("app").sources(["a.c"])).unwrap();
        let (ctx, runner) = shared_context(root);
        ctx.build(&g, app).unwrap();
        assert!(runner.commands().is_empty());
        assert!(!root.join("app").exists());
    }

    #[test]
    fn test_dependencies_built_before_dependent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for f in ["libadd.c", "libmul.c", "test.c"] {
            touch(&root.join(f), 100);
        }

        let mut g = TargetGraph::new();
        let add = g
            .add(Target::library("libadd").sources(["libadd.c"]))
            .unwrap();
        let mul = g
            .add(Target::static_library("libmul").sources(["libmul.c"]))
            .unwrap();
        let app = g
            .add(
                Target::executable("testlibadd")
                    .sources(["test.c"])
                    .ldflags("-L. -ladd")
                    .depends_on([add, mul]),
            )
            .unwrap();
        let (ctx, runner) = shared_context(root);
        ctx.build(&g, app).unwrap();
        assert_eq!(
            runner.commands(),
            [
                "cc -fPIC -c -o libadd.o libadd.c",
                "cc -shared -o libadd.so libadd.o",
                "ar rcs libadd.a libadd.o",
                "cc -fPIC -c -o libmul.o libmul.c",
                "ar rcs libmul.a libmul.o",
                "cc -c -o test.o test.c",
                "cc test.o -L. -ladd -o testlibadd",
            ]
        );
    }

    #[test]
    fn test_missing_sources_is_fatal_before_compiling() {
        let dir = tempfile::tempdir().unwrap();
        let mut g = TargetGraph::new();
        let app = g.add(Target::executable("app")).unwrap();
        let (ctx, runner) = shared_context(dir.path());
        let e = ctx.build(&g, app).unwrap_err();
        assert!(matches!(e, BuildError::EmptySources { .. }));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_dry_run_echoes_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.c"), 100);
        let mut g = TargetGraph::new();
        let app = g.add(Target::executable("app").sources(["a.c"])).unwrap();
        let ctx = context(dir.path(), RecordingRunner::new()).with_dry_run(true);
        ctx.build(&g, app).unwrap();
        assert!(!dir.path().join("a.o").exists());
    }

    #[test]
    fn test_jobs_override() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), RecordingRunner::new());
        assert_eq!(ctx.parallelism(), 2);
        let ctx = ctx.with_jobs(Some(0));
        assert_eq!(ctx.parallelism(), 1);
        let ctx = ctx.with_jobs(None);
        assert_eq!(ctx.parallelism(), 1);
    }
}
