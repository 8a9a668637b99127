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

//! The compile scheduler.
//!
//! One job per stale source. A fixed pool of workers pulls jobs from a shared
//! queue, so at most `parallelism` compilers run at any moment. Workers are
//! plain futures joined on the caller's runtime; the concurrency comes from
//! awaiting child processes, not from threads.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use mortarutil::command::ToolCommand;
use mortarutil::common::object_path;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::mtime::is_stale;
use mortarutil::target::Target;
use mortarutil::toolchain::{Toolchain, make_compile_command, split_flags};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::runner::{ToolRunner, ToolStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub source: PathBuf,
    pub object: PathBuf,
    pub command: ToolCommand,
}

/// What happened to one job.
#[derive(Debug)]
pub struct JobResult {
    pub source: PathBuf,
    pub object: PathBuf,
    /// `None` if the compiler could not be started.
    pub status: Option<ToolStatus>,
    pub diagnostic: Option<String>,
}

impl JobResult {
    pub fn success(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }
}

/// Host parallelism, or 1 if it cannot be determined.
pub fn host_parallelism() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            debug!("cannot determine host parallelism, compiling serially: {e}");
            1
        }
    }
}

/// One job for every source of `target` whose object is missing or older
/// than the source. Paths are relative to `root`, where the compiler runs.
pub fn plan_jobs(
    root: &Path,
    toolchain: &Toolchain,
    target: &Target,
) -> BuildResult<Vec<CompileJob>> {
    let cflags = split_flags("cflags", &target.cflags)?;
    let pic = target.kind.needs_pic();
    let mut jobs = vec![];
    for source in target.sources.iter() {
        let object = object_path(source);
        if !is_stale(&root.join(source), &root.join(&object)) {
            debug!(source = %source.display(), "up to date");
            continue;
        }
        let command = make_compile_command(toolchain, &cflags, pic, source, &object);
        jobs.push(CompileJob {
            source: source.clone(),
            object,
            command,
        });
    }
    Ok(jobs)
}

/// Runs `jobs` with at most `parallelism` of them outstanding.
///
/// Once any job fails no further jobs are started, but the ones already
/// running are awaited. Results come back in completion order.
pub async fn run_jobs(
    runner: &dyn ToolRunner,
    jobs: Vec<CompileJob>,
    parallelism: usize,
) -> Vec<JobResult> {
    let workers = parallelism.max(1).min(jobs.len());
    let queue = Mutex::new(VecDeque::from(jobs));
    let failed = AtomicBool::new(false);

    let pool = (0..workers).map(|_| worker(runner, &queue, &failed));
    futures::future::join_all(pool)
        .await
        .into_iter()
        .flatten()
        .collect()
}

async fn worker(
    runner: &dyn ToolRunner,
    queue: &Mutex<VecDeque<CompileJob>>,
    failed: &AtomicBool,
) -> Vec<JobResult> {
    let mut results = vec![];
    loop {
        if failed.load(Ordering::SeqCst) {
            break;
        }
        let Some(job) = queue.lock().await.pop_front() else {
            break;
        };
        let result = match runner.run(job.command.clone()).await {
            Ok(status) => JobResult {
                diagnostic: status.check(&job.command).err().map(|e| e.to_string()),
                status: Some(status),
                source: job.source,
                object: job.object,
            },
            Err(e) => JobResult {
                diagnostic: Some(describe(&e)),
                status: None,
                source: job.source,
                object: job.object,
            },
        };
        if !result.success() {
            failed.store(true, Ordering::SeqCst);
        }
        results.push(result);
    }
    results
}

fn describe(e: &BuildError) -> String {
    match std::error::Error::source(e) {
        Some(source) => format!("{e}: {source}"),
        None => e.to_string(),
    }
}

/// Compiles the stale sources of `target`. Returns whether anything was
/// recompiled, which decides if the link stage runs.
#[instrument(level = "debug", skip_all, fields(name = %target.name))]
pub async fn compile(
    root: &Path,
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    target: &Target,
    parallelism: usize,
) -> BuildResult<bool> {
    let jobs = plan_jobs(root, toolchain, target)?;
    if jobs.is_empty() {
        return Ok(false);
    }
    debug!(jobs = jobs.len(), parallelism, "compiling");
    let results = run_jobs(runner, jobs, parallelism).await;
    let failures: Vec<String> = results
        .iter()
        .filter(|r| !r.success())
        .map(|r| {
            format!(
                "{} ({})",
                r.source.display(),
                r.diagnostic.as_deref().unwrap_or("failed")
            )
        })
        .collect();
    if !failures.is_empty() {
        return Err(BuildError::CompileFailed {
            target: target.name.clone(),
            failures,
        });
    }
    Ok(true)
}
