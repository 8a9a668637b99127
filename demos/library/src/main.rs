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

//! A driver describing its project in code instead of `mortar.json`.
//!
//! The driver rebuilds itself with cargo whenever this file changes, then
//! builds a shared and static `libadd` plus a test program linked against it.
//!
//! ```text
//! cargo run -p mortar-demo-library            # build
//! cargo run -p mortar-demo-library -- run     # build and run testlibadd
//! cargo run -p mortar-demo-library -- clean
//! LIBDIR=/tmp/lib INCLUDEDIR=/tmp/include cargo run -p mortar-demo-library -- install
//! ```

use std::path::Path;

use mortarbuild::BuildContext;
use mortarbuild::bootstrap::{BootstrapConfig, self_rebuild};
use mortarutil::command::ToolCommand;
use mortarutil::dirs::{DEFAULT_INCLUDE_DIR, DEFAULT_LIB_DIR};
use mortarutil::invocation::{Invocation, env_or};
use mortarutil::report::{Reporter, print_error};
use mortarutil::target::{Target, TargetGraph};
use mortarutil::toolchain::{DEFAULT_AR, DEFAULT_CC, Toolchain};

fn main() {
    let invocation = Invocation::capture();
    let reporter = Reporter::new(invocation.arg_bool("--quiet", false));
    match drive(&invocation, reporter) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e);
            std::process::exit(-1);
        }
    }
}

fn drive(invocation: &Invocation, reporter: Reporter) -> anyhow::Result<i32> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let mut rebuild = ToolCommand::new("cargo");
    rebuild
        .args(["build", "--quiet", "--manifest-path"])
        .path_arg(&manifest_dir.join("Cargo.toml"));
    let config = BootstrapConfig::new(
        manifest_dir.join("src/main.rs"),
        std::env::current_exe()?,
        rebuild,
    )
    .propagate_exit_code(true);
    self_rebuild(invocation, &config, &reporter)?;

    let mut graph = TargetGraph::new();
    let libadd = graph.add(
        Target::library("libadd")
            .sources(["libadd.c"])
            .headers(["libadd.h"])
            .lib_install_dir(env_or("LIBDIR", DEFAULT_LIB_DIR))
            .headers_install_dir(env_or("INCLUDEDIR", DEFAULT_INCLUDE_DIR)),
    )?;
    let testlibadd = graph.add(
        Target::executable("testlibadd")
            .sources(["test.c"])
            .ldflags("-L. -ladd -Wl,-rpath,.")
            .depends_on([libadd]),
    )?;

    let toolchain = Toolchain::from_commands(&env_or("CC", DEFAULT_CC), &env_or("AR", DEFAULT_AR))?;
    let jobs = invocation.arg_value("--jobs", "").parse().ok();
    let ctx = BuildContext::new(manifest_dir.join("project"), toolchain, reporter)?
        .with_jobs(jobs)
        .with_dry_run(invocation.arg_bool("--dry-run", false));

    match invocation.verb() {
        Some("clean") => ctx.clean(&graph, testlibadd)?,
        Some("install") => {
            ctx.build(&graph, libadd)?;
            ctx.install(&graph, libadd)?;
        }
        Some("run") => return Ok(ctx.run(&graph, testlibadd, &[])?),
        _ => ctx.build(&graph, testlibadd)?,
    }
    Ok(0)
}
