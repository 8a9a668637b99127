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

#![warn(clippy::clone_on_ref_ptr)]

use std::{any::Any, io::IsTerminal};

use clap::Parser;
use cli::MortarSubcommands;

mod cli;

use tracing_subscriber::{Layer, layer::SubscriberExt};

/// Initialize logging and tracing-related functionality.
///
/// - `RUST_LOG` filters regular log output, printed to stderr. `--verbose`
///   lowers the default level from WARN to DEBUG.
/// - `MORTAR_TRACE` enables Chrome tracing output.
/// - `--trace` does the same as `MORTAR_TRACE=trace`, but writes to
///   `trace.json`. `MORTAR_TRACE` is ignored when `--trace` is given.
///
/// Returns a boxed guard that keeps the tracing system alive.
fn init_tracing(trace_flag: bool, verbose: bool) -> Box<dyn Any> {
    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let mortar_tracing_env = std::env::var("MORTAR_TRACE").ok();
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    let fmt = if !log_env_set {
        fmt.with_target(false).without_time().boxed()
    } else {
        fmt.compact().boxed()
    };

    let chrome_trace = if trace_flag {
        let chrome_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy("");
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .include_args(true)
            .file("trace.json")
            .build();

        Some((chrome_filter.and_then(layer), guard))
    } else if let Some(env) = mortar_tracing_env.as_deref() {
        let chrome_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy(env);
        let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
            .include_args(true)
            .build();

        Some((chrome_filter.and_then(layer), guard))
    } else {
        None
    };

    let (chrome_layer, chrome_guard) = chrome_trace.unzip();

    let fmt_layer = fmt.with_filter(filter);
    let registry = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(chrome_layer);
    tracing::subscriber::set_global_default(registry)
        .expect("Failed to set global tracing subscriber");

    Box::new(chrome_guard)
}

pub fn main() {
    let cli = cli::MortarCli::parse();
    let flags = cli.flags;

    let _trace_guard = init_tracing(flags.trace, flags.verbose);

    use MortarSubcommands::*;
    let res = match cli.subcommand {
        Build(b) => cli::run_build(&flags, &b),
        Clean(c) => cli::run_clean(&flags, &c),
        Install(i) => cli::run_install(&flags, &i),
        Run(r) => cli::run_run(&flags, &r),
    };

    drop(_trace_guard);

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            mortarutil::report::print_error(&e);
            std::process::exit(-1);
        }
    }
}
