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

use std::path::PathBuf;

/// Errors raised while validating, building, cleaning or installing targets.
///
/// Every variant except [`BuildError::Spawn`] maps to one of the fatal
/// categories: configuration problems, toolchain failures and filesystem
/// failures. None of them are retried; they are propagated up to the driver,
/// which prints them and exits with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("target `{target}` is missing required field `{field}`")]
    MissingField {
        target: String,
        field: &'static str,
    },

    #[error("target `{target}` has no sources")]
    EmptySources { target: String },

    #[error("`{}` is not found, self-rebuild is not possible", path.display())]
    MissingConfigSource { path: PathBuf },

    #[error("dependency cycle detected: {}", cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("unknown target `{name}`")]
    UnknownTarget { name: String },

    #[error("target `{target}` depends on unknown target `{dependency}`")]
    UnknownDependency { target: String, dependency: String },

    #[error("target `{name}` is declared more than once")]
    DuplicateTarget { name: String },

    #[error("target `{target}` compiles more than one source to `{}`", object.display())]
    DuplicateObject { target: String, object: PathBuf },

    #[error("cannot split {what} `{value}` into words")]
    BadFlags { what: String, value: String },

    #[error("target `{name}` is not an executable and cannot be run")]
    NotExecutable { name: String },

    #[error("command `{command}` failed with {}", describe_code(*code))]
    ToolchainFailure { command: String, code: Option<i32> },

    #[error(
        "failed to compile {} source file(s) of target `{target}`: {}",
        failures.len(),
        failures.join("; ")
    )]
    CompileFailed {
        target: String,
        failures: Vec<String>,
    },

    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {action} `{}`", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target `{target}` requires missing libraries: {}", missing.join(", "))]
    MissingLibraries {
        target: String,
        missing: Vec<String>,
    },

    #[error("self-rebuild has already run in this process")]
    BootstrapAlreadyRan,

    #[error("failed to start the async runtime")]
    Runtime(#[source] std::io::Error),
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl BuildError {
    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        BuildError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
