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

//! Installed-library checks through `pkg-config`.

use std::path::Path;
use std::process::{Command, Stdio};

use colored::Colorize;
use mortarutil::error::{BuildError, BuildResult};
use mortarutil::report::Reporter;

/// The libraries among `libs` that `pkg-config` does not know about. If
/// `pkg-config` itself is missing, nothing can be confirmed and every
/// library is reported missing.
pub fn missing_libs(reporter: &Reporter, libs: &[String]) -> Vec<String> {
    let Ok(pkg_config) = which::which("pkg-config") else {
        reporter.info(format!(
            "Program {} is not found. Can't check installed libs.",
            "pkg-config".cyan()
        ));
        return libs.to_vec();
    };
    libs.iter()
        .filter(|lib| !probe_one(reporter, &pkg_config, lib))
        .cloned()
        .collect()
}

fn probe_one(reporter: &Reporter, pkg_config: &Path, lib: &str) -> bool {
    let found = Command::new(pkg_config)
        .args(["--exists", lib])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success());
    let answer = if found { "YES".green() } else { "NO".red() };
    reporter.info(format!("Checking for {} ... {}", lib.cyan(), answer));
    found
}

/// Whether every library in `libs` is installed.
pub fn check_libs(reporter: &Reporter, libs: &[String]) -> bool {
    missing_libs(reporter, libs).is_empty()
}

/// Fails with [`BuildError::MissingLibraries`] unless every library `target`
/// requires is installed.
pub fn require_libs(reporter: &Reporter, target: &str, libs: &[String]) -> BuildResult<()> {
    let missing = missing_libs(reporter, libs);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BuildError::MissingLibraries {
            target: target.to_string(),
            missing,
        })
    }
}

#[test]
fn test_unknown_library_is_missing() {
    let libs = vec!["mortar-no-such-library-0xdead".to_string()];
    let reporter = Reporter::new(true);
    assert!(!check_libs(&reporter, &libs));
    let e = require_libs(&reporter, "app", &libs).unwrap_err();
    expect_test::expect!["target `app` requires missing libraries: mortar-no-such-library-0xdead"]
        .assert_eq(&e.to_string());
}

#[test]
fn test_nothing_required() {
    assert!(require_libs(&Reporter::new(true), "app", &[]).is_ok());
}
