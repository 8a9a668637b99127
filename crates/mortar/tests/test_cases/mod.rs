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

use super::*;
use expect_test::expect;
use filetime::{FileTime, set_file_mtime};

fn touch_future(path: &Path) {
    let now = FileTime::now();
    set_file_mtime(path, FileTime::from_unix_time(now.unix_seconds() + 100, 0)).unwrap();
}

#[test]
fn test_build_library_project() {
    let dir = TestDir::new("library");
    check(
        get_stdout(&dir, ["build"]),
        expect![[r#"
            info: Building target 'libadd'
            command: sh fakecc.sh -fPIC -c -o libadd.o libadd.c
            info: Building shared library 'libadd'
            command: sh fakecc.sh -shared -o libadd.so libadd.o
            info: Building static library 'libadd'
            command: sh fakear.sh rcs libadd.a libadd.o
            info: Building target 'testlibadd'
            command: sh fakecc.sh -c -o test.o test.c
            info: Linking executable 'testlibadd'
            command: sh fakecc.sh test.o -L. -ladd '-Wl,-rpath,.' -o testlibadd
        "#]],
    );
    for f in ["libadd.o", "libadd.so", "libadd.a", "test.o", "testlibadd"] {
        assert!(dir.join(f).exists(), "{f} is missing");
    }

    check(
        get_stdout(&dir, ["build"]),
        expect![[r#"
            info: Building target 'libadd'
            info: Target 'libadd' is up to date
            info: Building target 'testlibadd'
            info: Target 'testlibadd' is up to date
        "#]],
    );
}

#[test]
fn test_touched_source_rebuilds_and_relinks() {
    let dir = TestDir::new("library");
    mortar_cmd(&dir).args(["build", "-q"]).assert().success();

    touch_future(&dir.join("test.c"));
    check(
        get_stdout(&dir, ["build", "testlibadd"]),
        expect![[r#"
            info: Building target 'libadd'
            info: Target 'libadd' is up to date
            info: Building target 'testlibadd'
            command: sh fakecc.sh -c -o test.o test.c
            info: Linking executable 'testlibadd'
            command: sh fakecc.sh test.o -L. -ladd '-Wl,-rpath,.' -o testlibadd
        "#]],
    );
}

#[test]
fn test_deleted_artifact_is_not_relinked() {
    let dir = TestDir::new("library");
    mortar_cmd(&dir).args(["build", "-q"]).assert().success();
    std::fs::remove_file(dir.join("testlibadd")).unwrap();

    let out = get_stdout(&dir, ["build"]);
    assert!(!out.contains("command:"));
    assert!(!dir.join("testlibadd").exists());
}

#[test]
fn test_build_selected_dependency_only() {
    let dir = TestDir::new("library");
    check(
        get_stdout(&dir, ["build", "libadd", "--jobs", "1"]),
        expect![[r#"
            info: Building target 'libadd'
            command: sh fakecc.sh -fPIC -c -o libadd.o libadd.c
            info: Building shared library 'libadd'
            command: sh fakecc.sh -shared -o libadd.so libadd.o
            info: Building static library 'libadd'
            command: sh fakear.sh rcs libadd.a libadd.o
        "#]],
    );
    assert!(!dir.join("test.o").exists());
}

#[test]
fn test_compiler_flag_overrides_manifest() {
    let dir = TestDir::new("library");
    let out = get_stdout(&dir, ["build", "libadd", "--cc", "sh fakecc.sh -DFROM_FLAG"]);
    assert!(out.contains("command: sh fakecc.sh -DFROM_FLAG -fPIC -c -o libadd.o libadd.c"));
    assert!(out.contains("command: sh fakear.sh rcs libadd.a libadd.o"));
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = TestDir::new("library");
    let out = get_stdout(&dir, ["build", "--dry-run"]);
    assert!(out.contains("command: sh fakecc.sh -c -o test.o test.c"));
    assert!(!dir.join("libadd.o").exists());
    assert!(!dir.join("testlibadd").exists());
}

#[test]
fn test_clean() {
    let dir = TestDir::new("library");
    mortar_cmd(&dir).args(["build", "-q"]).assert().success();

    check(
        get_stdout(&dir, ["clean"]),
        expect![[r#"
            info: Clean build files for 'libadd'
            info: Clean build files for 'testlibadd'
        "#]],
    );
    for f in ["libadd.o", "libadd.so", "libadd.a", "test.o", "testlibadd"] {
        assert!(!dir.join(f).exists(), "{f} was not removed");
    }
    assert!(dir.join("libadd.c").exists());
    assert!(dir.join("libadd.h").exists());

    // nothing left to remove
    mortar_cmd(&dir).args(["clean"]).assert().success();
}

#[test]
fn test_run() {
    let dir = TestDir::new("library");
    check(
        get_stdout(&dir, ["run", "testlibadd", "-q", "--", "1", "2"]),
        expect![[r#"
            running testlibadd 1 2
        "#]],
    );

    check(
        get_stdout(&dir, ["run", "testlibadd"]),
        expect![[r#"
            info: Building target 'libadd'
            info: Target 'libadd' is up to date
            info: Building target 'testlibadd'
            info: Target 'testlibadd' is up to date
            command: ./testlibadd
            running testlibadd
        "#]],
    );
}

#[test]
fn test_run_library_fails() {
    let dir = TestDir::new("library");
    let err = get_err_stderr(&dir, ["run", "libadd"]);
    assert!(err.starts_with("error: failed to run `libadd`"));
    assert!(err.contains("target `libadd` is not an executable and cannot be run"));
}

#[test]
fn test_install() {
    let dir = TestDir::new("library");
    let prefix = tempfile::TempDir::new().unwrap();
    let bin = prefix.path().join("bin");
    let lib = prefix.path().join("lib");
    let include = prefix.path().join("include");

    mortar_cmd(&dir)
        .args(["install", "-q", "--bin-dir"])
        .arg(&bin)
        .arg("--include-dir")
        .arg(&include)
        .env("LIBDIR", &lib)
        .assert()
        .success();

    assert!(bin.join("testlibadd").exists());
    assert!(lib.join("libadd.so").exists());
    assert!(lib.join("libadd.a").exists());
    assert_eq!(
        read(include.join("libadd.h")),
        read(dir.join("libadd.h"))
    );
}

#[test]
fn test_install_without_build_fails() {
    let dir = TestDir::new("library");
    let prefix = tempfile::TempDir::new().unwrap();
    let err = mortar_cmd(&dir)
        .args(["install", "-q", "--no-build", "--lib-dir"])
        .arg(prefix.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .to_owned();
    let err = String::from_utf8(err).unwrap();
    assert!(err.contains("failed to copy"), "{err}");
    assert!(err.contains("libadd.so"), "{err}");
}

#[test]
fn test_compile_failure() {
    let dir = TestDir::new("broken");
    let err = get_err_stderr(&dir, ["build", "-j", "1"]);
    assert!(err.contains("bad.c: error: FAIL"), "{err}");
    assert!(
        err.contains(
            "error: failed to compile 1 source file(s) of target `app`: bad.c (command `sh fakecc.sh -c -Wall -o bad.o bad.c` failed with exit code 1)"
        ),
        "{err}"
    );
    assert!(dir.join("good.o").exists());
    assert!(!dir.join("app").exists());
}

#[test]
fn test_cycle_is_reported() {
    let dir = TestDir::new("cycle");
    let err = get_err_stderr(&dir, ["build"]);
    assert!(err.contains("dependency cycle detected: a -> b -> a"), "{err}");
    assert!(!dir.join("a.o").exists());
}

#[test]
fn test_cycle_beside_independent_target_is_reported() {
    let dir = TestDir::new("disjoint_cycle");
    let err = get_err_stderr(&dir, ["build", "-q"]);
    assert!(err.contains("dependency cycle detected: a -> b -> a"), "{err}");
    assert!(dir.join("app").exists());
    assert!(!dir.join("a.o").exists());

    let err = get_err_stderr(&dir, ["clean", "-q"]);
    assert!(err.contains("dependency cycle detected: a -> b -> a"), "{err}");
}

#[test]
fn test_unknown_target() {
    let dir = TestDir::new("library");
    check(
        get_err_stderr(&dir, ["build", "nope"]),
        expect![[r#"
            error: unknown target `nope`
        "#]],
    );
}

#[test]
fn test_missing_manifest() {
    let dir = TestDir::new_empty();
    let err = get_err_stderr(&dir, ["build"]);
    assert!(
        err.starts_with("error: could not find a `mortar.json` file in `$ROOT`"),
        "{err}"
    );
}

#[test]
fn test_project_found_from_subdirectory() {
    let dir = TestDir::new("library");
    let sub = dir.join("nested/deeper");
    std::fs::create_dir_all(&sub).unwrap();
    mortar_cmd(&sub).args(["build", "-q"]).assert().success();
    assert!(dir.join("testlibadd").exists());

    mortar_cmd(&TestDir::new_empty())
        .args(["clean", "-q", "-C"])
        .arg(dir.join("nested"))
        .assert()
        .success();
    assert!(!dir.join("testlibadd").exists());
}
