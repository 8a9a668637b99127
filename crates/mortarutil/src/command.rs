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

use std::fmt;
use std::path::{Path, PathBuf};

/// One invocation of an external tool: compiler, linker, archiver, or the
/// program being run. Arguments are passed verbatim, no shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args: vec![],
            cwd: None,
        }
    }

    /// Builds a command from a word list whose first element is the program.
    /// Returns `None` for an empty list.
    pub fn from_words<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words = words.into_iter().map(Into::into);
        let program = words.next()?;
        Some(ToolCommand {
            program,
            args: words.collect(),
            cwd: None,
        })
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut ToolCommand {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut ToolCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.args.push(arg.into());
        }
        self
    }

    pub fn args_with_cond<I, S>(&mut self, cond: bool, args: I) -> &mut ToolCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if cond {
            for arg in args {
                self.args.push(arg.into());
            }
        }
        self
    }

    pub fn path_arg(&mut self, path: &Path) -> &mut ToolCommand {
        self.args.push(path.display().to_string());
        self
    }

    pub fn path_args<P: AsRef<Path>>(&mut self, paths: &[P]) -> &mut ToolCommand {
        for p in paths {
            self.args.push(p.as_ref().display().to_string());
        }
        self
    }

    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut ToolCommand {
        self.cwd = Some(dir.into());
        self
    }

    /// The command line as echoed to the user, quoted so that a POSIX shell
    /// splits it back into the same words.
    pub fn build(&self) -> String {
        let words =
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        // only nul bytes cannot be quoted
        shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

#[test]
fn test_build_quotes_for_the_shell() {
    let mut cmd = ToolCommand::new("cc");
    cmd.args(["-c", "-DNAME=a b", "-DQ=\"x y\"", "", "-o", "a.o", "a.c"]);
    let line = cmd.build();
    assert_eq!(line, "cc -c '-DNAME=a b' '-DQ=\"x y\"' '' -o a.o a.c");

    let mut words = shlex::split(&line).unwrap();
    assert_eq!(words.remove(0), cmd.program);
    assert_eq!(words, cmd.args);
}

#[test]
fn test_build_leaves_plain_words_alone() {
    let mut cmd = ToolCommand::new("./app");
    cmd.args(["-L.", "-ladd", "src/main.o", "x+y@z:1"]);
    assert_eq!(cmd.build(), "./app -L. -ladd src/main.o x+y@z:1");
}

#[test]
fn test_from_words() {
    let cmd = ToolCommand::from_words(["ccache", "gcc"]).unwrap();
    assert_eq!(cmd.program, "ccache");
    assert_eq!(cmd.args, vec!["gcc".to_string()]);
    assert!(ToolCommand::from_words(Vec::<String>::new()).is_none());
}
