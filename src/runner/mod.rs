// kc85sdk - C and assembler build tooling for KC85/3 and KC85/4 home computers
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
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

//! Runner module for the external toolchain and emulator.
//!
//! This module provides functionality to:
//! - Locate external programs
//! - Run them as blocking subprocesses with inherited output
//! - Build the argument lists for the compiler, archiver, hex converter,
//!   assembler and the MESS emulator

mod mess;
mod toolchain;

pub use mess::{EmulatorLaunch, MESS_RESOLUTION};
pub use toolchain::{Toolchain, LIBRARY_SOURCES, SDCC_FLAGS};

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use thiserror::Error;

/// Errors that can occur while running an external program.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started at all.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran but did not exit with status zero.
    #[error("'{program}' exited with {}", describe_exit(.code))]
    ExitStatus { program: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// The program name as shown in messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes external programs.
///
/// Success means the program was launched and exited with status zero.
pub trait Invoker {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError>;
}

/// Runs programs as blocking child processes in a fixed working directory.
///
/// Output is not captured. There is no timeout; a hanging tool blocks the
/// caller until it exits.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    working_dir: PathBuf,
}

impl ProcessInvoker {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl Invoker for ProcessInvoker {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError> {
        debug!("running: {}", invocation);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|source| ToolError::Launch {
                program: invocation.program_name(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::ExitStatus {
                program: invocation.program_name(),
                code: status.code(),
            })
        }
    }
}

/// Locate a program, either by explicit path or by searching `PATH`.
pub fn probe(program: &Path) -> Option<PathBuf> {
    which::which(program).ok()
}
