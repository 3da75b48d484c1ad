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

//! Error types for the KC85 build tooling.
//!
//! Every fatal condition a command can hit ends up as a [`KcError`]. The
//! four categories map to distinct process exit codes, see
//! [`KcError::exit_code`]. A breakpoint that cannot be resolved is not an
//! error at all; it is reported as `None` by the symbol resolver.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::output::KccError;
use crate::runner::ToolError;

/// Broad failure category of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A tool is missing, the variant name is invalid, or an address is out of range.
    Configuration,
    /// An external program could not be launched or exited unsuccessfully.
    Toolchain,
    /// Reading or writing a build artifact failed.
    Io,
    /// The KCC header did not come out at exactly 128 bytes.
    Format,
}

impl ErrorKind {
    /// Process exit code reported for this category.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Toolchain => 3,
            ErrorKind::Io => 4,
            ErrorKind::Format => 5,
        }
    }
}

/// Any error that aborts a top-level command.
#[derive(Debug, Error)]
pub enum KcError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Kcc(#[from] KccError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A pipeline step reported failure for the given subject.
    #[error("{step} failed for '{subject}': {source}")]
    Step {
        step: &'static str,
        subject: String,
        #[source]
        source: ToolError,
    },

    /// A program that should exist before launching the emulator was not built.
    #[error("no build named '{name}' found at {}", path.display())]
    MissingBuild { name: String, path: PathBuf },

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl KcError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        KcError::Io {
            path: path.into(),
            source,
        }
    }

    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KcError::Config(_) => ErrorKind::Configuration,
            KcError::Kcc(e) => e.kind(),
            KcError::Tool(_) | KcError::Step { .. } | KcError::MissingBuild { .. } => {
                ErrorKind::Toolchain
            }
            KcError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, KcError>;
