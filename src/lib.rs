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

//! KC85 SDK Library
//!
//! This library builds C and assembler programs for the KC85/3 and KC85/4
//! home computers and packages them as KCC files that the MESS emulator can
//! quick-load.
//!
//! # Modules
//!
//! - [`error`] - Error types and exit codes
//! - [`system`] - Hardware variants and the artifact directory layout
//! - [`config`] - Persisted tool configuration
//! - [`output`] - KCC container format
//! - [`runner`] - External toolchain and emulator invocation
//! - [`symbols`] - Breakpoint lookup in map and label files
//! - [`pipeline`] - The build, run and debug commands
//!
//! # Example
//!
//! ```no_run
//! use kc85sdk::{Config, Layout, Pipeline, ProcessInvoker};
//! use std::path::Path;
//!
//! fn build(root: &Path) -> Result<(), kc85sdk::KcError> {
//!     let layout = Layout::new(root);
//!     let config = Config::load(&layout.config_file())?;
//!     let mut pipeline = Pipeline::new(&config, &layout, ProcessInvoker::new(root));
//!
//!     let name = pipeline.make(config.system, Path::new("hello.c"))?;
//!     pipeline.run(config.system, &name)
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod symbols;
pub mod system;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use error::{ErrorKind, KcError, Result};
pub use output::{build_image, pack_header, KccHeader};
pub use pipeline::{clean, Pipeline};
pub use runner::{Invocation, Invoker, ProcessInvoker, ToolError};
pub use system::{Layout, System};

/// The version of the KC85 SDK tools.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the tool.
pub const NAME: &str = "kc";
