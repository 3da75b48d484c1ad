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

//! Persisted tool configuration.
//!
//! The configuration is a single JSON object stored in `.config` next to the
//! build directories. It is loaded once per invocation and passed around by
//! reference; nothing mutates it while a command runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::probe;
use crate::system::System;

/// Errors raised while loading, saving or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown system '{0}', must be 'kc85_3' or 'kc85_4'")]
    UnknownSystem(String),

    #[error("'{tool}' not found (configured as '{}')", path.display())]
    ToolNotFound { tool: &'static str, path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Paths of the external programs and the default hardware variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// C compiler.
    pub sdcc: PathBuf,
    /// Library archiver.
    pub sdar: PathBuf,
    /// Intel hex to flat binary converter.
    pub makebin: PathBuf,
    /// Standalone assembler.
    pub z80asm: PathBuf,
    /// Emulator.
    pub mess: PathBuf,
    /// Variant used when a command does not name one.
    pub system: System,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sdcc: PathBuf::from("sdcc"),
            sdar: PathBuf::from("sdar"),
            makebin: PathBuf::from("makebin"),
            z80asm: PathBuf::from("z80asm"),
            mess: PathBuf::from("mess"),
            system: System::Kc85_3,
        }
    }
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// A missing file yields the defaults. Keys absent from the file keep
    /// their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from JSON text, merging over the defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Write the configuration to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let text = serde_json::to_string_pretty(self)
            .map_err(io::Error::from)
            .map_err(write_err)?;
        fs::write(path, text + "\n").map_err(write_err)
    }

    /// Return a copy with a different default variant.
    pub fn with_system(&self, system: System) -> Self {
        Self {
            system,
            ..self.clone()
        }
    }

    /// All configured programs, labelled by their role.
    pub fn tools(&self) -> [(&'static str, &Path); 5] {
        [
            ("mess", self.mess.as_path()),
            ("makebin", self.makebin.as_path()),
            ("sdcc", self.sdcc.as_path()),
            ("sdar", self.sdar.as_path()),
            ("z80asm", self.z80asm.as_path()),
        ]
    }

    /// Check that every configured program can be found.
    pub fn verify_tools(&self) -> Result<(), ConfigError> {
        for (tool, path) in self.tools() {
            match probe(path) {
                Some(found) => debug!("'{}' found at {}", tool, found.display()),
                None => {
                    return Err(ConfigError::ToolNotFound {
                        tool,
                        path: path.to_path_buf(),
                    })
                }
            }
        }
        Ok(())
    }
}
