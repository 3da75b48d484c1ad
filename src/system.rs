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

//! Hardware variants and the on-disk directory layout.
//!
//! All build artifacts live below a root directory:
//!
//! ```text
//! bin/<system>/<name>.{rel,ihx,map,bin,lab,kcc}
//! bin/<system>/__debug.txt
//! lib/<system>/caos.lib
//! ```
//!
//! Artifacts of the two variants never share a directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{KcError, Result};

/// Name of the persisted configuration file in the root directory.
pub const CONFIG_FILE_NAME: &str = ".config";

/// Name of the static runtime library inside `lib/<system>/`.
pub const LIBRARY_FILE_NAME: &str = "caos.lib";

/// Name of the emulator debug script inside `bin/<system>/`.
pub const DEBUG_SCRIPT_NAME: &str = "__debug.txt";

/// A supported KC85 hardware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum System {
    #[serde(rename = "kc85_3")]
    Kc85_3,
    #[serde(rename = "kc85_4")]
    Kc85_4,
}

impl System {
    /// Every known variant, in the order they are processed.
    pub const ALL: [System; 2] = [System::Kc85_3, System::Kc85_4];

    /// The textual name used on the command line, in `.config` and in paths.
    pub fn name(self) -> &'static str {
        match self {
            System::Kc85_3 => "kc85_3",
            System::Kc85_4 => "kc85_4",
        }
    }

    /// Preprocessor define handed to the C compiler.
    pub fn define(self) -> &'static str {
        match self {
            System::Kc85_3 => "-DKC85_3=1",
            System::Kc85_4 => "-DKC85_4=1",
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for System {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        System::ALL
            .into_iter()
            .find(|system| system.name() == s)
            .ok_or_else(|| ConfigError::UnknownSystem(s.to_string()))
    }
}

/// Resolves artifact paths below a root directory.
///
/// Paths are produced relative to the root, because external tools are run
/// with the root as their working directory. Use [`Layout::absolute`] for
/// paths this process reads or writes itself.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a root-relative path onto the root.
    pub fn absolute(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// `bin/<system>`
    pub fn bin_dir(&self, system: System) -> PathBuf {
        Path::new("bin").join(system.name())
    }

    /// `lib/<system>`
    pub fn lib_dir(&self, system: System) -> PathBuf {
        Path::new("lib").join(system.name())
    }

    /// `bin/<system>/<name>.<ext>`
    pub fn artifact(&self, system: System, name: &str, ext: &str) -> PathBuf {
        self.bin_dir(system).join(format!("{}.{}", name, ext))
    }

    /// `lib/<system>/caos.lib`
    pub fn library(&self, system: System) -> PathBuf {
        self.lib_dir(system).join(LIBRARY_FILE_NAME)
    }

    /// `bin/<system>/__debug.txt`
    pub fn debug_script(&self, system: System) -> PathBuf {
        self.bin_dir(system).join(DEBUG_SCRIPT_NAME)
    }

    /// `<root>/.config`
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Create `bin/<system>` and `lib/<system>` for every variant.
    pub fn ensure_dirs(&self) -> Result<()> {
        for system in System::ALL {
            for dir in [self.bin_dir(system), self.lib_dir(system)] {
                let path = self.absolute(dir);
                fs::create_dir_all(&path).map_err(|e| KcError::io(&path, e))?;
            }
        }
        Ok(())
    }
}
