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

//! MESS emulator launching.

use std::path::PathBuf;

use crate::config::Config;
use crate::system::{Layout, System};

use super::Invocation;

/// Window resolution passed to MESS.
pub const MESS_RESOLUTION: &str = "640x512";

/// Directory with the system ROMs, relative to the root.
const ROM_PATH: &str = "bios";

/// Emulator launch for a built KCC program.
#[derive(Debug, Clone)]
pub struct EmulatorLaunch {
    mess: PathBuf,
    system: System,
    kcc: PathBuf,
    debug_script: Option<PathBuf>,
}

impl EmulatorLaunch {
    /// Launch `bin/<system>/<name>.kcc` via quick-load.
    pub fn new(config: &Config, layout: &Layout, system: System, name: &str) -> Self {
        Self {
            mess: config.mess.clone(),
            system,
            kcc: layout.artifact(system, name, "kcc"),
            debug_script: None,
        }
    }

    /// Start with the debugger active, running `bin/<system>/__debug.txt`.
    pub fn with_debugger(mut self, layout: &Layout) -> Self {
        self.debug_script = Some(layout.debug_script(self.system));
        self
    }

    /// The KCC file that will be quick-loaded, relative to the root.
    pub fn kcc_path(&self) -> &PathBuf {
        &self.kcc
    }

    /// Whether the debugger will be enabled.
    pub fn is_debug(&self) -> bool {
        self.debug_script.is_some()
    }

    pub fn invocation(&self) -> Invocation {
        let inv = Invocation::new(&self.mess)
            .arg(self.system.name())
            .args(["-rompath", ROM_PATH])
            .args(["-window", "-resolution", MESS_RESOLUTION, "-nokeepaspect"])
            .arg("-skip_gameinfo")
            .arg("-quik")
            .arg(&self.kcc);

        match &self.debug_script {
            Some(script) => inv.args(["-debug", "-debugscript"]).arg(script),
            None => inv,
        }
    }
}
