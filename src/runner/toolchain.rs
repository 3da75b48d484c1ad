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

//! Argument lists for the SDCC compiler suite and the z80asm assembler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::system::{Layout, System};

use super::Invocation;

/// Flags shared by library and program builds.
///
/// The data segment starts at 0x200 and code at 0x300.
pub const SDCC_FLAGS: &[&str] = &[
    "--verbose",
    "-mz80",
    "--std-sdcc99",
    "--fomit-frame-pointer",
    "--disable-warning",
    "218",
    "--nostdinc",
    "--nostdlib",
    "--no-std-crt0",
    "--opt-code-size",
    "--code-loc",
    "0x300",
    "--data-loc",
    "0x200",
];

/// Runtime library modules, compiled from `lib/src/<name>.c`.
pub const LIBRARY_SOURCES: &[&str] = &[
    "caos_color",
    "caos_clear",
    "caos_clear_color_buf",
    "caos_wait",
    "caos_irm",
    "caos_line",
];

/// Include directory handed to the assembler.
const ASM_INCLUDE_PATH: &str = "lib/asm";

/// Builds invocations for the configured toolchain.
pub struct Toolchain<'a> {
    config: &'a Config,
    layout: &'a Layout,
}

/// A path with a trailing separator, which SDCC reads as an output directory.
fn dir_arg(dir: &Path) -> OsString {
    let mut arg = dir.as_os_str().to_os_string();
    arg.push(std::path::MAIN_SEPARATOR_STR);
    arg
}

impl<'a> Toolchain<'a> {
    pub fn new(config: &'a Config, layout: &'a Layout) -> Self {
        Self { config, layout }
    }

    /// Compile one runtime library module to an object file in `bin/<system>/`.
    pub fn compile_to_object(&self, system: System, module: &str) -> Invocation {
        let source = Path::new("lib").join("src").join(format!("{}.c", module));
        Invocation::new(&self.config.sdcc)
            .arg("-c")
            .arg(source)
            .args(SDCC_FLAGS)
            .arg("-o")
            .arg(dir_arg(&self.layout.bin_dir(system)))
    }

    /// Compile and link a C program against `caos.lib`, producing
    /// `bin/<system>/<stem>.ihx` and `.map`.
    pub fn compile_and_link(&self, system: System, source: &Path) -> Invocation {
        Invocation::new(&self.config.sdcc)
            .arg(source)
            .arg(system.define())
            .args(SDCC_FLAGS)
            .arg(crate::system::LIBRARY_FILE_NAME)
            .arg("-L")
            .arg(self.layout.lib_dir(system))
            .arg("-o")
            .arg(dir_arg(&self.layout.bin_dir(system)))
    }

    /// Rebuild `lib/<system>/caos.lib` from object files in `bin/<system>/`.
    pub fn archive(&self, system: System, modules: &[&str]) -> Invocation {
        let objects: Vec<PathBuf> = modules
            .iter()
            .map(|module| self.layout.artifact(system, module, "rel"))
            .collect();
        Invocation::new(&self.config.sdar)
            .arg("-rc")
            .arg(self.layout.library(system))
            .args(objects)
    }

    /// Convert `bin/<system>/<name>.ihx` into a flat binary `<name>.bin`.
    pub fn hex_to_binary(&self, system: System, name: &str) -> Invocation {
        Invocation::new(&self.config.makebin)
            .arg("-p")
            .arg(self.layout.artifact(system, name, "ihx"))
            .arg(self.layout.artifact(system, name, "bin"))
    }

    /// Assemble a source file into `bin/<system>/<name>.bin`, writing the
    /// label file `<name>.lab` next to it.
    ///
    /// z80asm only accepts the option values joined with `=`.
    pub fn assemble(&self, system: System, source: &Path, name: &str) -> Invocation {
        let mut label = OsString::from("--label=");
        label.push(self.layout.artifact(system, name, "lab"));
        Invocation::new(&self.config.z80asm)
            .arg("--verbose")
            .arg(format!("--includepath={}", ASM_INCLUDE_PATH))
            .arg(label)
            .arg("-o")
            .arg(self.layout.artifact(system, name, "bin"))
            .arg(source)
    }
}
