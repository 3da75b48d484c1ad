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

//! Build and run pipelines.
//!
//! Every command runs its steps in order and stops at the first failure.
//! Nothing is rolled back; artifacts written by earlier steps stay on disk.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::config::Config;
use crate::error::{KcError, Result};
use crate::output::{build_image, PayloadSource, DEFAULT_LOAD_ADDRESS};
use crate::runner::{EmulatorLaunch, Invocation, Invoker, Toolchain, LIBRARY_SOURCES};
use crate::symbols;
use crate::system::{Layout, System};

/// A KC85/3 program printing "HELLO WORLD", used by the self-test.
///
/// It starts with the CAOS menu prologue (`7F 7F "HELLO" 01`), so it shows
/// up as the `HELLO` command, then calls the OSTR routine with the string
/// inlined after the call and returns.
pub const HELLO_PROGRAM: &[u8] = &[
    0x7F, 0x7F, b'H', b'E', b'L', b'L', b'O', 0x01, // menu entry
    0xCD, 0x03, 0xF0, // call 0xF003
    0x23, // OSTR
    b'H', b'E', b'L', b'L', b'O', b' ', b'W', b'O', b'R', b'L', b'D', 0x0D, 0x0A, 0x00,
    0xC9, // ret
];

/// Build name used by the self-test.
pub const SELF_TEST_NAME: &str = "test";

/// Name of a build derived from a path: its file stem.
pub fn build_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string())
}

/// Runs commands against one root directory with one configuration.
pub struct Pipeline<'a, I: Invoker> {
    config: &'a Config,
    layout: &'a Layout,
    invoker: I,
}

impl<'a, I: Invoker> Pipeline<'a, I> {
    pub fn new(config: &'a Config, layout: &'a Layout, invoker: I) -> Self {
        Self {
            config,
            layout,
            invoker,
        }
    }

    /// The invoker, e.g. to inspect recorded calls.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    fn toolchain(&self) -> Toolchain<'a> {
        Toolchain::new(self.config, self.layout)
    }

    fn step(&mut self, step: &'static str, subject: &str, invocation: Invocation) -> Result<()> {
        self.invoker
            .run(&invocation)
            .map_err(|source| KcError::Step {
                step,
                subject: subject.to_string(),
                source,
            })
    }

    fn read(&self, relative: &Path) -> Result<Vec<u8>> {
        let path = self.layout.absolute(relative);
        fs::read(&path).map_err(|e| KcError::io(&path, e))
    }

    fn write(&self, relative: &Path, data: &[u8]) -> Result<()> {
        let path = self.layout.absolute(relative);
        fs::write(&path, data).map_err(|e| KcError::io(&path, e))
    }

    /// Package `bin/<system>/<name>.bin` into `bin/<system>/<name>.kcc`.
    fn package(&self, system: System, name: &str, source: PayloadSource) -> Result<()> {
        let binary = self.read(&self.layout.artifact(system, name, "bin"))?;
        let image = source.image(&name.to_uppercase(), &binary)?;
        debug!(
            "{} bytes of {:?} output packaged into {} bytes",
            binary.len(),
            source,
            image.len()
        );
        let kcc = self.layout.artifact(system, name, "kcc");
        self.write(&kcc, &image)?;
        println!("wrote {}", kcc.display());
        Ok(())
    }

    /// Compile and link a C source, convert it to a flat binary and package it.
    ///
    /// Returns the build name.
    pub fn make(&mut self, system: System, source: &Path) -> Result<String> {
        let name = build_name(source);
        let subject = source.display().to_string();
        self.layout.ensure_dirs()?;

        info!("compiling {} for {}", subject, system);
        let compile = self.toolchain().compile_and_link(system, source);
        self.step("compiling", &subject, compile)?;

        let makebin = self.toolchain().hex_to_binary(system, &name);
        self.step("makebin", &subject, makebin)?;

        self.package(system, &name, PayloadSource::Compiler)?;
        Ok(name)
    }

    /// Assemble a source file and package the result.
    ///
    /// The build is named after the last component of `output`, or after the
    /// source file stem if no output name is given. Returns the build name.
    pub fn asm(&mut self, system: System, source: &Path, output: Option<&str>) -> Result<String> {
        let name = match output {
            Some(output) => Path::new(output)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| output.to_string()),
            None => build_name(source),
        };
        let subject = source.display().to_string();
        self.layout.ensure_dirs()?;

        info!("assembling {} for {}", subject, system);
        let assemble = self.toolchain().assemble(system, source, &name);
        self.step("assembling", &subject, assemble)?;

        self.package(system, &name, PayloadSource::Assembler)?;
        Ok(name)
    }

    fn launch(&mut self, launch: EmulatorLaunch, name: &str) -> Result<()> {
        let kcc = self.layout.absolute(launch.kcc_path());
        if !kcc.is_file() {
            return Err(KcError::MissingBuild {
                name: name.to_string(),
                path: kcc,
            });
        }
        info!(
            "starting {} with {}{}",
            self.config.mess.display(),
            launch.kcc_path().display(),
            if launch.is_debug() { " (debugger)" } else { "" }
        );
        self.step("emulator", name, launch.invocation())
    }

    /// Run a built program in the emulator.
    pub fn run(&mut self, system: System, name: &str) -> Result<()> {
        self.layout.ensure_dirs()?;
        let launch = EmulatorLaunch::new(self.config, self.layout, system, name);
        self.launch(launch, name)
    }

    /// Write the debug script and run a built program with the debugger.
    ///
    /// An unresolved breakpoint only means the debugger starts without one.
    pub fn debug(&mut self, system: System, name: &str, breakpoint: Option<&str>) -> Result<()> {
        self.layout.ensure_dirs()?;
        let resolved = match breakpoint {
            Some(brk) => symbols::resolve(self.layout, system, name, brk)?,
            None => None,
        };

        let script = match &resolved {
            Some(bp) => {
                info!("setting breakpoint at ${}", bp.address);
                format!("go {}\n", bp.address)
            }
            None => {
                info!("no breakpoint set");
                "\n".to_string()
            }
        };
        self.write(&self.layout.debug_script(system), script.as_bytes())?;

        let launch =
            EmulatorLaunch::new(self.config, self.layout, system, name).with_debugger(self.layout);
        self.launch(launch, name)
    }

    /// Rebuild `caos.lib` for every variant.
    pub fn libs(&mut self) -> Result<()> {
        self.layout.ensure_dirs()?;
        for system in System::ALL {
            for module in LIBRARY_SOURCES {
                info!("compiling lib/src/{}.c for {}", module, system);
                let compile = self.toolchain().compile_to_object(system, module);
                self.step("compiling lib", module, compile)?;
            }
            let archive = self.toolchain().archive(system, LIBRARY_SOURCES);
            let library = self.layout.library(system);
            self.step("building lib", &library.display().to_string(), archive)?;
            println!("wrote {}", library.display());
        }
        Ok(())
    }

    /// Build the hardcoded HELLO image and run it.
    pub fn self_test(&mut self, system: System) -> Result<()> {
        self.layout.ensure_dirs()?;
        let image = build_image("HELLO", DEFAULT_LOAD_ADDRESS, HELLO_PROGRAM)?;
        let kcc = self.layout.artifact(system, SELF_TEST_NAME, "kcc");
        self.write(&kcc, &image)?;
        println!("wrote {}", kcc.display());
        self.run(system, SELF_TEST_NAME)
    }
}

/// Remove `bin/<system>` for every variant.
///
/// Directories that do not exist are skipped.
pub fn clean(layout: &Layout) -> Result<()> {
    for system in System::ALL {
        let path = layout.absolute(layout.bin_dir(system));
        match fs::remove_dir_all(&path) {
            Ok(()) => info!("removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist", path.display())
            }
            Err(e) => return Err(KcError::io(&path, e)),
        }
    }
    Ok(())
}
