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

//! KC85 SDK CLI
//!
//! Builds C and assembler programs for the KC85/3 and KC85/4 home computers
//! and runs them in MESS.

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kc85sdk::{clean, Config, KcError, Layout, Pipeline, ProcessInvoker, System};

/// C/ASM SDK for KC85/3 and KC85/4 home computers
#[derive(Parser, Debug)]
#[command(name = "kc")]
#[command(version)]
#[command(about = "C/ASM SDK for KC85/3 and KC85/4 home computers")]
#[command(long_about = r#"
Builds C sources with SDCC and assembler sources with z80asm, packages the
result as KCC files and runs them in the MESS emulator.

Artifacts are written to bin/<system>/, the runtime library to
lib/<system>/caos.lib. Tool paths and the default system are kept in .config.

Example usage:
  kc config --mess ~/mess/mess64 --system kc85_4
  kc make src/hello.c
  kc run hello
  kc debug hello main
"#)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root containing bin/, lib/ and .config
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure tool paths for your local environment
    Config {
        /// How to call MESS
        #[arg(long)]
        mess: Option<PathBuf>,
        /// How to call sdcc
        #[arg(long)]
        sdcc: Option<PathBuf>,
        /// How to call sdar
        #[arg(long)]
        sdar: Option<PathBuf>,
        /// How to call makebin
        #[arg(long)]
        makebin: Option<PathBuf>,
        /// How to call z80asm
        #[arg(long)]
        z80asm: Option<PathBuf>,
        /// Default system (kc85_3 or kc85_4)
        #[arg(long)]
        system: Option<System>,
    },

    /// Select the default system
    System {
        /// kc85_3 or kc85_4
        system: System,
    },

    /// Compile a C source into a program
    Make {
        /// C source file
        source: PathBuf,
    },

    /// Assemble an assembler source into a program
    Asm {
        /// Assembler source file
        #[arg(default_value = "out.s")]
        source: PathBuf,
        /// Program name (defaults to the source file name)
        name: Option<String>,
    },

    /// Run a compiled program in MESS
    Run {
        /// Program name
        #[arg(default_value = "out")]
        program: String,
    },

    /// Like run, but with the debugger active, optionally breaking at a C function or ASM label
    Debug {
        /// Program name
        #[arg(default_value = "out")]
        program: String,
        /// C function or assembler label to break at
        breakpoint: Option<String>,
    },

    /// Remove build files
    Clean,

    /// Run a hardcoded HELLO WORLD program
    Test,

    /// Rebuild caos.lib for kc85_3 and kc85_4
    Libs,
}

fn init_logging(verbose: bool) {
    env_logger::Builder::from_default_env()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Sources are named relative to the current directory, but tools run in the root.
fn source_path(root: &Path, source: PathBuf) -> Result<PathBuf, KcError> {
    if root == Path::new(".") {
        return Ok(source);
    }
    std::path::absolute(&source).map_err(|e| KcError::io(source, e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), KcError> {
    let layout = Layout::new(&cli.root);
    let config = Config::load(&layout.config_file())?;
    let system = config.system;
    let mut pipeline = Pipeline::new(&config, &layout, ProcessInvoker::new(&cli.root));

    match cli.command {
        Command::Config {
            mess,
            sdcc,
            sdar,
            makebin,
            z80asm,
            system,
        } => {
            let updated = Config {
                mess: mess.unwrap_or_else(|| config.mess.clone()),
                sdcc: sdcc.unwrap_or_else(|| config.sdcc.clone()),
                sdar: sdar.unwrap_or_else(|| config.sdar.clone()),
                makebin: makebin.unwrap_or_else(|| config.makebin.clone()),
                z80asm: z80asm.unwrap_or_else(|| config.z80asm.clone()),
                system: system.unwrap_or(config.system),
            };
            updated.verify_tools()?;
            updated.save(&layout.config_file())?;
            println!(".config written");
        }
        Command::System { system } => {
            config.with_system(system).save(&layout.config_file())?;
            println!(".config written");
        }
        Command::Make { source } => {
            let source = source_path(&cli.root, source)?;
            pipeline.make(system, &source)?;
        }
        Command::Asm { source, name } => {
            let source = source_path(&cli.root, source)?;
            pipeline.asm(system, &source, name.as_deref())?;
        }
        Command::Run { program } => {
            pipeline.run(system, &program)?;
        }
        Command::Debug {
            program,
            breakpoint,
        } => {
            pipeline.debug(system, &program, breakpoint.as_deref())?;
        }
        Command::Clean => {
            clean(&layout)?;
            println!("done.");
        }
        Command::Test => {
            pipeline.self_test(system)?;
        }
        Command::Libs => {
            pipeline.libs()?;
        }
    }

    Ok(())
}
