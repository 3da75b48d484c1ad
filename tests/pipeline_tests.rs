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

//! Pipeline tests with a scripted toolchain.
//!
//! The fake invoker records every call and writes the artifacts the real
//! tools would produce, so the orchestration can be checked without SDCC,
//! z80asm or MESS installed.

use std::fs;
use std::path::{Path, PathBuf};

use kc85sdk::output::{read_kcc, KCC_HEADER_SIZE};
use kc85sdk::runner::LIBRARY_SOURCES;
use kc85sdk::{
    Config, ErrorKind, Invocation, Invoker, KcError, Layout, Pipeline, System, ToolError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Records invocations and fakes the files external tools would write.
struct FakeToolchain {
    root: PathBuf,
    calls: Vec<Invocation>,
    binary: Vec<u8>,
    labels: Option<String>,
    fail_program: Option<&'static str>,
}

impl FakeToolchain {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            calls: Vec::new(),
            binary: Vec::new(),
            labels: None,
            fail_program: None,
        }
    }

    fn with_binary(mut self, binary: Vec<u8>) -> Self {
        self.binary = binary;
        self
    }

    fn with_labels(mut self, labels: &str) -> Self {
        self.labels = Some(labels.to_string());
        self
    }

    fn failing(mut self, program: &'static str) -> Self {
        self.fail_program = Some(program);
        self
    }

    fn programs(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.program_name()).collect()
    }

    fn args(inv: &Invocation) -> Vec<String> {
        inv.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl Invoker for FakeToolchain {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError> {
        self.calls.push(invocation.clone());
        let program = invocation.program_name();
        if self.fail_program == Some(program.as_str()) {
            return Err(ToolError::ExitStatus {
                program,
                code: Some(1),
            });
        }

        let args = Self::args(invocation);
        match program.as_str() {
            "makebin" => {
                fs::write(self.root.join(&args[2]), &self.binary).unwrap();
            }
            "z80asm" => {
                let out = args.iter().position(|a| a == "-o").unwrap() + 1;
                fs::write(self.root.join(&args[out]), &self.binary).unwrap();
                if let Some(labels) = &self.labels {
                    let lab = args
                        .iter()
                        .find_map(|a| a.strip_prefix("--label="))
                        .unwrap();
                    fs::write(self.root.join(lab), labels).unwrap();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn setup() -> (TempDir, Layout, Config) {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    (dir, layout, Config::default())
}

#[test]
fn test_make_strips_data_segment() {
    let (dir, layout, config) = setup();
    let binary: Vec<u8> = (0..0x300u32).map(|i| (i % 251) as u8).collect();
    let fake = FakeToolchain::new(dir.path()).with_binary(binary.clone());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let name = pipeline
        .make(System::Kc85_3, Path::new("src/hello.c"))
        .unwrap();
    assert_eq!(name, "hello");
    assert_eq!(pipeline.invoker().programs(), vec!["sdcc", "makebin"]);

    let (header, payload) =
        read_kcc(&layout.absolute(layout.artifact(System::Kc85_3, "hello", "kcc"))).unwrap();
    assert_eq!(header.name, "HELLO");
    assert_eq!(header.load_address, 0x200);
    assert_eq!(header.end_address, 0x300);
    assert_eq!(payload.len(), binary.len() - 0x200);
    assert_eq!(payload, &binary[0x200..]);
}

#[test]
fn test_make_compile_failure_stops_pipeline() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).failing("sdcc");
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let err = pipeline
        .make(System::Kc85_3, Path::new("broken.c"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Toolchain);
    assert_eq!(pipeline.invoker().programs(), vec!["sdcc"]);
    assert!(!layout
        .absolute(layout.artifact(System::Kc85_3, "broken", "kcc"))
        .exists());
}

#[test]
fn test_make_makebin_failure() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).failing("makebin");
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let err = pipeline
        .make(System::Kc85_4, Path::new("hello.c"))
        .unwrap_err();
    assert!(matches!(err, KcError::Step { step: "makebin", .. }));
}

#[test]
fn test_asm_uses_binary_unmodified() {
    let (dir, layout, config) = setup();
    let binary = vec![0x3E, 0x41, 0xCD, 0x03, 0xF0, 0x00, 0xC9];
    let fake = FakeToolchain::new(dir.path()).with_binary(binary.clone());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let name = pipeline
        .asm(System::Kc85_4, Path::new("demo/game.s"), None)
        .unwrap();
    assert_eq!(name, "game");

    let (header, payload) =
        read_kcc(&layout.absolute(layout.artifact(System::Kc85_4, "game", "kcc"))).unwrap();
    assert_eq!(header.name, "GAME");
    assert_eq!(header.load_address, 0x200);
    assert_eq!(header.end_address, 0x200 + binary.len() as u16);
    assert_eq!(payload, binary);
}

#[test]
fn test_asm_explicit_output_name() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).with_binary(vec![0xC9]);
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let name = pipeline
        .asm(System::Kc85_3, Path::new("game.s"), Some("out/pacman"))
        .unwrap();
    assert_eq!(name, "pacman");
    assert!(layout
        .absolute(layout.artifact(System::Kc85_3, "pacman", "kcc"))
        .is_file());
}

#[test]
fn test_asm_empty_binary() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    pipeline
        .asm(System::Kc85_3, Path::new("empty.s"), None)
        .unwrap();
    let kcc = fs::read(layout.absolute(layout.artifact(System::Kc85_3, "empty", "kcc"))).unwrap();
    assert_eq!(kcc.len(), KCC_HEADER_SIZE);
}

#[test]
fn test_run_passes_kcc_to_emulator() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).with_binary(vec![0xC9]);
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    pipeline.asm(System::Kc85_3, Path::new("a.s"), None).unwrap();
    pipeline.run(System::Kc85_3, "a").unwrap();

    let call = pipeline.invoker().calls.last().unwrap();
    assert_eq!(call.program_name(), "mess");
    let args = FakeToolchain::args(call);
    assert_eq!(args[0], "kc85_3");
    assert!(args.iter().any(|a| a == "-quik"));
    assert!(!args.iter().any(|a| a == "-debug"));
}

#[test]
fn test_run_missing_build() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let err = pipeline.run(System::Kc85_3, "nothing").unwrap_err();
    assert!(matches!(err, KcError::MissingBuild { .. }));
    assert!(pipeline.invoker().calls.is_empty());
}

#[test]
fn test_debug_prefers_label_file() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path())
        .with_binary(vec![0xC9])
        .with_labels("start:\tequ $0210\nloop:\tequ $0215\n");
    let mut pipeline = Pipeline::new(&config, &layout, fake);
    pipeline.asm(System::Kc85_4, Path::new("prog.s"), None).unwrap();
    fs::write(
        layout.absolute(layout.artifact(System::Kc85_4, "prog", "map")),
        "     00000400  _loop                              prog\n",
    )
    .unwrap();

    pipeline.debug(System::Kc85_4, "prog", Some("loop")).unwrap();

    let script = fs::read_to_string(layout.absolute(layout.debug_script(System::Kc85_4))).unwrap();
    assert_eq!(script, "go 0215\n");
    let args = FakeToolchain::args(pipeline.invoker().calls.last().unwrap());
    assert_eq!(args[args.len() - 3], "-debug");
}

#[test]
fn test_debug_falls_back_to_map_file() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).with_binary(vec![0u8; 0x210]);
    let mut pipeline = Pipeline::new(&config, &layout, fake);
    pipeline.make(System::Kc85_3, Path::new("hello.c")).unwrap();
    fs::write(
        layout.absolute(layout.artifact(System::Kc85_3, "hello", "map")),
        "     00000300  _main_loop                         hello\n     00000342  _main                              hello\n",
    )
    .unwrap();

    pipeline.debug(System::Kc85_3, "hello", Some("main")).unwrap();

    let script = fs::read_to_string(layout.absolute(layout.debug_script(System::Kc85_3))).unwrap();
    assert_eq!(script, "go 00000342\n");
}

#[test]
fn test_debug_unresolved_writes_blank_script() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path())
        .with_binary(vec![0xC9])
        .with_labels("start:\tequ $0200\n");
    let mut pipeline = Pipeline::new(&config, &layout, fake);
    pipeline.asm(System::Kc85_3, Path::new("prog.s"), None).unwrap();

    pipeline.debug(System::Kc85_3, "prog", Some("missing")).unwrap();

    let script = fs::read_to_string(layout.absolute(layout.debug_script(System::Kc85_3))).unwrap();
    assert!(script.trim().is_empty());
    assert_eq!(pipeline.invoker().programs().last().unwrap(), "mess");
}

#[test]
fn test_debug_without_breakpoint() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).with_binary(vec![0xC9]);
    let mut pipeline = Pipeline::new(&config, &layout, fake);
    pipeline.asm(System::Kc85_3, Path::new("prog.s"), None).unwrap();

    pipeline.debug(System::Kc85_3, "prog", None).unwrap();

    let script = fs::read_to_string(layout.absolute(layout.debug_script(System::Kc85_3))).unwrap();
    assert_eq!(script, "\n");
}

#[test]
fn test_libs_builds_every_variant_in_order() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    pipeline.libs().unwrap();

    let calls = &pipeline.invoker().calls;
    let per_system = LIBRARY_SOURCES.len() + 1;
    assert_eq!(calls.len(), per_system * 2);
    for (i, system) in System::ALL.into_iter().enumerate() {
        let archive = &calls[i * per_system + LIBRARY_SOURCES.len()];
        assert_eq!(archive.program_name(), "sdar");
        let args = FakeToolchain::args(archive);
        assert_eq!(
            PathBuf::from(&args[1]),
            layout.library(system),
            "library path for {}",
            system
        );
    }
}

#[test]
fn test_libs_failure_aborts() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path()).failing("sdar");
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    let err = pipeline.libs().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Toolchain);
    // Only the first variant was attempted.
    assert_eq!(pipeline.invoker().calls.len(), LIBRARY_SOURCES.len() + 1);
}

#[test]
fn test_self_test_writes_hello_image() {
    let (dir, layout, config) = setup();
    let fake = FakeToolchain::new(dir.path());
    let mut pipeline = Pipeline::new(&config, &layout, fake);

    pipeline.self_test(System::Kc85_3).unwrap();

    let kcc = fs::read(layout.absolute(layout.artifact(System::Kc85_3, "test", "kcc"))).unwrap();
    assert_eq!(kcc.len(), 155);
    assert_eq!(&kcc[17..21], &[0x00, 0x02, 0x1B, 0x02]);
    assert_eq!(pipeline.invoker().programs(), vec!["mess"]);
}

#[test]
fn test_clean_is_idempotent() {
    let (_dir, layout, _config) = setup();
    kc85sdk::clean(&layout).unwrap();

    layout.ensure_dirs().unwrap();
    let artifact = layout.absolute(layout.artifact(System::Kc85_4, "x", "kcc"));
    fs::write(&artifact, b"x").unwrap();
    kc85sdk::clean(&layout).unwrap();

    for system in System::ALL {
        assert!(!layout.absolute(layout.bin_dir(system)).exists());
    }
    kc85sdk::clean(&layout).unwrap();
}
