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

//! Output module for the KC85 build tooling.
//!
//! This module turns raw program bytes produced by the toolchains into KCC
//! files that the emulator can quick-load. Both toolchains share one
//! container format but lay out memory differently:
//! - the C compiler places data at 0x200 and code at 0x300, and its flat
//!   binary starts at address 0, so the first 0x200 bytes are dropped
//! - the assembler output already starts at 0x200 and is used as-is

pub mod kcc;

pub use kcc::{
    build_image, pack_header, read_kcc, split_image, write_kcc, KccError, KccHeader,
    DEFAULT_LOAD_ADDRESS, KCC_HEADER_SIZE, KCC_NAME_SIZE,
};

/// Number of leading bytes dropped from a compiler-produced flat binary.
pub const COMPILER_PAYLOAD_OFFSET: usize = 0x200;

/// Which toolchain produced a flat binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// C compiler and linker via `makebin`.
    Compiler,
    /// Standalone assembler.
    Assembler,
}

impl PayloadSource {
    /// Extract the loadable payload from a flat binary.
    ///
    /// Compiler binaries shorter than the data segment offset yield an
    /// empty payload.
    pub fn payload<'a>(self, binary: &'a [u8]) -> &'a [u8] {
        match self {
            PayloadSource::Compiler => binary.get(COMPILER_PAYLOAD_OFFSET..).unwrap_or(&[]),
            PayloadSource::Assembler => binary,
        }
    }

    /// Address the payload is loaded to.
    pub fn load_address(self) -> u16 {
        DEFAULT_LOAD_ADDRESS
    }

    /// Build the KCC image for a flat binary produced by this toolchain.
    pub fn image(self, name: &str, binary: &[u8]) -> Result<Vec<u8>, KccError> {
        build_image(name, self.load_address(), self.payload(binary))
    }
}
