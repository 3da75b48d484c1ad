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

//! KCC file writer and reader.
//!
//! A KCC file is a fixed 128-byte header followed by the raw program bytes.
//! The header layout is:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 10   | name, NUL padded, truncated at 10 bytes |
//! | 10     | 6    | reserved (zero)                         |
//! | 16     | 1    | number of addresses (always 2)          |
//! | 17     | 2    | load address (little-endian)            |
//! | 19     | 2    | end address (little-endian)             |
//! | 21     | 2    | execution address (always 0)            |
//! | 23     | 105  | padding (zero)                          |
//!
//! The end address is the first address after the payload.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::error::{ErrorKind, KcError};

/// Total size of a KCC header in bytes.
pub const KCC_HEADER_SIZE: usize = 128;

/// Width of the name field.
pub const KCC_NAME_SIZE: usize = 10;

const RESERVED_SIZE: usize = 6;

/// Value written to the number-of-addresses field.
pub const KCC_NUMBER_ADDRESSES: u8 = 2;

/// Load address used for every image this tool produces.
pub const DEFAULT_LOAD_ADDRESS: u16 = 0x0200;

/// Errors in building or decoding a KCC image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KccError {
    /// The header came out at the wrong size. This is an internal defect.
    #[error("ALIGNMENT ERROR: KCC header is {0} bytes, expected 128")]
    HeaderAlignment(usize),

    /// The payload does not fit into the 16-bit address space.
    #[error("payload of {length} bytes at ${load:04X} exceeds the 16-bit address space")]
    AddressRange { load: u16, length: usize },

    /// The end address lies below the load address.
    #[error("end address ${end:04X} is below load address ${load:04X}")]
    InvertedRange { load: u16, end: u16 },

    /// Fewer than 128 bytes were given to the decoder.
    #[error("KCC data too short: {0} bytes")]
    Truncated(usize),

    /// The payload length disagrees with the header's address range.
    #[error("KCC payload is {actual} bytes, header declares {declared}")]
    PayloadLength { declared: usize, actual: usize },
}

impl KccError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KccError::HeaderAlignment(_) => ErrorKind::Format,
            KccError::AddressRange { .. } | KccError::InvertedRange { .. } => {
                ErrorKind::Configuration
            }
            KccError::Truncated(_) | KccError::PayloadLength { .. } => ErrorKind::Format,
        }
    }
}

/// A decoded KCC header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KccHeader {
    /// Program name with padding removed.
    pub name: String,
    pub number_addresses: u8,
    pub load_address: u16,
    pub end_address: u16,
    pub execution_address: u16,
}

impl KccHeader {
    /// Decode the header from the first 128 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, KccError> {
        if data.len() < KCC_HEADER_SIZE {
            return Err(KccError::Truncated(data.len()));
        }

        let name_field = &data[..KCC_NAME_SIZE];
        let name_len = name_field
            .iter()
            .rposition(|&b| b != 0 && b != b' ')
            .map_or(0, |i| i + 1);
        let name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

        let word = |offset: usize| u16::from_le_bytes([data[offset], data[offset + 1]]);

        Ok(Self {
            name,
            number_addresses: data[16],
            load_address: word(17),
            end_address: word(19),
            execution_address: word(21),
        })
    }

    /// Number of payload bytes the header declares.
    pub fn payload_len(&self) -> usize {
        usize::from(self.end_address.saturating_sub(self.load_address))
    }
}

/// Encode the name into the fixed-width field.
///
/// The first 10 bytes of the UTF-8 encoding are kept; shorter names are
/// padded with NUL bytes. A multi-byte character crossing the 10-byte
/// boundary is cut.
fn encode_name(name: &str) -> [u8; KCC_NAME_SIZE] {
    let mut field = [0u8; KCC_NAME_SIZE];
    let bytes = name.as_bytes();
    let len = bytes.len().min(KCC_NAME_SIZE);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Build a 128-byte KCC header.
pub fn pack_header(
    name: &str,
    load_address: u16,
    end_address: u16,
) -> Result<[u8; KCC_HEADER_SIZE], KccError> {
    if end_address < load_address {
        return Err(KccError::InvertedRange {
            load: load_address,
            end: end_address,
        });
    }

    let mut header = Vec::with_capacity(KCC_HEADER_SIZE);
    header.extend_from_slice(&encode_name(name));
    header.extend_from_slice(&[0u8; RESERVED_SIZE]);
    header.push(KCC_NUMBER_ADDRESSES);
    header.extend_from_slice(&load_address.to_le_bytes());
    header.extend_from_slice(&end_address.to_le_bytes());
    // Execution address is left unset.
    header.extend_from_slice(&0u16.to_le_bytes());
    header.resize(KCC_HEADER_SIZE, 0);

    header
        .try_into()
        .map_err(|h: Vec<u8>| KccError::HeaderAlignment(h.len()))
}

/// Build a complete KCC image: header followed by `payload`.
pub fn build_image(name: &str, load_address: u16, payload: &[u8]) -> Result<Vec<u8>, KccError> {
    let end_address = u16::try_from(usize::from(load_address) + payload.len())
        .map_err(|_| KccError::AddressRange {
            load: load_address,
            length: payload.len(),
        })?;

    let header = pack_header(name, load_address, end_address)?;
    let mut image = Vec::with_capacity(KCC_HEADER_SIZE + payload.len());
    image.extend_from_slice(&header);
    image.extend_from_slice(payload);
    Ok(image)
}

/// Split an image into its header and payload.
pub fn split_image(data: &[u8]) -> Result<(KccHeader, &[u8]), KccError> {
    let header = KccHeader::parse(data)?;
    let payload = &data[KCC_HEADER_SIZE..];
    if payload.len() != header.payload_len() {
        return Err(KccError::PayloadLength {
            declared: header.payload_len(),
            actual: payload.len(),
        });
    }
    Ok((header, payload))
}

/// Write a KCC file.
pub fn write_kcc(
    path: &Path,
    name: &str,
    load_address: u16,
    payload: &[u8],
) -> Result<(), KcError> {
    let image = build_image(name, load_address, payload)?;
    fs::write(path, image).map_err(|e| KcError::io(path, e))
}

/// Read a KCC file and return its header and payload.
pub fn read_kcc(path: &Path) -> Result<(KccHeader, Vec<u8>), KcError> {
    let data = fs::read(path).map_err(|e| KcError::io(path, e))?;
    let (header, payload) = split_image(&data)?;
    Ok((header, payload.to_vec()))
}
