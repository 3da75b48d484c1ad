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

//! Fuzz target for the KCC codec.
//!
//! Decodes arbitrary bytes as a KCC image and, for structured input,
//! checks that a built image decodes to the same addresses.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_kcc

#![no_main]

use arbitrary::Arbitrary;
use kc85sdk::output::{build_image, split_image, KccHeader, KCC_HEADER_SIZE};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    name: String,
    load: u16,
    payload: Vec<u8>,
    raw: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // Decoding never panics, only returns Ok or Err
    let _ = KccHeader::parse(&input.raw);
    let _ = split_image(&input.raw);

    if let Ok(image) = build_image(&input.name, input.load, &input.payload) {
        assert_eq!(image.len(), KCC_HEADER_SIZE + input.payload.len());
        let (header, payload) = split_image(&image).expect("built image must decode");
        assert_eq!(header.load_address, input.load);
        assert_eq!(payload, &input.payload[..]);
    }
});
