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

//! Fuzz target for symbol file scanning.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_symbols

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (String, String)| {
    let (text, name) = data;
    // Scanning should never panic on malformed symbol files
    let _ = kc85sdk::symbols::find_in_map(&text, &name);
    let _ = kc85sdk::symbols::find_in_labels(&text, &name);
});
