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

//! Breakpoint resolution from linker map and assembler label files.
//!
//! Both formats are scanned line by line with a literal substring search and
//! the first match wins:
//!
//! - map file (`bin/<system>/<name>.map`, C builds): a line containing
//!   `_<name> ` (C symbols carry a leading underscore, the trailing space
//!   keeps `_main` from matching `_main_loop`); the address is the first
//!   token of the line
//! - label file (`bin/<system>/<name>.lab`, assembler builds): a line
//!   containing `<name>:` in the form `label: equ $0300`; the address is the
//!   third token with its leading `$` removed
//!
//! A label file match takes precedence over a map file match.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::error::{KcError, Result};
use crate::system::{Layout, System};

/// Where a breakpoint address was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSource {
    Map,
    Labels,
}

/// A resolved breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Address text as found in the symbol file, without a `$` prefix.
    pub address: String,
    pub source: SymbolSource,
}

/// Find `name` in linker map text.
pub fn find_in_map(text: &str, name: &str) -> Option<String> {
    let needle = format!("_{} ", name);
    text.lines()
        .filter(|line| line.contains(&needle))
        .find_map(|line| line.split_whitespace().next())
        .map(str::to_string)
}

/// Find `name` in assembler label text.
pub fn find_in_labels(text: &str, name: &str) -> Option<String> {
    let needle = format!("{}:", name);
    text.lines()
        .filter(|line| line.contains(&needle))
        .find_map(|line| line.split_whitespace().nth(2))
        .map(|token| strip_sigil(token).to_string())
}

/// Drop the leading currency sign from an address token.
fn strip_sigil(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.as_str()
}

/// Read a symbol file; `None` if it does not exist.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(KcError::io(path, e)),
    }
}

/// Resolve `breakpoint` against the symbol files of build `name`.
///
/// Returns `Ok(None)` if neither file exists or neither mentions the name.
pub fn resolve(
    layout: &Layout,
    system: System,
    name: &str,
    breakpoint: &str,
) -> Result<Option<Breakpoint>> {
    let map_path = layout.absolute(layout.artifact(system, name, "map"));
    let lab_path = layout.absolute(layout.artifact(system, name, "lab"));

    let map_addr = match read_optional(&map_path)? {
        Some(text) => {
            debug!("looking for '_{} ' in {}", breakpoint, map_path.display());
            find_in_map(&text, breakpoint)
        }
        None => None,
    };
    let lab_addr = match read_optional(&lab_path)? {
        Some(text) => {
            debug!("looking for '{}:' in {}", breakpoint, lab_path.display());
            find_in_labels(&text, breakpoint)
        }
        None => None,
    };

    let resolved = match (lab_addr, map_addr) {
        (Some(address), _) => Some(Breakpoint {
            address,
            source: SymbolSource::Labels,
        }),
        (None, Some(address)) => Some(Breakpoint {
            address,
            source: SymbolSource::Map,
        }),
        (None, None) => None,
    };

    match &resolved {
        Some(bp) => info!("found '{}' at {} ({:?})", breakpoint, bp.address, bp.source),
        None => info!("'{}' not found in symbol files of '{}'", breakpoint, name),
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const MAP: &str = "\
Area                       Addr   Size   Decimal Bytes (Attributes)
--------------------       ----   ----   ------- ----- ------------
     00000300  _main_loop                         hello
     00000320  _main                              hello
     00000340  _clear                             caos_clear
";

    const LABELS: &str = "\
main_loop:\tequ $0310
main:\tequ $0302
clear_screen:\tequ $04a0
";

    #[test_case("main", Some("00000320"); "exact symbol")]
    #[test_case("main_loop", Some("00000300"); "longer symbol")]
    #[test_case("clear", Some("00000340"); "library symbol")]
    #[test_case("clr", None; "missing symbol")]
    fn test_find_in_map(name: &str, expected: Option<&str>) {
        assert_eq!(find_in_map(MAP, name).as_deref(), expected);
    }

    #[test_case("main_loop", Some("0310"); "first label")]
    #[test_case("clear_screen", Some("04a0"); "last label")]
    #[test_case("main", Some("0302"); "exact label")]
    #[test_case("loop", Some("0310"); "suffix match")]
    #[test_case("draw", None; "missing label")]
    fn test_find_in_labels(name: &str, expected: Option<&str>) {
        assert_eq!(find_in_labels(LABELS, name).as_deref(), expected);
    }

    #[test]
    fn test_malformed_label_line_skipped() {
        let text = "start:\n start: equ $0200\n";
        assert_eq!(find_in_labels(text, "start").as_deref(), Some("0200"));
    }

    #[test]
    fn test_resolve_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        assert_eq!(resolve(&layout, System::Kc85_3, "prog", "main").unwrap(), None);
    }
}
