// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use splitzie::services::parser::ExtractionParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let _ = ExtractionParser::parse(raw);
    }
});
