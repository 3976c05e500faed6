// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use splitzie::services::calculator::SplitCalculator;
use splitzie::services::parser::ExtractionParser;

// Anything that parses must either split or fail with an error, never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data)
        && let Ok(bill) = ExtractionParser::parse(raw)
    {
        let _ = SplitCalculator::split(&bill);
    }
});
