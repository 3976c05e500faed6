// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use rust_decimal::Decimal;

use splitzie::domain::{Assignment, Bill};

/// 1x1 transparent PNG
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Parse a decimal literal like "10.00"
#[allow(dead_code)]
pub fn money(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[allow(dead_code)]
pub fn make_bill(items: &[(&str, &str)]) -> Bill {
    items
        .iter()
        .map(|(name, price)| (name.to_string(), money(price)))
        .collect()
}

#[allow(dead_code)]
pub fn make_assignment(entries: &[(&str, &[&str])]) -> Assignment {
    entries
        .iter()
        .map(|(person, items)| {
            (
                person.to_string(),
                items.iter().map(|i| i.to_string()).collect(),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn make_people(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The pizza/soda bill as the LLM would return it
#[allow(dead_code)]
pub fn pizza_extraction() -> serde_json::Value {
    serde_json::json!({
        "bill_item": {
            "items": {"pizza": 10.00, "soda": 2.00},
            "currency": "Dollars"
        },
        "person": {"people": ["Alice", "Bob"]},
        "mapping": {
            "assignment": {
                "Alice": ["pizza"],
                "Bob": ["pizza", "soda"]
            }
        }
    })
}
