// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Item name → price, in the order the items were read off the bill.
pub type Bill = IndexMap<String, Decimal>;

/// Person → items they are responsible for, in extraction order.
///
/// An item listed under several people is shared between them.
pub type Assignment = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItems {
    pub items: Bill,
    /// Currency shorthand as printed or inferred (e.g. "Rupees", "USD").
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonList {
    pub people: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMapping {
    pub assignment: Assignment,
}

/// Structured bill data as extracted from an image and the user's context.
///
/// The nested layout is the wire format shared with the LLM prompt and the
/// web client, so field names must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBill {
    pub bill_item: BillItems,
    pub person: PersonList,
    pub mapping: ItemMapping,
}

impl SplitBill {
    pub fn bill(&self) -> &Bill {
        &self.bill_item.items
    }

    pub fn people(&self) -> &[String] {
        &self.person.people
    }

    pub fn assignment(&self) -> &Assignment {
        &self.mapping.assignment
    }
}
