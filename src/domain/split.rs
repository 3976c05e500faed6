// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SplitBill;

/// One person's share of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonAmount {
    pub name: String,
    /// Owed amount, rounded to cents.
    pub amount: Decimal,
    pub shared_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSplitCalculation {
    pub per_person_split: Vec<PersonAmount>,
    pub total_amount: Decimal,
    /// Number of people sharing each bill item, in bill order.
    pub shared_item_counts: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    Ok,
    Error,
}

/// Body of `POST /api/split_bill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBillResponse {
    pub status: SplitStatus,
    pub split_bill: Option<SplitBill>,
    pub calculation: Option<BillSplitCalculation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SplitBillResponse {
    pub fn ok(split_bill: SplitBill, calculation: BillSplitCalculation) -> Self {
        Self {
            status: SplitStatus::Ok,
            split_bill: Some(split_bill),
            calculation: Some(calculation),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SplitStatus::Error,
            split_bill: None,
            calculation: None,
            error: Some(message.into()),
        }
    }
}
