// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{Assignment, Bill, BillSplitCalculation, PersonAmount, SplitBill};
use crate::error::{Error, Result};

/// Decimal places kept on every reported amount.
const MONEY_DP: u32 = 2;

pub struct SplitCalculator;

impl SplitCalculator {
    /// Split an extracted bill between the people it names.
    pub fn split(bill: &SplitBill) -> Result<BillSplitCalculation> {
        Self::calculate(bill.bill(), bill.people(), bill.assignment())
    }

    /// Compute each person's share.
    ///
    /// Every item's price is divided evenly between the assignment entries
    /// that reference it. Per-person amounts are rounded half-to-even to
    /// cents; the total is the rounded sum of the unrounded amounts.
    pub fn calculate(
        bill: &Bill,
        people: &[String],
        assignment: &Assignment,
    ) -> Result<BillSplitCalculation> {
        Self::validate(bill, people, assignment)?;

        let counts = Self::sharing_counts(bill, assignment);

        let mut per_person_split = Vec::with_capacity(assignment.len());
        let mut total = Decimal::ZERO;

        for (name, items) in assignment {
            let amount = Self::person_amount(bill, &counts, items)?;
            total = total
                .checked_add(amount)
                .ok_or_else(|| Error::SplitInvariant("total amount overflowed".into()))?;
            per_person_split.push(PersonAmount {
                name: name.clone(),
                amount: round_money(amount),
                shared_items: items.clone(),
            });
        }

        Ok(BillSplitCalculation {
            per_person_split,
            total_amount: round_money(total),
            shared_item_counts: counts,
        })
    }

    /// Check that people, assignment and bill describe the same sets.
    pub fn validate(bill: &Bill, people: &[String], assignment: &Assignment) -> Result<()> {
        if let Some((item, _)) = bill.iter().find(|(_, price)| **price < Decimal::ZERO) {
            return Err(Error::NegativePrice { item: item.clone() });
        }

        let listed: BTreeSet<&str> = people.iter().map(String::as_str).collect();
        let keys: BTreeSet<&str> = assignment.keys().map(String::as_str).collect();

        if listed != keys {
            return Err(Error::PeopleMismatch {
                missing: owned(listed.difference(&keys)),
                unexpected: owned(keys.difference(&listed)),
            });
        }

        let billed: BTreeSet<&str> = bill.keys().map(String::as_str).collect();
        let assigned: BTreeSet<&str> = assignment.values().flatten().map(String::as_str).collect();

        if billed != assigned {
            return Err(Error::ItemMismatch {
                unassigned: owned(billed.difference(&assigned)),
                unknown: owned(assigned.difference(&billed)),
            });
        }

        Ok(())
    }

    /// Count how many assignment entries reference each bill item.
    ///
    /// A person listing the same item twice counts as two shares.
    pub fn sharing_counts(bill: &Bill, assignment: &Assignment) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = bill.keys().map(|item| (item.clone(), 0)).collect();

        for item in assignment.values().flatten() {
            if let Some(count) = counts.get_mut(item) {
                *count += 1;
            }
        }

        counts
    }

    fn person_amount(
        bill: &Bill,
        counts: &IndexMap<String, usize>,
        items: &[String],
    ) -> Result<Decimal> {
        items.iter().try_fold(Decimal::ZERO, |acc, item| {
            let price = bill
                .get(item)
                .ok_or_else(|| Error::SplitInvariant(format!("item '{item}' is not on the bill")))?;
            let sharers = counts.get(item).copied().unwrap_or(0);
            let share = price
                .checked_div(Decimal::from(sharers))
                .ok_or_else(|| Error::SplitInvariant(format!("item '{item}' has no sharers")))?;
            acc.checked_add(share)
                .ok_or_else(|| Error::SplitInvariant("person amount overflowed".into()))
        })
    }
}

/// Round to cents, ties to even.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

fn owned<'a, 'b: 'a>(names: impl Iterator<Item = &'a &'b str>) -> Vec<String> {
    names.map(|name| (*name).to_string()).collect()
}
