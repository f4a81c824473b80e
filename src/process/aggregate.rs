//! Row aggregation: normalized rows, per-category buckets, overall totals.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::process::amount::parse_amount;

/// Bucket for rows whose category field is absent or blank.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Candidate header names, resolved first-match. Exports arrive with either
/// English or Portuguese headers.
const AMOUNT_KEYS: &[&str] = &["amount", "valor"];
const CATEGORY_KEYS: &[&str] = &["category", "categoria"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];

/// One normalized transaction row. Immutable once built; owned by the
/// aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub description: String,
    pub category: String,
    pub amount: Decimal,
}

/// Per-file summary written alongside the processed rows. All monetary
/// fields are rounded to 2 decimal places exactly once, at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub file: String,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub per_category: BTreeMap<String, Decimal>,
}

/// Running aggregation state for one invocation.
///
/// Totals accumulate at full precision; rounding happens only in
/// [`Aggregation::into_summary`] so repeated sub-cent amounts do not
/// compound rounding error.
#[derive(Debug, Default)]
pub struct Aggregation {
    rows: Vec<Row>,
    total_income: Decimal,
    total_expenses: Decimal,
    per_category: BTreeMap<String, Decimal>,
}

/// First candidate key whose value is non-empty after trimming.
fn resolve<'a>(fields: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

impl Aggregation {
    /// Fold one tabular record into the running state.
    ///
    /// A non-negative amount counts as income, a negative one as an expense
    /// (by absolute value); the signed amount always lands in the row's
    /// category bucket, so buckets carry net totals.
    pub fn push_record(&mut self, fields: &HashMap<String, String>) {
        let amount = parse_amount(resolve(fields, AMOUNT_KEYS));
        let category = resolve(fields, CATEGORY_KEYS)
            .unwrap_or(UNCATEGORIZED)
            .to_string();
        let description = resolve(fields, DESCRIPTION_KEYS)
            .unwrap_or_default()
            .to_string();

        if amount < Decimal::ZERO {
            self.total_expenses += -amount;
        } else {
            self.total_income += amount;
        }

        *self
            .per_category
            .entry(category.clone())
            .or_insert(Decimal::ZERO) += amount;

        self.rows.push(Row {
            description,
            category,
            amount,
        });
    }

    /// Finish the invocation: round totals and buckets to 2 decimal places
    /// and hand the rows over. `net` is derived from the unrounded totals.
    pub fn into_summary(self, file: &str) -> (Summary, Vec<Row>) {
        let net = self.total_income - self.total_expenses;
        let summary = Summary {
            file: file.to_string(),
            total_income: self.total_income.round_dp(2),
            total_expenses: self.total_expenses.round_dp(2),
            net: net.round_dp(2),
            per_category: self
                .per_category
                .into_iter()
                .map(|(category, total)| (category, total.round_dp(2)))
                .collect(),
        };
        (summary, self.rows)
    }
}
