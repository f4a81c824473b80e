//! Monetary amount normalization.
//!
//! Upstream exports write amounts every way imaginable: `R$ 1.234,56`,
//! `-50,00`, padded with stray characters, or missing entirely. Convention
//! is fixed Brazilian-style: `.` is a thousands separator, `,` the decimal
//! separator. A value that cannot be salvaged becomes zero — one bad amount
//! must never abort processing of the whole file.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// Everything that is not a digit, sign, decimal point or space gets
/// stripped before parsing (currency residue, letters, control chars).
static AMOUNT_CLEAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9\-\. ]").expect("amount cleanup pattern"));

/// Parse a raw textual amount into a `Decimal`, defaulting to zero.
///
/// `None` and unparseable inputs both yield `Decimal::ZERO`. Parsing is
/// attempted once on the cleaned text and once more with embedded spaces
/// removed before giving up.
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };

    let cleaned = raw
        .trim()
        .replace("R$", "")
        .replace('.', "")
        .replace(',', ".");
    let cleaned = AMOUNT_CLEAN.replace_all(&cleaned, "");

    cleaned
        .parse::<Decimal>()
        .or_else(|_| cleaned.replace(' ', "").parse::<Decimal>())
        .unwrap_or(Decimal::ZERO)
}
