//! Indian-style money formatting.
//!
//! Amounts are grouped the South Asian way: the last three digits form one
//! group, everything to the left is grouped in pairs. `1234567` renders as
//! `₹12,34,567`. Headline metrics use the scaled [`MoneyStyle::Lakhs`] and
//! [`MoneyStyle::Crores`] styles instead of the full digit string.

pub const RUPEE: &str = "₹";

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoneyStyle {
    /// Full digit string with Indian comma grouping.
    #[default]
    Full,
    /// Amount divided by 1,00,000 with an " L" suffix.
    Lakhs,
    /// Amount divided by 1,00,00,000 with a " Cr" suffix.
    Crores,
}

/// Formats an amount with the default [`MoneyStyle::Full`] style.
///
/// Zero and non-finite amounts collapse to `"₹0"` so chart labels never
/// show `NaN`.
pub fn format_inr(amount: f64) -> String {
    format_inr_as(amount, MoneyStyle::Full)
}

pub fn format_inr_as(amount: f64, style: MoneyStyle) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return format!("{}0", RUPEE);
    }

    match style {
        MoneyStyle::Full => {
            let rounded = amount.round();
            let sign = if rounded < 0.0 { "-" } else { "" };
            let digits = format!("{}", rounded.abs() as i64);
            format!("{}{}{}", sign, RUPEE, group_indian(&digits))
        }
        MoneyStyle::Lakhs => format!("{}{:.2} L", RUPEE, amount / LAKH),
        MoneyStyle::Crores => format!("{}{:.2} Cr", RUPEE, amount / CRORE),
    }
}

/// Applies Indian digit grouping to a plain digit string.
///
/// The last three digits form one group; the remainder is split into pairs
/// from the right, the leftmost group may be a single digit.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (rest, last3) = digits.split_at(digits.len() - 3);
    let mut grouped = String::new();
    let mut i = rest.len();
    while i > 0 {
        let start = i.saturating_sub(2);
        let pair = &rest[start..i];
        if grouped.is_empty() {
            grouped = pair.to_string();
        } else {
            grouped = format!("{},{}", pair, grouped);
        }
        i = start;
    }

    format!("{},{}", grouped, last3)
}
