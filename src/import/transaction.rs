//! Canonical bank-transaction records from parsed rows + mapping.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::BankTransaction;

use super::csv::ParsedCsv;
use super::mapping::ColumnMapping;

/// Parse a bank-formatted amount into a [`Decimal`].
///
/// Strips whitespace (including NBSP). Parentheses or a leading `-` denote
/// a negative amount. When both `,` and `.` appear, the right-most one is
/// the decimal separator and the other is digit grouping; a lone `,` is a
/// decimal separator. Non-numeric input yields `None`.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let (body, parenthesized) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (inner.to_string(), true),
        None => (cleaned, false),
    };

    let comma = body.rfind(',');
    let dot = body.rfind('.');
    let decimal_pos = match (comma, dot) {
        // Right-most separator is the decimal point, the other groups digits.
        (Some(ci), Some(di)) => Some(ci.max(di)),
        (Some(ci), None) => (body.matches(',').count() == 1).then_some(ci),
        (None, Some(di)) => (body.matches('.').count() == 1).then_some(di),
        (None, None) => None,
    };

    let mut normalized = String::with_capacity(body.len());
    for (i, c) in body.char_indices() {
        match c {
            ',' | '.' => {
                if Some(i) == decimal_pos {
                    normalized.push('.');
                }
            }
            _ => normalized.push(c),
        }
    }

    let value: Decimal = normalized.parse().ok()?;
    Some(if parenthesized { -value } else { value })
}

/// Normalize a date string to a [`NaiveDate`].
///
/// ISO input passes through; `DD[./-]MM[./-]YYYY` is reinterpreted;
/// otherwise a couple of generic formats are tried. Unparseable → `None`.
pub fn normalize_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d.%m.%Y",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%Y%m%d",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Build canonical transactions from parsed rows and a column mapping.
///
/// A row that fails to resolve date, description, or amount is dropped
/// silently — one bad row never aborts the batch. Zero-amount rows are
/// kept; the matching engine excludes them itself.
pub fn build_transactions(parsed: &ParsedCsv, mapping: &ColumnMapping) -> Vec<BankTransaction> {
    let mut transactions = Vec::new();

    for (i, row) in parsed.rows.iter().enumerate() {
        let cell = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let Some(date) = cell(mapping.date).and_then(|s| normalize_date(&s)) else {
            continue;
        };
        let Some(description) = cell(mapping.description) else {
            continue;
        };
        let Some(amount) = resolve_amount(mapping, &cell) else {
            continue;
        };

        let raw: BTreeMap<String, String> = parsed
            .headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), v.clone()))
            .collect();

        transactions.push(BankTransaction {
            id: format!("tx-{}", i + 1),
            date,
            amount,
            description,
            currency: cell(mapping.currency),
            counterparty: cell(mapping.counterparty),
            reference: cell(mapping.reference),
            ocr: cell(mapping.ocr),
            account: cell(mapping.account),
            raw,
        });
    }

    transactions
}

/// Signed amount from either the direct column or `inflow − outflow`.
/// An empty flow cell counts as zero; both empty means unresolved.
fn resolve_amount(
    mapping: &ColumnMapping,
    cell: &impl Fn(Option<usize>) -> Option<String>,
) -> Option<Decimal> {
    if mapping.amount.is_some() {
        return cell(mapping.amount).and_then(|s| parse_amount(&s));
    }

    let inflow = cell(mapping.inflow).and_then(|s| parse_amount(&s));
    let outflow = cell(mapping.outflow).and_then(|s| parse_amount(&s));
    match (inflow, outflow) {
        (None, None) => None,
        (inflow, outflow) => {
            Some(inflow.unwrap_or(Decimal::ZERO) - outflow.unwrap_or(Decimal::ZERO))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn comma_decimal() {
        assert_eq!(parse_amount("-625,00"), Some(dec!(-625.00)));
        assert_eq!(parse_amount("12,5"), Some(dec!(12.5)));
    }

    #[test]
    fn dot_decimal() {
        assert_eq!(parse_amount("1234.56"), Some(dec!(1234.56)));
    }

    #[test]
    fn mixed_separators_rightmost_wins() {
        assert_eq!(parse_amount("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("1.234.567,89"), Some(dec!(1234567.89)));
    }

    #[test]
    fn grouping_only_commas() {
        assert_eq!(parse_amount("1,234,567"), Some(dec!(1234567)));
    }

    #[test]
    fn whitespace_and_nbsp_stripped() {
        assert_eq!(parse_amount("1\u{a0}234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount(" 42 "), Some(dec!(42)));
    }

    #[test]
    fn parenthesized_negative() {
        assert_eq!(parse_amount("(625,00)"), Some(dec!(-625.00)));
    }

    #[test]
    fn unicode_minus() {
        assert_eq!(parse_amount("\u{2212}100"), Some(dec!(-100)));
    }

    #[test]
    fn non_numeric_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("ej bokförd"), None);
        assert_eq!(parse_amount("12 kr"), None);
    }

    #[test]
    fn iso_passes_through() {
        assert_eq!(
            normalize_date("2026-01-10"),
            NaiveDate::from_ymd_opt(2026, 1, 10)
        );
    }

    #[test]
    fn swedish_day_first_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 31);
        assert_eq!(normalize_date("31-12-2025"), expected);
        assert_eq!(normalize_date("31.12.2025"), expected);
        assert_eq!(normalize_date("31/12/2025"), expected);
    }

    #[test]
    fn compact_fallback() {
        assert_eq!(
            normalize_date("20251231"),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
    }

    #[test]
    fn unparseable_date_is_none() {
        assert_eq!(normalize_date("not-a-date"), None);
        assert_eq!(normalize_date("2025-13-40"), None);
    }
}
