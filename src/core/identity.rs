//! Swedish identifier validation — organisation numbers, bankgiro,
//! plusgiro, and OCR payment references — plus the text-normalization
//! helpers shared by header and counterparty matching.
//!
//! The identifiers all share the Luhn mod-10 check digit.

use super::error::ValidationError;

/// Keep only ASCII digits.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lowercase, fold Swedish diacritics, drop everything non-alphanumeric.
///
/// Used wherever free text is compared: CSV header recognition and
/// counterparty-name matching.
pub fn normalize_text(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'å' | 'ä' | 'á' | 'à' => Some('a'),
            'ö' | 'ó' | 'ò' => Some('o'),
            'é' | 'è' | 'ë' => Some('e'),
            'ü' => Some('u'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Expected Luhn check digit for `payload` (the digits before the check
/// digit). Doubling starts from the rightmost payload digit.
fn luhn_check_digit(payload: &str) -> Option<u32> {
    if payload.is_empty() || !payload.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut checksum = 0;
    for (i, c) in payload.chars().rev().enumerate() {
        let d = c.to_digit(10)?;
        checksum += if i % 2 == 0 {
            let doubled = d * 2;
            if doubled > 9 { doubled - 9 } else { doubled }
        } else {
            d
        };
    }
    Some((10 - checksum % 10) % 10)
}

/// Whether the last digit of `digits` is a correct Luhn check digit.
fn luhn_valid(digits: &str) -> bool {
    if digits.len() < 2 {
        return false;
    }
    let (payload, check) = digits.split_at(digits.len() - 1);
    match (luhn_check_digit(payload), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

/// Validate a Swedish organisation number (NNNNNN-NNNN).
pub fn validate_org_number(org_nr: &str) -> Result<(), ValidationError> {
    let clean = digits_only(org_nr);

    if clean.len() != 10 {
        return Err(ValidationError::new(
            "org_number",
            "organisationsnummer måste vara 10 siffror",
        ));
    }
    if clean.starts_with('0') {
        return Err(ValidationError::new(
            "org_number",
            "organisationsnummer kan inte börja med 0",
        ));
    }
    if !luhn_valid(&clean) {
        return Err(ValidationError::new("org_number", "ogiltig kontrollsiffra"));
    }
    Ok(())
}

/// Validate a bankgiro number (7–8 digits, Luhn check digit).
pub fn validate_bankgiro(bg_nr: &str) -> Result<(), ValidationError> {
    let clean = digits_only(bg_nr);

    if clean.len() < 7 || clean.len() > 8 {
        return Err(ValidationError::new(
            "bankgiro",
            "bankgironummer måste vara 7–8 siffror",
        ));
    }
    if !luhn_valid(&clean) {
        return Err(ValidationError::new(
            "bankgiro",
            "ogiltig kontrollsiffra för bankgiro",
        ));
    }
    Ok(())
}

/// Validate a plusgiro number (2–8 digits, Luhn check digit).
pub fn validate_plusgiro(pg_nr: &str) -> Result<(), ValidationError> {
    let clean = digits_only(pg_nr);

    if clean.len() < 2 || clean.len() > 8 {
        return Err(ValidationError::new(
            "plusgiro",
            "plusgironummer måste vara 2–8 siffror",
        ));
    }
    if !luhn_valid(&clean) {
        return Err(ValidationError::new(
            "plusgiro",
            "ogiltig kontrollsiffra för plusgiro",
        ));
    }
    Ok(())
}

/// Validate an OCR payment reference (2–25 digits, Luhn check digit).
pub fn validate_ocr(ocr: &str) -> Result<(), ValidationError> {
    let clean = digits_only(ocr);

    if clean.len() < 2 || clean.len() > 25 {
        return Err(ValidationError::new(
            "ocr",
            "OCR-referens måste vara 2–25 siffror",
        ));
    }
    if !luhn_valid(&clean) {
        return Err(ValidationError::new(
            "ocr",
            "ogiltig kontrollsiffra för OCR-referens",
        ));
    }
    Ok(())
}
