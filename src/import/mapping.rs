//! Header→field mapping for bank exports.
//!
//! Columns are recognized by normalized synonym lookup, optionally seeded
//! from a bank-specific profile detected by header fingerprint. Missing
//! mandatory fields are reported as a named list, never as an error.

use serde::{Deserialize, Serialize};

/// Column indexes into the header row for each recognized field.
///
/// Invariant: `amount` set implies `inflow`/`outflow` unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
    pub inflow: Option<usize>,
    pub outflow: Option<usize>,
    pub counterparty: Option<usize>,
    pub reference: Option<usize>,
    pub ocr: Option<usize>,
    pub currency: Option<usize>,
    pub account: Option<usize>,
}

impl ColumnMapping {
    /// Names of mandatory fields this mapping lacks. The amount requirement
    /// is satisfied either by a single signed column or by both flows.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.amount.is_none() && !(self.inflow.is_some() && self.outflow.is_some()) {
            missing.push("amount");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

/// The fields a bank export column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedField {
    Date,
    Description,
    Amount,
    Inflow,
    Outflow,
    Counterparty,
    Reference,
    Ocr,
    Currency,
    Account,
}

const ALL_FIELDS: &[MappedField] = &[
    MappedField::Date,
    MappedField::Description,
    MappedField::Amount,
    MappedField::Inflow,
    MappedField::Outflow,
    MappedField::Counterparty,
    MappedField::Reference,
    MappedField::Ocr,
    MappedField::Currency,
    MappedField::Account,
];

/// Generic fallback synonyms, normalized form.
fn generic_synonyms(field: MappedField) -> &'static [&'static str] {
    match field {
        MappedField::Date => &[
            "bokforingsdag",
            "bokforingsdatum",
            "transaktionsdag",
            "transaktionsdatum",
            "datum",
            "date",
        ],
        MappedField::Description => &[
            "text",
            "beskrivning",
            "rubrik",
            "specifikation",
            "transaktionstext",
            "description",
        ],
        MappedField::Amount => &["belopp", "summa", "amount", "beloppsek"],
        MappedField::Inflow => &["insattning", "inbetalning", "kredit", "credit"],
        MappedField::Outflow => &["uttag", "utbetalning", "debet", "debit"],
        MappedField::Counterparty => &[
            "motpart",
            "mottagare",
            "avsandare",
            "betalningsmottagare",
            "namn",
        ],
        MappedField::Reference => &["referens", "meddelande", "verifikationsnummer", "reference"],
        MappedField::Ocr => &["ocr", "ocrnummer", "ocrreferens"],
        MappedField::Currency => &["valuta", "currency"],
        MappedField::Account => &["kontonummer", "konto", "account"],
    }
}

/// A bank-specific header profile.
///
/// `fingerprint` is the set of normalized headers that identifies the bank;
/// `synonyms` override the generic set for fields where the bank's wording
/// is ambiguous or misleading.
#[derive(Debug, Clone)]
pub struct BankProfile {
    pub name: &'static str,
    fingerprint: &'static [&'static str],
    synonyms: &'static [(MappedField, &'static [&'static str])],
}

/// Profiles for the common Swedish bank exports.
const BANK_PROFILES: &[BankProfile] = &[
    BankProfile {
        name: "Swedbank",
        fingerprint: &["radnummer", "bokforingsdag", "beskrivning"],
        synonyms: &[
            (MappedField::Date, &["bokforingsdag"]),
            (MappedField::Description, &["beskrivning"]),
            (MappedField::Reference, &["referens"]),
            (MappedField::Account, &["kontonummer"]),
        ],
    },
    BankProfile {
        name: "Nordea",
        fingerprint: &["bokforingsdag", "rubrik", "avsandare"],
        synonyms: &[
            (MappedField::Date, &["bokforingsdag"]),
            (MappedField::Description, &["rubrik"]),
            (MappedField::Counterparty, &["namn", "mottagare", "avsandare"]),
            (MappedField::Reference, &["meddelande"]),
        ],
    },
    BankProfile {
        name: "SEB",
        fingerprint: &["bokforingsdatum", "verifikationsnummer"],
        synonyms: &[
            (MappedField::Date, &["bokforingsdatum"]),
            (MappedField::Description, &["text"]),
            (MappedField::Reference, &["verifikationsnummer"]),
        ],
    },
    BankProfile {
        name: "Handelsbanken",
        fingerprint: &["reskontradatum", "transaktionsdatum"],
        synonyms: &[
            (MappedField::Date, &["transaktionsdatum"]),
            (MappedField::Description, &["text"]),
        ],
    },
];

/// Outcome of header mapping: the mapping itself, the detected bank profile
/// (if any), and the named list of missing mandatory fields.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub mapping: ColumnMapping,
    /// Name of the detected bank profile, e.g. "Nordea".
    pub profile: Option<&'static str>,
    /// Mandatory fields no column could be found for.
    pub missing: Vec<&'static str>,
}

/// Normalize a header for synonym lookup: lowercase, fold Swedish
/// diacritics, strip everything non-alphanumeric.
pub fn normalize_header(header: &str) -> String {
    crate::core::identity::normalize_text(header)
}

/// Detect a bank profile from the normalized header set.
pub fn detect_profile(headers: &[String]) -> Option<&'static BankProfile> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    BANK_PROFILES.iter().find(|profile| {
        profile
            .fingerprint
            .iter()
            .all(|f| normalized.iter().any(|h| h == f))
    })
}

/// Find the column for `field`, preferring the profile's synonyms and
/// falling back to the generic set.
pub fn find_header(
    headers: &[String],
    field: MappedField,
    profile: Option<&BankProfile>,
) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    if let Some(profile) = profile {
        if let Some((_, synonyms)) = profile.synonyms.iter().find(|(f, _)| *f == field) {
            if let Some(idx) = find_in(&normalized, synonyms) {
                return Some(idx);
            }
        }
    }
    find_in(&normalized, generic_synonyms(field))
}

fn find_in(normalized: &[String], synonyms: &[&str]) -> Option<usize> {
    for synonym in synonyms {
        if let Some(idx) = normalized.iter().position(|h| h == synonym) {
            return Some(idx);
        }
    }
    None
}

/// Guess a complete column mapping from the header row.
///
/// An explicit `amount` column clears `inflow`/`outflow`; a column already
/// claimed by one field is not offered to later ones.
pub fn guess_mapping(headers: &[String]) -> MappingOutcome {
    let profile = detect_profile(headers);
    let mut mapping = ColumnMapping::default();
    let mut taken: Vec<usize> = Vec::new();

    for &field in ALL_FIELDS {
        let found = find_header(headers, field, profile).filter(|idx| !taken.contains(idx));
        let Some(idx) = found else { continue };
        taken.push(idx);
        match field {
            MappedField::Date => mapping.date = Some(idx),
            MappedField::Description => mapping.description = Some(idx),
            MappedField::Amount => mapping.amount = Some(idx),
            MappedField::Inflow => mapping.inflow = Some(idx),
            MappedField::Outflow => mapping.outflow = Some(idx),
            MappedField::Counterparty => mapping.counterparty = Some(idx),
            MappedField::Reference => mapping.reference = Some(idx),
            MappedField::Ocr => mapping.ocr = Some(idx),
            MappedField::Currency => mapping.currency = Some(idx),
            MappedField::Account => mapping.account = Some(idx),
        }
    }

    if mapping.amount.is_some() {
        mapping.inflow = None;
        mapping.outflow = None;
    }

    let missing = mapping.missing_required();
    MappingOutcome {
        mapping,
        profile: profile.map(|p| p.name),
        missing,
    }
}
