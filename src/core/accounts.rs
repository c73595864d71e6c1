//! BAS chart-of-accounts data and control-account configuration.

use serde::{Deserialize, Serialize};

use super::types::InvoiceKind;

/// Named account entry for BAS lookup.
#[derive(Debug, Clone)]
pub struct NamedAccount {
    /// 4-digit account number.
    pub number: u16,
    /// Swedish account name (e.g. "Kundfordringar").
    pub name: &'static str,
}

/// Common BAS accounts touched by invoice postings.
const BAS_ACCOUNTS: &[NamedAccount] = &[
    NamedAccount { number: 1510, name: "Kundfordringar" },
    NamedAccount { number: 1930, name: "Företagskonto" },
    NamedAccount { number: 2440, name: "Leverantörsskulder" },
    NamedAccount { number: 2611, name: "Utgående moms 25%" },
    NamedAccount { number: 2621, name: "Utgående moms 12%" },
    NamedAccount { number: 2631, name: "Utgående moms 6%" },
    NamedAccount { number: 2641, name: "Ingående moms" },
    NamedAccount { number: 2650, name: "Redovisningskonto för moms" },
    NamedAccount { number: 3010, name: "Försäljning tjänster 25%" },
    NamedAccount { number: 3011, name: "Försäljning tjänster momsfri" },
    NamedAccount { number: 6212, name: "Telefon och internet" },
    NamedAccount { number: 6590, name: "Övriga externa tjänster" },
];

/// Look up a BAS account by number.
pub fn account_by_number(number: u16) -> Option<&'static NamedAccount> {
    BAS_ACCOUNTS.iter().find(|a| a.number == number)
}

/// Swedish name of a BAS account class (first digit 1–8).
pub fn account_class_name(account: &str) -> Option<&'static str> {
    match account.chars().next()? {
        '1' => Some("Tillgångar"),
        '2' => Some("Eget kapital och skulder"),
        '3' => Some("Intäkter"),
        '4' => Some("Kostnader för varor och material"),
        '5' | '6' => Some("Övriga externa kostnader"),
        '7' => Some("Personalkostnader"),
        '8' => Some("Finansiella poster"),
        _ => None,
    }
}

/// Whether `account` is a syntactically valid 4-digit BAS code (1000–9999).
pub fn is_valid_bas_account(account: &str) -> bool {
    account.len() == 4
        && account.chars().all(|c| c.is_ascii_digit())
        && !account.starts_with('0')
}

/// Whether `account` is a VAT account (2610–2649 covers utgående and
/// ingående moms in the BAS plan).
pub fn is_vat_account(account: &str) -> bool {
    match account.parse::<u16>() {
        Ok(n) => (2610..=2649).contains(&n),
        Err(_) => false,
    }
}

/// Which balance-sheet accounts are expected in a given invoice's posting.
///
/// The set varies per chart of accounts and company, so it is configuration
/// rather than a constant; the defaults cover the standard BAS plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlAccounts {
    /// Customer receivables (kundfordringar).
    pub receivables: Vec<String>,
    /// Supplier payables (leverantörsskulder).
    pub payables: Vec<String>,
    /// Company bank accounts, accepted for cash-settled invoices.
    pub bank: Vec<String>,
}

impl Default for ControlAccounts {
    fn default() -> Self {
        Self {
            receivables: vec!["1510".into()],
            payables: vec!["2440".into()],
            bank: vec!["1930".into()],
        }
    }
}

impl ControlAccounts {
    /// The control accounts acceptable for an invoice of the given kind.
    pub fn for_kind(&self, kind: InvoiceKind) -> impl Iterator<Item = &str> {
        let primary = match kind {
            InvoiceKind::Customer => &self.receivables,
            InvoiceKind::Supplier => &self.payables,
        };
        primary.iter().chain(self.bank.iter()).map(String::as_str)
    }

    /// Whether `account` is a control account for the given invoice kind.
    pub fn is_control(&self, kind: InvoiceKind, account: &str) -> bool {
        self.for_kind(kind).any(|a| a == account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_number() {
        assert_eq!(account_by_number(1510).unwrap().name, "Kundfordringar");
        assert!(account_by_number(4711).is_none());
    }

    #[test]
    fn class_names() {
        assert_eq!(account_class_name("1930"), Some("Tillgångar"));
        assert_eq!(account_class_name("6212"), Some("Övriga externa kostnader"));
        assert_eq!(account_class_name("9999"), None);
    }

    #[test]
    fn bas_account_syntax() {
        assert!(is_valid_bas_account("1510"));
        assert!(is_valid_bas_account("9999"));
        assert!(!is_valid_bas_account("0999"));
        assert!(!is_valid_bas_account("99999"));
        assert!(!is_valid_bas_account("15a0"));
    }

    #[test]
    fn vat_account_range() {
        assert!(is_vat_account("2611"));
        assert!(is_vat_account("2641"));
        assert!(!is_vat_account("2650"));
        assert!(!is_vat_account("1510"));
    }

    #[test]
    fn control_accounts_per_kind() {
        let control = ControlAccounts::default();
        assert!(control.is_control(InvoiceKind::Customer, "1510"));
        assert!(control.is_control(InvoiceKind::Customer, "1930"));
        assert!(!control.is_control(InvoiceKind::Customer, "2440"));
        assert!(control.is_control(InvoiceKind::Supplier, "2440"));
    }
}
