#![cfg(feature = "matching")]

use chrono::NaiveDate;
use kontera::core::{BankTransaction, Confidence, InvoiceCandidate, InvoiceKind};
use kontera::matching::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn outgoing(amount: Decimal, description: &str) -> BankTransaction {
    BankTransaction::new("tx-1", date(2026, 1, 10), amount, description)
}

fn supplier(number: &str, name: &str, balance: Decimal) -> InvoiceCandidate {
    InvoiceCandidate::new(InvoiceKind::Supplier, number, name, balance).balance(balance)
}

fn customer(number: &str, name: &str, total: Decimal) -> InvoiceCandidate {
    InvoiceCandidate::new(InvoiceKind::Customer, number, name, total)
}

#[test]
fn ocr_and_amount_give_high_confidence() {
    let tx = outgoing(dec!(-625.00), "Telia faktura 100").reference("OCR 1234566");
    let invoice = supplier("100", "Telia Sverige AB", dec!(625.00)).ocr("1234566");

    let result = propose_match(&tx, &[invoice], &[]);
    let matched = result.matched.as_ref().expect("should match");
    assert_eq!(matched.invoice.number, "100");
    assert_eq!(result.confidence, Some(Confidence::High));
    assert_eq!(confidence_label(&result), Some("Hög"));

    let note = result.note.unwrap();
    assert!(note.contains("OCR"), "note was: {note}");
}

#[test]
fn no_candidate_within_tolerance_yields_note() {
    let tx = outgoing(dec!(-625.00), "Betalning");
    let invoice = supplier("100", "Telia Sverige AB", dec!(900.00));

    let result = propose_match(&tx, &[invoice], &[]);
    assert!(result.matched.is_none());
    assert!(result.confidence.is_none());
    assert_eq!(result.note.as_deref(), Some(NOTE_NO_MATCH));
}

#[test]
fn zero_amount_gets_distinct_note_and_no_match() {
    let tx = outgoing(dec!(0), "Justering");
    let invoice = customer("1", "Kund AB", dec!(0));

    let result = propose_match(&tx, &[], &[invoice]);
    assert!(result.matched.is_none());
    assert_eq!(result.note.as_deref(), Some(NOTE_ZERO_AMOUNT));
}

#[test]
fn direction_selects_candidate_pool() {
    let supplier_invoice = supplier("100", "Telia Sverige AB", dec!(625.00));
    let customer_invoice = customer("200", "Kund AB", dec!(625.00));

    let out = propose_match(
        &outgoing(dec!(-625.00), "Telia"),
        std::slice::from_ref(&supplier_invoice),
        std::slice::from_ref(&customer_invoice),
    );
    assert_eq!(out.matched.unwrap().kind, InvoiceKind::Supplier);

    let incoming = BankTransaction::new("tx-2", date(2026, 1, 10), dec!(625.00), "Inbetalning 200");
    let inc = propose_match(&incoming, &[supplier_invoice], &[customer_invoice]);
    assert_eq!(inc.matched.unwrap().kind, InvoiceKind::Customer);
}

#[test]
fn settled_and_cancelled_invoices_are_ineligible() {
    let paid = supplier("100", "Telia Sverige AB", dec!(625.00)).balance(dec!(0));
    let booked = supplier("101", "Telia Sverige AB", dec!(625.00)).booked(true);
    let cancelled = customer("200", "Kund AB", dec!(625.00)).cancelled(true);

    let out = propose_match(&outgoing(dec!(-625.00), "Telia"), &[paid, booked], &[]);
    assert!(out.matched.is_none());

    let incoming = BankTransaction::new("tx-2", date(2026, 1, 10), dec!(625.00), "Betalning");
    let inc = propose_match(&incoming, &[], &[cancelled]);
    assert!(inc.matched.is_none());
}

#[test]
fn equal_scores_break_on_due_date_then_number() {
    let tx = outgoing(dec!(-500.00), "Betalning");
    let later = supplier("300", "AB Alfa", dec!(500.00)).due_date(date(2026, 3, 1));
    let earlier = supplier("301", "AB Beta", dec!(500.00)).due_date(date(2026, 2, 1));

    // Provider order has "later" first; the earlier due date must win.
    let result = propose_match(&tx, &[later.clone(), earlier.clone()], &[]);
    assert_eq!(result.matched.unwrap().invoice.number, "301");

    // Same due dates: the lower invoice number wins, regardless of order.
    let a = supplier("310", "AB Alfa", dec!(500.00)).due_date(date(2026, 2, 1));
    let b = supplier("309", "AB Beta", dec!(500.00)).due_date(date(2026, 2, 1));
    let result = propose_match(&tx, &[a, b], &[]);
    assert_eq!(result.matched.unwrap().invoice.number, "309");
}

#[test]
fn higher_score_beats_tie_break() {
    let tx = outgoing(dec!(-500.00), "Faktura 321");
    let plain = supplier("299", "AB Alfa", dec!(500.00)).due_date(date(2026, 1, 1));
    let referenced = supplier("321", "AB Beta", dec!(500.00)).due_date(date(2026, 3, 1));

    let result = propose_match(&tx, &[plain, referenced], &[]);
    assert_eq!(result.matched.unwrap().invoice.number, "321");
}

#[test]
fn confidence_tier_thresholds() {
    // Amount only (40) + invoice number (25) = 65 → Medium.
    let tx = outgoing(dec!(-500.00), "Faktura 400");
    let invoice = supplier("400", "AB Alfa", dec!(500.00));
    let result = propose_match(&tx, &[invoice], &[]);
    assert_eq!(result.confidence, Some(Confidence::Medium));

    // Amount only (40) → Low.
    let tx = outgoing(dec!(-500.00), "Betalning");
    let invoice = supplier("401", "AB Alfa", dec!(500.00));
    let result = propose_match(&tx, &[invoice], &[]);
    assert_eq!(result.confidence, Some(Confidence::Low));
}

#[test]
fn note_always_explains_the_amount_signal() {
    let tx = outgoing(dec!(-499.50), "Faktura 400");
    let invoice = supplier("400", "AB Alfa", dec!(500.00));
    let result = propose_match(&tx, &[invoice], &[]);
    let note = result.note.unwrap();
    assert!(note.contains("belopp"), "note was: {note}");
}

#[test]
fn batch_matches_are_independent() {
    let txs = vec![
        outgoing(dec!(-625.00), "Telia faktura 100"),
        {
            let mut tx = outgoing(dec!(-77.00), "Okänd betalning");
            tx.id = "tx-2".into();
            tx
        },
    ];
    let suppliers = vec![supplier("100", "Telia Sverige AB", dec!(625.00))];

    let results = match_batch(&txs, &suppliers, &[]);
    assert_eq!(results.len(), 2);
    assert!(results[0].matched.is_some());
    assert!(results[1].matched.is_none());
    assert_eq!(results[1].note.as_deref(), Some(NOTE_NO_MATCH));
}

#[test]
fn payment_registration_carries_provenance() {
    let mut tx = outgoing(dec!(-625.00), "Betalning").ocr("1234566");
    tx.raw.insert("Belopp".into(), "-625,00".into());
    let invoice = supplier("100", "Telia Sverige AB", dec!(625.00)).ocr("1234566");

    let result = propose_match(&tx, &[invoice], &[]);
    let registration = build_payment_registration(&result).unwrap();
    assert_eq!(registration.invoice_number, "100");
    assert_eq!(registration.amount, dec!(625.00));
    assert_eq!(registration.date, date(2026, 1, 10));
    assert_eq!(registration.reference, "1234566");
    assert_eq!(registration.provenance.transaction_id, "tx-1");
    assert_eq!(
        registration.provenance.raw.get("Belopp").map(String::as_str),
        Some("-625,00")
    );
    assert!(registration.provenance.match_note.contains("OCR"));
}

#[test]
fn unmatched_result_cannot_become_payment() {
    let tx = outgoing(dec!(-625.00), "Betalning");
    let result = propose_match(&tx, &[], &[]);
    assert!(build_payment_registration(&result).is_err());
}
