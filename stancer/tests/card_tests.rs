mod common;

use common::{FakeHttp, VISA, fake_client};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use stancer::{Card, Error, Resource, TypeKind, ValueKind};

fn value_error(err: Error) -> (ValueKind, String) {
    let kind = err.value_kind().unwrap_or_else(|| panic!("expected a value error, got {err:?}"));
    (kind, err.to_string())
}

/// Appends the Luhn check digit to `digits`.
fn with_check_digit(digits: &str) -> String {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(position, digit)| {
            if position % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    format!("{digits}{}", (10 - sum % 10) % 10)
}

// ── Number ───────────────────────────────────────────────────────

#[test]
fn number_ignores_separators_and_keeps_last_digits() {
    let card = Card::detached();
    card.set_number("4111 1111-1111 1111").unwrap();

    assert_eq!(card.number().unwrap().as_deref(), Some(VISA));
    assert_eq!(card.last4().unwrap().as_deref(), Some("1111"));
    assert_eq!(card.modified_fields(), vec!["number".to_string()]);
}

#[test]
fn number_must_pass_the_luhn_check() {
    let card = Card::detached();
    let (kind, message) = value_error(card.set_number("4111111111111112").unwrap_err());

    assert_eq!(kind, ValueKind::CardNumber);
    assert_eq!(message, "\"4111111111111112\" is not a valid credit card number.");
    assert_eq!(card.number().unwrap(), None);
}

#[test]
fn number_is_kept_out_of_debug_output() {
    let card = Card::detached();
    card.set_number(VISA).unwrap();

    let debug = format!("{card:?}");
    assert!(!debug.contains(VISA));
    assert!(debug.contains("last4"));
}

proptest! {
    #[test]
    fn numbers_with_a_valid_check_digit_are_accepted(digits in "[0-9]{12,18}") {
        let number = with_check_digit(&digits);
        let card = Card::detached();
        prop_assert!(card.set_number(number.clone()).is_ok());
        prop_assert_eq!(card.last4().unwrap(), Some(number[number.len() - 4..].to_string()));
    }

    #[test]
    fn a_wrong_check_digit_is_rejected(digits in "[0-9]{12,18}", offset in 1u32..10) {
        let valid = with_check_digit(&digits);
        let check = valid.chars().last().and_then(|c| c.to_digit(10)).unwrap();
        let wrong = format!("{digits}{}", (check + offset) % 10);

        let err = Card::detached().set_number(wrong).unwrap_err();
        prop_assert_eq!(err.value_kind(), Some(ValueKind::CardNumber));
    }
}

// ── Other attributes ─────────────────────────────────────────────

#[test]
fn attribute_rules() {
    let card = Card::detached();

    assert_eq!(
        value_error(card.set_cvc("12").unwrap_err()),
        (ValueKind::CardVerificationCode, "CVC must have 3 characters.".to_string())
    );
    assert_eq!(
        value_error(card.set_exp_month(13).unwrap_err()),
        (
            ValueKind::CardExpirationMonth,
            "Expiration month must be between 1 and 12.".to_string()
        )
    );
    assert_eq!(
        value_error(card.set_zip_code("1").unwrap_err()),
        (ValueKind::ZipCode, "Zip code must be between 2 and 8 characters.".to_string())
    );
    assert_eq!(
        value_error(card.set_name("Bob").unwrap_err()),
        (ValueKind::Name, "Name must be between 4 and 64 characters.".to_string())
    );

    card.set_cvc("123").unwrap();
    card.set_exp_month(12).unwrap();
    card.set_exp_year(2030).unwrap();
    card.set_zip_code("75001").unwrap();
    card.set_name("John Doe").unwrap();
    card.set_tokenize(true).unwrap();

    assert_eq!(card.cvc().unwrap().as_deref(), Some("123"));
    assert_eq!(card.exp_month().unwrap(), Some(12));
    assert_eq!(card.exp_year().unwrap(), Some(2030));
    assert_eq!(card.tokenize().unwrap(), Some(true));
}

#[test]
fn tokenize_reports_a_type_error() {
    let err = Card::detached().set("tokenize", "yes").unwrap_err();
    assert!(matches!(err, Error::InvalidType { kind: TypeKind::CardTokenize, .. }));
    assert_eq!(err.to_string(), "Tokenize must be a boolean.");
}

#[test]
fn expiration_year_must_be_an_integer() {
    let (kind, message) = value_error(Card::detached().set("exp_year", "2030").unwrap_err());
    assert_eq!(kind, ValueKind::CardExpirationYear);
    assert_eq!(message, "Expiration year must be an integer.");
}

// ── Brand and completeness ───────────────────────────────────────

#[test]
fn brand_names() {
    let card = Card::detached();
    for (brand, name) in [
        ("amex", "American Express"),
        ("mastercard", "MasterCard"),
        ("visa", "VISA"),
        ("jcb", "JCB"),
        ("unionpay", "unionpay"),
    ] {
        card.hydrate([("brand", brand)]).unwrap();
        assert_eq!(card.brand_name().unwrap().as_deref(), Some(name));
    }
}

#[test]
fn completeness() {
    let card = Card::detached();
    assert!(!card.is_complete());

    card.set_number(VISA).unwrap();
    card.set_exp_month(1).unwrap();
    card.set_exp_year(2031).unwrap();
    assert!(!card.is_complete());

    card.set_cvc("321").unwrap();
    assert!(card.is_complete());

    let http = FakeHttp::new();
    assert!(Card::retrieve(&fake_client(&http), "card_1").is_complete());
    assert_eq!(http.request_count(), 0);
}

// ── Wire ─────────────────────────────────────────────────────────

#[test]
fn server_attributes_are_never_sent() {
    let card = Card::detached();
    card.hydrate([("brand", "visa"), ("country", "FR"), ("funding", "credit")])
        .unwrap();
    card.set_number(VISA).unwrap();
    card.set_cvc("123").unwrap();

    assert_eq!(card.to_json_repr(), json!({"cvc": "123", "number": VISA}));
}

#[test]
fn retrieved_card_fetches_on_first_read() {
    let http = FakeHttp::new();
    http.respond_json(json!({
        "id": "card_xH4ecrsEzBr8L8MZAC4WViNa",
        "brand": "mastercard",
        "exp_month": 3,
        "exp_year": 2033,
        "last4": "4444",
        "created": 1_579_010_740,
        "live_mode": false
    }));

    let card = Card::retrieve(&fake_client(&http), "card_xH4ecrsEzBr8L8MZAC4WViNa");
    assert_eq!(card.brand_name().unwrap().as_deref(), Some("MasterCard"));
    assert_eq!(card.last4().unwrap().as_deref(), Some("4444"));
    assert_eq!(card.number().unwrap(), None);

    assert_eq!(http.request_count(), 1);
    assert_eq!(
        http.last_request().url,
        "https://api.stancer.com/v1/cards/card_xH4ecrsEzBr8L8MZAC4WViNa"
    );
    assert!(!card.is_modified());
}
