//! Per-method field validation and input formatting.

use std::sync::LazyLock;

use common::FieldErrors;
use regex::Regex;

use crate::details::{CardDetails, PaymentDetails};

static UPI_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.\-_]{2,256}@[a-zA-Z]{2,64}$").expect("valid UPI pattern")
});

static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("valid expiry pattern")
});

const MIN_CARD_DIGITS: usize = 16;
const MIN_CVV_DIGITS: usize = 3;
const MIN_HOLDER_NAME: usize = 2;

/// Validates the details for their method. Methods without input always pass.
pub fn validate(details: &PaymentDetails) -> Result<(), FieldErrors> {
    match details {
        PaymentDetails::Upi { upi_id } => validate_upi_id(upi_id),
        PaymentDetails::Card(card) => validate_card(card),
        PaymentDetails::NetBanking { .. } | PaymentDetails::Wallet { .. } | PaymentDetails::Cod => {
            Ok(())
        }
    }
}

pub fn is_valid_upi_id(upi_id: &str) -> bool {
    UPI_ID.is_match(upi_id)
}

pub fn validate_upi_id(upi_id: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !is_valid_upi_id(upi_id) {
        errors.insert("upi", "Enter a valid UPI ID (example@paytm)");
    }
    errors.into_result()
}

/// Checks number, expiry, CVV and holder name, reporting every failing field.
pub fn validate_card(card: &CardDetails) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if number.len() < MIN_CARD_DIGITS || !number.chars().all(|c| c.is_ascii_digit()) {
        errors.insert("number", "Enter a valid card number");
    }

    if !EXPIRY.is_match(&card.expiry) {
        errors.insert("expiry", "Enter expiry as MM/YY");
    }

    if card.cvv.len() < MIN_CVV_DIGITS || !card.cvv.chars().all(|c| c.is_ascii_digit()) {
        errors.insert("cvv", "Enter a valid CVV");
    }

    if card.name.trim().chars().count() < MIN_HOLDER_NAME {
        errors.insert("name", "Enter the cardholder name");
    }

    errors.into_result()
}

/// Groups typed card digits in fours, dropping anything else and keeping at
/// most sixteen digits.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(MIN_CARD_DIGITS)
        .collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns typed digits into `MM/YY`.
pub fn format_expiry(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Keeps at most four digits.
pub fn format_cvv(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(4).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, expiry: &str) -> CardDetails {
        CardDetails::new(number, expiry, "123", "Asha Rao")
    }

    #[test]
    fn test_upi_ids() {
        assert!(is_valid_upi_id("user@bank"));
        assert!(is_valid_upi_id("first.last-01_x@okaxis"));
        assert!(!is_valid_upi_id("bad-id"));
        assert!(!is_valid_upi_id("u@bank"));
        assert!(!is_valid_upi_id("user@b"));
        assert!(!is_valid_upi_id("user@bank1"));
        assert!(validate_upi_id("bad-id").unwrap_err().contains("upi"));
    }

    #[test]
    fn test_card_number_length() {
        let err = validate_card(&card("1234 5678 9012", "09/26")).unwrap_err();
        assert!(err.contains("number"));
        assert_eq!(err.len(), 1);

        assert!(validate_card(&card("1234 5678 9012 3456", "09/26")).is_ok());
    }

    #[test]
    fn test_card_number_must_be_digits() {
        let err = validate_card(&card("1234 5678 9012 345X", "09/26")).unwrap_err();
        assert!(err.contains("number"));
    }

    #[test]
    fn test_expiry_month_range() {
        let err = validate_card(&card("1234567890123456", "13/25")).unwrap_err();
        assert!(err.contains("expiry"));
        assert!(validate_card(&card("1234567890123456", "09/26")).is_ok());
        assert!(validate_card(&card("1234567890123456", "00/26")).is_err());
        assert!(validate_card(&card("1234567890123456", "9/26")).is_err());
    }

    #[test]
    fn test_cvv_and_name() {
        let details = CardDetails::new("1234567890123456", "01/30", "12", " A ");
        let err = validate_card(&details).unwrap_err();
        assert!(err.contains("cvv"));
        assert!(err.contains("name"));
        assert!(!err.contains("number"));
    }

    #[test]
    fn test_inputless_methods_always_pass() {
        assert!(validate(&PaymentDetails::Cod).is_ok());
        assert!(validate(&PaymentDetails::NetBanking { bank: None }).is_ok());
        assert!(validate(&PaymentDetails::Wallet { provider: None }).is_ok());
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_card_number("1234567890123456789"), "1234 5678 9012 3456");
        assert_eq!(format_card_number("12-34 5"), "1234 5");
        assert_eq!(format_expiry("0926"), "09/26");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_cvv("12a345"), "1234");
    }
}
