//! Client-side card checks and display helpers.
//!
//! These checks are advisory: they catch typos before a round-trip. There is
//! no Luhn check, and the payment processor behind the backend has the final
//! word on whether a card is acceptable.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Card network, inferred from the leading digits for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    /// Infer the brand from a (possibly formatted) card number.
    #[must_use]
    pub fn detect(number: &str) -> Self {
        let digits = digits_only(number);
        let starts = |p: &str| digits.starts_with(p);

        if starts("4") {
            Self::Visa
        } else if ["51", "52", "53", "54", "55"].iter().any(|p| starts(p)) {
            Self::Mastercard
        } else if starts("34") || starts("37") {
            Self::Amex
        } else if starts("6011") || starts("65") {
            Self::Discover
        } else {
            Self::Unknown
        }
    }

    /// Lowercase name, as sent in the payment descriptor's `tipo`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Unknown => "unknown",
        }
    }
}

/// A single problem found in the card form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("Número de tarjeta inválido")]
    NumberLength,
    #[error("Nombre del titular requerido")]
    HolderName,
    #[error("Fecha de expiración inválida (MM/AA)")]
    ExpiryFormat,
    #[error("Mes de expiración inválido")]
    InvalidMonth,
    #[error("La tarjeta está vencida")]
    Expired,
    #[error("CVV inválido")]
    CvvLength,
}

/// Raw card form fields.
#[derive(Debug, Clone, Default)]
pub struct CardInput {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvv: String,
    pub notes: String,
}

/// A card that passed the client-side checks.
///
/// Holds only what may leave the device: brand, last four digits, holder and
/// expiry. The full number and CVV are dropped here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    pub brand: CardBrand,
    pub last4: String,
    pub holder: String,
    pub expiry: String,
    pub notes: String,
}

impl CardInput {
    /// Run every check and collect all failures.
    ///
    /// `today` decides expiry: a card is good through the last day of its
    /// expiry month.
    ///
    /// # Errors
    ///
    /// Returns every [`CardError`] found, in form order.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedCard, Vec<CardError>> {
        let mut errors = Vec::new();

        let number = digits_only(&self.number);
        if !(13..=19).contains(&number.len()) {
            errors.push(CardError::NumberLength);
        }

        let holder = self.holder.trim();
        if holder.chars().count() < 3 {
            errors.push(CardError::HolderName);
        }

        let expiry = self.expiry.trim();
        if let Err(e) = check_expiry(expiry, today) {
            errors.push(e);
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) {
            errors.push(CardError::CvvLength);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let last4 = number
            .get(number.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_owned();

        Ok(ValidatedCard {
            brand: CardBrand::detect(&number),
            last4,
            holder: holder.to_owned(),
            expiry: expiry.to_owned(),
            notes: self.notes.trim().to_owned(),
        })
    }
}

/// Check an `MM/YY` expiry against the current date.
fn check_expiry(expiry: &str, today: NaiveDate) -> Result<(), CardError> {
    let (mm, yy) = expiry.split_once('/').ok_or(CardError::ExpiryFormat)?;
    let is_two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !is_two_digits(mm) || !is_two_digits(yy) {
        return Err(CardError::ExpiryFormat);
    }

    let month: u32 = mm.parse().map_err(|_| CardError::ExpiryFormat)?;
    let year: i32 = yy.parse().map_err(|_| CardError::ExpiryFormat)?;
    if !(1..=12).contains(&month) {
        return Err(CardError::InvalidMonth);
    }

    let expiry_month = (2000 + year) * 12 + i32::try_from(month).unwrap_or(0);
    let current_month = today.year() * 12 + i32::try_from(today.month()).unwrap_or(0);
    if expiry_month < current_month {
        return Err(CardError::Expired);
    }
    Ok(())
}

fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Group card digits in fours for display, e.g. `4111 1111 1111 1111`.
///
/// Non-digits are dropped and at most 19 digits are kept.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = digits_only(input).chars().take(19).collect();
    digits
        .chunks(4)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Insert the `/` into an expiry as it is typed, e.g. `1225` -> `12/25`.
#[must_use]
pub fn format_expiry(input: &str) -> String {
    let digits: String = digits_only(input).chars().take(4).collect();
    if digits.len() > 2 {
        let (mm, yy) = digits.split_at(2);
        format!("{mm}/{yy}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn card(expiry: &str) -> CardInput {
        CardInput {
            number: "4111 1111 1111 1111".into(),
            holder: "Ana Mora".into(),
            expiry: expiry.into(),
            cvv: "123".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardBrand::detect("4111 1111"), CardBrand::Visa);
        assert_eq!(CardBrand::detect("5500000000000004"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("5600000000000004"), CardBrand::Unknown);
        assert_eq!(CardBrand::detect("378282246310005"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("6011000990139424"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("6500000000000000"), CardBrand::Discover);
        assert_eq!(CardBrand::detect(""), CardBrand::Unknown);
    }

    #[test]
    fn test_rejects_invalid_month() {
        let errors = card("13/25").validate(day(2024, 1, 1)).expect_err("invalid");
        assert_eq!(errors, vec![CardError::InvalidMonth]);
    }

    #[test]
    fn test_expiry_valid_through_its_month() {
        assert!(card("12/25").validate(day(2025, 12, 31)).is_ok());
        assert!(card("12/25").validate(day(2025, 6, 1)).is_ok());
    }

    #[test]
    fn test_expiry_in_past_is_rejected() {
        let errors = card("12/25").validate(day(2026, 1, 1)).expect_err("expired");
        assert_eq!(errors, vec![CardError::Expired]);
    }

    #[test]
    fn test_expiry_format() {
        for bad in ["1225", "1/25", "12/2025", "ab/cd", ""] {
            let errors = card(bad).validate(day(2024, 1, 1)).expect_err(bad);
            assert_eq!(errors, vec![CardError::ExpiryFormat], "{bad}");
        }
    }

    #[test]
    fn test_collects_every_error() {
        let input = CardInput {
            number: "4111".into(),
            holder: "A".into(),
            expiry: "00/30".into(),
            cvv: "12345".into(),
            notes: String::new(),
        };
        let errors = input.validate(day(2024, 1, 1)).expect_err("invalid");
        assert_eq!(
            errors,
            vec![
                CardError::NumberLength,
                CardError::HolderName,
                CardError::InvalidMonth,
                CardError::CvvLength,
            ]
        );
    }

    #[test]
    fn test_number_length_bounds() {
        let mut input = card("12/30");
        input.number = "4".repeat(13);
        assert!(input.validate(day(2024, 1, 1)).is_ok());
        input.number = "4".repeat(19);
        assert!(input.validate(day(2024, 1, 1)).is_ok());
        input.number = "4".repeat(20);
        assert!(input.validate(day(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_validated_card_keeps_only_last_four() {
        let valid = card("12/30").validate(day(2024, 1, 1)).expect("valid");
        assert_eq!(valid.last4, "1111");
        assert_eq!(valid.brand, CardBrand::Visa);
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("41-11 11"), "4111 11");
        assert_eq!(format_expiry("1225"), "12/25");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12/259"), "12/25");
    }
}
