//! Bank account number classification, validation and formatting.
//!
//! Accepts either a Norwegian domestic account number (BBAN, 11 digits
//! with a MOD-11 check digit) or an IBAN. The kind is decided by the
//! first two characters of the cleaned input: two letters mean IBAN.

mod bban;
mod countries;
mod iban;

pub use bban::{check_digit, validate_bban, BBAN_LENGTH};
pub use countries::{iban_country, IbanCountry, IBAN_COUNTRIES};
pub use iban::validate_iban;

use serde::{Deserialize, Serialize};

use crate::patterns::{ACCOUNT_SEPARATORS, LEADING_LETTERS};

/// Maximum IBAN length.
pub const IBAN_MAX_LENGTH: usize = 34;

/// Kind of account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// International Bank Account Number.
    Iban,
    /// Norwegian domestic account number.
    Bban,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iban => write!(f, "IBAN"),
            Self::Bban => write!(f, "BBAN"),
        }
    }
}

/// A validated account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountNumber {
    /// Detected kind.
    pub kind: AccountKind,
    /// Separators stripped, uppercase.
    pub normalized: String,
}

impl AccountNumber {
    /// Parse and validate an account number. Returns `None` if invalid.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = clean_account_number(raw);
        let kind = kind_of(&normalized);

        let valid = match kind {
            AccountKind::Iban => validate_iban(&normalized),
            AccountKind::Bban => validate_bban(&normalized),
        };

        valid.then_some(Self { kind, normalized })
    }

    /// Human readable form, see [`format_account_number`].
    pub fn formatted(&self) -> String {
        format_account_number(&self.normalized)
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Strip everything except ASCII letters and digits and uppercase the rest.
pub fn clean_account_number(raw: &str) -> String {
    ACCOUNT_SEPARATORS.replace_all(raw, "").to_ascii_uppercase()
}

/// Classify an account number as IBAN or BBAN.
pub fn classify(raw: &str) -> AccountKind {
    kind_of(&clean_account_number(raw))
}

fn kind_of(cleaned: &str) -> AccountKind {
    if LEADING_LETTERS.is_match(cleaned) {
        AccountKind::Iban
    } else {
        AccountKind::Bban
    }
}

/// Validate a bank account number in either IBAN or BBAN form.
///
/// Separators and case are ignored.
pub fn validate_bank_account(raw: &str) -> bool {
    AccountNumber::parse(raw).is_some()
}

/// Format an account number for display.
///
/// IBANs are split in groups of four (`NO93 8601 1117 947`), Norwegian
/// account numbers as `XXXX XX XXXXX`. Incomplete domestic numbers are
/// returned cleaned but ungrouped.
pub fn format_account_number(raw: &str) -> String {
    let cleaned = clean_account_number(raw);

    match kind_of(&cleaned) {
        AccountKind::Iban => cleaned
            .chars()
            .collect::<Vec<char>>()
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<String>>()
            .join(" "),
        AccountKind::Bban if cleaned.len() == BBAN_LENGTH => {
            format!("{} {} {}", &cleaned[0..4], &cleaned[4..6], &cleaned[6..])
        }
        AccountKind::Bban => cleaned,
    }
}

/// Filter a keystroke-level account input.
///
/// Input starting with a letter is treated as an IBAN: uppercased and
/// capped at 34 significant characters. Anything else is a domestic
/// number: non-digits are dropped and it is capped at 11 digits.
/// Whitespace is kept so the user's grouping survives. Returns `None`
/// when the input exceeds the cap and should be rejected.
pub fn sanitize_account_input(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let starts_with_letter = kept.chars().next().is_some_and(|c| c.is_ascii_alphabetic());

    let (value, limit) = if starts_with_letter {
        (kept.to_ascii_uppercase(), IBAN_MAX_LENGTH)
    } else {
        let digits: String = kept
            .chars()
            .filter(|c| c.is_ascii_digit() || c.is_whitespace())
            .collect();
        (digits, BBAN_LENGTH)
    };

    let significant = value.chars().filter(|c| !c.is_whitespace()).count();
    (significant <= limit).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_validate_bank_account() {
        assert!(validate_bank_account("NO9386011117947"));
        assert!(!validate_bank_account("NO9386011117948"));
        assert!(validate_bank_account("86011117947"));
        assert!(!validate_bank_account("86011117948"));
    }

    #[test]
    fn test_separators_are_ignored() {
        let samples = [
            ("NO9386011117947", "NO93 8601 1117 947"),
            ("NO9386011117947", "no93-8601.1117/947"),
            ("86011117947", "8601 11 17947"),
            ("86011117947", "8601.11.17947"),
            ("86011117948", " 8601-11-17948 "),
        ];
        for (clean, noisy) in samples {
            assert_eq!(validate_bank_account(clean), validate_bank_account(noisy), "{}", noisy);
        }
        assert_eq!(clean_account_number("no93 8601-1117.947"), "NO9386011117947");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("NO93 8601 1117 947"), AccountKind::Iban);
        assert_eq!(classify("8601 11 17947"), AccountKind::Bban);
        assert_eq!(classify("N0"), AccountKind::Bban);
        assert_eq!(classify(""), AccountKind::Bban);
    }

    #[test]
    fn test_parse() {
        let account = AccountNumber::parse("no93 8601 1117 947").unwrap();
        assert_eq!(account.kind, AccountKind::Iban);
        assert_eq!(account.normalized, "NO9386011117947");
        assert!(AccountNumber::parse("1234").is_none());
    }

    #[test]
    fn test_format_account_number() {
        assert_eq!(format_account_number("86011117947"), "8601 11 17947");
        assert_eq!(format_account_number("NO9386011117947"), "NO93 8601 1117 947");
        assert_eq!(format_account_number("8601 1"), "86011");
    }

    #[test]
    fn test_sanitize_account_input() {
        assert_eq!(sanitize_account_input("no93 8601"), Some("NO93 8601".to_string()));
        assert_eq!(sanitize_account_input("8601-11 179ab"), Some("860111 179".to_string()));
        assert_eq!(sanitize_account_input("860111179471"), None);
        assert_eq!(sanitize_account_input(&format!("NO{}", "1".repeat(33))), None);
    }

    /// Interleave `separators` with the characters of `account`.
    fn with_noise(account: &str, separators: &[String]) -> String {
        let mut noisy = String::new();
        for (i, c) in account.chars().enumerate() {
            if let Some(sep) = separators.get(i) {
                noisy.push_str(sep);
            }
            noisy.push(c);
        }
        noisy
    }

    proptest! {
        #[test]
        fn prop_separators_do_not_change_bban_result(
            account in "[0-9]{11}",
            separators in prop::collection::vec("[ .\\-/]{0,2}", 0..12),
        ) {
            let noisy = with_noise(&account, &separators);
            prop_assert_eq!(clean_account_number(&noisy), account.clone());
            prop_assert_eq!(validate_bank_account(&noisy), validate_bank_account(&account));
        }

        #[test]
        fn prop_separators_do_not_change_iban_result(
            bban in "[0-9]{11}",
            check in 2u32..=98,
            separators in prop::collection::vec("[ .\\-]{0,2}", 0..16),
        ) {
            let account = format!("NO{:02}{}", check, bban);
            let noisy = with_noise(&account.to_lowercase(), &separators);
            prop_assert_eq!(validate_bank_account(&noisy), validate_bank_account(&account));
        }

        #[test]
        fn prop_cleaning_is_idempotent(raw in "[ -~]{0,40}") {
            let once = clean_account_number(&raw);
            prop_assert_eq!(clean_account_number(&once), once.clone());
            prop_assert_eq!(validate_bank_account(&once), validate_bank_account(&raw));
        }
    }
}
