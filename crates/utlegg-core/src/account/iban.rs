//! IBAN (International Bank Account Number) validation.

use tracing::trace;

use super::countries::{bban_pattern, iban_country};
use crate::patterns::IBAN_STRUCTURE;

/// Number of characters folded into the running remainder at a time.
const MOD97_CHUNK: usize = 7;

/// Validate a cleaned, uppercase IBAN.
///
/// Checks, in order:
/// 1. Structure: 2 letters, 2 digits, 1-30 alphanumerics
/// 2. Total length, when the country is in the registry
/// 3. BBAN structure, when the registry has a pattern for the country
/// 4. The mod-97 checksum
///
/// Countries missing from the registry skip steps 2 and 3.
pub fn validate_iban(iban: &str) -> bool {
    if !IBAN_STRUCTURE.is_match(iban) {
        return false;
    }

    let country_code = &iban[..2];
    let bban = &iban[4..];

    match iban_country(country_code) {
        Some(country) if country.length != iban.len() => {
            trace!(
                "IBAN length {} does not match {} ({})",
                iban.len(),
                country.code,
                country.length
            );
            return false;
        }
        Some(_) => {}
        None => trace!("Unknown IBAN country {}, skipping length check", country_code),
    }

    if let Some(pattern) = bban_pattern(country_code) {
        if !pattern.is_match(bban) {
            trace!("BBAN {} does not match structure for {}", bban, country_code);
            return false;
        }
    }

    mod97(&numeric_form(iban)) == 1
}

/// Rearrange an IBAN (first 4 characters to the end) and replace
/// letters with their two-digit values (A=10, ..., Z=35).
fn numeric_form(iban: &str) -> String {
    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    let mut number_str = String::with_capacity(rearranged.len() * 2);
    for c in rearranged.chars() {
        if c.is_ascii_digit() {
            number_str.push(c);
        } else {
            let value = (c as u32) - ('A' as u32) + 10;
            number_str.push_str(&value.to_string());
        }
    }
    number_str
}

/// Reduce a decimal numeral modulo 97 in fixed-size chunks.
///
/// The numeral is far too large for any integer type, so each chunk is
/// appended to the previous remainder and reduced before moving on.
fn mod97(number_str: &str) -> u64 {
    number_str
        .as_bytes()
        .chunks(MOD97_CHUNK)
        .fold(0u64, |remainder, chunk| {
            let (value, scale) = chunk.iter().fold((0u64, 1u64), |(value, scale), b| {
                (value * 10 + u64::from(b - b'0'), scale * 10)
            });
            (remainder * scale + value) % 97
        })
}
