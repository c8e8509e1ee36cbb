//! IBAN country registry: expected lengths and BBAN structures.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Registry entry for one IBAN country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbanCountry {
    /// ISO 3166-1 alpha-2 code.
    pub code: &'static str,
    /// Total IBAN length including country code and check digits.
    pub length: usize,
    /// Pattern the BBAN part (after the first 4 characters) must match.
    pub bban_pattern: Option<&'static str>,
}

const fn entry(code: &'static str, length: usize) -> IbanCountry {
    IbanCountry { code, length, bban_pattern: None }
}

const fn structured(code: &'static str, length: usize, pattern: &'static str) -> IbanCountry {
    IbanCountry { code, length, bban_pattern: Some(pattern) }
}

/// Known IBAN countries.
pub static IBAN_COUNTRIES: &[IbanCountry] = &[
    structured("AD", 24, r"^\d{8}[A-Z0-9]{12}$"),
    entry("AE", 23),
    entry("AL", 28),
    structured("AT", 20, r"^\d{16}$"),
    entry("AZ", 28),
    entry("BA", 20),
    structured("BE", 16, r"^\d{12}$"),
    entry("BG", 22),
    entry("BH", 22),
    entry("BI", 27),
    entry("BR", 29),
    entry("BY", 28),
    structured("CH", 21, r"^\d{5}[A-Z0-9]{12}$"),
    entry("CR", 22),
    entry("CY", 28),
    entry("CZ", 24),
    structured("DE", 22, r"^\d{18}$"),
    entry("DJ", 27),
    structured("DK", 18, r"^\d{14}$"),
    entry("DO", 28),
    structured("EE", 20, r"^\d{16}$"),
    entry("EG", 29),
    structured("ES", 24, r"^\d{20}$"),
    structured("FI", 18, r"^\d{14}$"),
    entry("FK", 18),
    structured("FO", 18, r"^\d{14}$"),
    structured("FR", 27, r"^\d{10}[A-Z0-9]{11}\d{2}$"),
    structured("GB", 22, r"^[A-Z]{4}\d{14}$"),
    entry("GE", 22),
    entry("GI", 23),
    structured("GL", 18, r"^\d{14}$"),
    entry("GR", 27),
    entry("GT", 28),
    entry("HR", 21),
    entry("HU", 28),
    structured("IE", 22, r"^[A-Z]{4}\d{14}$"),
    entry("IL", 23),
    entry("IQ", 23),
    structured("IS", 26, r"^\d{22}$"),
    structured("IT", 27, r"^[A-Z]\d{10}[A-Z0-9]{12}$"),
    entry("JO", 30),
    entry("KW", 30),
    entry("KZ", 20),
    entry("LB", 28),
    entry("LC", 32),
    entry("LI", 21),
    entry("LT", 20),
    structured("LU", 20, r"^\d{3}[A-Z0-9]{13}$"),
    entry("LV", 21),
    entry("LY", 25),
    entry("MC", 27),
    entry("MD", 24),
    entry("ME", 22),
    entry("MK", 19),
    entry("MN", 20),
    entry("MR", 27),
    entry("MT", 31),
    entry("MU", 30),
    entry("NI", 28),
    structured("NL", 18, r"^[A-Z]{4}\d{10}$"),
    structured("NO", 15, r"^\d{11}$"),
    entry("OM", 23),
    entry("PK", 24),
    structured("PL", 28, r"^\d{24}$"),
    entry("PS", 29),
    structured("PT", 25, r"^\d{21}$"),
    entry("QA", 29),
    entry("RO", 24),
    entry("RS", 22),
    entry("RU", 33),
    entry("SA", 24),
    entry("SC", 31),
    entry("SD", 18),
    structured("SE", 24, r"^\d{20}$"),
    entry("SI", 19),
    entry("SK", 24),
    entry("SM", 27),
    entry("SO", 23),
    entry("ST", 25),
    entry("SV", 28),
    entry("TL", 23),
    entry("TN", 24),
    entry("TR", 26),
    entry("UA", 29),
    entry("VA", 22),
    entry("VG", 24),
    entry("XK", 20),
    entry("YE", 30),
];

lazy_static! {
    static ref BY_CODE: HashMap<&'static str, &'static IbanCountry> =
        IBAN_COUNTRIES.iter().map(|c| (c.code, c)).collect();

    static ref BBAN_PATTERNS: HashMap<&'static str, Regex> = IBAN_COUNTRIES
        .iter()
        .filter_map(|c| c.bban_pattern.map(|p| (c.code, Regex::new(p).unwrap())))
        .collect();
}

/// Look up the registry entry for a country code.
pub fn iban_country(code: &str) -> Option<&'static IbanCountry> {
    BY_CODE.get(code).copied()
}

/// Compiled BBAN pattern for a country code, if the registry has one.
pub fn bban_pattern(code: &str) -> Option<&'static Regex> {
    BBAN_PATTERNS.get(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = IBAN_COUNTRIES.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), IBAN_COUNTRIES.len());
    }

    #[test]
    fn test_lengths_within_iban_bounds() {
        for country in IBAN_COUNTRIES {
            assert!(
                (5..=34).contains(&country.length),
                "{} has length {}",
                country.code,
                country.length
            );
        }
    }

    #[test]
    fn test_patterns_compile() {
        for country in IBAN_COUNTRIES.iter().filter(|c| c.bban_pattern.is_some()) {
            assert!(bban_pattern(country.code).is_some(), "{}", country.code);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(iban_country("NO").map(|c| c.length), Some(15));
        assert_eq!(iban_country("SE").map(|c| c.length), Some(24));
        assert!(iban_country("XY").is_none());
        assert!(bban_pattern("NL").unwrap().is_match("ABNA0417164300"));
    }
}
