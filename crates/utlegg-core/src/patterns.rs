//! Common regex patterns for account numbers and form fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Country code, check digits, 1-30 alphanumerics
    pub static ref IBAN_STRUCTURE: Regex = Regex::new(
        r"^[A-Z]{2}\d{2}[A-Z0-9]{1,30}$"
    ).unwrap();

    // Anything that is not part of an account number
    pub static ref ACCOUNT_SEPARATORS: Regex = Regex::new(
        r"[^A-Za-z0-9]"
    ).unwrap();

    // Leading country code, used to tell IBAN from BBAN while typing
    pub static ref LEADING_LETTERS: Regex = Regex::new(
        r"^[A-Za-z]{2}"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();
}
