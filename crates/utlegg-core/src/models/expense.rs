//! Expense report data models and form validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::ExpenseCategory;
use crate::account::{clean_account_number, validate_bank_account};
use crate::locale::Locale;
use crate::patterns::EMAIL;

/// Minimum description length for a line item.
pub const MIN_DESCRIPTION_LEN: usize = 2;

/// Earliest accepted report date.
pub fn earliest_report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Identity of the person to be reimbursed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
    /// Full name.
    pub name: String,
    pub street_address: String,
    pub postal_code: String,
    pub city: String,
    /// Left empty on input to use the locale's default country.
    #[serde(default)]
    pub country: String,
}

impl Payer {
    /// Fill an empty country with the default for `locale`.
    pub fn apply_default_country(&mut self, locale: Locale) {
        if self.country.trim().is_empty() {
            self.country = locale.default_country().to_string();
        }
    }

    /// Single-line address: `street, postal city, country`.
    pub fn address_line(&self) -> String {
        format!(
            "{}, {} {}, {}",
            self.street_address, self.postal_code, self.city, self.country
        )
    }
}

/// A receipt or other supporting document.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Original file name.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One row of the expense form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseLineItem {
    pub description: String,
    pub category: ExpenseCategory,
    /// Amount in the report currency.
    pub amount: Decimal,
    pub attachment: Attachment,
}

/// A complete reimbursement claim, the input to the report assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseReport {
    pub payer: Payer,
    /// Bank account as entered (IBAN or BBAN).
    pub bank_account: String,
    pub email: String,
    pub date: NaiveDate,
    pub locale: Locale,
    pub expenses: Vec<ExpenseLineItem>,
}

impl ExpenseReport {
    /// Sum of all line item amounts.
    pub fn total(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Bank account with separators stripped.
    pub fn bank_account_clean(&self) -> String {
        clean_account_number(&self.bank_account)
    }

    /// Suggested download file name, e.g. `2026-10-16-expense-report.pdf`.
    pub fn file_name(&self) -> String {
        format!("{}-expense-report.pdf", self.date.format("%Y-%m-%d"))
    }

    /// Check the report the way the expense form does before submitting.
    ///
    /// Returns every problem found; an empty list means the report can be
    /// handed to the assembler.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let required = [
            ("name", &self.payer.name, IssueKind::NameRequired),
            ("streetAddress", &self.payer.street_address, IssueKind::StreetRequired),
            ("postalCode", &self.payer.postal_code, IssueKind::PostalRequired),
            ("city", &self.payer.city, IssueKind::CityRequired),
            ("country", &self.payer.country, IssueKind::CountryRequired),
        ];
        for (field, value, kind) in required {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(field, kind));
            }
        }

        if !validate_bank_account(&self.bank_account) {
            issues.push(ValidationIssue::new("bankAccount", IssueKind::InvalidAccount));
        }

        if !EMAIL.is_match(self.email.trim()) {
            issues.push(ValidationIssue::new("email", IssueKind::InvalidEmail));
        }

        if self.date < earliest_report_date() {
            issues.push(ValidationIssue::new("date", IssueKind::DateRequired));
        }

        if self.expenses.is_empty() {
            issues.push(ValidationIssue::new("expenses", IssueKind::ExpenseRequired));
        }

        for (i, expense) in self.expenses.iter().enumerate() {
            if expense.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
                issues.push(ValidationIssue::new(
                    format!("expenses[{}].description", i),
                    IssueKind::DescriptionRequired,
                ));
            }
            if expense.amount < Decimal::new(1, 2) {
                issues.push(ValidationIssue::new(
                    format!("expenses[{}].amount", i),
                    IssueKind::AmountPositive,
                ));
            }
            if expense.attachment.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("expenses[{}].attachment", i),
                    IssueKind::FileRequired,
                ));
            }
        }

        issues
    }
}

/// Kind of form validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    NameRequired,
    StreetRequired,
    PostalRequired,
    CityRequired,
    CountryRequired,
    InvalidAccount,
    InvalidEmail,
    DateRequired,
    ExpenseRequired,
    DescriptionRequired,
    CategoryRequired,
    AmountPositive,
    FileRequired,
}

impl IssueKind {
    /// User-facing message in the given locale.
    pub fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::NameRequired, Locale::NbNo) => "Navn må fylles ut",
            (Self::NameRequired, Locale::EnGb) => "Name is required",
            (Self::StreetRequired, Locale::NbNo) => "Gateadresse må fylles ut",
            (Self::StreetRequired, Locale::EnGb) => "Street address is required",
            (Self::PostalRequired, Locale::NbNo) => "Postnummer må fylles ut",
            (Self::PostalRequired, Locale::EnGb) => "Postal code is required",
            (Self::CityRequired, Locale::NbNo) => "Sted må fylles ut",
            (Self::CityRequired, Locale::EnGb) => "City is required",
            (Self::CountryRequired, Locale::NbNo) => "Land må fylles ut",
            (Self::CountryRequired, Locale::EnGb) => "Country is required",
            (Self::InvalidAccount, Locale::NbNo) => "Ugyldig kontonummer",
            (Self::InvalidAccount, Locale::EnGb) => "Invalid account number",
            (Self::InvalidEmail, Locale::NbNo) => "Ugyldig e-postadresse",
            (Self::InvalidEmail, Locale::EnGb) => "Invalid email address",
            (Self::DateRequired, Locale::NbNo) => "Dato må være etter 1. januar 2020",
            (Self::DateRequired, Locale::EnGb) => "Date must be after 1 January 2020",
            (Self::ExpenseRequired, Locale::NbNo) => "Legg til minst ett utlegg",
            (Self::ExpenseRequired, Locale::EnGb) => "Add at least one expense",
            (Self::DescriptionRequired, Locale::NbNo) => "Beskrivelse må ha minst 2 tegn",
            (Self::DescriptionRequired, Locale::EnGb) => "Description needs at least 2 characters",
            (Self::CategoryRequired, Locale::NbNo) => "Velg en kategori",
            (Self::CategoryRequired, Locale::EnGb) => "Select a category",
            (Self::AmountPositive, Locale::NbNo) => "Beløpet må være større enn 0",
            (Self::AmountPositive, Locale::EnGb) => "Amount must be greater than 0",
            (Self::FileRequired, Locale::NbNo) => "Vedlegg er påkrevd",
            (Self::FileRequired, Locale::EnGb) => "Attachment is required",
        }
    }
}

/// A single failed form check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path, e.g. `expenses[1].amount`.
    pub field: String,
    pub kind: IssueKind,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        self.kind.message(locale)
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.kind.message(Locale::EnGb))
    }
}
