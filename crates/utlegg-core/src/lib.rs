//! Core library for expense reimbursement reports.
//!
//! This crate provides:
//! - Bank account validation (IBAN mod-97 and Norwegian 11-digit MOD-11)
//! - Expense report models, categories and form validation
//! - Locale formatting of amounts and dates (nb-NO, en-GB)
//! - PDF assembly of a summary page plus captioned receipt pages

pub mod account;
pub mod error;
pub mod locale;
pub mod models;
pub mod patterns;
pub mod pdf;
pub mod report;

pub use account::{
    classify, clean_account_number, format_account_number, sanitize_account_input,
    validate_bank_account, AccountKind, AccountNumber,
};
pub use error::{ReportError, Result, UtleggError};
pub use locale::Locale;
pub use models::{
    Attachment, ExpenseCategory, ExpenseLineItem, ExpenseReport, IssueKind, Payer, UtleggConfig,
    ValidationIssue,
};
pub use report::{downscale_image, generate_pdf, AssembledDocument, ReportAssembler};
