//! Data models for expense reports and configuration.

pub mod category;
pub mod config;
pub mod expense;

pub use category::{groups, CategoryItem, ExpenseCategory, EXPENSE_CATEGORIES};
pub use config::{AttachmentConfig, ColumnFractions, LayoutConfig, ReportConfig, UtleggConfig};
pub use expense::{
    Attachment, ExpenseLineItem, ExpenseReport, IssueKind, Payer, ValidationIssue,
};
