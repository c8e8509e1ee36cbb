//! WASM bindings for expense reports.
//!
//! This crate provides WebAssembly bindings for use in browsers: bank
//! account validation for form fields, report validation and PDF
//! assembly from `File` attachments.

use chrono::NaiveDate;
use js_sys::{Array, Reflect, Uint8Array};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use utlegg_core::models::{
    Attachment, ExpenseCategory, ExpenseLineItem, ExpenseReport, IssueKind, Payer,
    ValidationIssue,
};
use utlegg_core::{account, generate_pdf as assemble_pdf, Locale};

/// Category used in place of a missing one while validating.
const FALLBACK_CATEGORY: u16 = 7790;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Validate an IBAN or Norwegian 11-digit account number.
#[wasm_bindgen(js_name = validateBankAccount)]
pub fn validate_bank_account(account: &str) -> bool {
    account::validate_bank_account(account)
}

/// Format an account number for display (`NO93 8601 1117 947`, `8601 11 17947`).
#[wasm_bindgen(js_name = formatAccountNumber)]
pub fn format_account_number(account: &str) -> String {
    account::format_account_number(account)
}

/// Filter account field input; `undefined` means the keystroke should be rejected.
#[wasm_bindgen(js_name = sanitizeAccountInput)]
pub fn sanitize_account_input(input: &str) -> Option<String> {
    account::sanitize_account_input(input)
}

/// Format an amount for the given locale (default `nb-NO`).
#[wasm_bindgen(js_name = formatAmount)]
pub fn format_amount(amount: f64, locale: Option<String>) -> Result<String, JsValue> {
    let locale = parse_locale(locale.as_deref())?;
    let amount = Decimal::try_from(amount).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(locale.format_amount(amount))
}

/// All expense categories as `{ code, name, group, fullName }`.
#[wasm_bindgen(js_name = expenseCategories)]
pub fn expense_categories() -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CategoryJs {
        code: u16,
        name: &'static str,
        group: &'static str,
        full_name: String,
    }

    let categories: Vec<CategoryJs> = ExpenseCategory::all()
        .map(|c| CategoryJs {
            code: c.code(),
            name: c.item().name,
            group: c.group(),
            full_name: c.full_name(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&categories).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a report form. Resolves to a list of `{ field, kind, message }`;
/// an empty list means the report can be generated.
#[wasm_bindgen(js_name = validateReport)]
pub async fn validate_report(report: JsValue) -> Result<JsValue, JsValue> {
    let (report, mut issues) = load_report(&report).await?;
    issues.extend(report.validate());

    #[derive(Serialize)]
    struct IssueJs {
        field: String,
        kind: IssueKind,
        message: &'static str,
    }

    let output: Vec<IssueJs> = issues
        .into_iter()
        .map(|issue| IssueJs {
            message: issue.message(report.locale),
            field: issue.field,
            kind: issue.kind,
        })
        .collect();

    serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Assemble the report PDF. Attachments are read in line item order.
#[wasm_bindgen(js_name = generatePdf)]
pub async fn generate_pdf(report: JsValue) -> Result<Uint8Array, JsValue> {
    let (report, issues) = load_report(&report).await?;
    if let Some(issue) = issues.first() {
        return Err(JsValue::from_str(&issue.to_string()));
    }

    let assembled = assemble_pdf(&report).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(Uint8Array::from(assembled.bytes()))
}

/// Report form fields as sent from JavaScript.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportInput {
    #[serde(default)]
    payer: Payer,
    #[serde(default)]
    bank_account: String,
    #[serde(default)]
    email: String,
    date: NaiveDate,
    #[serde(default)]
    locale: Locale,
    #[serde(default)]
    expenses: Vec<ExpenseInput>,
}

#[derive(Deserialize)]
struct ExpenseInput {
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<ExpenseCategory>,
    amount: Decimal,
}

/// Read the form object and its `File` attachments.
///
/// Missing categories are reported as issues since they cannot be
/// represented in an [`ExpenseReport`].
async fn load_report(value: &JsValue) -> Result<(ExpenseReport, Vec<ValidationIssue>), JsValue> {
    let input: ReportInput = serde_wasm_bindgen::from_value(value.clone())
        .map_err(|e| JsValue::from_str(&format!("invalid report: {}", e)))?;

    let raw_expenses = Reflect::get(value, &JsValue::from_str("expenses"))?;
    let raw_expenses: Array = if Array::is_array(&raw_expenses) {
        raw_expenses.unchecked_into()
    } else {
        Array::new()
    };

    let mut issues = Vec::new();
    let mut expenses = Vec::with_capacity(input.expenses.len());
    for (i, expense) in input.expenses.into_iter().enumerate() {
        let attachment = read_attachment(&raw_expenses.get(i as u32)).await?;

        let category = match expense.category {
            Some(category) => category,
            None => {
                issues.push(ValidationIssue::new(
                    format!("expenses[{}].category", i),
                    IssueKind::CategoryRequired,
                ));
                ExpenseCategory::from_code(FALLBACK_CATEGORY)
                    .ok_or_else(|| JsValue::from_str("missing fallback category"))?
            }
        };

        expenses.push(ExpenseLineItem {
            description: expense.description,
            category,
            amount: expense.amount,
            attachment,
        });
    }

    let mut payer = input.payer;
    payer.apply_default_country(input.locale);

    let report = ExpenseReport {
        payer,
        bank_account: input.bank_account,
        email: input.email,
        date: input.date,
        locale: input.locale,
        expenses,
    };

    Ok((report, issues))
}

/// Read the `attachment` File of one expense; absent files yield an
/// empty attachment.
async fn read_attachment(expense: &JsValue) -> Result<Attachment, JsValue> {
    if expense.is_undefined() {
        return Ok(Attachment::new("", Vec::new()));
    }

    let value = Reflect::get(expense, &JsValue::from_str("attachment"))?;
    let Ok(file) = value.dyn_into::<File>() else {
        return Ok(Attachment::new("", Vec::new()));
    };

    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = Uint8Array::new(&buffer).to_vec();

    Ok(Attachment::new(file.name(), bytes))
}

fn parse_locale(locale: Option<&str>) -> Result<Locale, JsValue> {
    match locale {
        Some(tag) => tag.parse().map_err(|e: String| JsValue::from_str(&e)),
        None => Ok(Locale::default()),
    }
}
