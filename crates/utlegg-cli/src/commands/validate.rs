//! Validate command - check bank account numbers.

use clap::Args;
use console::style;
use serde::Serialize;

use utlegg_core::account::{classify, clean_account_number, format_account_number, validate_bank_account, AccountKind};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Account numbers (IBAN or 11-digit Norwegian), separators allowed
    #[arg(required = true)]
    accounts: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct AccountCheck {
    input: String,
    kind: AccountKind,
    normalized: String,
    formatted: String,
    valid: bool,
}

impl AccountCheck {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            kind: classify(input),
            normalized: clean_account_number(input),
            formatted: format_account_number(input),
            valid: validate_bank_account(input),
        }
    }
}

pub async fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let checks: Vec<AccountCheck> = args.accounts.iter().map(|a| AccountCheck::new(a)).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
    } else {
        for check in &checks {
            let mark = if check.valid {
                style("✓").green()
            } else {
                style("✗").red()
            };
            let verdict = if check.valid {
                style("valid").green()
            } else {
                style("invalid").red()
            };
            println!("{} {:<5} {} {}", mark, check.kind.to_string(), check.formatted, verdict);
        }
    }

    let invalid = checks.iter().filter(|c| !c.valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} account number(s) are invalid", invalid, checks.len());
    }

    Ok(())
}
