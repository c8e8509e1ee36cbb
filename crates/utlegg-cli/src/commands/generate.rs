//! Generate command - assemble a report PDF from a JSON report file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use utlegg_core::models::{
    Attachment, AttachmentConfig, ExpenseCategory, ExpenseLineItem, ExpenseReport, Payer,
};
use utlegg_core::{downscale_image, Locale, ReportAssembler};

use super::load_config;

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Report file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output PDF (default: <date>-expense-report.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Downscale large photos before embedding them
    #[arg(long)]
    resize: bool,

    /// Report locale, overriding the report file and configuration
    #[arg(short, long)]
    locale: Option<Locale>,

    /// Skip form validation
    #[arg(long)]
    no_validate: bool,
}

/// Report file layout. Attachments are paths relative to the file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportFile {
    payer: Payer,
    bank_account: String,
    email: String,
    date: NaiveDate,
    #[serde(default)]
    locale: Option<Locale>,
    expenses: Vec<ExpenseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseEntry {
    description: String,
    category: ExpenseCategory,
    amount: Decimal,
    attachment: PathBuf,
}

pub async fn run(args: GenerateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Report file not found: {}", args.input.display());
    }

    let content = tokio::fs::read_to_string(&args.input).await?;
    let file: ReportFile = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid report file {}: {}", args.input.display(), e))?;

    let base_dir = args
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let locale = args
        .locale
        .or(file.locale)
        .unwrap_or(config.report.locale);

    info!("Generating report from {}", args.input.display());

    let pb = ProgressBar::new(file.expenses.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    // Attachments are read one at a time, in line item order
    let mut expenses = Vec::with_capacity(file.expenses.len());
    for entry in file.expenses {
        pb.set_message(format!("Loading {}", entry.attachment.display()));
        let attachment = load_attachment(&base_dir, &entry.attachment, args.resize, &config.attachments).await?;
        expenses.push(ExpenseLineItem {
            description: entry.description,
            category: entry.category,
            amount: entry.amount,
            attachment,
        });
        pb.inc(1);
    }

    let mut payer = file.payer;
    payer.apply_default_country(locale);

    let report = ExpenseReport {
        payer,
        bank_account: file.bank_account,
        email: file.email,
        date: file.date,
        locale,
        expenses,
    };

    if config.report.validate && !args.no_validate {
        let issues = report.validate();
        if !issues.is_empty() {
            pb.abandon();
            eprintln!("{}", style("Validation issues:").red());
            for issue in &issues {
                eprintln!("  - {}: {}", issue.field, issue.message(locale));
            }
            anyhow::bail!("Report is invalid ({} issue(s))", issues.len());
        }
    }

    pb.set_message("Assembling PDF...");
    let assembled = ReportAssembler::from_config(&config).assemble(&report)?;
    pb.inc(1);

    let output_path = match args.output {
        Some(path) => path,
        None => config
            .report
            .output_dir
            .clone()
            .unwrap_or_default()
            .join(assembled.file_name()),
    };
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, assembled.bytes()).await?;

    pb.finish_with_message("Done");

    println!(
        "{} Wrote {} ({} pages, total {})",
        style("✓").green(),
        output_path.display(),
        assembled.page_count(),
        locale.format_amount(report.total())
    );
    debug!("Total generation time: {:?}", start.elapsed());

    Ok(())
}

async fn load_attachment(
    base_dir: &Path,
    path: &Path,
    resize: bool,
    config: &AttachmentConfig,
) -> anyhow::Result<Attachment> {
    let full_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    let mut bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read attachment {}: {}", full_path.display(), e))?;

    if resize {
        if let Some(smaller) = downscale_image(
            &bytes,
            config.resize_max_width,
            config.resize_max_height,
            config.resize_quality,
        )? {
            debug!(
                "Downscaled {} from {} to {} bytes",
                full_path.display(),
                bytes.len(),
                smaller.len()
            );
            bytes = smaller;
        }
    }

    let file_name = full_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();

    Ok(Attachment::new(file_name, bytes))
}
