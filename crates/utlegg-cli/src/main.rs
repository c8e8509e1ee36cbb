//! CLI application for assembling expense reimbursement reports.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{categories, config, generate, validate};

/// Expense reports - validate bank accounts and build reimbursement PDFs
#[derive(Parser)]
#[command(name = "utlegg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a report PDF from a JSON report file
    Generate(generate::GenerateArgs),

    /// Check IBAN or Norwegian bank account numbers
    Validate(validate::ValidateArgs),

    /// List expense categories
    Categories(categories::CategoriesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate(args) => generate::run(args, cli.config.as_deref()).await,
        Commands::Validate(args) => validate::run(args).await,
        Commands::Categories(args) => categories::run(args).await,
        Commands::Config(args) => config::run(args).await,
    }
}
