//! Categories command - list the expense category taxonomy.

use clap::Args;
use console::style;
use serde::Serialize;

use utlegg_core::models::{groups, ExpenseCategory};

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// Only list categories in this group
    #[arg(short, long)]
    group: Option<String>,

    /// Print categories as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CategoryRow {
    code: u16,
    name: &'static str,
    group: &'static str,
}

pub async fn run(args: CategoriesArgs) -> anyhow::Result<()> {
    let selected: Vec<&'static str> = match &args.group {
        Some(group) => {
            let found = groups()
                .into_iter()
                .find(|g| g.eq_ignore_ascii_case(group))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown category group: {} (available: {})",
                        group,
                        groups().join(", ")
                    )
                })?;
            vec![found]
        }
        None => groups(),
    };

    if args.json {
        let rows: Vec<CategoryRow> = selected
            .iter()
            .flat_map(|g| ExpenseCategory::in_group(*g))
            .map(|c| CategoryRow {
                code: c.code(),
                name: c.item().name,
                group: c.group(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for group in selected {
        println!("{}", style(group).bold());
        for category in ExpenseCategory::in_group(group) {
            println!("  {}", category.full_name());
        }
    }

    Ok(())
}
