use clap::{Args, ValueEnum};
use tracing::info;

use crate::config::{ConfigValidator, DEFAULT_LIMIT_MAX, DEFAULT_LIMIT_MIN};
use crate::core::listing::{review_page, ReviewPage};
use crate::error::Result;
use crate::services::SimpleServices;
use crate::utils::progress::{ProgressMessages, ProgressUtils};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
pub struct ListArgs {
    /// Maximum number of assets to show (defaults to `default_limit`)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn execute(args: ListArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let limit = args.limit.unwrap_or(config.default_limit);
    ConfigValidator::validate_range(limit, DEFAULT_LIMIT_MIN, DEFAULT_LIMIT_MAX, "limit")?;

    let db = services.create_database().await?;
    let engine = services.create_suggestion_engine()?;

    let pb = ProgressUtils::create_query_spinner();
    pb.set_message(ProgressMessages::COLLECTING);
    let page = review_page(&db, &engine, limit).await?;
    pb.finish_and_clear();

    info!("{} of {} unlabelled assets listed", page.rows.len(), page.total_missing);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Table => print_table(&page),
    }

    Ok(())
}

fn print_table(page: &ReviewPage) {
    println!("🖼️  Assets missing ALT text: {}", page.total_missing);

    if page.rows.is_empty() {
        println!("  ✅ Nothing to do");
        return;
    }

    println!(
        "\n  {:>6}  {:<32}  {:<24}  {:<24}  {}",
        "ID", "FILE", "PAGE TITLE", "FILE LABEL", "PREFILL"
    );
    for row in &page.rows {
        println!(
            "  {:>6}  {:<32}  {:<24}  {:<24}  {}",
            row.asset_id.0,
            truncate(&row.file_path, 32),
            truncate(&row.suggestion.page_title, 24),
            truncate(&row.suggestion.file_label, 24),
            row.suggestion.prefill
        );
    }

    if (page.rows.len() as u64) < page.total_missing {
        println!("\n  … {} more not shown", page.total_missing - page.rows.len() as u64);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
