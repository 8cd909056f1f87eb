use clap::Args;
use tracing::info;

use crate::cli::operations::apply::{print_summary, run_batch};
use crate::config::{ConfigValidator, DEFAULT_LIMIT_MAX, DEFAULT_LIMIT_MIN};
use crate::core::batch::BatchEntry;
use crate::core::listing::{review_page, ReviewPage};
use crate::error::Result;
use crate::services::SimpleServices;
use crate::utils::progress::{ProgressMessages, ProgressUtils};

#[derive(Args)]
pub struct AutofillArgs {
    /// Maximum number of assets to label (defaults to `default_limit`)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Show what would be written without writing it
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(args: AutofillArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let limit = args.limit.unwrap_or(config.default_limit);
    ConfigValidator::validate_range(limit, DEFAULT_LIMIT_MIN, DEFAULT_LIMIT_MAX, "limit")?;

    let db = services.create_database().await?;
    let engine = services.create_suggestion_engine()?;

    let pb = ProgressUtils::create_query_spinner();
    pb.set_message(ProgressMessages::COLLECTING);
    let page = review_page(&db, &engine, limit).await?;
    pb.finish_and_clear();

    let entries = accept_prefills(&page);
    info!(
        "Accepting {} suggestions ({} rows without a suggestion)",
        entries.len(),
        page.rows.len() - entries.len()
    );

    if entries.is_empty() {
        println!("✅ No suggestions to accept");
        return Ok(());
    }

    if args.dry_run {
        for entry in &entries {
            println!("  #{} → {}", entry.asset_id, entry.label);
        }
    }

    let report = run_batch(&db, &entries, args.dry_run).await?;
    print_summary(&report);

    Ok(())
}

/// A `save` entry for every row that has a non-empty prefill.
fn accept_prefills(page: &ReviewPage) -> Vec<BatchEntry> {
    page.rows
        .iter()
        .filter(|row| !row.suggestion.prefill.is_empty())
        .map(|row| BatchEntry::save(row.asset_id, row.suggestion.prefill.clone()))
        .collect()
}
