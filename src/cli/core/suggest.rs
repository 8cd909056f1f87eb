use clap::Args;

use crate::core::models::AssetId;
use crate::error::{AltFillError, Result};
use crate::services::{ContentStore, SimpleServices};

#[derive(Args)]
pub struct SuggestArgs {
    /// Asset id to suggest a label for
    #[arg(value_name = "ASSET_ID")]
    asset_id: i64,

    /// Print the suggestion as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: SuggestArgs, services: &SimpleServices) -> Result<()> {
    let db = services.create_database().await?;
    let engine = services.create_suggestion_engine()?;
    let id = AssetId(args.asset_id);

    let asset = db
        .asset(id)
        .await?
        .ok_or_else(|| AltFillError::Validation(format!("No image asset with id {}", id)))?;
    let suggestion = engine.suggest(&db, id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
        return Ok(());
    }

    println!("🖼️  Asset #{}: {}", id, asset.file_path);
    if asset.has_label() {
        println!("  🏷️  Current ALT text: {}", asset.label.as_deref().unwrap_or_default());
    } else {
        println!("  🏷️  Current ALT text: (none)");
    }
    println!("  📄 Page title: {}", or_dash(&suggestion.page_title));
    println!("  📁 File label: {}", or_dash(&suggestion.file_label));
    println!("  ✏️  Prefill:    {}", or_dash(&suggestion.prefill));

    Ok(())
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
