use serde::Serialize;

use crate::core::models::AssetId;
use crate::core::suggest::{Suggestion, SuggestionEngine};
use crate::error::Result;
use crate::services::ContentStore;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
    pub asset_id: AssetId,
    pub file_path: String,
    pub suggestion: Suggestion,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    /// All unlabelled assets, not just the ones on this page
    pub total_missing: u64,
    pub rows: Vec<ReviewRow>,
}

pub async fn count_missing(store: &dyn ContentStore) -> Result<u64> {
    store.count_missing_labels().await
}

/// Unlabelled image assets, ascending by id, at most `limit` of them.
pub async fn list_missing(store: &dyn ContentStore, limit: usize) -> Result<Vec<AssetId>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    store.list_missing_labels(limit).await
}

/// The listing joined with a fresh suggestion for every row.
pub async fn review_page(
    store: &dyn ContentStore,
    engine: &SuggestionEngine,
    limit: usize,
) -> Result<ReviewPage> {
    let total_missing = count_missing(store).await?;
    let mut rows = Vec::new();

    for asset_id in list_missing(store, limit).await? {
        // Rows can vanish between the listing query and this lookup
        let Some(asset) = store.asset(asset_id).await? else {
            continue;
        };
        let suggestion = engine.suggest_for(store, &asset).await?;
        rows.push(ReviewRow {
            asset_id,
            file_path: asset.file_path,
            suggestion,
        });
    }

    Ok(ReviewPage { total_missing, rows })
}
