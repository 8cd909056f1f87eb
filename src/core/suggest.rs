use serde::Serialize;

use crate::core::models::{Asset, AssetId};
use crate::core::text::{file_label, normalize};
use crate::core::usage::UsageLocator;
use crate::error::Result;
use crate::services::ContentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Normalized title of the first content record using the asset
    pub page_title: String,
    /// Normalized file name without extension
    pub file_label: String,
    /// What the operator sees pre-filled
    pub prefill: String,
}

impl Suggestion {
    pub fn new(page_title: String, file_label: String) -> Self {
        let prefill = if !page_title.is_empty() {
            page_title.clone()
        } else {
            file_label.clone()
        };

        Self {
            page_title,
            file_label,
            prefill,
        }
    }
}

/// Derives label suggestions from current store state. Nothing is cached.
pub struct SuggestionEngine {
    locator: UsageLocator,
}

impl SuggestionEngine {
    pub fn new(locator: UsageLocator) -> Self {
        Self { locator }
    }

    /// Unknown assets get an empty suggestion.
    pub async fn suggest(&self, store: &dyn ContentStore, id: AssetId) -> Result<Suggestion> {
        match store.asset(id).await? {
            Some(asset) => self.suggest_for(store, &asset).await,
            None => Ok(Suggestion::default()),
        }
    }

    pub async fn suggest_for(&self, store: &dyn ContentStore, asset: &Asset) -> Result<Suggestion> {
        let page_title = match self.locator.locate(store, asset).await? {
            Some(content_id) => store
                .content_title(content_id)
                .await?
                .map(|title| normalize(&title))
                .unwrap_or_default(),
            None => String::new(),
        };

        Ok(Suggestion::new(page_title, file_label(&asset.file_path)))
    }
}
