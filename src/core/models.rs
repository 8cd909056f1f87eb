//! Domain types shared by the store and the labelling pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a media asset (a content item of type `attachment`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub i64);

/// Identifier of a page/post-like content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub i64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: AssetId,
    /// Source file path relative to the uploads root
    pub file_path: String,
    pub mime_type: String,
    pub label: Option<String>,
}

impl Asset {
    pub fn has_label(&self) -> bool {
        self.label.as_deref().is_some_and(|l| !l.trim().is_empty())
    }
}

/// Restricts which content records count as a usage of an asset.
#[derive(Debug, Clone)]
pub struct UsageFilter {
    pub excluded_types: Vec<String>,
    pub allowed_statuses: Vec<String>,
}

impl Default for UsageFilter {
    fn default() -> Self {
        Self {
            excluded_types: ["revision", "attachment", "nav_menu_item"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_statuses: ["publish", "private", "draft", "pending", "future"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
