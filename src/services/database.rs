use crate::core::models::{Asset, AssetId, ContentId, UsageFilter};
use crate::error::Result;

/// Read/write access to the content store.
///
/// Every component takes a `&dyn ContentStore` explicitly. Lookups that can
/// match several content records always return the lowest identifier.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Number of image assets whose label is absent or empty
    async fn count_missing_labels(&self) -> Result<u64>;

    /// Up to `limit` unlabelled image asset ids, ascending
    async fn list_missing_labels(&self, limit: usize) -> Result<Vec<AssetId>>;

    async fn asset(&self, id: AssetId) -> Result<Option<Asset>>;

    /// Current stored label, read straight from the store
    async fn label(&self, id: AssetId) -> Result<Option<String>>;

    /// Insert or replace the label attribute of an asset
    async fn write_label(&self, id: AssetId, label: &str) -> Result<()>;

    async fn find_featured_reference(&self, asset: AssetId, filter: &UsageFilter) -> Result<Option<ContentId>>;

    /// First content record whose body contains `needle` literally
    async fn find_body_containing(&self, needle: &str, filter: &UsageFilter) -> Result<Option<ContentId>>;

    async fn content_title(&self, id: ContentId) -> Result<Option<String>>;
}
