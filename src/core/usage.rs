//! First-usage lookup for an asset
//!
//! Strategies run in a fixed order and the first hit wins: structural
//! references (featured asset, embed marker) before a raw URL-path match,
//! which can false-positive on shared path prefixes.

use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::core::models::{Asset, ContentId, UsageFilter};
use crate::error::{AltFillError, Result};
use crate::services::ContentStore;

#[async_trait::async_trait]
pub trait UsageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find(
        &self,
        store: &dyn ContentStore,
        asset: &Asset,
        filter: &UsageFilter,
    ) -> Result<Option<ContentId>>;
}

/// Content record whose featured-asset attribute points at the asset
pub struct FeaturedReference;

#[async_trait::async_trait]
impl UsageStrategy for FeaturedReference {
    fn name(&self) -> &'static str {
        "featured"
    }

    async fn find(
        &self,
        store: &dyn ContentStore,
        asset: &Asset,
        filter: &UsageFilter,
    ) -> Result<Option<ContentId>> {
        store.find_featured_reference(asset.id, filter).await
    }
}

/// Content record whose body carries `<prefix><asset id>`
pub struct EmbeddedMarker {
    prefix: String,
}

impl EmbeddedMarker {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn marker(&self, asset: &Asset) -> String {
        format!("{}{}", self.prefix, asset.id)
    }
}

#[async_trait::async_trait]
impl UsageStrategy for EmbeddedMarker {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn find(
        &self,
        store: &dyn ContentStore,
        asset: &Asset,
        filter: &UsageFilter,
    ) -> Result<Option<ContentId>> {
        store.find_body_containing(&self.marker(asset), filter).await
    }
}

/// Builds public URLs for uploaded files
#[derive(Debug, Clone)]
pub struct AssetUrlResolver {
    site_url: Url,
    uploads_path: String,
}

impl AssetUrlResolver {
    pub fn new(site_url: &str, uploads_path: &str) -> Result<Self> {
        let site_url = Url::parse(site_url).map_err(|e| {
            AltFillError::Validation(format!("Invalid site URL '{}': {}", site_url, e))
        })?;

        Ok(Self {
            site_url,
            uploads_path: uploads_path.trim_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, file_path: &str) -> Option<Url> {
        let file_path = file_path.trim_start_matches('/');
        if file_path.is_empty() {
            return None;
        }

        let base = self.site_url.as_str().trim_end_matches('/');
        let joined = if self.uploads_path.is_empty() {
            format!("{}/{}", base, file_path)
        } else {
            format!("{}/{}/{}", base, self.uploads_path, file_path)
        };

        Url::parse(&joined).ok()
    }

    /// Path component of the asset's public URL as it would appear
    /// unencoded in a body, e.g. `/uploads/2024/06/café photo.jpg`.
    pub fn public_path(&self, file_path: &str) -> Option<String> {
        let file_path = file_path.trim_start_matches('/');
        if file_path.is_empty() {
            return None;
        }

        let base = self.site_url.path().trim_end_matches('/');
        Some(if self.uploads_path.is_empty() {
            format!("{}/{}", base, file_path)
        } else {
            format!("{}/{}/{}", base, self.uploads_path, file_path)
        })
    }

    /// Percent-encoded form of `public_path`
    pub fn encoded_path(&self, file_path: &str) -> Option<String> {
        self.public_url(file_path).map(|url| url.path().to_string())
    }
}

/// Content record whose body contains the path of the asset's public URL
pub struct UrlPath {
    resolver: AssetUrlResolver,
}

impl UrlPath {
    pub fn new(resolver: AssetUrlResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait::async_trait]
impl UsageStrategy for UrlPath {
    fn name(&self) -> &'static str {
        "url-path"
    }

    async fn find(
        &self,
        store: &dyn ContentStore,
        asset: &Asset,
        filter: &UsageFilter,
    ) -> Result<Option<ContentId>> {
        let Some(path) = self.resolver.public_path(&asset.file_path) else {
            return Ok(None);
        };
        if let Some(found) = store.find_body_containing(&path, filter).await? {
            return Ok(Some(found));
        }

        match self.resolver.encoded_path(&asset.file_path) {
            Some(encoded) if encoded != path => store.find_body_containing(&encoded, filter).await,
            _ => Ok(None),
        }
    }
}

pub struct UsageLocator {
    strategies: Vec<Box<dyn UsageStrategy>>,
    filter: UsageFilter,
}

impl UsageLocator {
    pub fn new(strategies: Vec<Box<dyn UsageStrategy>>, filter: UsageFilter) -> Self {
        Self { strategies, filter }
    }

    /// Featured reference, then embed marker, then URL path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = AssetUrlResolver::new(&config.site_url, &config.uploads_path)?;

        Ok(Self::new(
            vec![
                Box::new(FeaturedReference),
                Box::new(EmbeddedMarker::new(config.embed_marker_prefix.clone())),
                Box::new(UrlPath::new(resolver)),
            ],
            UsageFilter::default(),
        ))
    }

    pub async fn locate(&self, store: &dyn ContentStore, asset: &Asset) -> Result<Option<ContentId>> {
        for strategy in &self.strategies {
            if let Some(content_id) = strategy.find(store, asset, &self.filter).await? {
                debug!("Asset #{} first used by #{} ({})", asset.id, content_id, strategy.name());
                return Ok(Some(content_id));
            }
        }

        debug!("No usage found for asset #{}", asset.id);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::{Database, NewItem};
    use crate::core::models::AssetId;

    fn test_config() -> Config {
        Config {
            site_url: "https://example.com".to_string(),
            uploads_path: "/uploads".to_string(),
            ..Config::default()
        }
    }

    async fn load_asset(db: &Database, id: i64) -> Asset {
        db.asset(AssetId(id)).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_featured_beats_embedded_even_with_higher_id() {
        let db = Database::open_in_memory().unwrap();
        let asset = db.insert_item(&NewItem::image("2024/06/hero.jpg")).unwrap();
        assert_eq!(asset, 1);
        db.insert_item(&NewItem::page("Two", "")).unwrap();
        let embedded = db
            .insert_item(&NewItem::page("Three", r#"<img class="wp-image-1" src="x.jpg">"#))
            .unwrap();
        db.insert_item(&NewItem::page("Four", "")).unwrap();
        let featured = db.insert_item(&NewItem::page("Five", "")).unwrap();
        db.set_featured(featured, asset).unwrap();
        assert_eq!((embedded, featured), (3, 5));

        let locator = UsageLocator::from_config(&test_config()).unwrap();
        let found = locator.locate(&db, &load_asset(&db, asset).await).await.unwrap();
        assert_eq!(found, Some(ContentId(5)));
    }

    #[tokio::test]
    async fn test_embedded_beats_url_path() {
        let db = Database::open_in_memory().unwrap();
        let asset = db.insert_item(&NewItem::image("2024/06/hero.jpg")).unwrap();
        let by_path = db
            .insert_item(&NewItem::page("Path", r#"<img src="https://example.com/uploads/2024/06/hero.jpg">"#))
            .unwrap();
        let by_marker = db
            .insert_item(&NewItem::page("Marker", &format!("<img class=\"wp-image-{}\">", asset)))
            .unwrap();
        assert!(by_path < by_marker);

        let locator = UsageLocator::from_config(&test_config()).unwrap();
        let found = locator.locate(&db, &load_asset(&db, asset).await).await.unwrap();
        assert_eq!(found, Some(ContentId(by_marker)));
    }

    #[tokio::test]
    async fn test_url_path_fallback_and_filter() {
        let db = Database::open_in_memory().unwrap();
        let asset = db.insert_item(&NewItem::image("2024/06/hero.jpg")).unwrap();
        db.insert_item(&NewItem::page("Trashed", "/uploads/2024/06/hero.jpg").with_status("trash"))
            .unwrap();
        db.insert_item(&NewItem::page("Menu", "/uploads/2024/06/hero.jpg").with_type("nav_menu_item"))
            .unwrap();
        let pending = db
            .insert_item(&NewItem::page("Pending", "see /uploads/2024/06/hero.jpg").with_status("pending"))
            .unwrap();

        let locator = UsageLocator::from_config(&test_config()).unwrap();
        let found = locator.locate(&db, &load_asset(&db, asset).await).await.unwrap();
        assert_eq!(found, Some(ContentId(pending)));
    }

    #[tokio::test]
    async fn test_not_found() {
        let db = Database::open_in_memory().unwrap();
        let asset = db.insert_item(&NewItem::image("lonely.png")).unwrap();
        db.insert_item(&NewItem::page("Unrelated", "nothing to see")).unwrap();

        let locator = UsageLocator::from_config(&test_config()).unwrap();
        let found = locator.locate(&db, &load_asset(&db, asset).await).await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_url_path_matches_unencoded_and_encoded_bodies() {
        let db = Database::open_in_memory().unwrap();
        let raw = db.insert_item(&NewItem::image("2024/06/café photo.jpg")).unwrap();
        let raw_page = db
            .insert_item(&NewItem::page("Raw", r#"<img src="https://example.com/uploads/2024/06/café photo.jpg">"#))
            .unwrap();
        let encoded = db.insert_item(&NewItem::image("2024/06/new logo.png")).unwrap();
        let encoded_page = db
            .insert_item(&NewItem::page("Encoded", r#"<img src="/uploads/2024/06/new%20logo.png">"#))
            .unwrap();

        let locator = UsageLocator::from_config(&test_config()).unwrap();
        let found = locator.locate(&db, &load_asset(&db, raw).await).await.unwrap();
        assert_eq!(found, Some(ContentId(raw_page)));
        let found = locator.locate(&db, &load_asset(&db, encoded).await).await.unwrap();
        assert_eq!(found, Some(ContentId(encoded_page)));
    }

    #[test]
    fn test_public_path() {
        let resolver = AssetUrlResolver::new("https://example.com/blog/", "/uploads/").unwrap();
        assert_eq!(
            resolver.public_path("2024/06/img_042.jpg").as_deref(),
            Some("/blog/uploads/2024/06/img_042.jpg")
        );
        assert_eq!(resolver.public_path(""), None);

        let bare = AssetUrlResolver::new("https://cdn.example.com", "").unwrap();
        assert_eq!(bare.public_path("/a.png").as_deref(), Some("/a.png"));

        let site = AssetUrlResolver::new("https://example.com", "uploads").unwrap();
        assert_eq!(
            site.public_path("2024/06/café photo.jpg").as_deref(),
            Some("/uploads/2024/06/café photo.jpg")
        );
        assert_eq!(
            site.encoded_path("2024/06/café photo.jpg").as_deref(),
            Some("/uploads/2024/06/caf%C3%A9%20photo.jpg")
        );
    }

    #[test]
    fn test_marker_format() {
        let asset = Asset {
            id: AssetId(42),
            file_path: String::new(),
            mime_type: "image/png".to_string(),
            label: None,
        };
        assert_eq!(EmbeddedMarker::new("wp-image-").marker(&asset), "wp-image-42");
    }
}
