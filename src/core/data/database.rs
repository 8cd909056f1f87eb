//! SQLite-backed content store
//!
//! Two logical tables: `content_items` (pages, posts, attachments) and
//! `item_attributes`, a key/value table keyed by content item id. The ALT
//! text of an asset and the featured-asset reference of a record are both
//! attributes; their keys come from configuration.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::models::{Asset, AssetId, ContentId, UsageFilter};
use crate::error::{DatabaseError, Result};
use crate::services::ContentStore;

const CURRENT_DB_VERSION: u32 = 1;

const ASSET_ITEM_TYPE: &str = "attachment";
const IMAGE_MIME_PATTERN: &str = "image/%";

/// Attribute keys used for labels and featured references
#[derive(Debug, Clone)]
pub struct AttributeKeys {
    pub label: String,
    pub featured: String,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            label: "alt_text".to_string(),
            featured: "featured_asset".to_string(),
        }
    }
}

impl From<&Config> for AttributeKeys {
    fn from(config: &Config) -> Self {
        Self {
            label: config.label_attribute.clone(),
            featured: config.featured_attribute.clone(),
        }
    }
}

/// A content item to insert, used by `init --demo` and tests
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub item_type: String,
    pub status: String,
    pub title: String,
    pub body: String,
    pub mime_type: String,
    pub file_path: Option<String>,
}

impl NewItem {
    pub fn image(file_path: &str) -> Self {
        Self {
            item_type: ASSET_ITEM_TYPE.to_string(),
            status: "inherit".to_string(),
            mime_type: mime_for(file_path).to_string(),
            file_path: Some(file_path.to_string()),
            ..Self::default()
        }
    }

    pub fn page(title: &str, body: &str) -> Self {
        Self {
            item_type: "page".to_string(),
            status: "publish".to_string(),
            title: title.to_string(),
            body: body.to_string(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    #[cfg(test)]
    pub fn with_type(mut self, item_type: &str) -> Self {
        self.item_type = item_type.to_string();
        self
    }
}

fn mime_for(file_path: &str) -> &'static str {
    match Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub content_items: i64,
    pub image_assets: i64,
    pub labelled_assets: i64,
}

pub struct Database {
    conn: Mutex<Connection>,
    keys: AttributeKeys,
}

impl Database {
    pub async fn new(db_path: &Path, keys: AttributeKeys) -> Result<Self> {
        info!("Opening content database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(DatabaseError::Connection)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::from_connection(conn, keys)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::Connection)?;
        Self::from_connection(conn, AttributeKeys::default())
    }

    fn from_connection(mut conn: Connection, keys: AttributeKeys) -> Result<Self> {
        let existing_user_version: u32 =
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if existing_user_version < CURRENT_DB_VERSION {
            Self::upgrade_database(&mut conn, existing_user_version)?;
        }

        Ok(Database {
            conn: Mutex::new(conn),
            keys,
        })
    }

    fn upgrade_database(conn: &mut Connection, existing_version: u32) -> Result<()> {
        debug!("Upgrading database from version {} to {}", existing_version, CURRENT_DB_VERSION);

        if existing_version == 0 {
            let tx = conn.transaction()?;

            tx.pragma_update(None, "user_version", CURRENT_DB_VERSION)?;

            tx.execute_batch(r#"
                CREATE TABLE IF NOT EXISTS content_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    item_type TEXT NOT NULL DEFAULT 'post',
                    status TEXT NOT NULL DEFAULT 'publish',
                    title TEXT NOT NULL DEFAULT '',
                    body TEXT NOT NULL DEFAULT '',
                    mime_type TEXT NOT NULL DEFAULT '',
                    file_path TEXT
                );

                CREATE TABLE IF NOT EXISTS item_attributes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    item_id INTEGER NOT NULL,
                    attr_key TEXT NOT NULL,
                    attr_value TEXT,
                    UNIQUE (item_id, attr_key)
                );

                CREATE INDEX IF NOT EXISTS idx_items_type_mime ON content_items(item_type, mime_type);
                CREATE INDEX IF NOT EXISTS idx_items_type_status ON content_items(item_type, status);
                CREATE INDEX IF NOT EXISTS idx_attributes_key_value ON item_attributes(attr_key, attr_value);
            "#).map_err(|e| DatabaseError::Migration(e.to_string()))?;

            tx.commit()?;
        }

        info!("Database schema is at version {}", CURRENT_DB_VERSION);
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned.into())
    }

    pub fn insert_item(&self, item: &NewItem) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO content_items (item_type, status, title, body, mime_type, file_path)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.item_type,
                item.status,
                item.title,
                item.body,
                item.mime_type,
                item.file_path,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_attribute(&self, item_id: i64, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            r#"
            INSERT INTO item_attributes (item_id, attr_key, attr_value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (item_id, attr_key) DO UPDATE SET attr_value = excluded.attr_value
            "#,
            params![item_id, key, value],
        )?;
        Ok(())
    }

    pub fn set_featured(&self, content_id: i64, asset_id: i64) -> Result<()> {
        self.set_attribute(content_id, &self.keys.featured, &asset_id.to_string())
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        let conn = self.conn()?;
        let summary = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM content_items),
                (SELECT COUNT(*) FROM content_items WHERE item_type = ?1 AND mime_type LIKE ?2),
                (SELECT COUNT(*) FROM content_items c
                    JOIN item_attributes a ON a.item_id = c.id AND a.attr_key = ?3
                    WHERE c.item_type = ?1 AND c.mime_type LIKE ?2 AND TRIM(a.attr_value) <> '')
            "#,
            params![ASSET_ITEM_TYPE, IMAGE_MIME_PATTERN, self.keys.label],
            |row| {
                Ok(StoreSummary {
                    content_items: row.get(0)?,
                    image_assets: row.get(1)?,
                    labelled_assets: row.get(2)?,
                })
            },
        )?;
        Ok(summary)
    }
}

/// `NOT IN (...)`/`IN (...)` clauses for a usage filter, with their
/// parameters appended to `values`.
fn filter_clause(filter: &UsageFilter, values: &mut Vec<String>) -> String {
    let mut clause = String::new();

    if !filter.excluded_types.is_empty() {
        let marks = vec!["?"; filter.excluded_types.len()].join(", ");
        clause.push_str(&format!(" AND c.item_type NOT IN ({})", marks));
        values.extend(filter.excluded_types.iter().cloned());
    }

    // An empty status list matches nothing rather than everything
    let marks = vec!["?"; filter.allowed_statuses.len().max(1)].join(", ");
    clause.push_str(&format!(" AND c.status IN ({})", marks));
    if filter.allowed_statuses.is_empty() {
        values.push(String::new());
    } else {
        values.extend(filter.allowed_statuses.iter().cloned());
    }

    clause
}

#[async_trait::async_trait]
impl ContentStore for Database {
    async fn count_missing_labels(&self) -> Result<u64> {
        let count: i64 = self.conn()?.query_row(
            r#"
            SELECT COUNT(*) FROM content_items c
            LEFT JOIN item_attributes a ON a.item_id = c.id AND a.attr_key = ?1
            WHERE c.item_type = ?2 AND c.mime_type LIKE ?3
              AND (a.attr_value IS NULL OR TRIM(a.attr_value) = '')
            "#,
            params![self.keys.label, ASSET_ITEM_TYPE, IMAGE_MIME_PATTERN],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    async fn list_missing_labels(&self, limit: usize) -> Result<Vec<AssetId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id FROM content_items c
            LEFT JOIN item_attributes a ON a.item_id = c.id AND a.attr_key = ?1
            WHERE c.item_type = ?2 AND c.mime_type LIKE ?3
              AND (a.attr_value IS NULL OR TRIM(a.attr_value) = '')
            ORDER BY c.id ASC
            LIMIT ?4
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let ids = stmt
            .query_map(params![self.keys.label, ASSET_ITEM_TYPE, IMAGE_MIME_PATTERN, limit], |row| {
                row.get::<_, i64>(0).map(AssetId)
            })?
            .collect::<std::result::Result<Vec<AssetId>, _>>()?;

        Ok(ids)
    }

    async fn asset(&self, id: AssetId) -> Result<Option<Asset>> {
        let asset = self
            .conn()?
            .query_row(
                r#"
                SELECT c.id, COALESCE(c.file_path, ''), c.mime_type, a.attr_value
                FROM content_items c
                LEFT JOIN item_attributes a ON a.item_id = c.id AND a.attr_key = ?2
                WHERE c.id = ?1 AND c.item_type = ?3
                "#,
                params![id.0, self.keys.label, ASSET_ITEM_TYPE],
                |row| {
                    Ok(Asset {
                        id: AssetId(row.get(0)?),
                        file_path: row.get(1)?,
                        mime_type: row.get(2)?,
                        label: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(asset)
    }

    async fn label(&self, id: AssetId) -> Result<Option<String>> {
        let label = self
            .conn()?
            .query_row(
                "SELECT attr_value FROM item_attributes WHERE item_id = ?1 AND attr_key = ?2",
                params![id.0, self.keys.label],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        Ok(label)
    }

    async fn write_label(&self, id: AssetId, label: &str) -> Result<()> {
        self.set_attribute(id.0, &self.keys.label, label)
    }

    async fn find_featured_reference(&self, asset: AssetId, filter: &UsageFilter) -> Result<Option<ContentId>> {
        let mut values = vec![self.keys.featured.clone(), asset.0.to_string()];
        let sql = format!(
            r#"
            SELECT c.id FROM content_items c
            JOIN item_attributes a ON a.item_id = c.id
            WHERE a.attr_key = ? AND a.attr_value = ?{}
            ORDER BY c.id ASC
            LIMIT 1
            "#,
            filter_clause(filter, &mut values)
        );

        let id = self
            .conn()?
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(id.map(ContentId))
    }

    async fn find_body_containing(&self, needle: &str, filter: &UsageFilter) -> Result<Option<ContentId>> {
        if needle.is_empty() {
            return Ok(None);
        }

        // instr() keeps the match literal; LIKE would treat % and _ as wildcards
        let mut values = vec![needle.to_string()];
        let sql = format!(
            r#"
            SELECT c.id FROM content_items c
            WHERE instr(c.body, ?) > 0{}
            ORDER BY c.id ASC
            LIMIT 1
            "#,
            filter_clause(filter, &mut values)
        );

        let id = self
            .conn()?
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(id.map(ContentId))
    }

    async fn content_title(&self, id: ContentId) -> Result<Option<String>> {
        let title = self
            .conn()?
            .query_row(
                "SELECT title FROM content_items WHERE id = ?1",
                params![id.0],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_image(db: &Database, path: &str, label: Option<&str>) -> AssetId {
        let id = db.insert_item(&NewItem::image(path)).unwrap();
        if let Some(label) = label {
            db.set_attribute(id, "alt_text", label).unwrap();
        }
        AssetId(id)
    }

    #[tokio::test]
    async fn test_listing_is_bounded_ascending_and_unlabelled() {
        let db = Database::open_in_memory().unwrap();
        let a = seed_image(&db, "a.jpg", None);
        let _b = seed_image(&db, "b.jpg", Some("Labelled"));
        let c = seed_image(&db, "c.png", Some(""));
        let d = seed_image(&db, "d.gif", Some("   "));
        let e = seed_image(&db, "e.webp", None);
        db.insert_item(&NewItem::image("manual.pdf")).unwrap();
        db.insert_item(&NewItem::page("Home", "")).unwrap();

        assert_eq!(db.count_missing_labels().await.unwrap(), 4);
        assert_eq!(db.list_missing_labels(10).await.unwrap(), vec![a, c, d, e]);
        assert_eq!(db.list_missing_labels(2).await.unwrap(), vec![a, c]);
        assert!(db.list_missing_labels(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_label_upserts() {
        let db = Database::open_in_memory().unwrap();
        let id = seed_image(&db, "a.jpg", None);

        assert_eq!(db.label(id).await.unwrap(), None);
        db.write_label(id, "First").await.unwrap();
        db.write_label(id, "Second").await.unwrap();
        assert_eq!(db.label(id).await.unwrap(), Some("Second".to_string()));

        let asset = db.asset(id).await.unwrap().unwrap();
        assert_eq!(asset.file_path, "a.jpg");
        assert_eq!(asset.mime_type, "image/jpeg");
        assert_eq!(asset.label.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_asset_lookup_ignores_non_attachments() {
        let db = Database::open_in_memory().unwrap();
        let page = db.insert_item(&NewItem::page("Home", "")).unwrap();
        assert!(db.asset(AssetId(page)).await.unwrap().is_none());
        assert!(db.asset(AssetId(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_featured_lookup_applies_filter_and_lowest_id() {
        let db = Database::open_in_memory().unwrap();
        let asset = seed_image(&db, "hero.jpg", None);
        let trashed = db.insert_item(&NewItem::page("Old", "").with_status("trash")).unwrap();
        let revision = db.insert_item(&NewItem::page("Rev", "").with_type("revision")).unwrap();
        let first = db.insert_item(&NewItem::page("First", "").with_status("draft")).unwrap();
        let second = db.insert_item(&NewItem::page("Second", "")).unwrap();
        for id in [trashed, revision, second, first] {
            db.set_featured(id, asset.0).unwrap();
        }

        let found = db.find_featured_reference(asset, &UsageFilter::default()).await.unwrap();
        assert_eq!(found, Some(ContentId(first)));
    }

    #[tokio::test]
    async fn test_body_search_is_literal() {
        let db = Database::open_in_memory().unwrap();
        db.insert_item(&NewItem::page("Wildcard", "100% off_sale")).unwrap();
        let literal = db.insert_item(&NewItem::page("Literal", "see /uploads/a_b.jpg")).unwrap();

        let filter = UsageFilter::default();
        assert_eq!(db.find_body_containing("a_b.jpg", &filter).await.unwrap(), Some(ContentId(literal)));
        assert_eq!(db.find_body_containing("%", &filter).await.unwrap().map(|c| c.0), Some(1));
        assert_eq!(db.find_body_containing("nothing here", &filter).await.unwrap(), None);
        assert_eq!(db.find_body_containing("", &filter).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reopen_keeps_schema_version() {
        let dir = std::env::temp_dir().join(format!("altfill-db-test-{}", std::process::id()));
        let path = dir.join("reopen.db");
        let _ = std::fs::remove_file(&path);

        let first = Database::new(&path, AttributeKeys::default()).await.unwrap();
        let id = AssetId(first.insert_item(&NewItem::image("kept.jpg")).unwrap());
        first.write_label(id, "Kept").await.unwrap();
        drop(first);

        // A second open must not re-run the migration over existing data.
        let second = Database::new(&path, AttributeKeys::default()).await.unwrap();
        let version: u32 = second
            .conn()
            .unwrap()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_DB_VERSION);
        assert_eq!(second.label(id).await.unwrap().as_deref(), Some("Kept"));
        assert_eq!(second.summary().unwrap().image_assets, 1);

        drop(second);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_summary_counts() {
        let db = Database::open_in_memory().unwrap();
        seed_image(&db, "a.jpg", Some("A"));
        seed_image(&db, "b.jpg", None);
        db.insert_item(&NewItem::page("Home", "")).unwrap();

        let summary = db.summary().unwrap();
        assert_eq!(summary.content_items, 3);
        assert_eq!(summary.image_assets, 2);
        assert_eq!(summary.labelled_assets, 1);
    }
}
