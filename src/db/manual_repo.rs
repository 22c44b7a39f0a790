use chrono::{DateTime, Utc};
use neomanual_core::model::{
    Block, BlockBase, ImageBlock, LayoutError, ManualLayout, Page, TextBlock,
};
use neomanual_core::sync;
use serde::Serialize;
use sqlx::SqlitePool;

use super::now_timestamp;

/// Title stored for manuals saved without one.
pub const DEFAULT_MANUAL_TITLE: &str = "My Manual Title";

#[derive(Debug)]
pub enum RepoError {
    Database(sqlx::Error),
    InvalidLayout(LayoutError),
    /// The manual id is already stored for another user.
    NotOwner(String),
    /// A page or block id is already stored under another manual.
    IdConflict(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Database(e) => write!(f, "Database error: {}", e),
            RepoError::InvalidLayout(e) => write!(f, "Invalid layout: {}", e),
            RepoError::NotOwner(id) => write!(f, "Manual {} belongs to another user", id),
            RepoError::IdConflict(id) => {
                write!(f, "Id {} is already used by another manual", id)
            }
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::Database(e) => Some(e),
            RepoError::InvalidLayout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::Database(e)
    }
}

impl From<LayoutError> for RepoError {
    fn from(e: LayoutError) -> Self {
        RepoError::InvalidLayout(e)
    }
}

/// A stored manual without its pages.
#[derive(Debug, Clone, Serialize)]
pub struct ManualSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct ManualRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ManualRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id: String,
    background_color: Option<String>,
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: String,
    kind: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    z_index: Option<i32>,
    content: Option<String>,
    font_size: Option<f64>,
    font_family: Option<String>,
    font_weight: Option<String>,
    color: Option<String>,
    italic: Option<bool>,
    rotation: Option<f64>,
    src: Option<String>,
    alt_text: Option<String>,
    opacity: Option<f64>,
    label: Option<String>,
}

impl BlockRow {
    /// Rebuilds the block, or `None` for a type this build does not know.
    fn into_block(self) -> Option<Block> {
        let base = BlockBase {
            id: self.id,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            z_index: self.z_index,
        };
        match self.kind.as_str() {
            "text" => Some(Block::Text(TextBlock {
                base,
                content: self.content.unwrap_or_default(),
                font_size: self.font_size.unwrap_or(14.0),
                font_family: self.font_family,
                font_weight: self.font_weight.and_then(|w| w.parse().ok()),
                color: self.color,
                italic: self.italic,
                rotation: self.rotation,
            })),
            "image" => Some(Block::Image(ImageBlock {
                base,
                src: self.src.unwrap_or_default(),
                alt_text: self.alt_text,
                opacity: self.opacity,
                label: self.label,
            })),
            other => {
                tracing::warn!(block_id = %base.id, kind = other, "Skipping block of unknown type");
                None
            }
        }
    }
}

/// Per-variant column values; the other variant's columns stay NULL.
#[derive(Default)]
struct BlockColumns<'a> {
    content: Option<&'a str>,
    font_size: Option<f64>,
    font_family: Option<&'a str>,
    font_weight: Option<&'static str>,
    color: Option<&'a str>,
    italic: Option<bool>,
    rotation: Option<f64>,
    src: Option<&'a str>,
    alt_text: Option<&'a str>,
    opacity: Option<f64>,
    label: Option<&'a str>,
}

impl<'a> From<&'a Block> for BlockColumns<'a> {
    fn from(block: &'a Block) -> Self {
        match block {
            Block::Text(text) => Self {
                content: Some(text.content.as_str()),
                font_size: Some(text.font_size),
                font_family: text.font_family.as_deref(),
                font_weight: Some(text.font_weight.unwrap_or_default().as_str()),
                color: text.color.as_deref(),
                italic: text.italic,
                rotation: text.rotation,
                ..Default::default()
            },
            Block::Image(image) => Self {
                src: Some(image.src.as_str()),
                alt_text: image.alt_text.as_deref(),
                opacity: Some(image.opacity.unwrap_or(1.0)),
                label: image.label.as_deref(),
                ..Default::default()
            },
        }
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl ManualRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upserts the manual, its pages and blocks, then deletes the blocks and
    /// pages the layout no longer holds. Returns the manual id.
    ///
    /// Everything runs in one transaction. Saving the same layout twice
    /// leaves the same rows behind.
    pub async fn save_manual_with_pages(
        &self,
        user_id: &str,
        layout: &ManualLayout,
    ) -> Result<String, RepoError> {
        layout.validate()?;

        let mut tx = self.pool.begin().await?;
        let now = now_timestamp();
        let title = layout.display_title().unwrap_or(DEFAULT_MANUAL_TITLE);

        let result = sqlx::query(
            r#"
            INSERT INTO manuals (id, user_id, title, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title, updated_at = excluded.updated_at
            WHERE manuals.user_id = excluded.user_id
            "#,
        )
        .bind(&layout.id)
        .bind(user_id)
        .bind(title)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotOwner(layout.id.clone()));
        }

        for (order, page) in layout.pages.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO pages (id, manual_id, background_color, page_order)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    background_color = excluded.background_color,
                    page_order = excluded.page_order
                WHERE pages.manual_id = excluded.manual_id
                "#,
            )
            .bind(&page.id)
            .bind(&layout.id)
            .bind(&page.background_color)
            .bind(order as i64)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepoError::IdConflict(page.id.clone()));
            }
        }

        // Blocks are diffed across the whole manual, so a block moved to
        // another page survives.
        let stored_blocks: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT blocks.id FROM blocks
            JOIN pages ON pages.id = blocks.page_id
            WHERE pages.manual_id = ?
            "#,
        )
        .bind(&layout.id)
        .fetch_all(&mut *tx)
        .await?;

        for id in sync::blocks_to_delete(layout, &stored_blocks) {
            sqlx::query("DELETE FROM blocks WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for page in &layout.pages {
            for (order, block) in page.blocks.iter().enumerate() {
                let base = block.base();
                let columns = BlockColumns::from(block);
                let result = sqlx::query(
                    r#"
                    INSERT INTO blocks (id, page_id, type, block_order, x, y, width, height, z_index,
                                        content, font_size, font_family, font_weight, color, italic, rotation,
                                        src, alt_text, opacity, label)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(id) DO UPDATE SET
                        page_id = excluded.page_id,
                        type = excluded.type,
                        block_order = excluded.block_order,
                        x = excluded.x,
                        y = excluded.y,
                        width = excluded.width,
                        height = excluded.height,
                        z_index = excluded.z_index,
                        content = excluded.content,
                        font_size = excluded.font_size,
                        font_family = excluded.font_family,
                        font_weight = excluded.font_weight,
                        color = excluded.color,
                        italic = excluded.italic,
                        rotation = excluded.rotation,
                        src = excluded.src,
                        alt_text = excluded.alt_text,
                        opacity = excluded.opacity,
                        label = excluded.label
                    WHERE blocks.page_id IN (SELECT id FROM pages WHERE manual_id = ?)
                    "#,
                )
                .bind(&base.id)
                .bind(&page.id)
                .bind(block.kind())
                .bind(order as i64)
                .bind(base.x)
                .bind(base.y)
                .bind(base.width)
                .bind(base.height)
                .bind(base.z_index)
                .bind(columns.content)
                .bind(columns.font_size)
                .bind(columns.font_family)
                .bind(columns.font_weight)
                .bind(columns.color)
                .bind(columns.italic)
                .bind(columns.rotation)
                .bind(columns.src)
                .bind(columns.alt_text)
                .bind(columns.opacity)
                .bind(columns.label)
                .bind(&layout.id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(RepoError::IdConflict(base.id.clone()));
                }
            }
        }

        let stored_pages: Vec<String> =
            sqlx::query_scalar("SELECT id FROM pages WHERE manual_id = ?")
                .bind(&layout.id)
                .fetch_all(&mut *tx)
                .await?;

        for id in sync::pages_to_delete(layout, &stored_pages) {
            // CASCADE removes any blocks still on the page
            sqlx::query("DELETE FROM pages WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            manual_id = %layout.id,
            pages = layout.pages.len(),
            blocks = layout.block_count(),
            "Saved manual"
        );

        Ok(layout.id.clone())
    }

    /// Loads a manual by id regardless of owner.
    pub async fn fetch_layout(&self, manual_id: &str) -> Result<Option<ManualLayout>, sqlx::Error> {
        let row: Option<ManualRow> = sqlx::query_as(
            "SELECT id, title, created_at, updated_at FROM manuals WHERE id = ?",
        )
        .bind(manual_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate_layout(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Loads a manual only if it belongs to `user_id`.
    pub async fn fetch_layout_for_user(
        &self,
        user_id: &str,
        manual_id: &str,
    ) -> Result<Option<ManualLayout>, sqlx::Error> {
        let row: Option<ManualRow> = sqlx::query_as(
            "SELECT id, title, created_at, updated_at FROM manuals WHERE id = ? AND user_id = ?",
        )
        .bind(manual_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate_layout(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// The user's most recently updated manual.
    pub async fn fetch_latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ManualLayout>, sqlx::Error> {
        let row: Option<ManualRow> = sqlx::query_as(
            r#"
            SELECT id, title, created_at, updated_at FROM manuals
            WHERE user_id = ?
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate_layout(row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<ManualSummary>, sqlx::Error> {
        let rows: Vec<ManualRow> = sqlx::query_as(
            r#"
            SELECT id, title, created_at, updated_at FROM manuals
            WHERE user_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ManualSummary {
                created_at: parse_timestamp(&row.created_at),
                updated_at: parse_timestamp(&row.updated_at),
                id: row.id,
                title: row.title,
            })
            .collect())
    }

    /// Returns false when the user has no manual with this id.
    pub async fn update_title(
        &self,
        user_id: &str,
        manual_id: &str,
        title: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE manuals SET title = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(title)
        .bind(now_timestamp())
        .bind(manual_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when the user has no manual with this id.
    pub async fn delete(&self, user_id: &str, manual_id: &str) -> Result<bool, sqlx::Error> {
        // CASCADE will handle pages and blocks
        let result = sqlx::query("DELETE FROM manuals WHERE id = ? AND user_id = ?")
            .bind(manual_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hydrate_layout(&self, row: ManualRow) -> Result<ManualLayout, sqlx::Error> {
        let page_rows: Vec<PageRow> = sqlx::query_as(
            "SELECT id, background_color FROM pages WHERE manual_id = ? ORDER BY page_order",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let mut pages = Vec::with_capacity(page_rows.len());
        for page_row in page_rows {
            let block_rows: Vec<BlockRow> = sqlx::query_as(
                r#"
                SELECT id, type AS kind, x, y, width, height, z_index,
                       content, font_size, font_family, font_weight, color, italic, rotation,
                       src, alt_text, opacity, label
                FROM blocks
                WHERE page_id = ?
                ORDER BY block_order
                "#,
            )
            .bind(&page_row.id)
            .fetch_all(&self.pool)
            .await?;

            pages.push(Page {
                id: page_row.id,
                background_color: page_row.background_color,
                blocks: block_rows.into_iter().filter_map(BlockRow::into_block).collect(),
            });
        }

        Ok(ManualLayout {
            id: row.id,
            title: Some(row.title),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use neomanual_core::model::FontWeight;
    use tempfile::TempDir;

    struct TestContext {
        repo: ManualRepository,
        pool: SqlitePool,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        TestContext {
            repo: ManualRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn text(content: &str) -> Block {
        let mut block = TextBlock::new(content, 14.0, BlockBase::new(50.0, 50.0, 200.0, 100.0));
        block.font_weight = Some(FontWeight::Normal);
        Block::Text(block)
    }

    fn image(src: &str) -> Block {
        let mut block = ImageBlock::new(src, BlockBase::new(10.0, 20.0, 150.0, 150.0));
        block.opacity = Some(0.5);
        block.alt_text = Some("alt".to_string());
        block.base.z_index = Some(2);
        Block::Image(block)
    }

    fn sample_layout() -> ManualLayout {
        let mut cover = Page::new().with_blocks(vec![text("Hello"), image("cover.png")]);
        cover.background_color = Some("#eee".to_string());
        ManualLayout::new()
            .with_title("Streets of Rage")
            .with_pages(vec![cover, Page::new().with_blocks(vec![text("Page two")])])
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_fetch_roundtrip() {
        let ctx = setup_repo().await;
        let layout = sample_layout();

        let id = ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();
        assert_eq!(id, layout.id);

        let fetched = ctx.repo.fetch_layout(&id).await.unwrap().unwrap();
        assert_eq!(fetched, layout);
    }

    #[tokio::test]
    async fn test_save_applies_column_defaults() {
        let ctx = setup_repo().await;
        let plain_text = Block::Text(TextBlock::new("x", 12.0, BlockBase::new(0.0, 0.0, 1.0, 1.0)));
        let plain_image = Block::Image(ImageBlock::new("", BlockBase::new(0.0, 0.0, 1.0, 1.0)));
        let mut layout = ManualLayout::new()
            .with_pages(vec![Page::new().with_blocks(vec![plain_text, plain_image])]);
        layout.title = Some("   ".to_string());

        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();
        let fetched = ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap();

        assert_eq!(fetched.title.as_deref(), Some(DEFAULT_MANUAL_TITLE));
        match &fetched.pages[0].blocks[..] {
            [Block::Text(text), Block::Image(image)] => {
                assert_eq!(text.font_weight, Some(FontWeight::Normal));
                assert_eq!(image.opacity, Some(1.0));
            }
            other => panic!("unexpected blocks: {:?}", other),
        }

        let (src, content): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT src, content FROM blocks WHERE type = 'text'")
                .fetch_one(&ctx.pool)
                .await
                .unwrap();
        assert!(src.is_none());
        assert_eq!(content.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let ctx = setup_repo().await;
        let layout = sample_layout();

        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert_eq!(count(&ctx.pool, "manuals").await, 1);
        assert_eq!(count(&ctx.pool, "pages").await, 2);
        assert_eq!(count(&ctx.pool, "blocks").await, 3);
        assert_eq!(ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap(), layout);
    }

    #[tokio::test]
    async fn test_save_deletes_removed_blocks_and_pages() {
        let ctx = setup_repo().await;
        let mut layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        layout.pages[0].blocks.remove(1);
        layout.pages.remove(1);
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert_eq!(count(&ctx.pool, "pages").await, 1);
        assert_eq!(count(&ctx.pool, "blocks").await, 1);
        assert_eq!(ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap(), layout);
    }

    #[tokio::test]
    async fn test_block_moved_between_pages_survives() {
        let ctx = setup_repo().await;
        let mut layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        // Move the image onto page two and drop page one.
        let moved = layout.pages[0].blocks.remove(1);
        layout.pages[1].blocks.push(moved);
        layout.pages.remove(0);
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        let fetched = ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap();
        assert_eq!(fetched, layout);
        assert_eq!(count(&ctx.pool, "blocks").await, 2);
    }

    #[tokio::test]
    async fn test_page_and_block_order_follow_layout() {
        let ctx = setup_repo().await;
        let mut layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        layout.pages.swap(0, 1);
        layout.pages[1].blocks.reverse();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert_eq!(ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap(), layout);
    }

    #[tokio::test]
    async fn test_save_rejects_other_users_manual() {
        let ctx = setup_repo().await;
        let mut layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        layout.title = Some("Hijacked".to_string());
        let err = ctx
            .repo
            .save_manual_with_pages("user2", &layout)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotOwner(_)));

        let stored = ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Streets of Rage"));
    }

    #[tokio::test]
    async fn test_save_rejects_page_of_other_manual() {
        let ctx = setup_repo().await;
        let first = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &first).await.unwrap();

        let second = ManualLayout::new().with_pages(vec![first.pages[1].clone()]);
        let err = ctx
            .repo
            .save_manual_with_pages("user1", &second)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::IdConflict(_)));
        assert_eq!(count(&ctx.pool, "manuals").await, 1);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_layout() {
        let ctx = setup_repo().await;
        let layout = ManualLayout::new().with_pages(vec![]);

        let err = ctx
            .repo
            .save_manual_with_pages("user1", &layout)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidLayout(LayoutError::NoPages)));
        assert_eq!(count(&ctx.pool, "manuals").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_block_type_is_skipped() {
        let ctx = setup_repo().await;
        let layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        sqlx::query("UPDATE blocks SET type = 'video' WHERE type = 'image'")
            .execute(&ctx.pool)
            .await
            .unwrap();

        let fetched = ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap();
        assert_eq!(fetched.block_count(), 2);
    }

    #[tokio::test]
    async fn test_list_and_latest_by_user() {
        let ctx = setup_repo().await;
        let older = sample_layout().with_title("Older");
        let newer = sample_layout().with_title("Newer");
        let other = sample_layout().with_title("Other");

        ctx.repo.save_manual_with_pages("user1", &older).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        ctx.repo.save_manual_with_pages("user1", &newer).await.unwrap();
        ctx.repo.save_manual_with_pages("user2", &other).await.unwrap();

        let summaries = ctx.repo.list_by_user("user1").await.unwrap();
        let titles: Vec<&str> = summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        let latest = ctx.repo.fetch_latest_for_user("user1").await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
        assert!(ctx.repo.fetch_latest_for_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_for_user_checks_owner() {
        let ctx = setup_repo().await;
        let layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert!(ctx.repo.fetch_layout_for_user("user1", &layout.id).await.unwrap().is_some());
        assert!(ctx.repo.fetch_layout_for_user("user2", &layout.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_title() {
        let ctx = setup_repo().await;
        let layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert!(ctx.repo.update_title("user1", &layout.id, "Renamed").await.unwrap());
        assert!(!ctx.repo.update_title("user2", &layout.id, "Nope").await.unwrap());

        let fetched = ctx.repo.fetch_layout(&layout.id).await.unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let ctx = setup_repo().await;
        let layout = sample_layout();
        ctx.repo.save_manual_with_pages("user1", &layout).await.unwrap();

        assert!(!ctx.repo.delete("user2", &layout.id).await.unwrap());
        assert!(ctx.repo.delete("user1", &layout.id).await.unwrap());

        assert!(ctx.repo.fetch_layout(&layout.id).await.unwrap().is_none());
        assert_eq!(count(&ctx.pool, "pages").await, 0);
        assert_eq!(count(&ctx.pool, "blocks").await, 0);
    }
}
