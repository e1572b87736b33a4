use color_eyre::{eyre::OptionExt, Result};

use super::models::{Page, PageRef, PageRow};
use super::Db;

const PAGE_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.image_path, p.created_at,
    cat.id AS category_id, cat.name AS category_name,
    u.id AS author_id, u.name AS author_name,
    (SELECT COUNT(*) FROM comments c WHERE c.page_id = p.id) AS comment_count
"#;

const PAGE_JOINS: &str = r#"
    FROM pages p
    JOIN categories cat ON cat.id = p.category_id
    JOIN users u ON u.id = p.created_by_id
"#;

impl Db {
    pub async fn page_exists(&self, page_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pages WHERE id = $1)")
            .bind(page_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn get_page(&self, page_id: i64) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} {PAGE_JOINS} WHERE p.id = $1"
        ))
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Page::from))
    }

    /// Paginated newest-first listing with optional category filter and
    /// case-insensitive title/content search. Returns the page slice and the
    /// total match count.
    pub async fn list_pages(
        &self,
        offset: i64,
        limit: i64,
        category_id: Option<i64>,
        search: Option<&str>,
    ) -> Result<(Vec<Page>, i64)> {
        let pattern = search.map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            SELECT {PAGE_COLUMNS} {PAGE_JOINS}
            WHERE ($1 IS NULL OR p.category_id = $1)
              AND ($2 IS NULL OR p.title LIKE $2 OR p.content LIKE $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(category_id)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM pages p
            WHERE ($1 IS NULL OR p.category_id = $1)
              AND ($2 IS NULL OR p.title LIKE $2 OR p.content LIKE $2)
            "#,
        )
        .bind(category_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Page::from).collect(), total))
    }

    /// Pages ranked by comment volume; feeds the moderation panel's filter
    /// dropdown.
    pub async fn pages_by_comment_count(&self, limit: i64) -> Result<Vec<(PageRef, i64)>> {
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            r#"
            SELECT p.id, p.title, COUNT(c.id) AS comment_count
            FROM pages p
            LEFT JOIN comments c ON c.page_id = p.id
            GROUP BY p.id, p.title
            ORDER BY comment_count DESC, p.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, count)| (PageRef { id, title }, count))
            .collect())
    }

    pub async fn create_page(
        &self,
        title: &str,
        content: &str,
        image_path: &str,
        category_id: i64,
        created_by_id: i64,
    ) -> Result<Page> {
        let page_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pages (title, content, image_path, category_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(image_path)
        .bind(category_id)
        .bind(created_by_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("page {page_id} created by user {created_by_id}");

        self.get_page(page_id)
            .await?
            .ok_or_eyre("page missing right after insert")
    }

    pub async fn update_page(
        &self,
        page_id: i64,
        title: &str,
        content: &str,
        image_path: &str,
        category_id: i64,
    ) -> Result<Option<Page>> {
        let affected = sqlx::query(
            "UPDATE pages SET title = $1, content = $2, image_path = $3, category_id = $4 WHERE id = $5",
        )
        .bind(title)
        .bind(content)
        .bind(image_path)
        .bind(category_id)
        .bind(page_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Ok(None);
        }

        tracing::info!("page {page_id} updated");
        self.get_page(page_id).await
    }

    /// Hard delete; the page's comments go with it.
    pub async fn delete_page(&self, page_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE page_id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        let affected = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if affected > 0 {
            tracing::info!("page {page_id} deleted");
        }
        Ok(affected > 0)
    }
}
