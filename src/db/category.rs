use color_eyre::Result;

use super::models::{CategoryRow, Page, PageRow};
use super::Db;

impl Db {
    pub async fn category_exists(&self, category_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let categories = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT
                cat.id, cat.name,
                (SELECT COUNT(*) FROM pages p WHERE p.category_id = cat.id) AS page_count
            FROM categories cat
            ORDER BY cat.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// A category together with its pages, newest-first.
    pub async fn get_category(&self, category_id: i64) -> Result<Option<(CategoryRow, Vec<Page>)>> {
        let category = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT
                cat.id, cat.name,
                (SELECT COUNT(*) FROM pages p WHERE p.category_id = cat.id) AS page_count
            FROM categories cat
            WHERE cat.id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(category) = category else {
            return Ok(None);
        };

        let pages = sqlx::query_as::<_, PageRow>(
            r#"
            SELECT
                p.id, p.title, p.content, p.image_path, p.created_at,
                cat.id AS category_id, cat.name AS category_name,
                u.id AS author_id, u.name AS author_name,
                (SELECT COUNT(*) FROM comments c WHERE c.page_id = p.id) AS comment_count
            FROM pages p
            JOIN categories cat ON cat.id = p.category_id
            JOIN users u ON u.id = p.created_by_id
            WHERE p.category_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((category, pages.into_iter().map(Page::from).collect())))
    }
}
