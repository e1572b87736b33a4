use std::collections::HashMap;

use color_eyre::{eyre::OptionExt, Result};

use super::models::{Comment, CommentRow, ModerationComment, ModerationCommentRow};
use super::Db;

const COMMENT_COLUMNS: &str = r#"
    c.id, c.text, c.flagged, c.page_id, c.parent_id, c.created_at,
    u.id AS user_id, u.name AS user_name
"#;

impl Db {
    /// Persist a comment with its pre-computed moderation flag and return it
    /// with the author attached.
    pub async fn create_comment(
        &self,
        text: &str,
        page_id: i64,
        user_id: i64,
        parent_id: Option<i64>,
        flagged: bool,
    ) -> Result<Comment> {
        let comment_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (text, flagged, page_id, user_id, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(text)
        .bind(flagged)
        .bind(page_id)
        .bind(user_id)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "comment {comment_id} created on page {page_id} by user {user_id}, flagged={flagged}"
        );

        self.get_comment(comment_id)
            .await?
            .ok_or_eyre("comment missing right after insert")
    }

    pub async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id WHERE c.id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    /// Top-level comments for a page, newest-first, each with its direct
    /// replies in chronological reading order. When `include_flagged` is
    /// false, flagged comments disappear at both levels independently.
    pub async fn comments_for_page(
        &self,
        page_id: i64,
        include_flagged: bool,
    ) -> Result<Vec<Comment>> {
        let visibility = if include_flagged { "" } else { "AND c.flagged = FALSE" };

        let top_level = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c JOIN users u ON u.id = c.user_id
            WHERE c.page_id = $1 AND c.parent_id IS NULL {visibility}
            ORDER BY c.created_at DESC, c.id DESC
            "#
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        let replies = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c JOIN users u ON u.id = c.user_id
            WHERE c.page_id = $1 AND c.parent_id IS NOT NULL {visibility}
            ORDER BY c.created_at ASC, c.id ASC
            "#
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_parent: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in replies {
            let Some(parent) = row.parent_id else { continue };
            by_parent.entry(parent).or_default().push(row.into());
        }

        let threads = top_level
            .into_iter()
            .map(|row| {
                let mut comment = Comment::from(row);
                comment.replies = by_parent.remove(&comment.id).unwrap_or_default();
                comment
            })
            .collect();

        Ok(threads)
    }

    /// Flat newest-first listing for the moderation panel, optionally
    /// restricted to one page and/or to flagged comments only.
    pub async fn all_comments(
        &self,
        page_id: Option<i64>,
        flagged_only: bool,
    ) -> Result<Vec<ModerationComment>> {
        let rows = sqlx::query_as::<_, ModerationCommentRow>(
            r#"
            SELECT
                c.id, c.text, c.flagged, c.parent_id, c.created_at,
                u.id AS user_id, u.name AS user_name,
                p.id AS page_id, p.title AS page_title,
                (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
            FROM comments c
            JOIN users u ON u.id = c.user_id
            JOIN pages p ON p.id = c.page_id
            WHERE ($1 IS NULL OR c.page_id = $1)
              AND (NOT $2 OR c.flagged)
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(page_id)
        .bind(flagged_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModerationComment::from).collect())
    }

    /// Clear the moderation flag. Idempotent: approving an already-visible
    /// comment succeeds and changes nothing. Returns the updated comment,
    /// or None if the id does not exist.
    pub async fn approve_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let affected = sqlx::query("UPDATE comments SET flagged = FALSE WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Ok(None);
        }

        tracing::info!("comment {comment_id} approved");
        self.get_comment(comment_id).await
    }

    /// Hard delete. Direct replies go with the parent; no orphans are left
    /// behind. Returns false if the id does not exist.
    pub async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE parent_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        let affected = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if affected > 0 {
            tracing::info!("comment {comment_id} deleted");
        }
        Ok(affected > 0)
    }
}
