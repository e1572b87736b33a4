// Row structs and the JSON shapes built from them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The caller context resolved from a bearer token; passed explicitly into
/// every operation that needs identity or role.
#[derive(Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_deleted: bool,
}

/// Author summary embedded in comments and pages.
#[derive(Clone, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub flagged: bool,
    pub page_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub user_id: i64,
    pub user_name: String,
}

/// A comment as clients see it. Top-level comments carry their direct
/// replies; replies carry an empty list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub flagged: bool,
    pub page_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub user: Author,
    pub replies: Vec<Comment>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            text: row.text,
            flagged: row.flagged,
            page_id: row.page_id,
            parent_id: row.parent_id,
            created_at: row.created_at,
            user: Author {
                id: row.user_id,
                name: row.user_name,
            },
            replies: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ModerationCommentRow {
    pub id: i64,
    pub text: String,
    pub flagged: bool,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub user_id: i64,
    pub user_name: String,
    pub page_id: i64,
    pub page_title: String,
    pub reply_count: i64,
}

/// Flat moderation-panel view: no nesting, annotated with the parent page
/// and the number of replies.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationComment {
    pub id: i64,
    pub text: String,
    pub flagged: bool,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub user: Author,
    pub page: PageRef,
    pub reply_count: i64,
}

impl From<ModerationCommentRow> for ModerationComment {
    fn from(row: ModerationCommentRow) -> Self {
        ModerationComment {
            id: row.id,
            text: row.text,
            flagged: row.flagged,
            parent_id: row.parent_id,
            created_at: row.created_at,
            user: Author {
                id: row.user_id,
                name: row.user_name,
            },
            page: PageRef {
                id: row.page_id,
                title: row.page_title,
            },
            reply_count: row.reply_count,
        }
    }
}

#[derive(Clone, Serialize)]
pub struct PageRef {
    pub id: i64,
    pub title: String,
}

#[derive(Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow)]
pub struct PageRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_path: String,
    pub created_at: String,
    pub category_id: i64,
    pub category_name: String,
    pub author_id: i64,
    pub author_name: String,
    pub comment_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_path: String,
    pub created_at: String,
    pub category: CategoryRef,
    pub created_by: Author,
    pub comment_count: i64,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            id: row.id,
            title: row.title,
            content: row.content,
            image_path: row.image_path,
            created_at: row.created_at,
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name,
            },
            created_by: Author {
                id: row.author_id,
                name: row.author_name,
            },
            comment_count: row.comment_count,
        }
    }
}

#[derive(sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub page_count: i64,
}

#[derive(sqlx::FromRow)]
pub struct TestRow {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub questions_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: i64,
    pub text: String,
    pub answers: Vec<AnswerDetail>,
}

/// Full test detail including the answer key; admin-facing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetail {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub questions: Vec<QuestionDetail>,
}

#[derive(sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRow {
    pub id: i64,
    pub score: i64,
    pub total: i64,
    pub test_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

#[derive(sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecordRow {
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
}

#[derive(sqlx::FromRow)]
pub struct ResultTallyRow {
    pub test_id: i64,
    pub score: i64,
    pub total: i64,
}

#[derive(sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_deleted: bool,
    pub created_at: String,
    pub comment_count: i64,
}
