use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub text: String,
    pub page_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBody {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub image_path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestBody {
    pub title: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub text: String,
    pub answers: Vec<NewAnswer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestBody {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub answer_id: i64,
}
