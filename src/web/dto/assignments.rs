use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AssignmentCreateBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub group_id: Uuid,
    pub deadline: DateTime<Utc>,
    /// Required when an admin creates the assignment
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmissionBody {
    pub answer_text: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GradeBody {
    /// 0..=7
    pub grade: i32,
    pub comment: Option<String>,
}
