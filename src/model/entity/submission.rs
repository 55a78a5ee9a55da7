use crate::model::access::HasOwner;
use crate::model::entity::Assignment;
use crate::model::repo::ResourceTyped;
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const MAX_SUBMISSION_GRADE: i32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Submission {
    id: Uuid,
    assignment_id: Uuid,
    student_id: Uuid,
    answer_text: String,
    submitted_at: DateTime<Utc>,
    grade: Option<i32>,
    teacher_comment: String,
}

impl ResourceTyped for Submission {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Submission
    }
}

impl Submission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn assignment_id(&self) -> Uuid {
        self.assignment_id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn grade(&self) -> Option<i32> {
        self.grade
    }

    pub fn teacher_comment(&self) -> &str {
        &self.teacher_comment
    }
}

pub struct SubmissionCreate {
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub answer_text: String,
}

impl Submission {
    /// One submission per (assignment, student); a repeat is a
    /// [`DatabaseError::Conflict`].
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SubmissionCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO submissions (id, assignment_id, student_id, answer_text, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.assignment_id)
        .bind(data.student_id)
        .bind(&data.answer_text)
        .bind(Utc::now())
        .fetch_one(mm.executor())
        .await
        .map_err(DatabaseError::from_insert)?;

        Ok(row)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM submissions WHERE id = ?1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all_for_assignment(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        assignment_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM submissions WHERE assignment_id = ?1 ORDER BY submitted_at DESC",
        )
        .bind(assignment_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Stores a teacher grade (0..=7) and comment.
    pub async fn set_grade(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        grade: i32,
        comment: String,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE submissions SET grade = ?1, teacher_comment = ?2 WHERE id = ?3")
            .bind(grade)
            .bind(&comment)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.grade = Some(grade);
        self.teacher_comment = comment;
        Ok(self)
    }
}

/// Submissions are owned by the teacher of their assignment.
#[async_trait]
impl HasOwner for Submission {
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Uuid> {
        use crate::model::Repository;

        let assignment = Assignment::find_by_id(mm, actor, self.assignment_id)
            .await?
            .ok_or(DatabaseError::Forbidden)?;
        Ok(assignment.teacher_id())
    }
}
