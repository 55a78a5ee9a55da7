use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};
use crate::quiz::Curriculum;
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    lesson_date: NaiveDate,
    title: String,
    content: String,
    theory_minutes: i32,
    practice_minutes: i32,
    curriculum: String,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_date(&self) -> NaiveDate {
        self.lesson_date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn theory_minutes(&self) -> i32 {
        self.theory_minutes
    }

    pub fn practice_minutes(&self) -> i32 {
        self.practice_minutes
    }

    /// Unknown selectors fall back to mixed fractions.
    pub fn curriculum(&self) -> Curriculum {
        Curriculum::from(self.curriculum.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub lesson_date: NaiveDate,
    pub title: String,
    pub content: String,
    pub theory_minutes: Option<i32>,
    pub practice_minutes: Option<i32>,
    pub curriculum: Option<String>,
}

#[async_trait]
impl Repository<Lesson, LessonCreate, Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO lessons (id, lesson_date, title, content, theory_minutes, practice_minutes, curriculum)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.lesson_date)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.theory_minutes.unwrap_or(0))
        .bind(data.practice_minutes.unwrap_or(0))
        .bind(
            data.curriculum
                .unwrap_or_else(|| Curriculum::MixedFractions.to_string()),
        )
        .fetch_one(mm.executor())
        .await
        .map_err(crate::model::DatabaseError::from_insert)?;

        Ok(row)
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = ?1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons ORDER BY lesson_date LIMIT ?1 OFFSET ?2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    pub async fn find_by_date(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        date: NaiveDate,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE lesson_date = ?1")
            .bind(date)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
