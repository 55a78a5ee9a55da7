use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Assignment {
    id: Uuid,
    title: String,
    description: String,
    group_id: Uuid,
    teacher_id: Uuid,
    deadline: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Assignment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Assignment
    }
}

impl Assignment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    pub fn teacher_id(&self) -> Uuid {
        self.teacher_id
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AssignmentCreate {
    pub title: String,
    pub description: String,
    pub group_id: Uuid,
    pub teacher_id: Uuid,
    pub deadline: DateTime<Utc>,
}

#[async_trait]
impl Repository<Assignment, AssignmentCreate, Uuid> for Assignment {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AssignmentCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO assignments (id, title, description, group_id, teacher_id, deadline, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.group_id)
        .bind(data.teacher_id)
        .bind(data.deadline)
        .bind(Utc::now())
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM assignments WHERE id = ?1")
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
        let result =
            sqlx::query_as("SELECT * FROM assignments ORDER BY created_at DESC LIMIT ?1 OFFSET ?2")
                .bind(limit)
                .bind(offset)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assignments")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Assignment {
    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Uuid> {
        Ok(self.teacher_id)
    }
}

impl Assignment {
    pub async fn all_for_group(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        group_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM assignments WHERE group_id = ?1 ORDER BY created_at DESC")
                .bind(group_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn all_for_teacher(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        teacher_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM assignments WHERE teacher_id = ?1 ORDER BY created_at DESC",
        )
        .bind(teacher_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
