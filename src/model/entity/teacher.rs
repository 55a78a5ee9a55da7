use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Teacher {
    id: Uuid,
    user_id: Option<Uuid>,
    full_name: String,
    email: Option<String>,
}

impl ResourceTyped for Teacher {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Teacher
    }
}

impl Teacher {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TeacherCreate {
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub email: Option<String>,
}

#[async_trait]
impl Repository<Teacher, TeacherCreate, Uuid> for Teacher {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: TeacherCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            "INSERT INTO teachers (id, user_id, full_name, email) VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(&data.full_name)
        .bind(&data.email)
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
        let result = sqlx::query_as("SELECT * FROM teachers WHERE id = ?1")
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
        let result = sqlx::query_as("SELECT * FROM teachers ORDER BY full_name LIMIT ?1 OFFSET ?2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}
