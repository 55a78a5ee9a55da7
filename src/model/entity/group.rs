use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub static DEFAULT_GROUP_COLOR: &str = "#bd2e8d";

/// Study group. `number` is a label such as `1`, `2.1` or `3`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Group {
    id: Uuid,
    number: f64,
    teacher_id: Option<Uuid>,
    description: String,
    color: String,
}

impl ResourceTyped for Group {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Group
    }
}

impl Group {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn number(&self) -> f64 {
        self.number
    }

    pub fn teacher_id(&self) -> Option<Uuid> {
        self.teacher_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Group {}", self.number)
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GroupCreate {
    pub number: f64,
    pub teacher_id: Option<Uuid>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[async_trait]
impl Repository<Group, GroupCreate, Uuid> for Group {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: GroupCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            "INSERT INTO study_groups (id, number, teacher_id, description, color) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.number)
        .bind(data.teacher_id)
        .bind(data.description.unwrap_or_default())
        .bind(data.color.unwrap_or_else(|| DEFAULT_GROUP_COLOR.to_string()))
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
        let result = sqlx::query_as("SELECT * FROM study_groups WHERE id = ?1")
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
        let result = sqlx::query_as("SELECT * FROM study_groups ORDER BY number LIMIT ?1 OFFSET ?2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_groups")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Group {
    pub async fn find_by_number(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        number: f64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM study_groups WHERE number = ?1")
            .bind(number)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM study_groups ORDER BY number")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct GroupWithCountRow {
    pub id: Uuid,
    pub number: f64,
    pub teacher_id: Option<Uuid>,
    pub teacher_name: Option<String>,
    pub description: String,
    pub color: String,
    pub student_count: i64,
}

impl GroupWithCountRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                g.id,
                g.number,
                g.teacher_id,
                t.full_name AS teacher_name,
                g.description,
                g.color,
                COUNT(s.id) AS student_count
            FROM study_groups g
            LEFT JOIN teachers t ON t.id = g.teacher_id
            LEFT JOIN students s ON s.current_group_id = g.id
            GROUP BY g.id
            ORDER BY g.number
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
