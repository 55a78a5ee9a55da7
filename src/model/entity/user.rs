use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;
use crate::web::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};

pub static ROLE_ADMIN: &str = "admin";
pub static ROLE_TEACHER: &str = "teacher";
pub static ROLE_STUDENT: &str = "student";

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: uuid::Uuid,
    username: String,
    #[serde(skip)]
    password_hash: String,
    role: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreate {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

#[async_trait::async_trait]
impl Repository<UserEntity, UserEntityCreate, uuid::Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let mut conn = mm.executor().acquire().await?;
        Self::insert(&mut conn, &data).await
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
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
        let result = sqlx::query_as("SELECT * FROM users ORDER BY username LIMIT ?1 OFFSET ?2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreate, Uuid);

#[derive(Debug, FromRow)]
struct RoleRow {
    role: String,
    student_id: Option<Uuid>,
    teacher_id: Option<Uuid>,
}

impl UserEntity {
    /// Inserts on an explicit connection so registration can link the new
    /// account to its student in the same transaction.
    pub async fn insert(
        conn: &mut SqliteConnection,
        data: &UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            "INSERT INTO users (id, username, password_hash, role) VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.role)
        .fetch_one(conn)
        .await
        .map_err(crate::model::DatabaseError::from_insert)?;

        Ok(row)
    }

    pub async fn find_by_username(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        username: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Resolves the user's role together with its linked profile. Returns
    /// `None` for unknown users and for non-admin accounts without a profile.
    pub async fn resolve_role(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<UserRole>> {
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            SELECT
                u.role,
                s.id AS student_id,
                t.id AS teacher_id
            FROM users u
            LEFT JOIN students s ON s.user_id = u.id
            LEFT JOIN teachers t ON t.user_id = u.id
            WHERE u.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row.and_then(|row| {
            UserRole::from_parts(&row.role, row.teacher_id, row.student_id)
        }))
    }
}
