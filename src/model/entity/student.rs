use crate::model::access::HasOwner;
use crate::model::entity::Group;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::Repository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Student {
    id: Uuid,
    user_id: Option<Uuid>,
    full_name: String,
    class_name: Option<String>,
    /// Cache of the latest group-history entry, see [`Student::refresh_current_group`].
    current_group_id: Option<Uuid>,
    is_registered: bool,
}

impl ResourceTyped for Student {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Student
    }
}

impl Student {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn current_group_id(&self) -> Option<Uuid> {
        self.current_group_id
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }
}

/// Student records are created without a group; groups are assigned through
/// the history log.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StudentCreate {
    pub full_name: String,
    pub class_name: Option<String>,
}

#[async_trait]
impl Repository<Student, StudentCreate, Uuid> for Student {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StudentCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            "INSERT INTO students (id, full_name, class_name) VALUES (?1, ?2, ?3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.full_name)
        .bind(&data.class_name)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM students WHERE id = ?1")
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
        let result = sqlx::query_as("SELECT * FROM students ORDER BY full_name LIMIT ?1 OFFSET ?2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Student {
    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Uuid> {
        Ok(self.id)
    }
}

impl Student {
    /// Every student with exactly this name. Names are not unique, callers
    /// decide what more than one match means.
    pub async fn find_by_full_name(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        full_name: &str,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM students WHERE full_name = ?1")
            .bind(full_name)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn unregistered(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM students WHERE is_registered = FALSE ORDER BY full_name")
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn set_class_name(
        conn: &mut SqliteConnection,
        id: Uuid,
        class_name: &str,
    ) -> DatabaseResult<()> {
        sqlx::query("UPDATE students SET class_name = ?1 WHERE id = ?2")
            .bind(class_name)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Links an account to a not yet registered student. Returns `false` when
    /// somebody registered this student first.
    pub async fn link_user(
        conn: &mut SqliteConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE students SET user_id = ?1, is_registered = TRUE WHERE id = ?2 AND is_registered = FALSE",
        )
        .bind(user_id)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Group of the latest history entry on or before `date`.
    pub async fn group_at(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
        date: NaiveDate,
    ) -> DatabaseResult<Option<Group>> {
        let result = sqlx::query_as(
            r#"
            SELECT g.*
            FROM group_history h
            JOIN study_groups g ON g.id = h.group_id
            WHERE h.student_id = ?1 AND h.transfer_date <= ?2
            ORDER BY h.transfer_date DESC, h.rowid DESC
            LIMIT 1
            "#,
        )
        .bind(id)
        .bind(date)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// Recomputes the `current_group_id` cache: the group of the latest entry
    /// in the log, future-dated ones included. It only depends on the log, so
    /// refreshing on every history write keeps it exact.
    pub async fn refresh_current_group(conn: &mut SqliteConnection, id: Uuid) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE students SET current_group_id = (
                SELECT group_id
                FROM group_history
                WHERE student_id = ?1
                ORDER BY transfer_date DESC, rowid DESC
                LIMIT 1
            )
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct StudentWithGroupRow {
    pub id: Uuid,
    pub full_name: String,
    pub class_name: Option<String>,
    pub is_registered: bool,
    pub group_id: Option<Uuid>,
    pub group_number: Option<f64>,
}

impl StudentWithGroupRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        group_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                s.id,
                s.full_name,
                s.class_name,
                s.is_registered,
                g.id AS group_id,
                g.number AS group_number
            FROM students s
            LEFT JOIN study_groups g ON g.id = s.current_group_id
            WHERE ?1 IS NULL OR s.current_group_id = ?1
            ORDER BY s.full_name
            "#,
        )
        .bind(group_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
