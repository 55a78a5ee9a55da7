use crate::history::HistoryRecord;
use crate::model::entity::Student;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Append-only log of group transfers. Entries are never updated; a later
/// entry for the same student supersedes earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct GroupHistory {
    id: Uuid,
    student_id: Uuid,
    group_id: Uuid,
    transfer_date: NaiveDate,
    reason: String,
}

impl crate::model::ResourceTyped for GroupHistory {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::GroupHistory
    }
}

impl GroupHistory {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    pub fn transfer_date(&self) -> NaiveDate {
        self.transfer_date
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GroupHistoryCreate {
    pub student_id: Uuid,
    pub group_id: Uuid,
    pub transfer_date: NaiveDate,
    pub reason: String,
}

impl GroupHistory {
    /// Appends an entry without touching the student's cached group. Callers
    /// must refresh the cache in the same transaction.
    pub async fn append(
        conn: &mut SqliteConnection,
        data: &GroupHistoryCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO group_history (id, student_id, group_id, transfer_date, reason)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, student_id, group_id, transfer_date, reason
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.student_id)
        .bind(data.group_id)
        .bind(data.transfer_date)
        .bind(&data.reason)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    /// Appends an entry and refreshes the student's current group in one
    /// transaction.
    #[tracing::instrument(skip(mm, _actor))]
    pub async fn record_transfer(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: GroupHistoryCreate,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.executor().begin().await?;
        let entry = Self::append(&mut tx, &data).await?;
        Student::refresh_current_group(&mut tx, data.student_id).await?;
        tx.commit().await?;

        tracing::debug!("student {} moved to group {}", data.student_id, data.group_id);
        Ok(entry)
    }

    /// Entries of one student, oldest first.
    pub async fn for_student(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT id, student_id, group_id, transfer_date, reason
            FROM group_history
            WHERE student_id = ?1
            ORDER BY transfer_date ASC, rowid ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// The whole log joined with names and group numbers, in log order.
    pub async fn all_records(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<HistoryRecord>> {
        let result = sqlx::query_as(
            r#"
            SELECT
                h.student_id,
                s.full_name AS student_name,
                h.group_id,
                g.number AS group_number,
                h.transfer_date
            FROM group_history h
            JOIN students s ON s.id = h.student_id
            JOIN study_groups g ON g.id = h.group_id
            ORDER BY h.transfer_date ASC, h.rowid ASC
            "#,
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_history")
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    /// Drops the whole log together with every current-group cache. Only
    /// used by full re-imports.
    pub async fn clear(conn: &mut SqliteConnection) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM group_history")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE students SET current_group_id = NULL")
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
