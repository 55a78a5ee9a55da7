use std::collections::HashMap;

use crate::model::entity::Lesson;
use crate::model::repo::ResourceTyped;
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult};
use crate::quiz::{self, Exercise, GradeReport};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

static EMPTY_TASKS: &str = "[]";

/// Per (lesson, student) quiz. Moves from `Pending` to `Submitted` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LessonTask {
    id: Uuid,
    lesson_id: Uuid,
    student_id: Uuid,
    tasks_data: String,
    answers: Option<String>,
    correct_count: i32,
    total_count: i32,
    score: Option<i32>,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LessonTaskState {
    Pending,
    Submitted,
}

impl ResourceTyped for LessonTask {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonTask
    }
}

impl LessonTask {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn correct_count(&self) -> i32 {
        self.correct_count
    }

    pub fn total_count(&self) -> i32 {
        self.total_count
    }

    pub fn score(&self) -> Option<i32> {
        self.score
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn state(&self) -> LessonTaskState {
        match self.submitted_at {
            Some(_) => LessonTaskState::Submitted,
            None => LessonTaskState::Pending,
        }
    }

    pub fn exercises(&self) -> DatabaseResult<Vec<Exercise>> {
        Ok(serde_json::from_str(&self.tasks_data)?)
    }

    /// Submitted answers, empty while pending.
    pub fn answers(&self) -> DatabaseResult<HashMap<String, String>> {
        match &self.answers {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(HashMap::new()),
        }
    }
}

impl LessonTask {
    pub async fn find_for(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM lesson_tasks WHERE lesson_id = ?1 AND student_id = ?2")
                .bind(lesson_id)
                .bind(student_id)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    /// Returns the student's task set for `lesson`, creating the row and
    /// generating exercises on first access. Later calls never regenerate.
    #[tracing::instrument(skip(mm, _actor, lesson), fields(lesson_id = %lesson.id()))]
    pub async fn get_or_create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson: &Lesson,
        student_id: Uuid,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "INSERT OR IGNORE INTO lesson_tasks (id, lesson_id, student_id) VALUES (?1, ?2, ?3)",
        )
        .bind(Uuid::new_v4())
        .bind(lesson.id())
        .bind(student_id)
        .execute(mm.executor())
        .await?;

        let task: Self =
            sqlx::query_as("SELECT * FROM lesson_tasks WHERE lesson_id = ?1 AND student_id = ?2")
                .bind(lesson.id())
                .bind(student_id)
                .fetch_one(mm.executor())
                .await?;

        if task.tasks_data != EMPTY_TASKS {
            return Ok(task);
        }

        let exercises = quiz::generate_tasks(&lesson.curriculum().to_string());
        let tasks_data = serde_json::to_string(&exercises)?;

        // only the first writer fills the set
        sqlx::query(
            "UPDATE lesson_tasks SET tasks_data = ?1, total_count = ?2 WHERE id = ?3 AND tasks_data = ?4",
        )
        .bind(&tasks_data)
        .bind(exercises.len() as i32)
        .bind(task.id)
        .bind(EMPTY_TASKS)
        .execute(mm.executor())
        .await?;
        tracing::debug!("generated {} exercises", exercises.len());

        let task = sqlx::query_as("SELECT * FROM lesson_tasks WHERE id = ?1")
            .bind(task.id)
            .fetch_one(mm.executor())
            .await?;
        Ok(task)
    }

    /// Grades `answers` and moves the task to `Submitted`. The transition is a
    /// single conditional update, a second submission fails with
    /// [`DatabaseError::AlreadySubmitted`] and leaves the stored result as is.
    #[tracing::instrument(skip_all, fields(task_id = %self.id))]
    pub async fn submit(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        answers: HashMap<String, String>,
    ) -> DatabaseResult<(Self, GradeReport)> {
        if self.state() == LessonTaskState::Submitted {
            return Err(DatabaseError::AlreadySubmitted);
        }

        let answers: HashMap<String, String> = answers
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();
        let report = quiz::grade(&self.exercises()?, &answers);
        let answers_raw = serde_json::to_string(&answers)?;

        let updated: Option<Self> = sqlx::query_as(
            r#"
            UPDATE lesson_tasks
            SET answers = ?1, correct_count = ?2, total_count = ?3, score = ?4, submitted_at = ?5
            WHERE id = ?6 AND submitted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(&answers_raw)
        .bind(report.correct_count)
        .bind(report.total_count)
        .bind(report.grade)
        .bind(Utc::now())
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        match updated {
            Some(task) => {
                tracing::info!(grade = report.grade, "lesson task submitted");
                Ok((task, report))
            }
            None => Err(DatabaseError::AlreadySubmitted),
        }
    }
}
