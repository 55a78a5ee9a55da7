use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        DatabaseResult,
        entity::{Lesson, LessonTask, LessonTaskState},
    },
    quiz::{self, Exercise, ExerciseQuestion, GradeReport},
};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonView {
    pub lesson: Lesson,
    pub state: LessonTaskState,
    /// Prompts only, answer keys are part of `result`
    pub exercises: Vec<ExerciseQuestion>,
    pub result: Option<LessonResult>,
}

impl LessonView {
    pub fn new(lesson: Lesson, task: &LessonTask) -> DatabaseResult<Self> {
        let exercises = task.exercises()?;
        let result = match task.state() {
            LessonTaskState::Submitted => Some(LessonResult::from_task(task)?),
            LessonTaskState::Pending => None,
        };

        Ok(Self {
            lesson,
            state: task.state(),
            exercises: exercises.iter().map(ExerciseQuestion::from).collect(),
            result,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitBody {
    /// Exercise index (as string) → answer
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExerciseOutcome {
    pub exercise: Exercise,
    pub given: String,
    pub correct: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonResult {
    pub correct_count: i32,
    pub total_count: i32,
    pub earned_points: u32,
    pub total_points: u32,
    pub percentage: f64,
    pub score: Option<i32>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub exercises: Vec<ExerciseOutcome>,
}

impl LessonResult {
    /// Rebuilds the result from what was stored at submission.
    pub fn from_task(task: &LessonTask) -> DatabaseResult<Self> {
        let answers = task.answers()?;
        let report = quiz::grade(&task.exercises()?, &answers);
        Self::from_report(task, &answers, report)
    }

    /// Result of a submission that was just graded into `report`.
    pub fn from_report(
        task: &LessonTask,
        answers: &HashMap<String, String>,
        report: GradeReport,
    ) -> DatabaseResult<Self> {
        let exercises = task
            .exercises()?
            .into_iter()
            .zip(&report.correct)
            .enumerate()
            .map(|(idx, (exercise, &correct))| ExerciseOutcome {
                exercise,
                given: answers.get(&idx.to_string()).cloned().unwrap_or_default(),
                correct,
            })
            .collect();

        Ok(Self {
            correct_count: task.correct_count(),
            total_count: task.total_count(),
            earned_points: report.earned_points,
            total_points: report.total_points,
            percentage: report.percentage,
            score: task.score(),
            submitted_at: task.submitted_at(),
            exercises,
        })
    }
}
