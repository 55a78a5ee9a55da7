use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;

use crate::{
    model::{
        ResourceTyped,
        entity::{Lesson, LessonTask, LessonTaskState},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::lessons::{LessonResult, LessonView, SubmitBody},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{date}", get(lessons_get_handler))
        .route("/{date}/submit", post(lessons_submit_handler))
        .route("/{date}/result", get(lessons_result_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_lesson(state: &AppState, ctx: &RequestContext, date: NaiveDate) -> WebResult<Lesson> {
    let user = ctx.user()?;
    Lesson::find_by_date(state.pool(), user, date)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{date}",
    description = "Lesson of the day with the caller's exercises. The exercises are generated on first access and never change afterwards",
    params(
        ("date" = NaiveDate, Path, description = "Lesson date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonView),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only students have exercises", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let (user, student_id) = ctx.student()?;
    let lesson = find_lesson(&state, &ctx, date).await?;

    let task = LessonTask::get_or_create(state.pool(), user, &lesson, student_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?;

    let view = LessonView::new(lesson, &task)
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{date}/submit",
    description = "Grades the caller's answers and stores the result. Only the first submission counts",
    request_body = SubmitBody,
    params(
        ("date" = NaiveDate, Path, description = "Lesson date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Answers graded", body = LessonResult),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only students can submit", body = ErrorResponse),
        (status = 404, description = "Lesson not found or never opened", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub async fn lessons_submit_handler(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    ctx: RequestContext,
    Json(body): Json<SubmitBody>,
) -> WebResult<impl IntoResponse> {
    let (user, student_id) = ctx.student()?;
    let lesson = find_lesson(&state, &ctx, date).await?;

    let task = LessonTask::find_for(state.pool(), user, lesson.id(), student_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(LessonTask::get_resource_type()))?;

    let (task, report) = task
        .submit(state.pool(), user, body.answers)
        .await
        .map_err(|e| WebError::from_database(LessonTask::get_resource_type(), e))?;

    let answers = task
        .answers()
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?;
    let result = LessonResult::from_report(&task, &answers, report)
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{date}/result",
    description = "Stored result of the caller's submission",
    params(
        ("date" = NaiveDate, Path, description = "Lesson date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Result found", body = LessonResult),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only students have results", body = ErrorResponse),
        (status = 404, description = "Lesson not found or not submitted yet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub async fn lessons_result_handler(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let (user, student_id) = ctx.student()?;
    let lesson = find_lesson(&state, &ctx, date).await?;

    let task = LessonTask::find_for(state.pool(), user, lesson.id(), student_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?
        .filter(|task| task.state() == LessonTaskState::Submitted)
        .ok_or(WebError::quiz_not_submitted())?;

    let result = LessonResult::from_task(&task)
        .map_err(|e| WebError::resource_fetch_error(LessonTask::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(result)))
}
